//! Merging server metadata into an exported image container.
//!
//! Image containers written alongside an export carry a textual metadata
//! block describing the image. [`merge_into_container`] enriches that block
//! with the acquisition metadata held on the server: the instrument, the
//! per-channel settings, objective settings and imaging environment.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::TranscodeError;
use crate::export::{
    export_imaging_environment, export_instrument, export_objective_settings, export_pixels,
};
use crate::ids::{EntityKind, Lsid};
use crate::interchange::io_json::{from_json_str, to_json_string};
use crate::session::Session;
use crate::source;

/// A file format with an embedded metadata block.
pub trait MetadataContainer {
    /// Path of the container on disk, for error messages.
    fn path(&self) -> &Path;

    fn read_block(&self) -> Result<String, TranscodeError>;

    /// Replaces the block and writes the container back.
    fn write_block(&mut self, block: &str) -> Result<(), TranscodeError>;
}

/// Merges the image's server metadata into the first image described by
/// the container's metadata block.
///
/// The instrument is replaced if the block already holds one with the same
/// identifier and appended otherwise; the first image's channels,
/// objective settings and imaging environment are overwritten.
pub fn merge_into_container<S, C>(
    session: &S,
    image: &source::Image,
    container: &mut C,
) -> Result<(), TranscodeError>
where
    S: Session,
    C: MetadataContainer,
{
    let pixels = image
        .pixels
        .as_ref()
        .ok_or_else(|| TranscodeError::precondition("image has no pixels"))?;
    let channels = export_pixels(pixels)?.channels;
    let instrument = match image.instrument {
        Some(id) => {
            let instrument: source::Instrument = session.load(id)?;
            Some(export_instrument(&instrument)?)
        }
        None => None,
    };
    let objective_settings = image
        .objective_settings
        .as_ref()
        .and_then(export_objective_settings);
    let imaging_environment = image
        .imaging_environment
        .as_ref()
        .map(export_imaging_environment);

    let block = container.read_block()?;
    let mut document = from_json_str(&block).map_err(|e| TranscodeError::Container {
        path: container.path().to_path_buf(),
        message: format!("metadata block is not an interchange document: {e}"),
    })?;
    if document.images.is_empty() {
        return Err(TranscodeError::Container {
            path: container.path().to_path_buf(),
            message: "metadata block describes no image".into(),
        });
    }

    let instrument_ref: Option<Lsid> = instrument.as_ref().map(|ins| ins.id);
    if let Some(instrument) = instrument {
        match document
            .instruments
            .iter_mut()
            .find(|existing| existing.id == instrument.id)
        {
            Some(slot) => *slot = instrument,
            None => document.instruments.push(instrument),
        }
    }

    let first = &mut document.images[0];
    if instrument_ref.is_some() {
        first.instrument_ref = instrument_ref;
    }
    first.pixels.channels = channels;
    first.objective_settings = objective_settings;
    first.imaging_environment = imaging_environment;

    let merged = to_json_string(&document).map_err(|e| TranscodeError::Container {
        path: container.path().to_path_buf(),
        message: format!("cannot serialize merged metadata: {e}"),
    })?;
    container.write_block(&merged)?;
    log::info!(
        "merged {} metadata into {}",
        image
            .id
            .map(|id| Lsid::from_source(EntityKind::Image, id).to_string())
            .unwrap_or_else(|| "unsaved image".into()),
        container.path().display()
    );
    Ok(())
}

/// A JSON container file whose `image_description` field holds the
/// metadata block. Other fields are kept as they are.
#[derive(Debug)]
pub struct JsonContainer {
    path: PathBuf,
    body: Map<String, Value>,
}

impl JsonContainer {
    pub const BLOCK_FIELD: &'static str = "image_description";

    pub fn open(path: &Path) -> Result<Self, TranscodeError> {
        let raw = fs::read_to_string(path)?;
        let body: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| TranscodeError::Container {
                path: path.to_path_buf(),
                message: format!("not a JSON object: {e}"),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            body,
        })
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl MetadataContainer for JsonContainer {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_block(&self) -> Result<String, TranscodeError> {
        match self.body.get(Self::BLOCK_FIELD) {
            Some(Value::String(block)) => Ok(block.clone()),
            _ => Err(TranscodeError::Container {
                path: self.path.clone(),
                message: format!("missing string field '{}'", Self::BLOCK_FIELD),
            }),
        }
    }

    /// Writes to a temporary file next to the container and renames it over
    /// the original, so readers never see a half-written file.
    fn write_block(&mut self, block: &str) -> Result<(), TranscodeError> {
        self.body
            .insert(Self::BLOCK_FIELD.to_string(), Value::String(block.to_string()));

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        let json = serde_json::to_vec_pretty(&self.body).map_err(|e| TranscodeError::Container {
            path: self.path.clone(),
            message: format!("cannot serialize container: {e}"),
        })?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| TranscodeError::Io(e.error))?;
        Ok(())
    }
}
