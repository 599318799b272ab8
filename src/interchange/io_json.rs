//! JSON serialization for interchange documents.
//!
//! The interchange schema's own wire format is out of scope; this JSON
//! rendering of the in-memory model is what the CLI reads and writes, and
//! what tests use to inspect a transcoded document.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::model::Document;
use crate::error::TranscodeError;

/// Reads an interchange document from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_document_json(path: &Path) -> Result<Document, TranscodeError> {
    let file = File::open(path).map_err(TranscodeError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| TranscodeError::DocumentJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes an interchange document to a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_document_json(path: &Path, document: &Document) -> Result<(), TranscodeError> {
    let file = File::create(path).map_err(TranscodeError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, document).map_err(|source| {
        TranscodeError::DocumentJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Reads a document from a JSON string.
pub fn from_json_str(json: &str) -> Result<Document, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes a document to a pretty-printed JSON string.
pub fn to_json_string(document: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EntityKind, Lsid};
    use crate::interchange::{
        Channel, DimensionOrder, Image, Instrument, Measure, PixelType, Pixels,
    };

    fn sample_document() -> Document {
        let pixels = Pixels {
            id: Lsid::new(EntityKind::Pixels, 11),
            dimension_order: DimensionOrder::XYZCT,
            pixel_type: PixelType::Uint16,
            size_x: 512,
            size_y: 512,
            size_z: 3,
            size_c: 1,
            size_t: 1,
            physical_size_x: Some(Measure::new(0.2, "µm")),
            physical_size_y: Some(Measure::new(0.2, "µm")),
            physical_size_z: None,
            metadata_only: true,
            channels: vec![Channel {
                id: Lsid::new(EntityKind::Channel, 21),
                name: Some("DAPI".into()),
                samples_per_pixel: Some(1),
                illumination_type: None,
                pinhole_size: None,
                acquisition_mode: None,
                contrast_method: None,
                excitation_wavelength: Some(Measure::new(405.0, "nm")),
                emission_wavelength: None,
                fluor: None,
                nd_filter: None,
                pockel_cell_setting: None,
                color: None,
                light_path: None,
                light_source_settings: None,
                detector_settings: None,
            }],
            planes: Vec::new(),
        };

        Document {
            images: vec![Image {
                id: Lsid::new(EntityKind::Image, 1),
                name: Some("cells.tif".into()),
                acquisition_date: None,
                description: None,
                pixels,
                instrument_ref: Some(Lsid::new(EntityKind::Instrument, 4)),
                objective_settings: None,
                imaging_environment: None,
                stage_label: None,
                roi_refs: Vec::new(),
            }],
            instruments: vec![Instrument::new(Lsid::new(EntityKind::Instrument, 4))],
            rois: Vec::new(),
        }
    }

    #[test]
    fn test_json_roundtrip_string() {
        let document = sample_document();
        let json = to_json_string(&document).expect("serialize");
        let restored = from_json_str(&json).expect("deserialize");
        assert_eq!(restored, document);
    }

    #[test]
    fn test_json_uses_qualified_ids() {
        let json = to_json_string(&sample_document()).expect("serialize");
        assert!(json.contains("\"Image:1\""));
        assert!(json.contains("\"instrument_ref\": \"Instrument:4\""));
        assert!(json.contains("\"type\": \"uint16\""));
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.json");
        let document = sample_document();

        write_document_json(&path, &document).expect("write");
        let restored = read_document_json(&path).expect("read");
        assert_eq!(restored, document);
    }

    #[test]
    fn test_parse_error_names_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write fixture");

        let err = read_document_json(&path).unwrap_err();
        assert!(matches!(err, TranscodeError::DocumentJsonParse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
