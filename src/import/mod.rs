//! Interchange document to source graph.
//!
//! Import runs in reference order. Instruments and their components are
//! created first and recorded in an [`IdentityMap`]; images are then
//! attached to existing server images, resolving every reference to an
//! instrument component through that map.

mod channel;
mod common;
mod identity;
mod image;
mod instrument;
mod roi;

pub use channel::{check_channel_count, import_channel, import_light_path, LightPathRefs};
pub use identity::{IdentityMap, MappedEntity};
pub use image::import_image;
pub use instrument::{import_instrument, import_instruments};
pub use roi::{decode_rois, import_roi, import_rois, import_shape, persist_rois};

use crate::error::TranscodeError;
use crate::ids::SourceId;
use crate::interchange::Document;
use crate::report::TranscodeReport;
use crate::session::Session;

/// Options for import.
#[derive(Clone, Debug)]
pub struct ImportOptions {
    /// Create server ROIs for the ROIs each image refers to.
    pub include_rois: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { include_rois: true }
    }
}

/// Imports a whole document.
///
/// Every instrument is created first; then `document.images[i]` is
/// attached to server image `targets[i]`. Returns the identity map built
/// along the way.
///
/// # Errors
/// [`TranscodeError::Precondition`] if the number of targets differs from
/// the number of document images; checked before anything is written.
pub fn import_document<S: Session>(
    session: &mut S,
    document: &Document,
    targets: &[SourceId],
    options: &ImportOptions,
    report: &mut TranscodeReport,
) -> Result<IdentityMap, TranscodeError> {
    if targets.len() != document.images.len() {
        return Err(TranscodeError::precondition(format!(
            "{} target image(s) given for {} document image(s)",
            targets.len(),
            document.images.len()
        )));
    }

    let mut map = IdentityMap::new();
    import_instruments(session, &document.instruments, &mut map, report)?;

    for (image, &target) in document.images.iter().zip(targets) {
        import_image(session, document, image, target, &map, options, report)?;
    }

    log::info!(
        "imported {} image(s) and {} instrument(s)",
        document.images.len(),
        document.instruments.len()
    );
    Ok(map)
}
