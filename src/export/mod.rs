//! Source graph to interchange document.
//!
//! Per-entity exporters are pure functions from one source entity to its
//! interchange counterpart. [`export_image`] drives them for one image and
//! inserts the result into a document, exporting each instrument at most
//! once however many channels or images refer to it.

mod channel;
mod image;
mod instrument;
mod roi;

pub use channel::{
    export_channel, export_detector_settings, export_light_path, export_light_source_settings,
    export_plane,
};
pub use image::{
    export_image, export_images, export_imaging_environment, export_objective_settings,
    export_pixels, export_stage_label,
};
pub use instrument::{
    export_detector, export_dichroic, export_filter, export_instrument, export_light_source,
    export_microscope, export_objective,
};
pub use roi::{export_roi, export_rois, export_shape};

pub(crate) use instrument::{BAND_PASS, DETECTOR_TYPE_RENAMES, UNKNOWN};

use crate::error::TranscodeError;
use crate::ids::{EntityKind, Lsid, SourceId};
use crate::interchange::{ManufacturerSpec, Measure};
use crate::source::Quantity;
use crate::units;

/// Options for export.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Export the image's ROIs and reference them from the image.
    pub include_rois: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { include_rois: true }
    }
}

/// Converts a source quantity to a value with its unit symbol.
pub(crate) fn measure(quantity: Option<&Quantity>) -> Option<Measure> {
    quantity.map(|q| Measure::new(q.value, units::to_symbol(&q.unit)))
}

/// The interchange identifier of a persisted entity; an unsaved entity
/// cannot be referenced.
pub(crate) fn lsid_of(kind: EntityKind, id: Option<SourceId>) -> Result<Lsid, TranscodeError> {
    id.map(|id| Lsid::from_source(kind, id))
        .ok_or_else(|| TranscodeError::precondition(format!("{kind} has no identifier")))
}

pub(crate) fn manufacturer_spec(
    manufacturer: &Option<String>,
    model: &Option<String>,
    serial_number: &Option<String>,
    lot_number: &Option<String>,
) -> ManufacturerSpec {
    ManufacturerSpec {
        manufacturer: manufacturer.clone(),
        model: model.clone(),
        serial_number: serial_number.clone(),
        lot_number: lot_number.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_normalizes_unit() {
        let q = Quantity::length(405.0, "NANOMETER");
        assert_eq!(measure(Some(&q)), Some(Measure::new(405.0, "nm")));
        assert_eq!(measure(None), None);
    }

    #[test]
    fn lsid_of_unsaved_entity_is_precondition() {
        let err = lsid_of(EntityKind::Detector, None).unwrap_err();
        assert!(matches!(err, TranscodeError::Precondition(_)));
        assert_eq!(
            lsid_of(EntityKind::Detector, Some(SourceId(3))).expect("lsid"),
            Lsid::new(EntityKind::Detector, 3)
        );
    }
}
