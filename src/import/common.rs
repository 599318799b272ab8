//! Helpers shared by the importers: quantities, enumerations and the
//! vocabulary differences between the two models.

use crate::error::TranscodeError;
use crate::export::{DETECTOR_TYPE_RENAMES, UNKNOWN};
use crate::interchange::Measure;
use crate::session::Session;
use crate::source::Quantity;
use crate::units;

// Server enumeration classes.
pub(crate) const ENUM_DETECTOR_TYPE: &str = "DetectorType";
pub(crate) const ENUM_LASER_TYPE: &str = "LaserType";
pub(crate) const ENUM_LASER_MEDIUM: &str = "LaserMedium";
pub(crate) const ENUM_PULSE: &str = "Pulse";
pub(crate) const ENUM_ARC_TYPE: &str = "ArcType";
pub(crate) const ENUM_FILAMENT_TYPE: &str = "FilamentType";
pub(crate) const ENUM_CORRECTION: &str = "Correction";
pub(crate) const ENUM_IMMERSION: &str = "Immersion";
pub(crate) const ENUM_FILTER_TYPE: &str = "FilterType";
pub(crate) const ENUM_MICROSCOPE_TYPE: &str = "MicroscopeType";
pub(crate) const ENUM_ILLUMINATION: &str = "Illumination";
pub(crate) const ENUM_ACQUISITION_MODE: &str = "AcquisitionMode";
pub(crate) const ENUM_CONTRAST_METHOD: &str = "ContrastMethod";
pub(crate) const ENUM_BINNING: &str = "Binning";
pub(crate) const ENUM_MEDIUM: &str = "Medium";

/// Converts a value with a unit symbol into a server quantity. The unit
/// goes back to its long form and picks the quantity kind.
pub(crate) fn quantity(measure: Option<&Measure>) -> Option<Quantity> {
    measure.map(|m| {
        let unit = units::to_long_form(&m.unit);
        let kind = units::quantity_kind(&unit);
        Quantity::new(m.value, unit, kind)
    })
}

/// Resolves an optional enumerated value through the session.
pub(crate) fn resolve_enum<S: Session>(
    session: &S,
    class: &str,
    value: Option<&str>,
) -> Result<Option<String>, TranscodeError> {
    value
        .map(|v| session.resolve_enum(class, v))
        .transpose()
        .map_err(TranscodeError::from)
}

/// Like [`resolve_enum`], but an absent value is stored as the server's
/// "Unknown" placeholder.
pub(crate) fn resolve_enum_or_unknown<S: Session>(
    session: &S,
    class: &str,
    value: Option<&str>,
) -> Result<String, TranscodeError> {
    Ok(session.resolve_enum(class, value.unwrap_or(UNKNOWN))?)
}

/// Maps an interchange detector type name to the server's name.
pub(crate) fn detector_type_name(name: &str) -> &str {
    DETECTOR_TYPE_RENAMES
        .iter()
        .find(|&&(_, ours)| ours == name)
        .map_or(name, |&(source, _)| source)
}
