//! Entity types of the acquisition server's object graph.
//!
//! These mirror what the server holds for one image: the image itself, its
//! primary pixels and channels, the per-channel acquisition settings, and
//! the instrument whose components those settings point at. References to
//! instrument components are held as [`SourceId`]s, never as nested copies,
//! so one detector can back many channels.

use serde::{Deserialize, Serialize};

use crate::ids::SourceId;
use crate::units::QuantityKind;

/// A physical value with its long-form unit name (`NANOMETER`, `SECOND`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
    pub kind: QuantityKind,
}

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>, kind: QuantityKind) -> Self {
        Self {
            value,
            unit: unit.into(),
            kind,
        }
    }

    pub fn length(value: f64, unit: impl Into<String>) -> Self {
        Self::new(value, unit, QuantityKind::Length)
    }

    pub fn time(value: f64, unit: impl Into<String>) -> Self {
        Self::new(value, unit, QuantityKind::Time)
    }
}

/// An 8-bit-per-channel colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// An image and the acquisition metadata attached to it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: Option<SourceId>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// ISO 8601 acquisition timestamp.
    pub acquisition_date: Option<String>,
    /// The primary pixels set.
    pub pixels: Option<Pixels>,
    pub instrument: Option<SourceId>,
    pub objective_settings: Option<ObjectiveSettings>,
    pub imaging_environment: Option<ImagingEnvironment>,
    pub stage_label: Option<StageLabel>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pixels {
    pub id: Option<SourceId>,
    pub dimension_order: Option<String>,
    pub pixels_type: Option<String>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub size_c: u32,
    pub size_t: u32,
    pub physical_size_x: Option<Quantity>,
    pub physical_size_y: Option<Quantity>,
    pub physical_size_z: Option<Quantity>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub planes: Vec<Plane>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Option<SourceId>,
    pub color: Option<Rgba>,
    pub logical_channel: LogicalChannel,
}

/// Per-channel acquisition description, including the settings that point
/// into the instrument.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalChannel {
    pub id: Option<SourceId>,
    pub name: Option<String>,
    pub samples_per_pixel: Option<u32>,
    pub illumination: Option<String>,
    pub pinhole_size: Option<Quantity>,
    pub mode: Option<String>,
    pub contrast_method: Option<String>,
    pub excitation_wave: Option<Quantity>,
    pub emission_wave: Option<Quantity>,
    pub fluor: Option<String>,
    pub nd_filter: Option<f64>,
    pub pockel_cell_setting: Option<i32>,
    pub light_path: Option<LightPath>,
    pub light_source_settings: Option<LightSourceSettings>,
    pub detector_settings: Option<DetectorSettings>,
}

/// Filters and dichroic a channel's light travels through. Filter lists
/// are ordered and may repeat a filter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightPath {
    pub id: Option<SourceId>,
    pub dichroic: Option<SourceId>,
    #[serde(default)]
    pub emission_filters: Vec<SourceId>,
    #[serde(default)]
    pub excitation_filters: Vec<SourceId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightSourceSettings {
    pub id: Option<SourceId>,
    pub light_source: Option<SourceId>,
    pub attenuation: Option<f64>,
    pub wavelength: Option<Quantity>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorSettings {
    pub id: Option<SourceId>,
    pub detector: Option<SourceId>,
    pub offset: Option<f64>,
    pub gain: Option<f64>,
    pub voltage: Option<Quantity>,
    pub zoom: Option<f64>,
    pub read_out_rate: Option<Quantity>,
    pub binning: Option<String>,
    pub integration: Option<i32>,
}

/// An instrument and the five component collections it owns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: Option<SourceId>,
    pub name: Option<String>,
    pub microscope: Option<Microscope>,
    #[serde(default)]
    pub light_sources: Vec<LightSource>,
    #[serde(default)]
    pub detectors: Vec<Detector>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub dichroics: Vec<Dichroic>,
}

/// Stored inline on its instrument; has no identifier of its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Microscope {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lot_number: Option<String>,
    pub microscope_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub id: Option<SourceId>,
    pub instrument: Option<SourceId>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lot_number: Option<String>,
    pub power: Option<Quantity>,
    pub details: LightSourceDetails,
}

impl LightSource {
    pub fn new(details: LightSourceDetails) -> Self {
        Self {
            id: None,
            instrument: None,
            manufacturer: None,
            model: None,
            serial_number: None,
            lot_number: None,
            power: None,
            details,
        }
    }

    pub fn with_id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_power(mut self, power: Quantity) -> Self {
        self.power = Some(power);
        self
    }
}

/// The concrete kind of a light source as stored by the server.
///
/// Kinds this crate does not know deserialize to `Unrecognized`, which the
/// exporter rejects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LightSourceDetails {
    Laser {
        laser_type: Option<String>,
        laser_medium: Option<String>,
        wavelength: Option<Quantity>,
        frequency_multiplication: Option<u32>,
        tuneable: Option<bool>,
        pulse: Option<String>,
        pockel_cell: Option<bool>,
        repetition_rate: Option<Quantity>,
    },
    Arc {
        arc_type: Option<String>,
    },
    Filament {
        filament_type: Option<String>,
    },
    LightEmittingDiode,
    GenericExcitationSource,
    #[serde(other)]
    Unrecognized,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub id: Option<SourceId>,
    pub instrument: Option<SourceId>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lot_number: Option<String>,
    pub detector_type: Option<String>,
    pub gain: Option<f64>,
    pub voltage: Option<Quantity>,
    pub offset: Option<f64>,
    pub zoom: Option<f64>,
    pub amplification_gain: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: Option<SourceId>,
    pub instrument: Option<SourceId>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lot_number: Option<String>,
    pub correction: Option<String>,
    pub immersion: Option<String>,
    pub lens_na: Option<f64>,
    pub nominal_magnification: Option<f64>,
    pub calibrated_magnification: Option<f64>,
    pub working_distance: Option<Quantity>,
    pub iris: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: Option<SourceId>,
    pub instrument: Option<SourceId>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lot_number: Option<String>,
    pub filter_type: Option<String>,
    pub filter_wheel: Option<String>,
    pub transmittance_range: Option<TransmittanceRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransmittanceRange {
    pub cut_in: Option<Quantity>,
    pub cut_out: Option<Quantity>,
    pub transmittance: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dichroic {
    pub id: Option<SourceId>,
    pub instrument: Option<SourceId>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lot_number: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSettings {
    pub id: Option<SourceId>,
    pub objective: Option<SourceId>,
    pub correction_collar: Option<f64>,
    pub medium: Option<String>,
    pub refractive_index: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagingEnvironment {
    pub id: Option<SourceId>,
    pub temperature: Option<Quantity>,
    pub air_pressure: Option<Quantity>,
    pub humidity: Option<f64>,
    pub co2_percent: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageLabel {
    pub id: Option<SourceId>,
    pub name: Option<String>,
    pub x: Option<Quantity>,
    pub y: Option<Quantity>,
    pub z: Option<Quantity>,
}

/// Timing and stage position of one acquired plane.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub the_z: u32,
    pub the_t: u32,
    pub the_c: u32,
    pub delta_t: Option<Quantity>,
    pub exposure_time: Option<Quantity>,
    pub position_x: Option<Quantity>,
    pub position_y: Option<Quantity>,
    pub position_z: Option<Quantity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_light_source_kind_deserializes_as_unrecognized() {
        let json = r#"{"kind":"SuperContinuum","brightness":11}"#;
        let details: LightSourceDetails = serde_json::from_str(json).expect("parse");
        assert_eq!(details, LightSourceDetails::Unrecognized);
    }

    #[test]
    fn laser_with_missing_fields_deserializes() {
        let json = r#"{"kind":"Laser","laser_medium":"Argon"}"#;
        let details: LightSourceDetails = serde_json::from_str(json).expect("parse");
        match details {
            LightSourceDetails::Laser {
                laser_medium,
                wavelength,
                ..
            } => {
                assert_eq!(laser_medium.as_deref(), Some("Argon"));
                assert!(wavelength.is_none());
            }
            other => panic!("expected laser, got {other:?}"),
        }
    }

    #[test]
    fn light_source_builder() {
        let ls = LightSource::new(LightSourceDetails::LightEmittingDiode)
            .with_id(7u64)
            .with_power(Quantity::new(5.0, "MILLIWATT", QuantityKind::Power));
        assert_eq!(ls.id, Some(SourceId(7)));
        assert_eq!(ls.power.map(|p| p.unit), Some("MILLIWATT".to_string()));
    }
}
