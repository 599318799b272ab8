//! Interchange document model.
//!
//! Field names follow the standardized acquisition-metadata schema. Every
//! instrument component lives once in [`Instrument`]; channels and image
//! settings refer to it by [`Lsid`].

use serde::{Deserialize, Serialize};

use super::pixels::{DimensionOrder, PixelType};
use super::shape::Roi;
use crate::ids::Lsid;
use crate::source::Rgba;

/// A complete interchange document.
///
/// Produced fresh by export and treated as read-only by import.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub images: Vec<Image>,

    #[serde(default)]
    pub instruments: Vec<Instrument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rois: Vec<Roi>,
}

impl Document {
    /// Position of the image whose identifier index equals `index`.
    pub fn image_position(&self, index: u64) -> Option<usize> {
        self.images.iter().position(|img| img.id.index == index)
    }

    /// Returns true if an instrument with this identifier is present.
    pub fn has_instrument(&self, id: &Lsid) -> bool {
        self.instruments.iter().any(|ins| ins.id == *id)
    }

    pub fn roi(&self, id: &Lsid) -> Option<&Roi> {
        self.rois.iter().find(|roi| roi.id == *id)
    }
}

/// A value paired with its unit symbol. A value is never emitted without
/// its unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    pub unit: String,
}

impl Measure {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// Packed RGBA colour as a signed 32-bit integer (`0xRRGGBBAA`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub i32);

impl Color {
    pub fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        let packed = u32::from_be_bytes([red, green, blue, alpha]);
        Color(packed as i32)
    }

    pub fn rgba(&self) -> (u8, u8, u8, u8) {
        let [r, g, b, a] = (self.0 as u32).to_be_bytes();
        (r, g, b, a)
    }
}

impl From<Rgba> for Color {
    fn from(c: Rgba) -> Self {
        Color::from_rgba(c.red, c.green, c.blue, c.alpha)
    }
}

impl From<Color> for Rgba {
    fn from(c: Color) -> Self {
        let (red, green, blue, alpha) = c.rgba();
        Rgba::new(red, green, blue, alpha)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// ISO 8601 acquisition timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub pixels: Pixels,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_ref: Option<Lsid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_settings: Option<ObjectiveSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imaging_environment: Option<ImagingEnvironment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_label: Option<StageLabel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roi_refs: Vec<Lsid>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pixels {
    pub id: Lsid,
    pub dimension_order: DimensionOrder,
    #[serde(rename = "type")]
    pub pixel_type: PixelType,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub size_c: u32,
    pub size_t: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_size_x: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_size_y: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_size_z: Option<Measure>,

    /// Pixel data is never carried; the document describes metadata only.
    #[serde(default = "default_metadata_only")]
    pub metadata_only: bool,

    #[serde(default)]
    pub channels: Vec<Channel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub planes: Vec<Plane>,
}

fn default_metadata_only() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_per_pixel: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illumination_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinhole_size: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excitation_wavelength: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_wavelength: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nd_filter: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pockel_cell_setting: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_path: Option<LightPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_source_settings: Option<LightSourceSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector_settings: Option<DetectorSettings>,
}

/// References into the instrument: filter lists keep their order and may
/// name the same filter twice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LightPath {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dichroic_ref: Option<Lsid>,

    #[serde(default)]
    pub emission_filter_refs: Vec<Lsid>,

    #[serde(default)]
    pub excitation_filter_refs: Vec<Lsid>,
}

/// Settings for the light source named by `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightSourceSettings {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attenuation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<Measure>,
}

/// Settings for the detector named by `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorSettings {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_out_rate: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binning: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
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

impl Instrument {
    /// Creates an instrument with empty component collections.
    pub fn new(id: Lsid) -> Self {
        Self {
            id,
            name: None,
            microscope: None,
            light_sources: Vec::new(),
            detectors: Vec::new(),
            objectives: Vec::new(),
            filters: Vec::new(),
            dichroics: Vec::new(),
        }
    }
}

/// Manufacturer fields shared by every instrument component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Microscope {
    #[serde(flatten)]
    pub spec: ManufacturerSpec,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub microscope_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub id: Lsid,

    #[serde(flatten)]
    pub spec: ManufacturerSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Measure>,

    pub variant: LightSourceVariant,
}

/// The closed set of light-source kinds the schema defines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LightSourceVariant {
    Laser {
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        laser_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        laser_medium: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wavelength: Option<Measure>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        frequency_multiplication: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tuneable: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pulse: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pockel_cell: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repetition_rate: Option<Measure>,
    },
    Arc {
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        arc_type: Option<String>,
    },
    Filament {
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        filament_type: Option<String>,
    },
    LightEmittingDiode,
    GenericExcitationSource,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub id: Lsid,

    #[serde(flatten)]
    pub spec: ManufacturerSpec,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub detector_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplification_gain: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: Lsid,

    #[serde(flatten)]
    pub spec: ManufacturerSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immersion: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lens_na: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_magnification: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibrated_magnification: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_distance: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iris: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: Lsid,

    #[serde(flatten)]
    pub spec: ManufacturerSpec,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_wheel: Option<String>,

    /// Present only for band-pass filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmittance_range: Option<TransmittanceRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransmittanceRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_in: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_out: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmittance: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dichroic {
    pub id: Lsid,

    #[serde(flatten)]
    pub spec: ManufacturerSpec,
}

/// Settings for the objective named by `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSettings {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_collar: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refractive_index: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagingEnvironment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_pressure: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_percent: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageLabel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Measure>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub the_z: u32,
    pub the_t: u32,
    pub the_c: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_t: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<Measure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_z: Option<Measure>,
}
