//! The standardized interchange schema.
//!
//! A [`Document`] holds images, the instruments they were acquired with,
//! and ROIs. Instrument components are stored once, under their
//! instrument, and referenced everywhere else by [`Lsid`].

pub mod io_json;
mod model;
mod pixels;
mod shape;

pub use crate::ids::{EntityKind, Lsid};
pub use model::{
    Channel, Color, Detector, DetectorSettings, Dichroic, Document, Filter, Image,
    ImagingEnvironment, Instrument, LightPath, LightSource, LightSourceSettings,
    LightSourceVariant, ManufacturerSpec, Measure, Microscope, Objective, ObjectiveSettings,
    Pixels, Plane, StageLabel, TransmittanceRange,
};
pub use pixels::{DimensionOrder, PixelType};
pub use shape::{Roi, Shape, ShapeKind};
