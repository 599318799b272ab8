//! Pixel type and dimension order enumerations of the interchange schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TranscodeError;

/// Storage type of one pixel sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    #[serde(rename = "int8")]
    Int8,
    #[serde(rename = "int16")]
    Int16,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "uint8")]
    Uint8,
    #[serde(rename = "uint16")]
    Uint16,
    #[serde(rename = "uint32")]
    Uint32,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "complex")]
    Complex,
    #[serde(rename = "double-complex")]
    DoubleComplex,
    #[serde(rename = "bit")]
    Bit,
}

impl PixelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelType::Int8 => "int8",
            PixelType::Int16 => "int16",
            PixelType::Int32 => "int32",
            PixelType::Uint8 => "uint8",
            PixelType::Uint16 => "uint16",
            PixelType::Uint32 => "uint32",
            PixelType::Float => "float",
            PixelType::Double => "double",
            PixelType::Complex => "complex",
            PixelType::DoubleComplex => "double-complex",
            PixelType::Bit => "bit",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelType {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pixel_type = match s {
            "int8" => PixelType::Int8,
            "int16" => PixelType::Int16,
            "int32" => PixelType::Int32,
            "uint8" => PixelType::Uint8,
            "uint16" => PixelType::Uint16,
            "uint32" => PixelType::Uint32,
            "float" => PixelType::Float,
            "double" => PixelType::Double,
            "complex" => PixelType::Complex,
            "double-complex" => PixelType::DoubleComplex,
            "bit" => PixelType::Bit,
            other => return Err(TranscodeError::invalid("pixel type", other)),
        };
        Ok(pixel_type)
    }
}

/// Rasterization order of the five image dimensions. X and Y always come
/// first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionOrder {
    XYZCT,
    XYZTC,
    XYCTZ,
    XYCZT,
    XYTCZ,
    XYTZC,
}

impl DimensionOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionOrder::XYZCT => "XYZCT",
            DimensionOrder::XYZTC => "XYZTC",
            DimensionOrder::XYCTZ => "XYCTZ",
            DimensionOrder::XYCZT => "XYCZT",
            DimensionOrder::XYTCZ => "XYTCZ",
            DimensionOrder::XYTZC => "XYTZC",
        }
    }
}

impl fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DimensionOrder {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let order = match s {
            "XYZCT" => DimensionOrder::XYZCT,
            "XYZTC" => DimensionOrder::XYZTC,
            "XYCTZ" => DimensionOrder::XYCTZ,
            "XYCZT" => DimensionOrder::XYCZT,
            "XYTCZ" => DimensionOrder::XYTCZ,
            "XYTZC" => DimensionOrder::XYTZC,
            other => return Err(TranscodeError::invalid("dimension order", other)),
        };
        Ok(order)
    }
}
