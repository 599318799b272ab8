//! Point-list text format used by polygon and polyline shapes.
//!
//! The interchange schema stores a vertex list as space-separated `x,y`
//! pairs: `"1.0,2.0 3.0,4.5"`. Some writers leave a trailing comma on each
//! pair (`"1.0,2.0, 3.0,4.5,"`); the decoder accepts both.

use serde::{Deserialize, Serialize};

use crate::error::TranscodeError;

/// A vertex in image pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointXY {
    pub x: f64,
    pub y: f64,
}

impl PointXY {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for PointXY {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Encodes vertices as `"x,y x,y ..."`.
///
/// Whole numbers keep one fractional digit (`1.0`, not `1`) so the text
/// reads as coordinates rather than indices.
pub fn encode_points(points: &[PointXY]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", format_coord(p.x), format_coord(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decodes a point list, tolerating a trailing comma on any pair.
pub fn decode_points(raw: &str) -> Result<Vec<PointXY>, TranscodeError> {
    let mut points = Vec::new();
    for token in raw.split_whitespace() {
        let pair = token.trim_end_matches(',');
        if pair.is_empty() {
            continue;
        }
        let (x, y) = pair
            .split_once(',')
            .ok_or_else(|| TranscodeError::invalid("point", token))?;
        let x = parse_coord(x, token)?;
        let y = parse_coord(y, token)?;
        points.push(PointXY::new(x, y));
    }
    Ok(points)
}

fn parse_coord(raw: &str, token: &str) -> Result<f64, TranscodeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| TranscodeError::invalid("point", token))
}

fn format_coord(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
