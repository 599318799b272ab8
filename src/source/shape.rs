//! Regions of interest as stored on the acquisition server.

use serde::{Deserialize, Serialize};

use super::model::Rgba;
use crate::ids::SourceId;
use crate::points::PointXY;

/// A region of interest linked to one image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub id: Option<SourceId>,
    pub image: Option<SourceId>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

/// One shape of an ROI: display attributes shared by every kind, plus the
/// kind-specific geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: Option<SourceId>,
    pub fill_color: Option<Rgba>,
    pub fill_rule: Option<String>,
    pub stroke_color: Option<Rgba>,
    pub stroke_width: Option<f64>,
    pub stroke_dash_array: Option<String>,
    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_style: Option<String>,
    pub locked: Option<bool>,
    pub the_z: Option<u32>,
    pub the_t: Option<u32>,
    pub the_c: Option<u32>,
    pub geometry: ShapeGeometry,
}

impl Shape {
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self {
            id: None,
            fill_color: None,
            fill_rule: None,
            stroke_color: None,
            stroke_width: None,
            stroke_dash_array: None,
            text: None,
            font_family: None,
            font_size: None,
            font_style: None,
            locked: None,
            the_z: None,
            the_t: None,
            the_c: None,
            geometry,
        }
    }

    pub fn with_id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ShapeGeometry {
    Point {
        x: f64,
        y: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        marker_start: Option<String>,
        marker_end: Option<String>,
    },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Ellipse {
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
    },
    Polygon {
        points: Vec<PointXY>,
    },
    Polyline {
        points: Vec<PointXY>,
        marker_start: Option<String>,
        marker_end: Option<String>,
    },
    Label {
        x: f64,
        y: f64,
    },
    /// Bitmask shapes; stored by the server but not transcoded.
    Mask {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    #[serde(other)]
    Unrecognized,
}

impl ShapeGeometry {
    /// Short name of the geometry kind, for logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ShapeGeometry::Point { .. } => "Point",
            ShapeGeometry::Line { .. } => "Line",
            ShapeGeometry::Rectangle { .. } => "Rectangle",
            ShapeGeometry::Ellipse { .. } => "Ellipse",
            ShapeGeometry::Polygon { .. } => "Polygon",
            ShapeGeometry::Polyline { .. } => "Polyline",
            ShapeGeometry::Label { .. } => "Label",
            ShapeGeometry::Mask { .. } => "Mask",
            ShapeGeometry::Unrecognized => "Unrecognized",
        }
    }
}
