//! Interchange ROIs and shapes.

use serde::{Deserialize, Serialize};

use super::model::Color;
use crate::ids::Lsid;

/// A region of interest. Images refer to it through `roi_refs`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub shapes: Vec<Shape>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: Lsid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_rule: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dash_array: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub the_z: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub the_t: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub the_c: Option<u32>,

    pub kind: ShapeKind,
}

/// Geometry of a shape. Polygon and polyline vertices use the point-list
/// text format (see [`crate::points`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeKind {
    Point {
        x: f64,
        y: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        marker_start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
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
        points: String,
    },
    Polyline {
        points: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        marker_start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        marker_end: Option<String>,
    },
    Label {
        x: f64,
        y: f64,
    },
    Mask {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}
