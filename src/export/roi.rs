//! ROI and shape export.

use super::lsid_of;
use crate::error::TranscodeError;
use crate::ids::{EntityKind, SourceId};
use crate::interchange::{self, Color, ShapeKind};
use crate::points::encode_points;
use crate::report::{TranscodeIssue, TranscodeIssueCode, TranscodeReport};
use crate::session::Session;
use crate::source::{self, ShapeGeometry};

/// Exports every ROI linked to the image. ROIs left without any
/// exportable shape are dropped.
pub fn export_rois<S: Session>(
    session: &S,
    image: SourceId,
    report: &mut TranscodeReport,
) -> Result<Vec<interchange::Roi>, TranscodeError> {
    let mut out = Vec::new();
    for roi in session.rois_for_image(image)? {
        if let Some(exported) = export_roi(&roi, report)? {
            out.push(exported);
        }
    }
    Ok(out)
}

/// Exports one ROI, or `None` if none of its shapes can be exported.
pub fn export_roi(
    roi: &source::Roi,
    report: &mut TranscodeReport,
) -> Result<Option<interchange::Roi>, TranscodeError> {
    let id = lsid_of(EntityKind::Roi, roi.id)?;

    let mut shapes = Vec::with_capacity(roi.shapes.len());
    for shape in &roi.shapes {
        match export_shape(shape)? {
            Some(exported) => shapes.push(exported),
            None => {
                log::warn!("{id}: skipping {} shape", shape.geometry.kind_name());
                report.add(TranscodeIssue::warning(
                    TranscodeIssueCode::SkippedMaskShape,
                    format!("{id}: mask shape skipped"),
                ));
            }
        }
    }

    if shapes.is_empty() {
        log::warn!("{id} has no exportable shapes, dropped");
        report.add(TranscodeIssue::warning(
            TranscodeIssueCode::DroppedEmptyRoi,
            format!("{id} has no exportable shapes and was dropped"),
        ));
        return Ok(None);
    }

    Ok(Some(interchange::Roi {
        id,
        name: roi.name.clone(),
        description: roi.description.clone(),
        shapes,
    }))
}

/// Exports one shape. Masks are not exported and yield `None`.
///
/// # Errors
/// [`TranscodeError::UnsupportedVariant`] for an unrecognized shape kind.
pub fn export_shape(shape: &source::Shape) -> Result<Option<interchange::Shape>, TranscodeError> {
    let id = lsid_of(EntityKind::Shape, shape.id)?;
    let kind = match &shape.geometry {
        ShapeGeometry::Point { x, y } => ShapeKind::Point { x: *x, y: *y },
        ShapeGeometry::Line {
            x1,
            y1,
            x2,
            y2,
            marker_start,
            marker_end,
        } => ShapeKind::Line {
            x1: *x1,
            y1: *y1,
            x2: *x2,
            y2: *y2,
            marker_start: marker_start.clone(),
            marker_end: marker_end.clone(),
        },
        ShapeGeometry::Rectangle {
            x,
            y,
            width,
            height,
        } => ShapeKind::Rectangle {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        },
        ShapeGeometry::Ellipse {
            x,
            y,
            radius_x,
            radius_y,
        } => ShapeKind::Ellipse {
            x: *x,
            y: *y,
            radius_x: *radius_x,
            radius_y: *radius_y,
        },
        ShapeGeometry::Polygon { points } => ShapeKind::Polygon {
            points: encode_points(points),
        },
        ShapeGeometry::Polyline {
            points,
            marker_start,
            marker_end,
        } => ShapeKind::Polyline {
            points: encode_points(points),
            marker_start: marker_start.clone(),
            marker_end: marker_end.clone(),
        },
        ShapeGeometry::Label { x, y } => ShapeKind::Label { x: *x, y: *y },
        ShapeGeometry::Mask { .. } => return Ok(None),
        ShapeGeometry::Unrecognized => {
            return Err(TranscodeError::UnsupportedVariant {
                entity: "shape",
                kind: format!("unrecognized kind on {id}"),
            })
        }
    };

    Ok(Some(interchange::Shape {
        id,
        fill_color: shape.fill_color.map(Color::from),
        fill_rule: shape.fill_rule.clone(),
        stroke_color: shape.stroke_color.map(Color::from),
        stroke_width: shape.stroke_width,
        stroke_dash_array: shape.stroke_dash_array.clone(),
        text: shape.text.clone(),
        font_family: shape.font_family.clone(),
        font_size: shape.font_size,
        font_style: shape.font_style.clone(),
        locked: shape.locked,
        the_z: shape.the_z,
        the_t: shape.the_t,
        the_c: shape.the_c,
        kind,
    }))
}
