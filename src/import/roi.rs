//! ROI and shape import.

use crate::error::TranscodeError;
use crate::ids::{EntityKind, SourceId};
use crate::interchange::{self, Document, ShapeKind};
use crate::points::decode_points;
use crate::report::{TranscodeIssue, TranscodeIssueCode, TranscodeReport};
use crate::session::Session;
use crate::source::{self, ShapeGeometry};

/// Creates a server ROI, linked to `target`, for each ROI the interchange
/// image refers to.
///
/// All referenced ROIs are decoded before the first one is saved.
///
/// # Errors
/// [`TranscodeError::MissingReference`] if the image refers to an ROI the
/// document does not contain; [`TranscodeError::InvalidData`] for a
/// malformed point list.
pub fn import_rois<S: Session>(
    session: &mut S,
    document: &Document,
    image: &interchange::Image,
    target: SourceId,
    report: &mut TranscodeReport,
) -> Result<Vec<SourceId>, TranscodeError> {
    let decoded = decode_rois(document, image, target, report)?;
    persist_rois(session, decoded, report)
}

/// Decodes every ROI the interchange image refers to without touching the
/// server. ROIs with no importable shape are left out.
pub fn decode_rois(
    document: &Document,
    image: &interchange::Image,
    target: SourceId,
    report: &mut TranscodeReport,
) -> Result<Vec<source::Roi>, TranscodeError> {
    let mut decoded = Vec::with_capacity(image.roi_refs.len());
    for roi_ref in &image.roi_refs {
        let roi = document
            .roi(roi_ref)
            .ok_or(TranscodeError::MissingReference {
                lsid: *roi_ref,
                expected: EntityKind::Roi.prefix(),
            })?;
        if let Some(roi) = import_roi(roi, target, report)? {
            decoded.push(roi);
        }
    }
    Ok(decoded)
}

/// Saves decoded ROIs and returns their new ids.
pub fn persist_rois<S: Session>(
    session: &mut S,
    rois: Vec<source::Roi>,
    report: &mut TranscodeReport,
) -> Result<Vec<SourceId>, TranscodeError> {
    let mut created = Vec::with_capacity(rois.len());
    for roi in rois {
        let shapes = roi.shapes.len();
        let stored = session.persist(roi)?;
        if let Some(id) = stored.id {
            created.push(id);
        }
        report.counts.rois += 1;
        report.counts.shapes += shapes;
    }
    Ok(created)
}

/// Decodes one ROI for the target image, or `None` if it has no shape that
/// can be imported.
pub fn import_roi(
    roi: &interchange::Roi,
    target: SourceId,
    report: &mut TranscodeReport,
) -> Result<Option<source::Roi>, TranscodeError> {
    let mut shapes = Vec::with_capacity(roi.shapes.len());
    for shape in &roi.shapes {
        match import_shape(shape)? {
            Some(decoded) => shapes.push(decoded),
            None => {
                log::warn!("{}: skipping mask {}", roi.id, shape.id);
                report.add(TranscodeIssue::warning(
                    TranscodeIssueCode::SkippedMaskShape,
                    format!("{}: mask {} skipped", roi.id, shape.id),
                ));
            }
        }
    }

    if shapes.is_empty() {
        log::warn!("{} has no importable shapes, dropped", roi.id);
        report.add(TranscodeIssue::warning(
            TranscodeIssueCode::DroppedEmptyRoi,
            format!("{} has no importable shapes and was dropped", roi.id),
        ));
        return Ok(None);
    }

    Ok(Some(source::Roi {
        id: None,
        image: Some(target),
        name: roi.name.clone(),
        description: roi.description.clone(),
        shapes,
    }))
}

/// Decodes one shape. Masks yield `None`.
pub fn import_shape(shape: &interchange::Shape) -> Result<Option<source::Shape>, TranscodeError> {
    let geometry = match &shape.kind {
        ShapeKind::Point { x, y } => ShapeGeometry::Point { x: *x, y: *y },
        ShapeKind::Line {
            x1,
            y1,
            x2,
            y2,
            marker_start,
            marker_end,
        } => ShapeGeometry::Line {
            x1: *x1,
            y1: *y1,
            x2: *x2,
            y2: *y2,
            marker_start: marker_start.clone(),
            marker_end: marker_end.clone(),
        },
        ShapeKind::Rectangle {
            x,
            y,
            width,
            height,
        } => ShapeGeometry::Rectangle {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        },
        ShapeKind::Ellipse {
            x,
            y,
            radius_x,
            radius_y,
        } => ShapeGeometry::Ellipse {
            x: *x,
            y: *y,
            radius_x: *radius_x,
            radius_y: *radius_y,
        },
        ShapeKind::Polygon { points } => ShapeGeometry::Polygon {
            points: decode_points(points)?,
        },
        ShapeKind::Polyline {
            points,
            marker_start,
            marker_end,
        } => ShapeGeometry::Polyline {
            points: decode_points(points)?,
            marker_start: marker_start.clone(),
            marker_end: marker_end.clone(),
        },
        ShapeKind::Label { x, y } => ShapeGeometry::Label { x: *x, y: *y },
        ShapeKind::Mask { .. } => return Ok(None),
    };

    Ok(Some(source::Shape {
        id: None,
        fill_color: shape.fill_color.map(Into::into),
        fill_rule: shape.fill_rule.clone(),
        stroke_color: shape.stroke_color.map(Into::into),
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
        geometry,
    }))
}
