//! Image export: pixels, image-level settings and document insertion.

use super::channel::{export_channel, export_plane};
use super::instrument::export_instrument;
use super::roi::export_rois;
use super::{lsid_of, measure, ExportOptions};
use crate::error::TranscodeError;
use crate::ids::{EntityKind, Lsid};
use crate::interchange::{self, DimensionOrder, Document, PixelType};
use crate::report::{TranscodeIssue, TranscodeIssueCode, TranscodeReport};
use crate::session::Session;
use crate::source;

/// Exports one image into `document`.
///
/// The image is matched against the document by identifier: a new image is
/// appended, an image already present is updated in place and keeps its
/// position. The image's instrument is exported only if the document does
/// not already hold it.
///
/// Everything that can fail (pixels, channels, ROIs, the instrument) is
/// built before the document is touched, so on error the document is
/// unchanged.
///
/// # Errors
/// - [`TranscodeError::Precondition`] if the image or its primary pixels
///   have no identifier.
/// - [`TranscodeError::InvalidData`] for an unknown pixel type or dimension
///   order.
/// - [`TranscodeError::UnsupportedVariant`] for an unknown light source or
///   shape kind.
pub fn export_image<S: Session>(
    session: &S,
    image: &source::Image,
    document: &mut Document,
    options: &ExportOptions,
    report: &mut TranscodeReport,
) -> Result<(), TranscodeError> {
    let image_id = image
        .id
        .ok_or_else(|| TranscodeError::precondition("image has no identifier"))?;
    let pixels = image
        .pixels
        .as_ref()
        .ok_or_else(|| TranscodeError::precondition(format!("image {image_id} has no pixels")))?;
    if pixels.id.is_none() {
        return Err(TranscodeError::precondition(format!(
            "primary pixels of image {image_id} have no identifier"
        )));
    }

    let lsid = Lsid::from_source(EntityKind::Image, image_id);
    let exported_pixels = export_pixels(pixels)?;

    let rois = if options.include_rois {
        export_rois(session, image_id, report)?
    } else {
        Vec::new()
    };

    let instrument_ref = image
        .instrument
        .map(|id| Lsid::from_source(EntityKind::Instrument, id));
    let new_instrument = match (image.instrument, instrument_ref) {
        (Some(id), Some(ins_ref)) if !document.has_instrument(&ins_ref) => {
            let instrument: source::Instrument = session.load(id)?;
            Some(export_instrument(&instrument)?)
        }
        (_, Some(ins_ref)) => {
            log::info!("{ins_ref} already in document, not exported again");
            report.add(TranscodeIssue::info(
                TranscodeIssueCode::ReusedInstrument,
                format!("{ins_ref} already present; reused for {lsid}"),
            ));
            None
        }
        _ => None,
    };

    let objective_settings = image
        .objective_settings
        .as_ref()
        .and_then(export_objective_settings);
    let imaging_environment = image
        .imaging_environment
        .as_ref()
        .map(export_imaging_environment);
    let stage_label = image.stage_label.as_ref().map(export_stage_label);

    // Nothing below can fail.
    let channel_count = exported_pixels.channels.len();
    let roi_refs: Vec<Lsid> = rois.iter().map(|roi| roi.id).collect();
    let roi_count = roi_refs.len();
    let shape_count: usize = rois.iter().map(|roi| roi.shapes.len()).sum();

    let mut stale_rois = Vec::new();
    match document.image_position(image_id.as_u64()) {
        Some(pos) => {
            let existing = &mut document.images[pos];
            existing.name = image.name.clone();
            existing.acquisition_date = image.acquisition_date.clone();
            existing.description = image.description.clone();
            existing.pixels = exported_pixels;
            stale_rois = std::mem::replace(&mut existing.roi_refs, roi_refs);
            existing.instrument_ref = instrument_ref;
            existing.objective_settings = objective_settings;
            existing.imaging_environment = imaging_environment;
            existing.stage_label = stage_label;

            log::info!("{lsid} already in document, updated in place");
            report.add(TranscodeIssue::info(
                TranscodeIssueCode::UpdatedExistingImage,
                format!("{lsid} was already present and has been updated"),
            ));
        }
        None => {
            document.images.push(interchange::Image {
                id: lsid,
                name: image.name.clone(),
                acquisition_date: image.acquisition_date.clone(),
                description: image.description.clone(),
                pixels: exported_pixels,
                instrument_ref,
                objective_settings,
                imaging_environment,
                stage_label,
                roi_refs,
            });
        }
    }

    if let Some(instrument) = new_instrument {
        document.instruments.push(instrument);
        report.counts.instruments += 1;
    }

    for roi in rois {
        match document.rois.iter_mut().find(|r| r.id == roi.id) {
            Some(slot) => *slot = roi,
            None => document.rois.push(roi),
        }
    }
    // ROIs the previous export referenced and nothing references now.
    stale_rois.retain(|old| !document.images.iter().any(|i| i.roi_refs.contains(old)));
    if !stale_rois.is_empty() {
        log::debug!("{lsid}: removing {} unreferenced ROI(s)", stale_rois.len());
        document.rois.retain(|roi| !stale_rois.contains(&roi.id));
    }

    report.counts.images += 1;
    report.counts.channels += channel_count;
    report.counts.rois += roi_count;
    report.counts.shapes += shape_count;

    log::debug!("exported {lsid} with {channel_count} channel(s)");
    Ok(())
}

/// Exports several images into one new document. Instruments shared by the
/// images appear once.
pub fn export_images<S: Session>(
    session: &S,
    images: &[source::Image],
    options: &ExportOptions,
    report: &mut TranscodeReport,
) -> Result<Document, TranscodeError> {
    let mut document = Document::default();
    for image in images {
        export_image(session, image, &mut document, options, report)?;
    }
    Ok(document)
}

/// Exports the primary pixels with their channels and planes.
///
/// # Errors
/// [`TranscodeError::InvalidData`] if the pixel type or dimension order is
/// missing or unknown.
pub fn export_pixels(pixels: &source::Pixels) -> Result<interchange::Pixels, TranscodeError> {
    let id = lsid_of(EntityKind::Pixels, pixels.id)?;
    let pixel_type: PixelType = pixels
        .pixels_type
        .as_deref()
        .ok_or_else(|| TranscodeError::invalid("pixel type", ""))?
        .parse()?;
    let dimension_order: DimensionOrder = pixels
        .dimension_order
        .as_deref()
        .ok_or_else(|| TranscodeError::invalid("dimension order", ""))?
        .parse()?;

    let channels = pixels
        .channels
        .iter()
        .map(export_channel)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(interchange::Pixels {
        id,
        dimension_order,
        pixel_type,
        size_x: pixels.size_x,
        size_y: pixels.size_y,
        size_z: pixels.size_z,
        size_c: pixels.size_c,
        size_t: pixels.size_t,
        physical_size_x: measure(pixels.physical_size_x.as_ref()),
        physical_size_y: measure(pixels.physical_size_y.as_ref()),
        physical_size_z: measure(pixels.physical_size_z.as_ref()),
        metadata_only: true,
        channels,
        planes: pixels.planes.iter().map(export_plane).collect(),
    })
}

/// Returns `None` when no objective is linked.
pub fn export_objective_settings(
    settings: &source::ObjectiveSettings,
) -> Option<interchange::ObjectiveSettings> {
    let objective = settings.objective?;
    Some(interchange::ObjectiveSettings {
        id: Lsid::from_source(EntityKind::Objective, objective),
        correction_collar: settings.correction_collar,
        medium: settings.medium.clone(),
        refractive_index: settings.refractive_index,
    })
}

pub fn export_imaging_environment(
    env: &source::ImagingEnvironment,
) -> interchange::ImagingEnvironment {
    interchange::ImagingEnvironment {
        temperature: measure(env.temperature.as_ref()),
        air_pressure: measure(env.air_pressure.as_ref()),
        humidity: env.humidity,
        co2_percent: env.co2_percent,
    }
}

pub fn export_stage_label(label: &source::StageLabel) -> interchange::StageLabel {
    interchange::StageLabel {
        name: label.name.clone(),
        x: measure(label.x.as_ref()),
        y: measure(label.y.as_ref()),
        z: measure(label.z.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SourceId;
    use crate::interchange::Measure;
    use crate::session::MemorySession;
    use crate::source::Quantity;

    fn pixels() -> source::Pixels {
        source::Pixels {
            id: Some(SourceId(2)),
            dimension_order: Some("XYZCT".into()),
            pixels_type: Some("uint16".into()),
            size_x: 64,
            size_y: 64,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            physical_size_x: Some(Quantity::length(0.5, "MICROMETER")),
            channels: vec![source::Channel {
                id: Some(SourceId(3)),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn image() -> source::Image {
        source::Image {
            id: Some(SourceId(1)),
            name: Some("first".into()),
            pixels: Some(pixels()),
            ..Default::default()
        }
    }

    #[test]
    fn image_without_id_fails_before_touching_document() {
        let session = MemorySession::new();
        let mut document = Document::default();
        let mut report = TranscodeReport::new("export");
        let img = source::Image {
            id: None,
            ..image()
        };

        let err = export_image(
            &session,
            &img,
            &mut document,
            &ExportOptions::default(),
            &mut report,
        )
        .unwrap_err();
        assert!(matches!(err, TranscodeError::Precondition(_)));
        assert!(document.images.is_empty());
    }

    #[test]
    fn pixels_without_id_is_precondition() {
        let session = MemorySession::new();
        let mut document = Document::default();
        let mut report = TranscodeReport::new("export");
        let mut img = image();
        if let Some(p) = img.pixels.as_mut() {
            p.id = None;
        }

        let err = export_image(
            &session,
            &img,
            &mut document,
            &ExportOptions::default(),
            &mut report,
        )
        .unwrap_err();
        assert!(matches!(err, TranscodeError::Precondition(_)));
    }

    #[test]
    fn unknown_pixel_type_is_invalid_data() {
        let mut px = pixels();
        px.pixels_type = Some("uint128".into());
        assert!(matches!(
            export_pixels(&px),
            Err(TranscodeError::InvalidData {
                field: "pixel type",
                ..
            })
        ));
    }

    #[test]
    fn pixels_carry_physical_sizes() {
        let out = export_pixels(&pixels()).expect("export");
        assert_eq!(out.physical_size_x, Some(Measure::new(0.5, "µm")));
        assert!(out.physical_size_y.is_none());
        assert_eq!(out.channels.len(), 1);
        assert!(out.metadata_only);
    }

    #[test]
    fn re_export_updates_in_place() {
        let session = MemorySession::new();
        let mut document = Document::default();
        let mut report = TranscodeReport::new("export");
        let options = ExportOptions::default();

        export_image(&session, &image(), &mut document, &options, &mut report).expect("first");
        let renamed = source::Image {
            name: Some("second".into()),
            ..image()
        };
        export_image(&session, &renamed, &mut document, &options, &mut report).expect("second");

        assert_eq!(document.images.len(), 1);
        assert_eq!(document.images[0].name.as_deref(), Some("second"));
        assert!(report.has(TranscodeIssueCode::UpdatedExistingImage));
    }

    #[test]
    fn objective_settings_need_an_objective() {
        let unlinked = source::ObjectiveSettings {
            medium: Some("Oil".into()),
            ..Default::default()
        };
        assert!(export_objective_settings(&unlinked).is_none());

        let linked = source::ObjectiveSettings {
            objective: Some(SourceId(9)),
            ..unlinked
        };
        let out = export_objective_settings(&linked).expect("settings");
        assert_eq!(out.id, Lsid::new(EntityKind::Objective, 9));
    }
}
