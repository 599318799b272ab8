//! Image import: attaches interchange metadata to an existing server image.

use super::channel::{check_channel_count, import_channel};
use super::common::{quantity, resolve_enum, ENUM_MEDIUM};
use super::identity::IdentityMap;
use super::roi::{decode_rois, persist_rois};
use super::ImportOptions;
use crate::error::TranscodeError;
use crate::ids::{EntityKind, SourceId};
use crate::interchange::{self, Document};
use crate::report::TranscodeReport;
use crate::session::Session;
use crate::source;

/// Applies an interchange image to the server image `target`.
///
/// The instruments the image refers to must already have been imported
/// into `map`. The target's pixels must have as many channels as the
/// interchange image; this is checked before anything is written. All
/// references are resolved and all ROI shapes decoded before the image is
/// saved, so a missing reference or a malformed shape leaves the server
/// image unchanged.
///
/// Returns the image as stored.
pub fn import_image<S: Session>(
    session: &mut S,
    document: &Document,
    image: &interchange::Image,
    target: SourceId,
    map: &IdentityMap,
    options: &ImportOptions,
    report: &mut TranscodeReport,
) -> Result<source::Image, TranscodeError> {
    let mut stored: source::Image = session.load(target)?;
    let pixels = stored.pixels.as_mut().ok_or_else(|| {
        TranscodeError::precondition(format!("image {target} has no pixels to attach to"))
    })?;
    check_channel_count(pixels, &image.pixels)?;

    if image.pixels.physical_size_x.is_some() {
        pixels.physical_size_x = quantity(image.pixels.physical_size_x.as_ref());
    }
    if image.pixels.physical_size_y.is_some() {
        pixels.physical_size_y = quantity(image.pixels.physical_size_y.as_ref());
    }
    if image.pixels.physical_size_z.is_some() {
        pixels.physical_size_z = quantity(image.pixels.physical_size_z.as_ref());
    }
    for (channel, incoming) in pixels.channels.iter_mut().zip(&image.pixels.channels) {
        import_channel(session, channel, incoming, map)?;
    }
    if !image.pixels.planes.is_empty() {
        pixels.planes = image.pixels.planes.iter().map(import_plane).collect();
    }

    if image.name.is_some() {
        stored.name = image.name.clone();
    }
    if image.description.is_some() {
        stored.description = image.description.clone();
    }
    if image.acquisition_date.is_some() {
        stored.acquisition_date = image.acquisition_date.clone();
    }
    if let Some(instrument_ref) = &image.instrument_ref {
        stored.instrument = Some(map.resolve(instrument_ref, EntityKind::Instrument)?);
    }
    if let Some(settings) = &image.objective_settings {
        let objective = map.resolve(&settings.id, EntityKind::Objective)?;
        let medium = resolve_enum(session, ENUM_MEDIUM, settings.medium.as_deref())?;
        let slot = stored
            .objective_settings
            .get_or_insert_with(Default::default);
        slot.objective = Some(objective);
        slot.correction_collar = settings.correction_collar;
        slot.medium = medium;
        slot.refractive_index = settings.refractive_index;
    }
    if let Some(env) = &image.imaging_environment {
        let slot = stored
            .imaging_environment
            .get_or_insert_with(Default::default);
        slot.temperature = quantity(env.temperature.as_ref());
        slot.air_pressure = quantity(env.air_pressure.as_ref());
        slot.humidity = env.humidity;
        slot.co2_percent = env.co2_percent;
    }
    if let Some(label) = &image.stage_label {
        let slot = stored.stage_label.get_or_insert_with(Default::default);
        slot.name = label.name.clone();
        slot.x = quantity(label.x.as_ref());
        slot.y = quantity(label.y.as_ref());
        slot.z = quantity(label.z.as_ref());
    }

    let rois = if options.include_rois {
        decode_rois(document, image, target, report)?
    } else {
        Vec::new()
    };

    let channel_count = image.pixels.channels.len();
    let stored = session.persist(stored)?;
    log::debug!("{} attached to image {target}", image.id);

    persist_rois(session, rois, report)?;

    report.counts.images += 1;
    report.counts.channels += channel_count;
    Ok(stored)
}

fn import_plane(plane: &interchange::Plane) -> source::Plane {
    source::Plane {
        the_z: plane.the_z,
        the_t: plane.the_t,
        the_c: plane.the_c,
        delta_t: quantity(plane.delta_t.as_ref()),
        exposure_time: quantity(plane.exposure_time.as_ref()),
        position_x: quantity(plane.position_x.as_ref()),
        position_y: quantity(plane.position_y.as_ref()),
        position_z: quantity(plane.position_z.as_ref()),
    }
}
