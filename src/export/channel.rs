//! Channel-level exporters: the channel itself, its light path and the
//! settings that point into the instrument.

use super::{lsid_of, measure};
use crate::error::TranscodeError;
use crate::ids::{EntityKind, Lsid};
use crate::interchange;
use crate::source;

/// Exports a channel with its logical-channel fields and attached settings.
pub fn export_channel(channel: &source::Channel) -> Result<interchange::Channel, TranscodeError> {
    let id = lsid_of(EntityKind::Channel, channel.id)?;
    let lc = &channel.logical_channel;

    Ok(interchange::Channel {
        id,
        name: lc.name.clone(),
        samples_per_pixel: lc.samples_per_pixel,
        illumination_type: lc.illumination.clone(),
        pinhole_size: measure(lc.pinhole_size.as_ref()),
        acquisition_mode: lc.mode.clone(),
        contrast_method: lc.contrast_method.clone(),
        excitation_wavelength: measure(lc.excitation_wave.as_ref()),
        emission_wavelength: measure(lc.emission_wave.as_ref()),
        fluor: lc.fluor.clone(),
        nd_filter: lc.nd_filter,
        pockel_cell_setting: lc.pockel_cell_setting,
        color: channel.color.map(interchange::Color::from),
        light_path: lc.light_path.as_ref().map(export_light_path),
        light_source_settings: lc
            .light_source_settings
            .as_ref()
            .and_then(export_light_source_settings),
        detector_settings: lc
            .detector_settings
            .as_ref()
            .and_then(export_detector_settings),
    })
}

/// References to the dichroic and filters; filter order is kept as stored.
pub fn export_light_path(path: &source::LightPath) -> interchange::LightPath {
    interchange::LightPath {
        dichroic_ref: path
            .dichroic
            .map(|id| Lsid::from_source(EntityKind::Dichroic, id)),
        emission_filter_refs: path
            .emission_filters
            .iter()
            .map(|&id| Lsid::from_source(EntityKind::Filter, id))
            .collect(),
        excitation_filter_refs: path
            .excitation_filters
            .iter()
            .map(|&id| Lsid::from_source(EntityKind::Filter, id))
            .collect(),
    }
}

/// Returns `None` when no light source is linked.
pub fn export_light_source_settings(
    settings: &source::LightSourceSettings,
) -> Option<interchange::LightSourceSettings> {
    let light_source = settings.light_source?;
    Some(interchange::LightSourceSettings {
        id: Lsid::from_source(EntityKind::LightSource, light_source),
        attenuation: settings.attenuation,
        wavelength: measure(settings.wavelength.as_ref()),
    })
}

/// Returns `None` when no detector is linked.
pub fn export_detector_settings(
    settings: &source::DetectorSettings,
) -> Option<interchange::DetectorSettings> {
    let detector = settings.detector?;
    Some(interchange::DetectorSettings {
        id: Lsid::from_source(EntityKind::Detector, detector),
        offset: settings.offset,
        gain: settings.gain,
        voltage: measure(settings.voltage.as_ref()),
        zoom: settings.zoom,
        read_out_rate: measure(settings.read_out_rate.as_ref()),
        binning: settings.binning.clone(),
        integration: settings.integration,
    })
}

pub fn export_plane(plane: &source::Plane) -> interchange::Plane {
    interchange::Plane {
        the_z: plane.the_z,
        the_t: plane.the_t,
        the_c: plane.the_c,
        delta_t: measure(plane.delta_t.as_ref()),
        exposure_time: measure(plane.exposure_time.as_ref()),
        position_x: measure(plane.position_x.as_ref()),
        position_y: measure(plane.position_y.as_ref()),
        position_z: measure(plane.position_z.as_ref()),
    }
}
