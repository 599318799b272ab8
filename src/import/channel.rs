//! Channel import: logical-channel fields and the settings that point into
//! an already-imported instrument.
//!
//! Existing light paths and settings on the target channel are updated in
//! place; missing ones are created. Every reference is resolved through the
//! [`IdentityMap`] before the target is changed, so a missing reference
//! leaves the channel as it was.

use super::common::{
    quantity, resolve_enum, ENUM_ACQUISITION_MODE, ENUM_BINNING, ENUM_CONTRAST_METHOD,
    ENUM_ILLUMINATION,
};
use super::identity::IdentityMap;
use crate::error::TranscodeError;
use crate::ids::{EntityKind, SourceId};
use crate::interchange;
use crate::session::Session;
use crate::source;

/// Fails unless both pixel sets have the same number of channels.
pub fn check_channel_count(
    target: &source::Pixels,
    incoming: &interchange::Pixels,
) -> Result<(), TranscodeError> {
    if target.channels.len() != incoming.channels.len() {
        return Err(TranscodeError::precondition(format!(
            "channel count mismatch: target pixels have {}, {} has {}",
            target.channels.len(),
            incoming.id,
            incoming.channels.len()
        )));
    }
    Ok(())
}

/// Applies one interchange channel to the target channel.
pub fn import_channel<S: Session>(
    session: &S,
    target: &mut source::Channel,
    incoming: &interchange::Channel,
    map: &IdentityMap,
) -> Result<(), TranscodeError> {
    let resolved = ResolvedRefs::resolve(incoming, map)?;
    let illumination = resolve_enum(
        session,
        ENUM_ILLUMINATION,
        incoming.illumination_type.as_deref(),
    )?;
    let mode = resolve_enum(
        session,
        ENUM_ACQUISITION_MODE,
        incoming.acquisition_mode.as_deref(),
    )?;
    let contrast_method = resolve_enum(
        session,
        ENUM_CONTRAST_METHOD,
        incoming.contrast_method.as_deref(),
    )?;
    let binning = match &incoming.detector_settings {
        Some(ds) => resolve_enum(session, ENUM_BINNING, ds.binning.as_deref())?,
        None => None,
    };

    if let Some(color) = incoming.color {
        target.color = Some(color.into());
    }

    let lc = &mut target.logical_channel;
    lc.name = incoming.name.clone();
    lc.samples_per_pixel = incoming.samples_per_pixel;
    lc.illumination = illumination;
    lc.pinhole_size = quantity(incoming.pinhole_size.as_ref());
    lc.mode = mode;
    lc.contrast_method = contrast_method;
    lc.excitation_wave = quantity(incoming.excitation_wavelength.as_ref());
    lc.emission_wave = quantity(incoming.emission_wavelength.as_ref());
    lc.fluor = incoming.fluor.clone();
    lc.nd_filter = incoming.nd_filter;
    lc.pockel_cell_setting = incoming.pockel_cell_setting;

    if let Some(refs) = resolved.light_path {
        import_light_path(lc.light_path.get_or_insert_with(Default::default), refs);
    }
    if let (Some(settings), Some(light_source)) =
        (&incoming.light_source_settings, resolved.light_source)
    {
        let target = lc
            .light_source_settings
            .get_or_insert_with(Default::default);
        target.light_source = Some(light_source);
        target.attenuation = settings.attenuation;
        target.wavelength = quantity(settings.wavelength.as_ref());
    }
    if let (Some(settings), Some(detector)) = (&incoming.detector_settings, resolved.detector) {
        let target = lc.detector_settings.get_or_insert_with(Default::default);
        target.detector = Some(detector);
        target.offset = settings.offset;
        target.gain = settings.gain;
        target.voltage = quantity(settings.voltage.as_ref());
        target.zoom = settings.zoom;
        target.read_out_rate = quantity(settings.read_out_rate.as_ref());
        target.binning = binning;
        target.integration = settings.integration;
    }

    Ok(())
}

/// Server identifiers behind a light path's references.
#[derive(Debug, Default)]
pub struct LightPathRefs {
    pub dichroic: Option<SourceId>,
    pub emission_filters: Vec<SourceId>,
    pub excitation_filters: Vec<SourceId>,
}

impl LightPathRefs {
    pub fn resolve(
        path: &interchange::LightPath,
        map: &IdentityMap,
    ) -> Result<Self, TranscodeError> {
        let filters = |refs: &[interchange::Lsid]| {
            refs.iter()
                .map(|lsid| map.resolve(lsid, EntityKind::Filter))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            dichroic: path
                .dichroic_ref
                .as_ref()
                .map(|lsid| map.resolve(lsid, EntityKind::Dichroic))
                .transpose()?,
            emission_filters: filters(&path.emission_filter_refs)?,
            excitation_filters: filters(&path.excitation_filter_refs)?,
        })
    }
}

/// Updates a light path. Filter lists are replaced only when the incoming
/// list is non-empty; order and repeats are kept.
pub fn import_light_path(target: &mut source::LightPath, refs: LightPathRefs) {
    if refs.dichroic.is_some() {
        target.dichroic = refs.dichroic;
    }
    if !refs.emission_filters.is_empty() {
        target.emission_filters = refs.emission_filters;
    }
    if !refs.excitation_filters.is_empty() {
        target.excitation_filters = refs.excitation_filters;
    }
}

struct ResolvedRefs {
    light_path: Option<LightPathRefs>,
    light_source: Option<SourceId>,
    detector: Option<SourceId>,
}

impl ResolvedRefs {
    fn resolve(channel: &interchange::Channel, map: &IdentityMap) -> Result<Self, TranscodeError> {
        Ok(Self {
            light_path: channel
                .light_path
                .as_ref()
                .map(|path| LightPathRefs::resolve(path, map))
                .transpose()?,
            light_source: channel
                .light_source_settings
                .as_ref()
                .map(|s| map.resolve(&s.id, EntityKind::LightSource))
                .transpose()?,
            detector: channel
                .detector_settings
                .as_ref()
                .map(|s| map.resolve(&s.id, EntityKind::Detector))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Lsid;
    use crate::interchange::{Measure, PixelType};
    use crate::session::MemorySession;

    fn incoming_channel() -> interchange::Channel {
        interchange::Channel {
            id: Lsid::new(EntityKind::Channel, 1),
            name: Some("mCherry".into()),
            samples_per_pixel: Some(1),
            illumination_type: Some("Epifluorescence".into()),
            pinhole_size: Some(Measure::new(1.0, "µm")),
            acquisition_mode: None,
            contrast_method: None,
            excitation_wavelength: Some(Measure::new(561.0, "nm")),
            emission_wavelength: Some(Measure::new(610.0, "nm")),
            fluor: Some("mCherry".into()),
            nd_filter: None,
            pockel_cell_setting: None,
            color: Some(interchange::Color::from_rgba(255, 0, 0, 255)),
            light_path: Some(interchange::LightPath {
                dichroic_ref: Some(Lsid::new(EntityKind::Dichroic, 5)),
                emission_filter_refs: vec![
                    Lsid::new(EntityKind::Filter, 4),
                    Lsid::new(EntityKind::Filter, 6),
                    Lsid::new(EntityKind::Filter, 4),
                ],
                excitation_filter_refs: Vec::new(),
            }),
            light_source_settings: None,
            detector_settings: Some(interchange::DetectorSettings {
                id: Lsid::new(EntityKind::Detector, 3),
                offset: None,
                gain: Some(1.5),
                voltage: None,
                zoom: None,
                read_out_rate: None,
                binning: Some("1x1".into()),
                integration: None,
            }),
        }
    }

    fn populated_map() -> IdentityMap {
        let mut map = IdentityMap::new();
        map.register(Lsid::new(EntityKind::Dichroic, 5), SourceId(50));
        map.register(Lsid::new(EntityKind::Filter, 4), SourceId(40));
        map.register(Lsid::new(EntityKind::Filter, 6), SourceId(60));
        map.register(Lsid::new(EntityKind::Detector, 3), SourceId(30));
        map
    }

    #[test]
    fn channel_fields_and_settings_are_applied() {
        let session = MemorySession::new();
        let mut target = source::Channel::default();
        import_channel(&session, &mut target, &incoming_channel(), &populated_map())
            .expect("import");

        let lc = &target.logical_channel;
        assert_eq!(lc.name.as_deref(), Some("mCherry"));
        assert_eq!(
            lc.excitation_wave.as_ref().map(|q| q.unit.as_str()),
            Some("NANOMETER")
        );
        let path = lc.light_path.as_ref().expect("light path");
        assert_eq!(path.dichroic, Some(SourceId(50)));
        assert_eq!(
            path.emission_filters,
            vec![SourceId(40), SourceId(60), SourceId(40)]
        );
        let ds = lc.detector_settings.as_ref().expect("detector settings");
        assert_eq!(ds.detector, Some(SourceId(30)));
        assert_eq!(ds.binning.as_deref(), Some("1x1"));
        assert_eq!(target.color, Some(source::Rgba::new(255, 0, 0, 255)));
    }

    #[test]
    fn existing_light_path_is_updated_in_place() {
        let session = MemorySession::new();
        let mut target = source::Channel::default();
        target.logical_channel.light_path = Some(source::LightPath {
            id: Some(SourceId(77)),
            excitation_filters: vec![SourceId(1)],
            ..Default::default()
        });

        import_channel(&session, &mut target, &incoming_channel(), &populated_map())
            .expect("import");

        let path = target.logical_channel.light_path.expect("light path");
        assert_eq!(path.id, Some(SourceId(77)));
        // Empty incoming list leaves the stored one alone.
        assert_eq!(path.excitation_filters, vec![SourceId(1)]);
    }

    #[test]
    fn missing_filter_leaves_channel_untouched() {
        let session = MemorySession::new();
        let mut map = IdentityMap::new();
        map.register(Lsid::new(EntityKind::Dichroic, 5), SourceId(50));
        map.register(Lsid::new(EntityKind::Detector, 3), SourceId(30));
        let mut target = source::Channel::default();

        let err = import_channel(&session, &mut target, &incoming_channel(), &map).unwrap_err();
        assert!(matches!(err, TranscodeError::MissingReference { .. }));
        assert_eq!(target, source::Channel::default());
    }

    #[test]
    fn channel_count_mismatch_is_precondition() {
        let target = source::Pixels {
            channels: vec![source::Channel::default(); 2],
            ..Default::default()
        };
        let incoming = interchange::Pixels {
            id: Lsid::new(EntityKind::Pixels, 1),
            dimension_order: interchange::DimensionOrder::XYZCT,
            pixel_type: PixelType::Uint8,
            size_x: 1,
            size_y: 1,
            size_z: 1,
            size_c: 1,
            size_t: 1,
            physical_size_x: None,
            physical_size_y: None,
            physical_size_z: None,
            metadata_only: true,
            channels: vec![incoming_channel()],
            planes: Vec::new(),
        };
        assert!(matches!(
            check_channel_count(&target, &incoming),
            Err(TranscodeError::Precondition(_))
        ));
    }
}
