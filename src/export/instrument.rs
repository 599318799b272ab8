//! Instrument exporters.
//!
//! [`export_instrument`] maps each of the instrument's five component
//! collections through its exporter, in stored order, so every component
//! appears exactly once in the resulting record.

use super::{lsid_of, manufacturer_spec, measure};
use crate::error::TranscodeError;
use crate::ids::EntityKind;
use crate::interchange;
use crate::source::{self, LightSourceDetails};

/// Placeholder the server stores for a value that was not recorded.
pub(crate) const UNKNOWN: &str = "Unknown";

/// The only filter type that carries a transmittance range.
pub(crate) const BAND_PASS: &str = "BandPass";

/// Detector type names that differ between the two vocabularies, as
/// `(source, interchange)`.
pub(crate) const DETECTOR_TYPE_RENAMES: &[(&str, &str)] = &[("EM-CCD", "EMCCD")];

/// Exports an instrument with its microscope and all components.
pub fn export_instrument(
    instrument: &source::Instrument,
) -> Result<interchange::Instrument, TranscodeError> {
    let mut out = interchange::Instrument::new(lsid_of(EntityKind::Instrument, instrument.id)?);
    out.name = instrument.name.clone();
    out.microscope = instrument.microscope.as_ref().map(export_microscope);

    out.light_sources = instrument
        .light_sources
        .iter()
        .map(export_light_source)
        .collect::<Result<_, _>>()?;
    out.detectors = instrument
        .detectors
        .iter()
        .map(export_detector)
        .collect::<Result<_, _>>()?;
    out.objectives = instrument
        .objectives
        .iter()
        .map(export_objective)
        .collect::<Result<_, _>>()?;
    out.filters = instrument
        .filters
        .iter()
        .map(export_filter)
        .collect::<Result<_, _>>()?;
    out.dichroics = instrument
        .dichroics
        .iter()
        .map(export_dichroic)
        .collect::<Result<_, _>>()?;

    log::debug!(
        "exported {} with {} light source(s), {} detector(s), {} objective(s), {} filter(s), {} dichroic(s)",
        out.id,
        out.light_sources.len(),
        out.detectors.len(),
        out.objectives.len(),
        out.filters.len(),
        out.dichroics.len()
    );
    Ok(out)
}

pub fn export_microscope(microscope: &source::Microscope) -> interchange::Microscope {
    interchange::Microscope {
        spec: manufacturer_spec(
            &microscope.manufacturer,
            &microscope.model,
            &microscope.serial_number,
            &microscope.lot_number,
        ),
        microscope_type: microscope.microscope_type.clone(),
    }
}

/// Exports a light source, dispatching on its kind.
///
/// # Errors
/// [`TranscodeError::UnsupportedVariant`] for a kind outside the known set.
pub fn export_light_source(
    light_source: &source::LightSource,
) -> Result<interchange::LightSource, TranscodeError> {
    let id = lsid_of(EntityKind::LightSource, light_source.id)?;
    let variant = match &light_source.details {
        LightSourceDetails::Laser {
            laser_type,
            laser_medium,
            wavelength,
            frequency_multiplication,
            tuneable,
            pulse,
            pockel_cell,
            repetition_rate,
        } => interchange::LightSourceVariant::Laser {
            laser_type: laser_type.clone(),
            laser_medium: known(laser_medium),
            wavelength: measure(wavelength.as_ref()),
            frequency_multiplication: *frequency_multiplication,
            tuneable: *tuneable,
            pulse: pulse.clone(),
            pockel_cell: *pockel_cell,
            repetition_rate: measure(repetition_rate.as_ref()),
        },
        LightSourceDetails::Arc { arc_type } => interchange::LightSourceVariant::Arc {
            arc_type: arc_type.clone(),
        },
        LightSourceDetails::Filament { filament_type } => {
            interchange::LightSourceVariant::Filament {
                filament_type: filament_type.clone(),
            }
        }
        LightSourceDetails::LightEmittingDiode => interchange::LightSourceVariant::LightEmittingDiode,
        LightSourceDetails::GenericExcitationSource => {
            interchange::LightSourceVariant::GenericExcitationSource
        }
        LightSourceDetails::Unrecognized => {
            return Err(TranscodeError::UnsupportedVariant {
                entity: "light source",
                kind: format!("unrecognized kind on {id}"),
            })
        }
    };

    Ok(interchange::LightSource {
        id,
        spec: manufacturer_spec(
            &light_source.manufacturer,
            &light_source.model,
            &light_source.serial_number,
            &light_source.lot_number,
        ),
        power: measure(light_source.power.as_ref()),
        variant,
    })
}

pub fn export_detector(detector: &source::Detector) -> Result<interchange::Detector, TranscodeError> {
    Ok(interchange::Detector {
        id: lsid_of(EntityKind::Detector, detector.id)?,
        spec: manufacturer_spec(
            &detector.manufacturer,
            &detector.model,
            &detector.serial_number,
            &detector.lot_number,
        ),
        detector_type: detector.detector_type.as_deref().map(detector_type_name),
        gain: detector.gain,
        voltage: measure(detector.voltage.as_ref()),
        offset: detector.offset,
        zoom: detector.zoom,
        amplification_gain: detector.amplification_gain,
    })
}

pub fn export_objective(
    objective: &source::Objective,
) -> Result<interchange::Objective, TranscodeError> {
    Ok(interchange::Objective {
        id: lsid_of(EntityKind::Objective, objective.id)?,
        spec: manufacturer_spec(
            &objective.manufacturer,
            &objective.model,
            &objective.serial_number,
            &objective.lot_number,
        ),
        correction: known(&objective.correction),
        immersion: known(&objective.immersion),
        lens_na: objective.lens_na,
        nominal_magnification: objective.nominal_magnification,
        calibrated_magnification: objective.calibrated_magnification,
        working_distance: measure(objective.working_distance.as_ref()),
        iris: objective.iris,
    })
}

/// Exports a filter. Only band-pass filters carry their transmittance
/// range; for any other type the range is left out even if stored.
pub fn export_filter(filter: &source::Filter) -> Result<interchange::Filter, TranscodeError> {
    let transmittance_range = if filter.filter_type.as_deref() == Some(BAND_PASS) {
        filter
            .transmittance_range
            .as_ref()
            .map(|range| interchange::TransmittanceRange {
                cut_in: measure(range.cut_in.as_ref()),
                cut_out: measure(range.cut_out.as_ref()),
                transmittance: range.transmittance,
            })
    } else {
        None
    };

    Ok(interchange::Filter {
        id: lsid_of(EntityKind::Filter, filter.id)?,
        spec: manufacturer_spec(
            &filter.manufacturer,
            &filter.model,
            &filter.serial_number,
            &filter.lot_number,
        ),
        filter_type: filter.filter_type.clone(),
        filter_wheel: filter.filter_wheel.clone(),
        transmittance_range,
    })
}

pub fn export_dichroic(dichroic: &source::Dichroic) -> Result<interchange::Dichroic, TranscodeError> {
    Ok(interchange::Dichroic {
        id: lsid_of(EntityKind::Dichroic, dichroic.id)?,
        spec: manufacturer_spec(
            &dichroic.manufacturer,
            &dichroic.model,
            &dichroic.serial_number,
            &dichroic.lot_number,
        ),
    })
}

fn detector_type_name(source_name: &str) -> String {
    DETECTOR_TYPE_RENAMES
        .iter()
        .find(|(src, _)| *src == source_name)
        .map_or(source_name, |&(_, ours)| ours)
        .to_string()
}

/// The server's placeholder for "not recorded" becomes an absent field.
fn known(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| v.as_str() != UNKNOWN).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Lsid, SourceId};
    use crate::interchange::{LightSourceVariant, Measure};
    use crate::source::{Quantity, TransmittanceRange};

    fn band_pass_filter(filter_type: &str) -> source::Filter {
        source::Filter {
            id: Some(SourceId(4)),
            filter_type: Some(filter_type.into()),
            transmittance_range: Some(TransmittanceRange {
                cut_in: Some(Quantity::length(450.0, "NANOMETER")),
                cut_out: Some(Quantity::length(490.0, "NANOMETER")),
                transmittance: Some(0.9),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn em_ccd_is_renamed() {
        let det = source::Detector {
            id: Some(SourceId(1)),
            detector_type: Some("EM-CCD".into()),
            ..Default::default()
        };
        let out = export_detector(&det).expect("export");
        assert_eq!(out.detector_type.as_deref(), Some("EMCCD"));

        let det = source::Detector {
            detector_type: Some("PMT".into()),
            ..det
        };
        assert_eq!(
            export_detector(&det).expect("export").detector_type.as_deref(),
            Some("PMT")
        );
    }

    #[test]
    fn band_pass_filter_keeps_range() {
        let out = export_filter(&band_pass_filter("BandPass")).expect("export");
        let range = out.transmittance_range.expect("range");
        assert_eq!(range.cut_in, Some(Measure::new(450.0, "nm")));
        assert_eq!(range.cut_out, Some(Measure::new(490.0, "nm")));
    }

    #[test]
    fn long_pass_filter_drops_range() {
        let out = export_filter(&band_pass_filter("LongPass")).expect("export");
        assert!(out.transmittance_range.is_none());
    }

    #[test]
    fn unknown_laser_medium_is_absent() {
        let ls = source::LightSource::new(LightSourceDetails::Laser {
            laser_type: Some("Gas".into()),
            laser_medium: Some("Unknown".into()),
            wavelength: Some(Quantity::length(488.0, "NANOMETER")),
            frequency_multiplication: None,
            tuneable: Some(false),
            pulse: None,
            pockel_cell: None,
            repetition_rate: None,
        })
        .with_id(2u64);

        let out = export_light_source(&ls).expect("export");
        match out.variant {
            LightSourceVariant::Laser {
                laser_medium,
                wavelength,
                ..
            } => {
                assert!(laser_medium.is_none());
                assert_eq!(wavelength, Some(Measure::new(488.0, "nm")));
            }
            other => panic!("expected laser, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_light_source_is_unsupported() {
        let ls = source::LightSource::new(LightSourceDetails::Unrecognized).with_id(2u64);
        assert!(matches!(
            export_light_source(&ls),
            Err(TranscodeError::UnsupportedVariant { .. })
        ));
    }

    #[test]
    fn instrument_keeps_component_order() {
        let instrument = source::Instrument {
            id: Some(SourceId(1)),
            detectors: vec![
                source::Detector {
                    id: Some(SourceId(12)),
                    ..Default::default()
                },
                source::Detector {
                    id: Some(SourceId(11)),
                    ..Default::default()
                },
            ],
            objectives: vec![source::Objective {
                id: Some(SourceId(20)),
                correction: Some("Unknown".into()),
                immersion: Some("Oil".into()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let out = export_instrument(&instrument).expect("export");
        assert_eq!(out.id, Lsid::new(EntityKind::Instrument, 1));
        let ids: Vec<u64> = out.detectors.iter().map(|d| d.id.index).collect();
        assert_eq!(ids, vec![12, 11]);
        assert!(out.objectives[0].correction.is_none());
        assert_eq!(out.objectives[0].immersion.as_deref(), Some("Oil"));
    }
}
