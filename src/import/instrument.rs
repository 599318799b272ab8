//! Instrument import.
//!
//! The server has no multi-entity transactions, so creation order matters:
//! the instrument record first, then its microscope, then light sources,
//! detectors, objectives, filters and dichroics. Each component is created
//! and registered in the [`IdentityMap`] before anything that refers to it,
//! and linked to its instrument through [`attach_to_instrument`].

use super::common::{
    detector_type_name, quantity, resolve_enum, resolve_enum_or_unknown, ENUM_ARC_TYPE,
    ENUM_CORRECTION, ENUM_DETECTOR_TYPE, ENUM_FILAMENT_TYPE, ENUM_FILTER_TYPE, ENUM_IMMERSION,
    ENUM_LASER_MEDIUM, ENUM_LASER_TYPE, ENUM_MICROSCOPE_TYPE, ENUM_PULSE,
};
use super::identity::IdentityMap;
use crate::error::TranscodeError;
use crate::export::BAND_PASS;
use crate::ids::SourceId;
use crate::interchange::{self, LightSourceVariant};
use crate::report::{TranscodeIssue, TranscodeIssueCode, TranscodeReport};
use crate::session::Session;
use crate::source::{self, LightSourceDetails};

/// Creates every instrument of the document on the server.
pub fn import_instruments<S: Session>(
    session: &mut S,
    instruments: &[interchange::Instrument],
    map: &mut IdentityMap,
    report: &mut TranscodeReport,
) -> Result<(), TranscodeError> {
    for instrument in instruments {
        import_instrument(session, instrument, map, report)?;
    }
    Ok(())
}

/// Creates one instrument and all of its components, in dependency order.
pub fn import_instrument<S: Session>(
    session: &mut S,
    instrument: &interchange::Instrument,
    map: &mut IdentityMap,
    report: &mut TranscodeReport,
) -> Result<SourceId, TranscodeError> {
    let created = session.persist(source::Instrument {
        name: instrument.name.clone(),
        ..Default::default()
    })?;
    let instrument_id = created
        .id
        .ok_or_else(|| TranscodeError::precondition("server did not assign an instrument id"))?;
    map.register(instrument.id, instrument_id);
    log::debug!("{} created as instrument {instrument_id}", instrument.id);

    if let Some(microscope) = &instrument.microscope {
        let microscope = create_microscope(session, microscope)?;
        let mut skipped = false;
        attach_to_instrument(session, instrument_id, |parent| {
            if parent.microscope.is_some() {
                skipped = true;
            } else {
                parent.microscope = Some(microscope);
            }
        })?;
        if skipped {
            log::info!("instrument {instrument_id} already has a microscope");
            report.add(TranscodeIssue::info(
                TranscodeIssueCode::SkippedExistingMicroscope,
                format!(
                    "instrument {instrument_id} already had a microscope; {} microscope ignored",
                    instrument.id
                ),
            ));
        }
    }

    for ls in &instrument.light_sources {
        let light_source = create_light_source(session, ls, instrument_id)?;
        let created = session.persist(light_source)?;
        register(map, ls.id, created.id)?;
        attach_to_instrument(session, instrument_id, |parent| {
            parent.light_sources.push(created)
        })?;
    }

    for det in &instrument.detectors {
        let detector = create_detector(session, det, instrument_id)?;
        let created = session.persist(detector)?;
        register(map, det.id, created.id)?;
        attach_to_instrument(session, instrument_id, |parent| parent.detectors.push(created))?;
    }

    for obj in &instrument.objectives {
        let objective = create_objective(session, obj, instrument_id)?;
        let created = session.persist(objective)?;
        register(map, obj.id, created.id)?;
        attach_to_instrument(session, instrument_id, |parent| parent.objectives.push(created))?;
    }

    for incoming in &instrument.filters {
        let filter = create_filter(session, incoming, instrument_id)?;
        let created = session.persist(filter)?;
        register(map, incoming.id, created.id)?;
        attach_to_instrument(session, instrument_id, |parent| parent.filters.push(created))?;
    }

    for dichroic in &instrument.dichroics {
        let created = session.persist(create_dichroic(dichroic, instrument_id))?;
        register(map, dichroic.id, created.id)?;
        attach_to_instrument(session, instrument_id, |parent| parent.dichroics.push(created))?;
    }

    report.counts.instruments += 1;
    Ok(instrument_id)
}

/// Re-loads the instrument, applies `attach` to it and saves it.
///
/// Every component is linked through this one read-modify-write so the
/// stored instrument always reflects what has been created so far.
pub(crate) fn attach_to_instrument<S, F>(
    session: &mut S,
    instrument: SourceId,
    attach: F,
) -> Result<source::Instrument, TranscodeError>
where
    S: Session,
    F: FnOnce(&mut source::Instrument),
{
    let mut parent: source::Instrument = session.load(instrument)?;
    attach(&mut parent);
    Ok(session.persist(parent)?)
}

fn register(
    map: &mut IdentityMap,
    lsid: interchange::Lsid,
    id: Option<SourceId>,
) -> Result<(), TranscodeError> {
    let id = id.ok_or_else(|| {
        TranscodeError::precondition(format!("server did not assign an id for {lsid}"))
    })?;
    map.register(lsid, id);
    Ok(())
}

fn create_microscope<S: Session>(
    session: &S,
    microscope: &interchange::Microscope,
) -> Result<source::Microscope, TranscodeError> {
    Ok(source::Microscope {
        manufacturer: microscope.spec.manufacturer.clone(),
        model: microscope.spec.model.clone(),
        serial_number: microscope.spec.serial_number.clone(),
        lot_number: microscope.spec.lot_number.clone(),
        microscope_type: resolve_enum(
            session,
            ENUM_MICROSCOPE_TYPE,
            microscope.microscope_type.as_deref(),
        )?,
    })
}

fn create_light_source<S: Session>(
    session: &S,
    ls: &interchange::LightSource,
    instrument: SourceId,
) -> Result<source::LightSource, TranscodeError> {
    let details = match &ls.variant {
        LightSourceVariant::Laser {
            laser_type,
            laser_medium,
            wavelength,
            frequency_multiplication,
            tuneable,
            pulse,
            pockel_cell,
            repetition_rate,
        } => LightSourceDetails::Laser {
            laser_type: resolve_enum(session, ENUM_LASER_TYPE, laser_type.as_deref())?,
            laser_medium: Some(resolve_enum_or_unknown(
                session,
                ENUM_LASER_MEDIUM,
                laser_medium.as_deref(),
            )?),
            wavelength: quantity(wavelength.as_ref()),
            frequency_multiplication: *frequency_multiplication,
            tuneable: *tuneable,
            pulse: resolve_enum(session, ENUM_PULSE, pulse.as_deref())?,
            pockel_cell: *pockel_cell,
            repetition_rate: quantity(repetition_rate.as_ref()),
        },
        LightSourceVariant::Arc { arc_type } => LightSourceDetails::Arc {
            arc_type: resolve_enum(session, ENUM_ARC_TYPE, arc_type.as_deref())?,
        },
        LightSourceVariant::Filament { filament_type } => LightSourceDetails::Filament {
            filament_type: resolve_enum(session, ENUM_FILAMENT_TYPE, filament_type.as_deref())?,
        },
        LightSourceVariant::LightEmittingDiode => LightSourceDetails::LightEmittingDiode,
        LightSourceVariant::GenericExcitationSource => LightSourceDetails::GenericExcitationSource,
    };

    Ok(source::LightSource {
        id: None,
        instrument: Some(instrument),
        manufacturer: ls.spec.manufacturer.clone(),
        model: ls.spec.model.clone(),
        serial_number: ls.spec.serial_number.clone(),
        lot_number: ls.spec.lot_number.clone(),
        power: quantity(ls.power.as_ref()),
        details,
    })
}

fn create_detector<S: Session>(
    session: &S,
    det: &interchange::Detector,
    instrument: SourceId,
) -> Result<source::Detector, TranscodeError> {
    Ok(source::Detector {
        id: None,
        instrument: Some(instrument),
        manufacturer: det.spec.manufacturer.clone(),
        model: det.spec.model.clone(),
        serial_number: det.spec.serial_number.clone(),
        lot_number: det.spec.lot_number.clone(),
        detector_type: resolve_enum(
            session,
            ENUM_DETECTOR_TYPE,
            det.detector_type.as_deref().map(detector_type_name),
        )?,
        gain: det.gain,
        voltage: quantity(det.voltage.as_ref()),
        offset: det.offset,
        zoom: det.zoom,
        amplification_gain: det.amplification_gain,
    })
}

fn create_objective<S: Session>(
    session: &S,
    obj: &interchange::Objective,
    instrument: SourceId,
) -> Result<source::Objective, TranscodeError> {
    Ok(source::Objective {
        id: None,
        instrument: Some(instrument),
        manufacturer: obj.spec.manufacturer.clone(),
        model: obj.spec.model.clone(),
        serial_number: obj.spec.serial_number.clone(),
        lot_number: obj.spec.lot_number.clone(),
        correction: Some(resolve_enum_or_unknown(
            session,
            ENUM_CORRECTION,
            obj.correction.as_deref(),
        )?),
        immersion: Some(resolve_enum_or_unknown(
            session,
            ENUM_IMMERSION,
            obj.immersion.as_deref(),
        )?),
        lens_na: obj.lens_na,
        nominal_magnification: obj.nominal_magnification,
        calibrated_magnification: obj.calibrated_magnification,
        working_distance: quantity(obj.working_distance.as_ref()),
        iris: obj.iris,
    })
}

/// Builds a filter; a band-pass filter gets its transmittance range here,
/// before the filter is first saved.
fn create_filter<S: Session>(
    session: &S,
    filter: &interchange::Filter,
    instrument: SourceId,
) -> Result<source::Filter, TranscodeError> {
    let filter_type = resolve_enum(session, ENUM_FILTER_TYPE, filter.filter_type.as_deref())?;
    let transmittance_range = if filter.filter_type.as_deref() == Some(BAND_PASS) {
        filter
            .transmittance_range
            .as_ref()
            .map(|range| source::TransmittanceRange {
                cut_in: quantity(range.cut_in.as_ref()),
                cut_out: quantity(range.cut_out.as_ref()),
                transmittance: range.transmittance,
            })
    } else {
        None
    };

    Ok(source::Filter {
        id: None,
        instrument: Some(instrument),
        manufacturer: filter.spec.manufacturer.clone(),
        model: filter.spec.model.clone(),
        serial_number: filter.spec.serial_number.clone(),
        lot_number: filter.spec.lot_number.clone(),
        filter_type,
        filter_wheel: filter.filter_wheel.clone(),
        transmittance_range,
    })
}

fn create_dichroic(dichroic: &interchange::Dichroic, instrument: SourceId) -> source::Dichroic {
    source::Dichroic {
        id: None,
        instrument: Some(instrument),
        manufacturer: dichroic.spec.manufacturer.clone(),
        model: dichroic.spec.model.clone(),
        serial_number: dichroic.spec.serial_number.clone(),
        lot_number: dichroic.spec.lot_number.clone(),
    }
}
