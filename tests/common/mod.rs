#![allow(dead_code)]

use acqxfer::ids::SourceId;
use acqxfer::points::PointXY;
use acqxfer::session::{MemorySession, Session};
use acqxfer::source::{
    self, Channel, Detector, DetectorSettings, Dichroic, Filter, ImagingEnvironment, Instrument,
    LightPath, LightSource, LightSourceDetails, LightSourceSettings, LogicalChannel, Microscope,
    Objective, ObjectiveSettings, Pixels, Plane, Quantity, Rgba, Roi, Shape, ShapeGeometry,
    StageLabel, TransmittanceRange,
};
use acqxfer::units::QuantityKind;
use serde_json::Value;

/// A server graph holding one fully described image.
pub struct Fixture {
    pub session: MemorySession,
    pub instrument: Instrument,
    pub image: source::Image,
}

impl Fixture {
    pub fn laser(&self) -> SourceId {
        self.instrument.light_sources[0].id.expect("laser id")
    }

    pub fn detector(&self) -> SourceId {
        self.instrument.detectors[0].id.expect("detector id")
    }

    pub fn objective(&self) -> SourceId {
        self.instrument.objectives[0].id.expect("objective id")
    }

    pub fn band_pass(&self) -> SourceId {
        self.instrument.filters[0].id.expect("band-pass id")
    }

    pub fn long_pass(&self) -> SourceId {
        self.instrument.filters[1].id.expect("long-pass id")
    }

    pub fn dichroic(&self) -> SourceId {
        self.instrument.dichroics[0].id.expect("dichroic id")
    }

    pub fn image_id(&self) -> SourceId {
        self.image.id.expect("image id")
    }
}

pub fn nm(value: f64) -> Quantity {
    Quantity::length(value, "NANOMETER")
}

pub fn instrument() -> Instrument {
    Instrument {
        name: Some("Spinning disk 2".into()),
        microscope: Some(Microscope {
            manufacturer: Some("Zeiss".into()),
            model: Some("Axio Observer".into()),
            serial_number: None,
            lot_number: None,
            microscope_type: Some("Inverted".into()),
        }),
        light_sources: vec![LightSource {
            manufacturer: Some("Coherent".into()),
            ..LightSource::new(LightSourceDetails::Laser {
                laser_type: Some("Gas".into()),
                laser_medium: Some("Ar".into()),
                wavelength: Some(nm(488.0)),
                frequency_multiplication: Some(1),
                tuneable: Some(false),
                pulse: Some("CW".into()),
                pockel_cell: None,
                repetition_rate: None,
            })
            .with_power(Quantity::new(20.0, "MILLIWATT", QuantityKind::Power))
        }],
        detectors: vec![Detector {
            model: Some("iXon 888".into()),
            detector_type: Some("EM-CCD".into()),
            gain: Some(300.0),
            ..Default::default()
        }],
        objectives: vec![Objective {
            model: Some("Plan-Apochromat 63x/1.40 Oil".into()),
            correction: Some("PlanApo".into()),
            immersion: Some("Oil".into()),
            lens_na: Some(1.4),
            nominal_magnification: Some(63.0),
            working_distance: Some(Quantity::length(0.19, "MILLIMETER")),
            ..Default::default()
        }],
        filters: vec![
            Filter {
                model: Some("ET470/40x".into()),
                filter_type: Some("BandPass".into()),
                transmittance_range: Some(TransmittanceRange {
                    cut_in: Some(nm(450.0)),
                    cut_out: Some(nm(490.0)),
                    transmittance: Some(0.9),
                }),
                ..Default::default()
            },
            Filter {
                model: Some("ET500lp".into()),
                filter_type: Some("LongPass".into()),
                filter_wheel: Some("Emission".into()),
                ..Default::default()
            },
        ],
        dichroics: vec![Dichroic {
            model: Some("T495lpxr".into()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn channel(name: &str, color: Rgba, fixture_ids: &ComponentIds) -> Channel {
    Channel {
        id: None,
        color: Some(color),
        logical_channel: LogicalChannel {
            id: None,
            name: Some(name.into()),
            samples_per_pixel: Some(1),
            illumination: Some("Epifluorescence".into()),
            pinhole_size: Some(Quantity::length(50.0, "MICROMETER")),
            mode: Some("SpinningDiskConfocal".into()),
            contrast_method: Some("Fluorescence".into()),
            excitation_wave: Some(nm(488.0)),
            emission_wave: Some(nm(509.0)),
            fluor: Some("GFP".into()),
            nd_filter: None,
            pockel_cell_setting: None,
            light_path: Some(LightPath {
                id: None,
                dichroic: Some(fixture_ids.dichroic),
                emission_filters: vec![fixture_ids.long_pass, fixture_ids.long_pass],
                excitation_filters: vec![fixture_ids.band_pass],
            }),
            light_source_settings: Some(LightSourceSettings {
                id: None,
                light_source: Some(fixture_ids.laser),
                attenuation: Some(0.25),
                wavelength: Some(nm(488.0)),
            }),
            detector_settings: Some(DetectorSettings {
                id: None,
                detector: Some(fixture_ids.detector),
                offset: Some(100.0),
                gain: Some(250.0),
                voltage: None,
                zoom: None,
                read_out_rate: Some(Quantity::new(10.0, "MEGAHERTZ", QuantityKind::Frequency)),
                binning: Some("1x1".into()),
                integration: Some(1),
            }),
        },
    }
}

struct ComponentIds {
    laser: SourceId,
    detector: SourceId,
    band_pass: SourceId,
    long_pass: SourceId,
    dichroic: SourceId,
}

/// Pixels matching [`fixture`]'s image, with `channels` blank channels.
pub fn blank_pixels(channels: usize) -> Pixels {
    Pixels {
        dimension_order: Some("XYZCT".into()),
        pixels_type: Some("uint16".into()),
        size_x: 512,
        size_y: 512,
        size_z: 3,
        size_c: channels as u32,
        size_t: 1,
        channels: vec![Channel::default(); channels],
        ..Default::default()
    }
}

/// A server with one two-channel image on an instrument with one of each
/// component, and two ROIs on the image: one with a rectangle, a polygon
/// and a mask, one with only a mask.
pub fn fixture() -> Fixture {
    let mut session = MemorySession::new();
    let instrument = session.persist(instrument()).expect("persist instrument");
    let ids = ComponentIds {
        laser: instrument.light_sources[0].id.expect("laser"),
        detector: instrument.detectors[0].id.expect("detector"),
        band_pass: instrument.filters[0].id.expect("band-pass"),
        long_pass: instrument.filters[1].id.expect("long-pass"),
        dichroic: instrument.dichroics[0].id.expect("dichroic"),
    };
    let objective = instrument.objectives[0].id.expect("objective");

    let mut pixels = blank_pixels(0);
    pixels.size_c = 2;
    pixels.physical_size_x = Some(Quantity::length(0.103, "MICROMETER"));
    pixels.physical_size_y = Some(Quantity::length(0.103, "MICROMETER"));
    pixels.physical_size_z = Some(Quantity::length(0.5, "MICROMETER"));
    pixels.channels = vec![
        channel("GFP", Rgba::new(0, 255, 0, 255), &ids),
        channel("GFP (2)", Rgba::new(0, 128, 0, 255), &ids),
    ];
    pixels.planes = vec![Plane {
        the_z: 0,
        the_t: 0,
        the_c: 0,
        delta_t: Some(Quantity::time(0.0, "SECOND")),
        exposure_time: Some(Quantity::time(100.0, "MILLISECOND")),
        position_x: Some(Quantity::length(1200.5, "MICROMETER")),
        position_y: None,
        position_z: None,
    }];

    let image = session
        .persist(source::Image {
            id: None,
            name: Some("cells_001.czi".into()),
            description: Some("HeLa, 24h".into()),
            acquisition_date: Some("2024-02-29T09:15:00".into()),
            pixels: Some(pixels),
            instrument: instrument.id,
            objective_settings: Some(ObjectiveSettings {
                id: None,
                objective: Some(objective),
                correction_collar: Some(0.17),
                medium: Some("Oil".into()),
                refractive_index: Some(1.518),
            }),
            imaging_environment: Some(ImagingEnvironment {
                id: None,
                temperature: Some(Quantity::new(37.0, "CELSIUS", QuantityKind::Temperature)),
                air_pressure: None,
                humidity: Some(40.0),
                co2_percent: Some(5.0),
            }),
            stage_label: Some(StageLabel {
                id: None,
                name: Some("A1 field 3".into()),
                x: Some(Quantity::length(10.0, "MILLIMETER")),
                y: Some(Quantity::length(12.5, "MILLIMETER")),
                z: None,
            }),
        })
        .expect("persist image");

    let mask = ShapeGeometry::Mask {
        x: 0.0,
        y: 0.0,
        width: 16.0,
        height: 16.0,
    };
    session
        .persist(Roi {
            id: None,
            image: image.id,
            name: Some("nucleus".into()),
            description: None,
            shapes: vec![
                Shape::new(ShapeGeometry::Rectangle {
                    x: 10.0,
                    y: 20.0,
                    width: 30.0,
                    height: 40.0,
                })
                .with_text("box"),
                Shape::new(ShapeGeometry::Polygon {
                    points: vec![
                        PointXY::new(1.0, 2.0),
                        PointXY::new(3.5, 4.0),
                        PointXY::new(5.0, 0.25),
                    ],
                }),
                Shape::new(mask.clone()),
            ],
        })
        .expect("persist roi");
    session
        .persist(Roi {
            id: None,
            image: image.id,
            name: Some("mask only".into()),
            description: None,
            shapes: vec![Shape::new(mask)],
        })
        .expect("persist mask roi");

    Fixture {
        session,
        instrument,
        image,
    }
}

/// A server holding one image with `channels` blank channels and matching
/// pixel dimensions, ready to be imported onto.
pub fn target_server(channels: usize) -> (MemorySession, SourceId) {
    let mut session = MemorySession::new();
    let image = session
        .persist(source::Image {
            pixels: Some(blank_pixels(channels)),
            ..Default::default()
        })
        .expect("persist target");
    let id = image.id.expect("target id");
    (session, id)
}

const ID_KEYS: &[&str] = &[
    "id",
    "instrument_ref",
    "dichroic_ref",
    "emission_filter_refs",
    "excitation_filter_refs",
    "roi_refs",
];

/// Removes every identifier and reference from a serialized document, so
/// documents exported from different servers can be compared.
pub fn strip_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ID_KEYS {
                map.remove(*key);
            }
            for child in map.values_mut() {
                strip_ids(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_ids),
        _ => {}
    }
}
