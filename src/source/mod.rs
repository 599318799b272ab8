//! The acquisition server's object model.
//!
//! Types here are what a [`Session`](crate::session::Session) loads and
//! persists. Every persisted entity has `id: Some(..)`; an entity with
//! `id: None` has not been saved yet and the server assigns one on
//! [`persist`](crate::session::Session::persist). Nested entities (pixels,
//! channels, settings, shapes) are saved with their parent and get their
//! identifiers in the same call.

mod model;
mod shape;

pub use model::{
    Channel, Detector, DetectorSettings, Dichroic, Filter, Image, ImagingEnvironment, Instrument,
    LightPath, LightSource, LightSourceDetails, LightSourceSettings, LogicalChannel, Microscope,
    Objective, ObjectiveSettings, Pixels, Plane, Quantity, Rgba, StageLabel, TransmittanceRange,
};
pub use shape::{Roi, Shape, ShapeGeometry};

use crate::ids::{EntityKind, SourceId};
use crate::session::SourceEntity;

macro_rules! source_entity {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl SourceEntity for $ty {
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> Option<SourceId> {
                    self.id
                }

                fn set_id(&mut self, id: SourceId) {
                    self.id = Some(id);
                }
            }
        )*
    };
}

source_entity! {
    LightSource => LightSource,
    Detector => Detector,
    Objective => Objective,
    Filter => Filter,
    Dichroic => Dichroic,
}

fn fill(slot: &mut Option<SourceId>, mint: &mut dyn FnMut() -> SourceId) {
    if slot.is_none() {
        *slot = Some(mint());
    }
}

impl SourceEntity for Image {
    const KIND: EntityKind = EntityKind::Image;

    fn id(&self) -> Option<SourceId> {
        self.id
    }

    fn set_id(&mut self, id: SourceId) {
        self.id = Some(id);
    }

    fn assign_ids(&mut self, mint: &mut dyn FnMut() -> SourceId) {
        fill(&mut self.id, mint);
        if let Some(pixels) = self.pixels.as_mut() {
            fill(&mut pixels.id, mint);
            for channel in &mut pixels.channels {
                fill(&mut channel.id, mint);
                let lc = &mut channel.logical_channel;
                fill(&mut lc.id, mint);
                if let Some(path) = lc.light_path.as_mut() {
                    fill(&mut path.id, mint);
                }
                if let Some(settings) = lc.light_source_settings.as_mut() {
                    fill(&mut settings.id, mint);
                }
                if let Some(settings) = lc.detector_settings.as_mut() {
                    fill(&mut settings.id, mint);
                }
            }
        }
        if let Some(settings) = self.objective_settings.as_mut() {
            fill(&mut settings.id, mint);
        }
        if let Some(env) = self.imaging_environment.as_mut() {
            fill(&mut env.id, mint);
        }
        if let Some(label) = self.stage_label.as_mut() {
            fill(&mut label.id, mint);
        }
    }
}

impl SourceEntity for Instrument {
    const KIND: EntityKind = EntityKind::Instrument;

    fn id(&self) -> Option<SourceId> {
        self.id
    }

    fn set_id(&mut self, id: SourceId) {
        self.id = Some(id);
    }

    /// Components stored inside the instrument are linked back to it.
    fn assign_ids(&mut self, mint: &mut dyn FnMut() -> SourceId) {
        fill(&mut self.id, mint);
        let owner = self.id;
        for ls in &mut self.light_sources {
            fill(&mut ls.id, mint);
            ls.instrument = owner;
        }
        for det in &mut self.detectors {
            fill(&mut det.id, mint);
            det.instrument = owner;
        }
        for obj in &mut self.objectives {
            fill(&mut obj.id, mint);
            obj.instrument = owner;
        }
        for filter in &mut self.filters {
            fill(&mut filter.id, mint);
            filter.instrument = owner;
        }
        for dichroic in &mut self.dichroics {
            fill(&mut dichroic.id, mint);
            dichroic.instrument = owner;
        }
    }
}

impl SourceEntity for Roi {
    const KIND: EntityKind = EntityKind::Roi;

    fn id(&self) -> Option<SourceId> {
        self.id
    }

    fn set_id(&mut self, id: SourceId) {
        self.id = Some(id);
    }

    fn assign_ids(&mut self, mint: &mut dyn FnMut() -> SourceId) {
        fill(&mut self.id, mint);
        for shape in &mut self.shapes {
            fill(&mut shape.id, mint);
        }
    }
}
