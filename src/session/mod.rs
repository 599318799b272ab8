//! The acquisition-server collaborator.
//!
//! Transcoding never talks to storage directly: it loads and persists
//! source entities through a [`Session`]. Each call is one synchronous
//! round trip; the store has no multi-entity transactions, so callers
//! order their writes so that every reference points at an entity that
//! already exists.

mod memory;

pub use memory::{MemorySession, SourceGraph};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::ids::{EntityKind, SourceId};
use crate::source::Roi;

/// Failures reported by a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: SourceId },

    #[error("'{value}' is not a known {class} value")]
    UnknownEnumerant { class: String, value: String },

    #[error("store error: {0}")]
    Store(String),
}

/// A source entity that a session can load and persist by identifier.
pub trait SourceEntity: Clone + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> Option<SourceId>;

    fn set_id(&mut self, id: SourceId);

    /// Gives this entity, and every entity stored inside it, an identifier
    /// if it has none. Existing identifiers are kept.
    fn assign_ids(&mut self, mint: &mut dyn FnMut() -> SourceId) {
        if self.id().is_none() {
            self.set_id(mint());
        }
    }
}

/// Loads and persists source entities.
pub trait Session {
    /// Loads the entity of type `T` with the given identifier.
    fn load<T: SourceEntity>(&self, id: SourceId) -> Result<T, SessionError>;

    /// Saves an entity and returns it as stored.
    ///
    /// An entity without an identifier is created and given one; an entity
    /// with an identifier replaces the stored version.
    fn persist<T: SourceEntity>(&mut self, entity: T) -> Result<T, SessionError>;

    /// All ROIs linked to the image.
    fn rois_for_image(&self, image: SourceId) -> Result<Vec<Roi>, SessionError>;

    /// Resolves an enumerated value against the server's enumeration
    /// `class`, returning the server's canonical value.
    fn resolve_enum(&self, class: &str, value: &str) -> Result<String, SessionError>;
}
