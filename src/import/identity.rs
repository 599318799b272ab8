//! Interchange identifier to server identifier mapping for one import.

use std::collections::HashMap;

use crate::error::TranscodeError;
use crate::ids::{EntityKind, Lsid, SourceId};

/// A source entity created during the current import.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MappedEntity {
    pub kind: EntityKind,
    pub id: SourceId,
}

/// Records which server entity each interchange identifier became.
///
/// Lives for exactly one import operation and is passed explicitly to
/// every step that needs to resolve a reference.
#[derive(Clone, Debug, Default)]
pub struct IdentityMap {
    entries: HashMap<Lsid, MappedEntity>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a created entity. A later registration of the same
    /// identifier replaces the earlier one.
    pub fn register(&mut self, lsid: Lsid, id: SourceId) {
        self.entries.insert(
            lsid,
            MappedEntity {
                kind: lsid.kind,
                id,
            },
        );
    }

    /// Resolves a reference that must point at an entity of kind `expected`.
    ///
    /// # Errors
    /// [`TranscodeError::MissingReference`] if the identifier was never
    /// registered or names a different kind.
    pub fn resolve(&self, lsid: &Lsid, expected: EntityKind) -> Result<SourceId, TranscodeError> {
        match self.entries.get(lsid) {
            Some(entry) if entry.kind == expected => Ok(entry.id),
            _ => Err(TranscodeError::MissingReference {
                lsid: *lsid,
                expected: expected.prefix(),
            }),
        }
    }

    pub fn get(&self, lsid: &Lsid) -> Option<&MappedEntity> {
        self.entries.get(lsid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_entity() {
        let mut map = IdentityMap::new();
        let lsid = Lsid::new(EntityKind::Filter, 4);
        map.register(lsid, SourceId(101));
        assert_eq!(map.resolve(&lsid, EntityKind::Filter).expect("resolve"), SourceId(101));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn missing_key_is_missing_reference() {
        let map = IdentityMap::new();
        let err = map
            .resolve(&Lsid::new(EntityKind::Detector, 1), EntityKind::Detector)
            .unwrap_err();
        match err {
            TranscodeError::MissingReference { lsid, expected } => {
                assert_eq!(lsid.to_string(), "Detector:1");
                assert_eq!(expected, "Detector");
            }
            other => panic!("expected MissingReference, got {other:?}"),
        }
    }

    #[test]
    fn kind_mismatch_is_missing_reference() {
        let mut map = IdentityMap::new();
        let lsid = Lsid::new(EntityKind::Filter, 4);
        map.register(lsid, SourceId(101));
        assert!(matches!(
            map.resolve(&lsid, EntityKind::Dichroic),
            Err(TranscodeError::MissingReference { .. })
        ));
    }
}
