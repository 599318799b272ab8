//! In-memory session over a JSON snapshot of a source graph.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Session, SessionError, SourceEntity};
use crate::error::TranscodeError;
use crate::ids::{EntityKind, SourceId};
use crate::source::Roi;

/// Serializable snapshot of everything a [`MemorySession`] holds.
///
/// Records are stored per kind as JSON values so one map can hold every
/// entity type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceGraph {
    /// Next identifier to hand out.
    #[serde(default = "first_id")]
    pub next_id: u64,

    #[serde(default)]
    pub records: BTreeMap<EntityKind, BTreeMap<u64, serde_json::Value>>,

    /// Enumeration classes the server restricts. A class not listed here
    /// accepts any value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enumerations: BTreeMap<String, BTreeSet<String>>,
}

fn first_id() -> u64 {
    1
}

/// A [`Session`] that keeps the whole source graph in memory.
#[derive(Clone, Debug)]
pub struct MemorySession {
    graph: SourceGraph,
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySession {
    pub fn new() -> Self {
        Self {
            graph: SourceGraph {
                next_id: first_id(),
                ..Default::default()
            },
        }
    }

    pub fn from_graph(mut graph: SourceGraph) -> Self {
        // Snapshots written by hand may carry ids at or past next_id.
        let highest = graph
            .records
            .values()
            .filter_map(|by_id| by_id.keys().next_back())
            .copied()
            .max()
            .unwrap_or(0);
        graph.next_id = graph.next_id.max(highest + 1).max(first_id());
        Self { graph }
    }

    /// Loads a session from a source-graph JSON file.
    pub fn from_file(path: &Path) -> Result<Self, TranscodeError> {
        let file = File::open(path).map_err(TranscodeError::Io)?;
        let graph: SourceGraph = serde_json::from_reader(BufReader::new(file)).map_err(
            |source| TranscodeError::GraphJsonParse {
                path: path.to_path_buf(),
                source,
            },
        )?;
        Ok(Self::from_graph(graph))
    }

    /// Writes the current graph to a JSON file.
    pub fn save_file(&self, path: &Path) -> Result<(), TranscodeError> {
        let file = File::create(path).map_err(TranscodeError::Io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.graph).map_err(|source| {
            TranscodeError::GraphJsonWrite {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn graph(&self) -> &SourceGraph {
        &self.graph
    }

    pub fn into_graph(self) -> SourceGraph {
        self.graph
    }

    /// Limits enumeration `class` to the given values.
    pub fn restrict_enumeration<I, S>(&mut self, class: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.graph
            .enumerations
            .insert(class.to_string(), values.into_iter().map(Into::into).collect());
    }

    /// Number of stored records of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.graph.records.get(&kind).map_or(0, BTreeMap::len)
    }

    /// Every stored entity of type `T`, in identifier order.
    pub fn all<T: SourceEntity>(&self) -> Result<Vec<T>, SessionError> {
        let Some(by_id) = self.graph.records.get(&T::KIND) else {
            return Ok(Vec::new());
        };
        by_id.values().map(|value| decode::<T>(value.clone())).collect()
    }

    fn mint(&mut self) -> SourceId {
        let id = SourceId(self.graph.next_id);
        self.graph.next_id += 1;
        id
    }
}

fn decode<T: SourceEntity>(value: serde_json::Value) -> Result<T, SessionError> {
    serde_json::from_value(value)
        .map_err(|e| SessionError::Store(format!("corrupt {} record: {e}", T::KIND)))
}

impl Session for MemorySession {
    fn load<T: SourceEntity>(&self, id: SourceId) -> Result<T, SessionError> {
        let value = self
            .graph
            .records
            .get(&T::KIND)
            .and_then(|by_id| by_id.get(&id.as_u64()))
            .ok_or(SessionError::NotFound { kind: T::KIND, id })?;
        decode(value.clone())
    }

    fn persist<T: SourceEntity>(&mut self, mut entity: T) -> Result<T, SessionError> {
        let mut next = self.graph.next_id;
        entity.assign_ids(&mut || {
            let id = SourceId(next);
            next += 1;
            id
        });
        self.graph.next_id = next;

        let id = match entity.id() {
            Some(id) => id,
            None => self.mint(),
        };
        if id.as_u64() >= self.graph.next_id {
            self.graph.next_id = id.as_u64() + 1;
        }
        entity.set_id(id);

        let value = serde_json::to_value(&entity)
            .map_err(|e| SessionError::Store(format!("cannot store {}: {e}", T::KIND)))?;
        self.graph
            .records
            .entry(T::KIND)
            .or_default()
            .insert(id.as_u64(), value);
        log::debug!("persisted {} {}", T::KIND, id);
        Ok(entity)
    }

    fn rois_for_image(&self, image: SourceId) -> Result<Vec<Roi>, SessionError> {
        let rois = self.all::<Roi>()?;
        Ok(rois
            .into_iter()
            .filter(|roi| roi.image == Some(image))
            .collect())
    }

    fn resolve_enum(&self, class: &str, value: &str) -> Result<String, SessionError> {
        match self.graph.enumerations.get(class) {
            Some(allowed) if !allowed.contains(value) => Err(SessionError::UnknownEnumerant {
                class: class.to_string(),
                value: value.to_string(),
            }),
            _ => Ok(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Detector, Image, Instrument, Pixels};

    #[test]
    fn persist_assigns_fresh_ids() {
        let mut session = MemorySession::new();
        let a = session.persist(Detector::default()).expect("persist");
        let b = session.persist(Detector::default()).expect("persist");
        assert!(a.id.is_some());
        assert_ne!(a.id, b.id);
        assert_eq!(session.count(EntityKind::Detector), 2);
    }

    #[test]
    fn persist_with_id_replaces() {
        let mut session = MemorySession::new();
        let mut det = session.persist(Detector::default()).expect("persist");
        det.model = Some("iXon".into());
        let id = det.id.expect("id");
        session.persist(det).expect("update");

        let loaded: Detector = session.load(id).expect("load");
        assert_eq!(loaded.model.as_deref(), Some("iXon"));
        assert_eq!(session.count(EntityKind::Detector), 1);
    }

    #[test]
    fn persist_cascades_ids_into_nested_entities() {
        let mut session = MemorySession::new();
        let image = Image {
            pixels: Some(Pixels::default()),
            ..Default::default()
        };
        let stored = session.persist(image).expect("persist");
        assert!(stored.id.is_some());
        assert!(stored.pixels.and_then(|p| p.id).is_some());
    }

    #[test]
    fn explicit_id_bumps_next_id() {
        let mut session = MemorySession::new();
        session
            .persist(Instrument {
                id: Some(SourceId(40)),
                ..Default::default()
            })
            .expect("seed");
        let fresh = session.persist(Instrument::default()).expect("persist");
        assert_eq!(fresh.id, Some(SourceId(41)));
    }

    #[test]
    fn load_missing_is_not_found() {
        let session = MemorySession::new();
        let err = session.load::<Image>(SourceId(9)).unwrap_err();
        assert!(matches!(
            err,
            SessionError::NotFound {
                kind: EntityKind::Image,
                id: SourceId(9)
            }
        ));
    }

    #[test]
    fn restricted_enumeration_rejects_unknown_values() {
        let mut session = MemorySession::new();
        assert_eq!(session.resolve_enum("Binning", "8x8").expect("open"), "8x8");

        session.restrict_enumeration("Binning", ["1x1", "2x2"]);
        assert_eq!(session.resolve_enum("Binning", "2x2").expect("ok"), "2x2");
        assert!(matches!(
            session.resolve_enum("Binning", "8x8"),
            Err(SessionError::UnknownEnumerant { .. })
        ));
    }

    #[test]
    fn graph_file_roundtrip_keeps_next_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("graph.json");

        let mut session = MemorySession::new();
        session.persist(Detector::default()).expect("persist");
        session.save_file(&path).expect("save");

        let mut reloaded = MemorySession::from_file(&path).expect("load");
        assert_eq!(reloaded.count(EntityKind::Detector), 1);
        let next = reloaded.persist(Detector::default()).expect("persist");
        assert_eq!(next.id, Some(SourceId(2)));
    }

    #[test]
    fn from_graph_repairs_stale_next_id() {
        let mut graph = SourceGraph::default();
        graph
            .records
            .entry(EntityKind::Image)
            .or_default()
            .insert(7, serde_json::json!({ "id": 7 }));
        let mut session = MemorySession::from_graph(graph);
        let fresh = session.persist(Image::default()).expect("persist");
        assert_eq!(fresh.id, Some(SourceId(8)));
    }
}
