//! Identifier types for both object models.
//!
//! The two identifier spaces never mix: [`SourceId`] is assigned by the
//! acquisition server, [`Lsid`] names an entity inside one interchange
//! document. Export copies a source id into an `Lsid` index; import mints
//! new source ids and records the pairing in the identity map.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A server-assigned identifier, unique within one server instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u64);

impl SourceId {
    /// Creates a new SourceId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SourceId {
    fn from(id: u64) -> Self {
        SourceId::new(id)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of entity that carry an identifier in either model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Image,
    Pixels,
    Channel,
    LogicalChannel,
    LightPath,
    LightSourceSettings,
    DetectorSettings,
    Instrument,
    LightSource,
    Detector,
    Objective,
    Filter,
    Dichroic,
    ObjectiveSettings,
    ImagingEnvironment,
    StageLabel,
    Roi,
    Shape,
}

impl EntityKind {
    /// Prefix used in the qualified interchange identifier.
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Image => "Image",
            EntityKind::Pixels => "Pixels",
            EntityKind::Channel => "Channel",
            EntityKind::LogicalChannel => "LogicalChannel",
            EntityKind::LightPath => "LightPath",
            EntityKind::LightSourceSettings => "LightSourceSettings",
            EntityKind::DetectorSettings => "DetectorSettings",
            EntityKind::Instrument => "Instrument",
            EntityKind::LightSource => "LightSource",
            EntityKind::Detector => "Detector",
            EntityKind::Objective => "Objective",
            EntityKind::Filter => "Filter",
            EntityKind::Dichroic => "Dichroic",
            EntityKind::ObjectiveSettings => "ObjectiveSettings",
            EntityKind::ImagingEnvironment => "ImagingEnvironment",
            EntityKind::StageLabel => "StageLabel",
            EntityKind::Roi => "ROI",
            EntityKind::Shape => "Shape",
        }
    }

    const ALL: [EntityKind; 18] = [
        EntityKind::Image,
        EntityKind::Pixels,
        EntityKind::Channel,
        EntityKind::LogicalChannel,
        EntityKind::LightPath,
        EntityKind::LightSourceSettings,
        EntityKind::DetectorSettings,
        EntityKind::Instrument,
        EntityKind::LightSource,
        EntityKind::Detector,
        EntityKind::Objective,
        EntityKind::Filter,
        EntityKind::Dichroic,
        EntityKind::ObjectiveSettings,
        EntityKind::ImagingEnvironment,
        EntityKind::StageLabel,
        EntityKind::Roi,
        EntityKind::Shape,
    ];

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A qualified interchange identifier such as `Detector:12`.
///
/// Kept structured so that lookups compare `(kind, index)` directly; the
/// string form only exists at the serialization boundary.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lsid {
    pub kind: EntityKind,
    pub index: u64,
}

impl Lsid {
    #[inline]
    pub fn new(kind: EntityKind, index: u64) -> Self {
        Self { kind, index }
    }

    /// Builds the interchange identifier for a persisted source entity.
    #[inline]
    pub fn from_source(kind: EntityKind, id: SourceId) -> Self {
        Self::new(kind, id.as_u64())
    }
}

impl fmt::Debug for Lsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lsid({}:{})", self.kind.prefix(), self.index)
    }
}

impl fmt::Display for Lsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.index)
    }
}

/// Error returned when a string is not a valid `Kind:index` identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LsidParseError(pub String);

impl fmt::Display for LsidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid interchange identifier '{}'", self.0)
    }
}

impl std::error::Error for LsidParseError {}

impl FromStr for Lsid {
    type Err = LsidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, index) = s
            .rsplit_once(':')
            .ok_or_else(|| LsidParseError(s.to_string()))?;
        let kind = EntityKind::from_prefix(prefix).ok_or_else(|| LsidParseError(s.to_string()))?;
        let index = index
            .parse::<u64>()
            .map_err(|_| LsidParseError(s.to_string()))?;
        Ok(Lsid::new(kind, index))
    }
}

impl Serialize for Lsid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Lsid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
