use std::path::PathBuf;
use thiserror::Error;

use crate::interchange::Lsid;
use crate::session::SessionError;

/// The main error type for acqxfer operations.
///
/// Every variant aborts the whole transcoding operation. Soft skips
/// (mask shapes, empty ROIs, absent optional settings) never surface here;
/// they are recorded in a [`TranscodeReport`](crate::report::TranscodeReport).
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required identifier is missing or two graphs that must be
    /// structurally congruent are not.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// An entity kind outside the known closed set.
    #[error("Unsupported {entity} variant: {kind}")]
    UnsupportedVariant { entity: &'static str, kind: String },

    /// An interchange identifier that has not been created yet in this
    /// import operation.
    #[error("Unresolved reference to {lsid} (expected a {expected})")]
    MissingReference { lsid: Lsid, expected: &'static str },

    #[error("Invalid {field}: '{value}'")]
    InvalidData { field: &'static str, value: String },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Failed to parse interchange JSON from {path}: {source}")]
    DocumentJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write interchange JSON to {path}: {source}")]
    DocumentJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse source graph from {path}: {source}")]
    GraphJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write source graph to {path}: {source}")]
    GraphJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Container {path}: {message}")]
    Container { path: PathBuf, message: String },
}

impl TranscodeError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        TranscodeError::Precondition(message.into())
    }

    pub(crate) fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        TranscodeError::InvalidData {
            field,
            value: value.into(),
        }
    }
}
