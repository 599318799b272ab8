//! Transcode report types for tracking soft skips and upsert decisions.
//!
//! Export and import never fail on known coverage gaps (mask shapes, ROIs
//! with nothing encodable, optional settings that are absent). Those gaps
//! are recorded here so callers can show exactly what happened.

use serde::Serialize;
use std::fmt;

/// A report generated during one export or import operation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TranscodeReport {
    /// Direction of the operation ("export" or "import").
    pub direction: String,
    /// Entity counts written during the operation.
    pub counts: TranscodeCounts,
    /// Issues recorded during the operation.
    pub issues: Vec<TranscodeIssue>,
}

impl TranscodeReport {
    /// Create a new empty report for an operation.
    pub fn new(direction: impl Into<String>) -> Self {
        Self {
            direction: direction.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: TranscodeIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues (coverage gaps).
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == TranscodeSeverity::Warning)
            .count()
    }

    /// Count of info-level issues (upsert and reuse decisions).
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == TranscodeSeverity::Info)
            .count()
    }

    /// Returns true if something present in the input was not transcoded.
    pub fn is_lossy(&self) -> bool {
        self.warning_count() > 0
    }

    /// Returns true if any issue carries the given code.
    pub fn has(&self, code: TranscodeIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for TranscodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} image(s), {} instrument(s), {} channel(s), {} ROI(s), {} shape(s)",
            self.direction,
            self.counts.images,
            self.counts.instruments,
            self.counts.channels,
            self.counts.rois,
            self.counts.shapes
        )?;

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == TranscodeSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == TranscodeSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts of entities written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TranscodeCounts {
    pub images: usize,
    pub instruments: usize,
    pub channels: usize,
    pub rois: usize,
    pub shapes: usize,
}

/// A single issue recorded during transcoding.
#[derive(Clone, Debug, Serialize)]
pub struct TranscodeIssue {
    pub severity: TranscodeSeverity,
    pub code: TranscodeIssueCode,
    pub message: String,
}

impl TranscodeIssue {
    /// Create a warning-level issue (something was skipped).
    pub fn warning(code: TranscodeIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: TranscodeSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (a decision, nothing lost).
    pub fn info(code: TranscodeIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: TranscodeSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for transcode issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeSeverity {
    Warning,
    Info,
}

/// Stable issue codes for programmatic consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeIssueCode {
    /// A mask shape was encountered and not encoded.
    SkippedMaskShape,
    /// An ROI had no encodable shapes and was left out entirely.
    DroppedEmptyRoi,
    /// The image already existed in the document and was updated in place.
    UpdatedExistingImage,
    /// The instrument was already in the document and was not re-exported.
    ReusedInstrument,
    /// The target instrument already had a microscope; the incoming one was ignored.
    SkippedExistingMicroscope,
}
