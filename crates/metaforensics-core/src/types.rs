//! Flags and reports produced by the analysis engine.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dates::DateComparison;
use crate::record::MetaValue;

/// Severity of a single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,

    /// Any level this engine does not know. Only reachable when flags are
    /// deserialized from elsewhere; it weighs nothing.
    #[serde(other)]
    Unrecognized,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unrecognized => "unrecognized",
        };
        f.write_str(s)
    }
}

/// What a flag is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Filesystem creation later than modification.
    DateAnomaly,
    /// A date field later than the evaluation instant.
    FutureDate,
    /// Filesystem and document timestamps disagree beyond tolerance.
    DateMismatch,
    /// Both author and title missing from a document.
    MetadataStripping,
    /// Placeholder author or title value.
    GenericMetadata,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::DateAnomaly => "date_anomaly",
            FlagKind::FutureDate => "future_date",
            FlagKind::DateMismatch => "date_mismatch",
            FlagKind::MetadataStripping => "metadata_stripping",
            FlagKind::GenericMetadata => "generic_metadata",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional structured detail attached to a flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagContext {
    /// Metadata key the flag is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Raw value of that key, rendered as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_created: Option<MetaValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_modified: Option<MetaValue>,

    /// Which two fields were compared (e.g. "fs_created vs pdf_creationdate")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,

    /// Full comparator payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DateComparison>,
}

/// One detected anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub severity: Severity,

    pub flag: FlagKind,

    pub message: String,

    #[serde(flatten)]
    pub context: FlagContext,
}

impl Flag {
    pub fn new(severity: Severity, flag: FlagKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            flag,
            message: message.into(),
            context: FlagContext::default(),
        }
    }

    /// Attach the offending field and its raw value.
    pub fn with_field(mut self, field: impl Into<String>, value: &MetaValue) -> Self {
        self.context.field = Some(field.into());
        self.context.value = Some(value.to_string());
        self
    }

    pub fn with_fs_dates(mut self, created: &MetaValue, modified: &MetaValue) -> Self {
        self.context.fs_created = Some(created.clone());
        self.context.fs_modified = Some(modified.clone());
        self
    }

    pub fn with_comparison(mut self, label: impl Into<String>, details: DateComparison) -> Self {
        self.context.comparison = Some(label.into());
        self.context.details = Some(details);
        self
    }
}

/// Number of flags per severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Overall classification of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Clean,
    Caution,
    Suspicious,

    /// Analysis did not complete; only used for substituted reports.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Clean => "clean",
            Status::Caution => "caution",
            Status::Suspicious => "suspicious",
            Status::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub status: Status,
    pub message: String,
}

/// Error code carried by a report substituted after a timeout.
pub const TIMEOUT_ERROR: &str = "forensic_analysis_timeout";

/// Final result of analyzing one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Set only when analysis did not run to completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub total_flags: usize,

    pub risk_score: u32,

    pub severity_breakdown: SeverityBreakdown,

    pub flags: Vec<Flag>,

    pub summary: Summary,

    /// The instant future dates were judged against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<NaiveDateTime>,
}

impl AnalysisReport {
    /// Terminal report used when analysis exceeded its wall-clock budget.
    pub fn timed_out() -> Self {
        Self::terminal(TIMEOUT_ERROR.to_string(), "Forensic analysis timed out".to_string())
    }

    /// Terminal report used when analysis faulted.
    pub fn failed(reason: impl fmt::Display) -> Self {
        let reason = reason.to_string();
        let message = format!("Forensic analysis failed: {}", reason);
        Self::terminal(reason, message)
    }

    fn terminal(error: String, message: String) -> Self {
        Self {
            error: Some(error),
            total_flags: 0,
            risk_score: 0,
            severity_breakdown: SeverityBreakdown::default(),
            flags: Vec::new(),
            summary: Summary {
                status: Status::Error,
                message,
            },
            evaluated_at: None,
        }
    }

    /// Whether this report stands in for an analysis that did not complete.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_deref() == Some(TIMEOUT_ERROR)
    }

    /// Flags of one kind, in detection order.
    pub fn flags_of(&self, kind: FlagKind) -> impl Iterator<Item = &Flag> {
        self.flags.iter().filter(move |f| f.flag == kind)
    }
}
