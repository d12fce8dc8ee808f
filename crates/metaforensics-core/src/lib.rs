//! # metaforensics-core
//!
//! Deterministic forensic analysis of extracted file metadata.
//!
//! Given the flat key/value metadata an extractor produced for one file,
//! this crate answers:
//! - Are the file's timestamps physically possible?
//! - Do the filesystem and the document agree about when it was made?
//! - Has identifying metadata been stripped or replaced by placeholders?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same record and same `now` always produce the same report
//! 2. **Total**: Missing or malformed fields are absence, never an error
//! 3. **Stateless**: No shared mutable state between runs
//! 4. **Isolated checks**: A failing check never discards other checks' flags
//!
//! ## Example
//!
//! ```rust,ignore
//! use metaforensics_core::{analyze, MetadataRecord, Status};
//!
//! let record = MetadataRecord::from_json_file("report.pdf.json")?;
//! let report = analyze(&record);
//!
//! match report.summary.status {
//!     Status::Clean => println!("OK: {}", report.summary.message),
//!     Status::Caution => println!("CAUTION: score {}", report.risk_score),
//!     Status::Suspicious => println!("SUSPICIOUS: {} flags", report.total_flags),
//!     Status::Error => unreachable!(),
//! }
//! ```

pub mod aggregator;
pub mod checks;
pub mod dates;
pub mod detector;
pub mod formats;
pub mod policy;
pub mod record;
pub mod types;

// Re-export main types at crate root
pub use aggregator::RiskAggregator;
pub use checks::{
    Check, CheckContext, CheckError, DateAnomalyCheck, GenericMetadataCheck,
    MetadataStrippingCheck,
};
pub use dates::{
    compare_dates, normalize_date, normalize_str, DateComparison, LaterOperand,
    DEFAULT_TOLERANCE_SECS, DOCUMENT_TOLERANCE_SECS,
};
pub use detector::Detector;
pub use formats::{DocumentFormat, FormatFields};
pub use policy::{AnalysisPolicy, PolicyError, ScoringPolicy, SeverityWeights};
pub use record::{CrossCheck, DatePair, MetaValue, MetadataRecord, RecordError};
pub use types::{
    AnalysisReport, Flag, FlagContext, FlagKind, Severity, SeverityBreakdown, Status, Summary,
    TIMEOUT_ERROR,
};

use chrono::{Local, NaiveDateTime};

/// A configured detector and aggregator sharing one policy.
///
/// Holds no per-run state, so one analyzer can serve any number of
/// concurrent runs.
pub struct Analyzer {
    policy: AnalysisPolicy,
    detector: Detector,
    aggregator: RiskAggregator,
}

impl Analyzer {
    pub fn new(policy: AnalysisPolicy) -> Self {
        Self::with_detector(policy, Detector::new())
    }

    /// Use a custom detector, e.g. one with extra checks registered.
    pub fn with_detector(policy: AnalysisPolicy, detector: Detector) -> Self {
        let aggregator = RiskAggregator::with_policy(policy.scoring);
        Self {
            policy,
            detector,
            aggregator,
        }
    }

    pub fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    /// Analyze against the current local wall-clock time.
    pub fn analyze(&self, record: &MetadataRecord) -> AnalysisReport {
        self.analyze_at(record, current_instant())
    }

    /// Analyze against a fixed evaluation instant.
    pub fn analyze_at(&self, record: &MetadataRecord, now: NaiveDateTime) -> AnalysisReport {
        let flags = self.detector.detect(record, &self.policy, now);
        let mut report = self.aggregator.aggregate(flags);
        report.evaluated_at = Some(now);
        report
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisPolicy::default())
    }
}

/// The evaluation instant: local wall-clock time without offset.
///
/// Matches how filesystem timestamps are rendered by the extractor.
pub fn current_instant() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Analyze a record with the default policy against the current time.
///
/// This is the main entry point.
pub fn analyze(record: &MetadataRecord) -> AnalysisReport {
    analyze_at(record, current_instant())
}

/// Analyze a record with the default policy against a frozen instant.
pub fn analyze_at(record: &MetadataRecord, now: NaiveDateTime) -> AnalysisReport {
    Analyzer::default().analyze_at(record, now)
}

/// Analyze a record with a custom policy against a frozen instant.
pub fn analyze_with_policy(
    record: &MetadataRecord,
    policy: &AnalysisPolicy,
    now: NaiveDateTime,
) -> AnalysisReport {
    Analyzer::new(policy.clone()).analyze_at(record, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_basic_analysis() {
        let record = MetadataRecord::from_json(
            r#"{
                "file_extension": ".docx",
                "fs_created": "2024-03-01T10:00:00+01:00",
                "fs_modified": "2024-03-02T10:00:00+01:00",
                "docx_author": "Jane Smith",
                "docx_title": "Lease agreement",
                "docx_created": "2024-03-01T10:01:00",
                "docx_modified": "2024-03-02T10:00:30"
            }"#,
        )
        .unwrap();

        let report = analyze_at(&record, now());

        assert_eq!(report.total_flags, 0);
        assert_eq!(report.summary.status, Status::Clean);
        assert_eq!(report.evaluated_at, Some(now()));
    }

    #[test]
    fn test_tampered_pdf() {
        let record = MetadataRecord::from_json(
            r#"{
                "file_extension": ".pdf",
                "fs_created": "2024-06-10T08:00:00",
                "fs_modified": "2024-06-01T08:00:00",
                "pdf_author": "",
                "pdf_title": "",
                "pdf_creationdate": "D:20240101000000+00'00'"
            }"#,
        )
        .unwrap();

        let report = analyze_at(&record, now());

        // date_anomaly (3) + date_mismatch (2) + metadata_stripping (2) + 2x generic (1)
        assert_eq!(report.severity_breakdown.high, 1);
        assert_eq!(report.severity_breakdown.medium, 2);
        assert_eq!(report.severity_breakdown.low, 2);
        assert_eq!(report.risk_score, 9);
        assert_eq!(report.summary.status, Status::Suspicious);
    }

    #[test]
    fn test_policy_changes_tolerance() {
        let record = MetadataRecord::new()
            .with("file_extension", ".pdf")
            .with("pdf_author", "Jane")
            .with("fs_created", "2024-01-01T00:00:00")
            .with("pdf_creationdate", "D:20240101001000");

        assert_eq!(analyze_at(&record, now()).total_flags, 1);

        let policy = AnalysisPolicy {
            document_tolerance_secs: 900,
            ..AnalysisPolicy::default()
        };
        assert_eq!(analyze_with_policy(&record, &policy, now()).total_flags, 0);
    }
}
