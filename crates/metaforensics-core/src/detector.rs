//! Anomaly detector: runs every check and concatenates their flags.

use chrono::NaiveDateTime;

use crate::checks::{default_checks, Check, CheckContext};
use crate::policy::AnalysisPolicy;
use crate::record::MetadataRecord;
use crate::types::Flag;

/// Runs a fixed, ordered set of checks over a record.
pub struct Detector {
    checks: Vec<Box<dyn Check>>,
}

impl Detector {
    /// A detector with the built-in checks.
    pub fn new() -> Self {
        Self {
            checks: default_checks(),
        }
    }

    /// A detector with no checks at all.
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check; it runs after all existing ones.
    pub fn with_check(mut self, check: Box<dyn Check>) -> Self {
        self.register(check);
        self
    }

    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    /// Names of the registered checks, in run order.
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run every check against the record.
    ///
    /// `now` is the single instant all future-date judgments use. A check
    /// that returns `CheckError` is logged and skipped; flags from the other
    /// checks are kept as they are. Panics are not caught here: a panicking
    /// check aborts the whole run, so custom checks should report faults as
    /// `CheckError` instead.
    pub fn detect(
        &self,
        record: &MetadataRecord,
        policy: &AnalysisPolicy,
        now: NaiveDateTime,
    ) -> Vec<Flag> {
        let ctx = CheckContext {
            record,
            now,
            policy,
        };

        let mut flags = Vec::new();
        for check in &self.checks {
            match check.run(&ctx) {
                Ok(found) => {
                    tracing::debug!(check = check.name(), flags = found.len(), "Check complete");
                    flags.extend(found);
                }
                Err(e) => {
                    tracing::warn!(check = check.name(), error = %e, "Check failed, skipping");
                }
            }
        }

        flags
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckError;
    use crate::types::{FlagKind, Severity};
    use chrono::NaiveDate;

    struct FailingCheck;

    impl Check for FailingCheck {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn description(&self) -> &'static str {
            "Always fails"
        }

        fn run(&self, _ctx: &CheckContext<'_>) -> Result<Vec<Flag>, CheckError> {
            Err(CheckError::Failed {
                check: self.name().to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn suspicious_pdf() -> MetadataRecord {
        MetadataRecord::new()
            .with("file_extension", ".pdf")
            .with("fs_created", "2024-05-02T00:00:00")
            .with("fs_modified", "2024-05-01T00:00:00")
            .with("pdf_author", "admin")
    }

    #[test]
    fn test_default_check_order() {
        assert_eq!(
            Detector::new().check_names(),
            vec!["date_anomalies", "metadata_stripping", "generic_metadata"]
        );
    }

    #[test]
    fn test_flags_are_concatenated_in_check_order() {
        let flags = Detector::new().detect(&suspicious_pdf(), &AnalysisPolicy::default(), now());

        let kinds: Vec<FlagKind> = flags.iter().map(|f| f.flag).collect();
        assert_eq!(kinds, vec![FlagKind::DateAnomaly, FlagKind::GenericMetadata]);
    }

    #[test]
    fn test_failing_check_keeps_other_flags() {
        let detector = Detector::new().with_check(Box::new(FailingCheck));
        let flags = detector.detect(&suspicious_pdf(), &AnalysisPolicy::default(), now());

        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].severity, Severity::High);
    }

    struct PanickingCheck;

    impl Check for PanickingCheck {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn description(&self) -> &'static str {
            "Panics instead of returning an error"
        }

        fn run(&self, _ctx: &CheckContext<'_>) -> Result<Vec<Flag>, CheckError> {
            panic!("unexpected record shape");
        }
    }

    #[test]
    #[should_panic(expected = "unexpected record shape")]
    fn test_panicking_check_aborts_detection() {
        let detector = Detector::new().with_check(Box::new(PanickingCheck));
        detector.detect(&suspicious_pdf(), &AnalysisPolicy::default(), now());
    }

    #[test]
    fn test_fs_only_record() {
        let record = MetadataRecord::new()
            .with("fs_created", "2024-01-01T00:00:00")
            .with("fs_modified", "2024-01-02T00:00:00")
            .with("size_bytes", 1024i64);

        assert!(Detector::new()
            .detect(&record, &AnalysisPolicy::default(), now())
            .is_empty());
    }

    #[test]
    fn test_empty_detector_finds_nothing() {
        assert!(Detector::empty()
            .detect(&suspicious_pdf(), &AnalysisPolicy::default(), now())
            .is_empty());
    }
}
