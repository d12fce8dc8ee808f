//! Risk aggregator: turns flags into a scored report.
//!
//! The policy is fixed and order-independent:
//! 1. Each flag contributes its severity weight (high 3, medium 2, low 1)
//! 2. Score >= 5 → suspicious
//! 3. Else score >= 2 → caution
//! 4. Else → clean

use crate::policy::ScoringPolicy;
use crate::types::{AnalysisReport, Flag, Severity, SeverityBreakdown, Status, Summary};

/// Aggregates flags into an `AnalysisReport`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAggregator {
    scoring: ScoringPolicy,
}

impl RiskAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(scoring: ScoringPolicy) -> Self {
        Self { scoring }
    }

    /// Severity-weighted sum over all flags.
    pub fn score(&self, flags: &[Flag]) -> u32 {
        flags
            .iter()
            .map(|f| self.scoring.weights.weight(f.severity))
            .fold(0u32, u32::saturating_add)
    }

    /// Status for a score.
    pub fn classify(&self, score: u32) -> Status {
        if score >= self.scoring.suspicious_threshold {
            Status::Suspicious
        } else if score >= self.scoring.caution_threshold {
            Status::Caution
        } else {
            Status::Clean
        }
    }

    /// Count flags per known severity.
    pub fn breakdown(&self, flags: &[Flag]) -> SeverityBreakdown {
        let mut breakdown = SeverityBreakdown::default();
        for flag in flags {
            match flag.severity {
                Severity::High => breakdown.high += 1,
                Severity::Medium => breakdown.medium += 1,
                Severity::Low => breakdown.low += 1,
                Severity::Unrecognized => {}
            }
        }
        breakdown
    }

    /// Build the final report. Never fails; no flags means a clean report.
    pub fn aggregate(&self, flags: Vec<Flag>) -> AnalysisReport {
        let risk_score = self.score(&flags);
        let status = self.classify(risk_score);
        let total_flags = flags.len();

        tracing::debug!(total_flags, risk_score, status = %status, "Flags aggregated");

        AnalysisReport {
            error: None,
            total_flags,
            risk_score,
            severity_breakdown: self.breakdown(&flags),
            summary: Summary {
                status,
                message: format!(
                    "Found {} potential issues with risk score {}",
                    total_flags, risk_score
                ),
            },
            flags,
            evaluated_at: None,
        }
    }
}
