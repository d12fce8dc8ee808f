//! The forensic checks.
//!
//! Each check looks at the whole record independently and reports zero or
//! more flags. Checks never see each other's output, so their order only
//! affects the order of flags in the report.
//!
//! | Check | Flags |
//! |-------|-------|
//! | `DateAnomalyCheck` | `date_anomaly`, `future_date`, `date_mismatch` |
//! | `MetadataStrippingCheck` | `metadata_stripping` |
//! | `GenericMetadataCheck` | `generic_metadata` |

mod dates;
mod generic;
mod stripping;

pub use dates::DateAnomalyCheck;
pub use generic::GenericMetadataCheck;
pub use stripping::MetadataStrippingCheck;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::policy::AnalysisPolicy;
use crate::record::MetadataRecord;
use crate::types::Flag;

/// A check that could not complete.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("check '{check}' failed: {reason}")]
    Failed { check: String, reason: String },
}

/// Everything a check may look at during one run.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub record: &'a MetadataRecord,

    /// Evaluation instant, captured once per run
    pub now: NaiveDateTime,

    pub policy: &'a AnalysisPolicy,
}

/// Trait implemented by every check.
pub trait Check: Send + Sync {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// What the check looks for.
    fn description(&self) -> &'static str;

    /// Inspect the record and report flags.
    ///
    /// Missing or malformed fields are absence, not failure. An `Err` is
    /// reserved for genuine faults and never discards other checks' flags.
    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Flag>, CheckError>;
}

/// The built-in checks in their default order.
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(DateAnomalyCheck::new()),
        Box::new(MetadataStrippingCheck::new()),
        Box::new(GenericMetadataCheck::new()),
    ]
}
