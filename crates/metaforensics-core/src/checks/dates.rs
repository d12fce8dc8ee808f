//! Date consistency check.
//!
//! Three independent tests over timestamps:
//! 1. Filesystem creation strictly after modification (impossible ordering)
//! 2. Any date-like field later than the evaluation instant
//! 3. Filesystem timestamps disagreeing with the document's own
//!    created/modified fields beyond the document tolerance
//!
//! All comparisons are timezone-naive. A PDF date with an explicit offset
//! and a filesystem date in local time are compared as if both were on the
//! same clock.

use crate::dates::{compare_dates, normalize_date};
use crate::record::MetadataRecord;
use crate::types::{Flag, FlagKind, Severity};

use super::{Check, CheckContext, CheckError};

/// The date consistency check.
pub struct DateAnomalyCheck;

impl DateAnomalyCheck {
    pub fn new() -> Self {
        Self
    }

    fn check_impossible_ordering(&self, record: &MetadataRecord, flags: &mut Vec<Flag>) {
        let (Some(created_raw), Some(modified_raw)) = (
            record.get_present("fs_created"),
            record.get_present("fs_modified"),
        ) else {
            return;
        };

        let (Some(created), Some(modified)) =
            (normalize_date(created_raw), normalize_date(modified_raw))
        else {
            return;
        };

        if created > modified {
            flags.push(
                Flag::new(
                    Severity::High,
                    FlagKind::DateAnomaly,
                    "File creation date is AFTER modification date (impossible)",
                )
                .with_fs_dates(created_raw, modified_raw),
            );
        }
    }

    fn check_future_dates(&self, ctx: &CheckContext<'_>, flags: &mut Vec<Flag>) {
        let markers: Vec<String> = ctx
            .policy
            .future_date_key_markers
            .iter()
            .map(|m| m.to_lowercase())
            .collect();

        for (key, value) in ctx.record.iter() {
            let key_lower = key.to_lowercase();
            if !markers.iter().any(|m| key_lower.contains(m.as_str())) {
                continue;
            }

            match normalize_date(value) {
                Some(dt) if dt > ctx.now => {
                    flags.push(
                        Flag::new(
                            Severity::High,
                            FlagKind::FutureDate,
                            format!("Date in future: {} = {}", key, value),
                        )
                        .with_field(key, value),
                    );
                }
                _ => {}
            }
        }
    }

    fn check_cross_source(&self, ctx: &CheckContext<'_>, flags: &mut Vec<Flag>) {
        let record = ctx.record;
        let Some(format) = record.format() else {
            return;
        };
        let fields = format.fields();

        let pairs = [
            ("fs_created", fields.created),
            ("fs_modified", fields.modified),
        ];

        for (fs_key, doc_key) in pairs {
            let Some(doc_value) = record.get_present(doc_key) else {
                continue;
            };

            let comparison = compare_dates(
                record.get(fs_key),
                Some(doc_value),
                ctx.policy.document_tolerance_secs,
            );

            if comparison.is_anomaly() {
                flags.push(
                    Flag::new(
                        Severity::Medium,
                        FlagKind::DateMismatch,
                        comparison.message().to_string(),
                    )
                    .with_comparison(format!("{} vs {}", fs_key, doc_key), comparison),
                );
            }
        }
    }
}

impl Default for DateAnomalyCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for DateAnomalyCheck {
    fn name(&self) -> &'static str {
        "date_anomalies"
    }

    fn description(&self) -> &'static str {
        "Do the file's timestamps agree with each other and with the present?"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Flag>, CheckError> {
        let mut flags = Vec::new();

        self.check_impossible_ordering(ctx.record, &mut flags);
        self.check_future_dates(ctx, &mut flags);
        self.check_cross_source(ctx, &mut flags);

        Ok(flags)
    }
}
