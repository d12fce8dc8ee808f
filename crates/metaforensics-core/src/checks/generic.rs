//! Generic metadata check.
//!
//! Flags authorship and title fields holding placeholder values such as
//! "admin" or "Untitled", which are typical of templates, test files and
//! hand-edited metadata.

use crate::types::{Flag, FlagKind, Severity};

use super::{Check, CheckContext, CheckError};

/// The generic metadata check.
pub struct GenericMetadataCheck;

impl GenericMetadataCheck {
    pub fn new() -> Self {
        Self
    }

    fn is_generic(value: &str, generic_values: &[String]) -> bool {
        let normalized = value.trim().to_lowercase();
        normalized.is_empty()
            || generic_values
                .iter()
                .any(|g| g.trim().to_lowercase() == normalized)
    }
}

impl Default for GenericMetadataCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for GenericMetadataCheck {
    fn name(&self) -> &'static str {
        "generic_metadata"
    }

    fn description(&self) -> &'static str {
        "Do author or title fields hold placeholder values?"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Flag>, CheckError> {
        let generic = &ctx.policy.generic_values;
        let rules: [(&str, &[String]); 2] = [
            ("author", generic.author.as_slice()),
            ("title", generic.title.as_slice()),
        ];

        let mut flags = Vec::new();

        for (key_marker, generic_values) in rules {
            for (key, value) in ctx.record.iter() {
                if !key.to_lowercase().contains(key_marker) {
                    continue;
                }
                let Some(text) = value.as_text() else {
                    continue;
                };

                if Self::is_generic(text, generic_values) {
                    flags.push(
                        Flag::new(
                            Severity::Low,
                            FlagKind::GenericMetadata,
                            format!("Suspicious or generic value in {}: '{}'", key, text),
                        )
                        .with_field(key, value),
                    );
                }
            }
        }

        Ok(flags)
    }
}
