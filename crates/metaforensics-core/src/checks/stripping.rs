//! Metadata stripping check.
//!
//! A document whose author and title are both missing has most likely had
//! its metadata removed.

use crate::formats::DocumentFormat;
use crate::types::{Flag, FlagKind, Severity};

use super::{Check, CheckContext, CheckError};

/// The metadata stripping check.
pub struct MetadataStrippingCheck;

impl MetadataStrippingCheck {
    pub fn new() -> Self {
        Self
    }

    fn message(format: DocumentFormat) -> String {
        match format {
            DocumentFormat::Pdf => {
                "PDF appears to have minimal or no metadata (author/title missing)".to_string()
            }
            other => format!(
                "{} appears to have minimal or no metadata",
                other.extension().to_uppercase()
            ),
        }
    }
}

impl Default for MetadataStrippingCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for MetadataStrippingCheck {
    fn name(&self) -> &'static str {
        "metadata_stripping"
    }

    fn description(&self) -> &'static str {
        "Has the document's identifying metadata been removed?"
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<Vec<Flag>, CheckError> {
        let Some(format) = ctx.record.format() else {
            return Ok(vec![]);
        };
        let fields = format.fields();

        if ctx.record.is_present(fields.author) || ctx.record.is_present(fields.title) {
            return Ok(vec![]);
        }

        Ok(vec![Flag::new(
            Severity::Medium,
            FlagKind::MetadataStripping,
            Self::message(format),
        )])
    }
}
