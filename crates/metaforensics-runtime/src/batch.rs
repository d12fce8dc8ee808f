//! Per-file result envelopes and batch aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use metaforensics_core::{AnalysisReport, CrossCheck, MetaValue, MetadataRecord};

/// A record paired with the name of the file it was extracted from.
#[derive(Debug, Clone)]
pub struct NamedRecord {
    pub filename: String,
    pub record: MetadataRecord,
}

impl NamedRecord {
    pub fn new(filename: impl Into<String>, record: MetadataRecord) -> Self {
        Self {
            filename: filename.into(),
            record,
        }
    }
}

/// Analysis of one file, with the raw fields an examiner looks at first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub filename: String,

    /// Lowercased suffix of `filename` (e.g. ".pdf"), or "unknown"
    pub file_type: String,

    pub cross_check: CrossCheck,

    pub document_metadata: BTreeMap<String, MetaValue>,

    pub forensic_flags: AnalysisReport,

    /// Extraction failures reported by the extractor
    pub errors: BTreeMap<String, MetaValue>,
}

impl FileAnalysis {
    pub fn new(filename: impl Into<String>, record: &MetadataRecord, report: AnalysisReport) -> Self {
        let filename = filename.into();
        Self {
            file_type: file_type(&filename),
            cross_check: record.cross_check(),
            document_metadata: record.document_fields(),
            forensic_flags: report,
            errors: record.extraction_errors(),
            filename,
        }
    }
}

fn file_type(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// A file that could not be analyzed at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    pub filename: String,
    pub error: String,
}

/// Results of analyzing several files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<FileAnalysis>,
    pub errors: Vec<FileError>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, analysis: FileAnalysis) {
        self.total_files += 1;
        self.successful += 1;
        self.results.push(analysis);
    }

    /// Record a file that never reached analysis, e.g. unreadable input.
    pub fn record_failure(&mut self, filename: impl Into<String>, error: impl ToString) {
        self.total_files += 1;
        self.failed += 1;
        self.errors.push(FileError {
            filename: filename.into(),
            error: error.to_string(),
        });
    }
}
