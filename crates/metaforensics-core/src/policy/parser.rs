//! Analysis policy parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::dates::DOCUMENT_TOLERANCE_SECS;
use crate::types::Severity;

use super::schema::validate_policy_schema;

/// Errors that can occur when loading a policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Failed to read policy file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Policy does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Policy validation failed: {0}")]
    ValidationError(String),
}

const DEFAULT_AUTHOR_VALUES: [&str; 5] = ["test", "admin", "user", "unknown", "sample"];
const DEFAULT_TITLE_VALUES: [&str; 4] = ["untitled", "test", "sample", "document"];
const DEFAULT_DATE_KEY_MARKERS: [&str; 3] = ["date", "created", "modified"];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Placeholder values that mark a field as generic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericValues {
    /// Checked against every key containing "author"
    pub author: Vec<String>,

    /// Checked against every key containing "title"
    pub title: Vec<String>,
}

impl Default for GenericValues {
    fn default() -> Self {
        Self {
            author: owned(&DEFAULT_AUTHOR_VALUES),
            title: owned(&DEFAULT_TITLE_VALUES),
        }
    }
}

/// Score contributed by one flag of each severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            high: 3,
            medium: 2,
            low: 1,
        }
    }
}

impl SeverityWeights {
    /// Weight of a severity. Unrecognized severities weigh nothing.
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Unrecognized => 0,
        }
    }
}

/// Weights and status thresholds for the risk aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub weights: SeverityWeights,

    /// Scores at or above this are suspicious
    pub suspicious_threshold: u32,

    /// Scores at or above this (and below suspicious) call for caution
    pub caution_threshold: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: SeverityWeights::default(),
            suspicious_threshold: 5,
            caution_threshold: 2,
        }
    }
}

/// Tunable parameters of an analysis run.
///
/// The default policy reproduces the built-in heuristics exactly; a policy
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPolicy {
    /// Tolerance for filesystem vs document date cross-checks
    pub document_tolerance_secs: u64,

    /// Key substrings that mark a field as a date for the future-date scan
    pub future_date_key_markers: Vec<String>,

    pub generic_values: GenericValues,

    pub scoring: ScoringPolicy,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            document_tolerance_secs: DOCUMENT_TOLERANCE_SECS,
            future_date_key_markers: owned(&DEFAULT_DATE_KEY_MARKERS),
            generic_values: GenericValues::default(),
            scoring: ScoringPolicy::default(),
        }
    }
}

impl AnalysisPolicy {
    /// Parse a policy from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, PolicyError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a policy from JSON string.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a policy from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a policy from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load a policy file, picking the parser from the extension.
    ///
    /// `.json` is parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    fn from_value(value: serde_json::Value) -> Result<Self, PolicyError> {
        // An empty YAML document parses as null
        let value = if value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            value
        };

        validate_policy_schema(&value).map_err(PolicyError::SchemaError)?;
        let policy: AnalysisPolicy = serde_json::from_value(value)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check constraints the schema cannot express.
    fn validate(&self) -> Result<(), PolicyError> {
        if self.scoring.caution_threshold > self.scoring.suspicious_threshold {
            return Err(PolicyError::ValidationError(format!(
                "caution_threshold ({}) exceeds suspicious_threshold ({})",
                self.scoring.caution_threshold, self.scoring.suspicious_threshold
            )));
        }

        if self
            .future_date_key_markers
            .iter()
            .any(|m| m.trim().is_empty())
        {
            return Err(PolicyError::ValidationError(
                "future_date_key_markers must not contain blank entries".to_string(),
            ));
        }

        Ok(())
    }
}
