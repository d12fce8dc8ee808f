//! The metadata record consumed by the analysis engine.
//!
//! A record is the flat key/value bag produced by an extraction adapter for
//! one file. Keys are namespaced by source (`fs_*`, `pdf_*`, `docx_*`,
//! `xlsx_*`, `pptx_*`) and extraction failures are reported under `*_error`
//! keys. No key is guaranteed to exist, and an explicit `null` is treated
//! exactly like a missing key.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::formats::DocumentFormat;

/// Errors that can occur when loading a record.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to read metadata file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse metadata JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Metadata must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// A single metadata value.
///
/// `DateTime` holds a value the extractor already parsed. It is never
/// produced by deserialization; JSON dates arrive as `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    #[serde(skip_deserializing)]
    DateTime(NaiveDateTime),
    List(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    /// Whether the value carries information.
    ///
    /// Null, `false`, zero, the empty string and empty collections all
    /// count as absent. Whitespace-only strings are present.
    pub fn is_present(&self) -> bool {
        match self {
            MetaValue::Null => false,
            MetaValue::Bool(b) => *b,
            MetaValue::Integer(i) => *i != 0,
            MetaValue::Float(f) => *f != 0.0,
            MetaValue::Text(s) => !s.is_empty(),
            MetaValue::DateTime(_) => true,
            MetaValue::List(items) => !items.is_empty(),
            MetaValue::Map(map) => !map.is_empty(),
        }
    }

    /// Borrow the value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Null => f.write_str("null"),
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Integer(i) => write!(f, "{}", i),
            MetaValue::Float(v) => write!(f, "{}", v),
            MetaValue::Text(s) => f.write_str(s),
            MetaValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            MetaValue::List(_) | MetaValue::Map(_) => {
                let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Integer(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<NaiveDateTime> for MetaValue {
    fn from(value: NaiveDateTime) -> Self {
        MetaValue::DateTime(value)
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(MetaValue::Null)
    }
}

/// The extracted metadata of one file.
///
/// Backed by a `BTreeMap` so that every traversal, and therefore the order
/// of produced flags, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: BTreeMap<String, MetaValue>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a record from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Build a record from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RecordError> {
        let kind = match &value {
            serde_json::Value::Object(_) => None,
            serde_json::Value::Null => Some("null"),
            serde_json::Value::Bool(_) => Some("a boolean"),
            serde_json::Value::Number(_) => Some("a number"),
            serde_json::Value::String(_) => Some("a string"),
            serde_json::Value::Array(_) => Some("an array"),
        };
        if let Some(kind) = kind {
            return Err(RecordError::NotAnObject(kind));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Look up a key. An explicit null is reported as missing.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(key).filter(|v| !matches!(v, MetaValue::Null))
    }

    /// Look up a key, keeping only values that carry information.
    pub fn get_present(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(key).filter(|v| v.is_present())
    }

    pub fn is_present(&self, key: &str) -> bool {
        self.get_present(key).is_some()
    }

    /// Look up a key holding text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_text)
    }

    /// Iterate over all non-null entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.fields
            .iter()
            .filter(|(_, v)| !matches!(v, MetaValue::Null))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document format named by `file_extension`, if recognized.
    pub fn format(&self) -> Option<DocumentFormat> {
        self.text("file_extension")
            .and_then(DocumentFormat::from_extension)
    }

    /// Document-derived fields, excluding extraction failure markers.
    pub fn document_fields(&self) -> BTreeMap<String, MetaValue> {
        self.fields
            .iter()
            .filter(|(k, _)| {
                DocumentFormat::ALL
                    .iter()
                    .any(|f| k.starts_with(f.key_prefix()))
                    && !k.ends_with("_error")
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Extraction failure markers (`*_error` keys).
    pub fn extraction_errors(&self) -> BTreeMap<String, MetaValue> {
        self.fields
            .iter()
            .filter(|(k, _)| k.ends_with("_error"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Side-by-side view of filesystem and document timestamps.
    ///
    /// The document side is the first present value among the formats in
    /// `DocumentFormat::ALL` order, regardless of the file extension.
    pub fn cross_check(&self) -> CrossCheck {
        let first_document = |pick: fn(DocumentFormat) -> &'static str| {
            DocumentFormat::ALL
                .iter()
                .find_map(|f| self.get_present(pick(*f)))
                .cloned()
        };

        CrossCheck {
            fs_created_vs_doc_created: DatePair {
                filesystem: self.get("fs_created").cloned(),
                document: first_document(|f| f.fields().created),
            },
            fs_modified_vs_doc_modified: DatePair {
                filesystem: self.get("fs_modified").cloned(),
                document: first_document(|f| f.fields().modified),
            },
        }
    }
}

impl FromIterator<(String, MetaValue)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (String, MetaValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A filesystem timestamp next to its document counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatePair {
    pub filesystem: Option<MetaValue>,
    pub document: Option<MetaValue>,
}

/// Raw created/modified pairs for presentation alongside a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCheck {
    pub fs_created_vs_doc_created: DatePair,
    pub fs_modified_vs_doc_modified: DatePair,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_missing() {
        let record = MetadataRecord::from_json(r#"{"pdf_author": null}"#).unwrap();
        assert!(record.get("pdf_author").is_none());
        assert!(record.get("pdf_title").is_none());
        assert_eq!(record.iter().count(), 0);
    }

    #[test]
    fn test_json_values_map_to_variants() {
        let record = MetadataRecord::from_json(
            r#"{"a": "text", "b": 3, "c": 1.5, "d": true, "e": {"x": 1}, "f": [1]}"#,
        )
        .unwrap();

        assert_eq!(record.text("a"), Some("text"));
        assert_eq!(record.get("b"), Some(&MetaValue::Integer(3)));
        assert_eq!(record.get("c"), Some(&MetaValue::Float(1.5)));
        assert_eq!(record.get("d"), Some(&MetaValue::Bool(true)));
        assert!(matches!(record.get("e"), Some(MetaValue::Map(_))));
        assert!(matches!(record.get("f"), Some(MetaValue::List(_))));
    }

    #[test]
    fn test_non_object_rejected() {
        let result = MetadataRecord::from_json("[1, 2]");
        assert!(matches!(result, Err(RecordError::NotAnObject("an array"))));
    }

    #[test]
    fn test_presence_follows_truthiness() {
        let record = MetadataRecord::new()
            .with("empty", "")
            .with("blank", "  ")
            .with("zero", 0i64)
            .with("off", false)
            .with("name", "Alice");

        assert!(!record.is_present("empty"));
        assert!(record.is_present("blank"));
        assert!(!record.is_present("zero"));
        assert!(!record.is_present("off"));
        assert!(record.is_present("name"));
        assert!(!record.is_present("missing"));
    }

    #[test]
    fn test_document_fields_and_errors() {
        let record = MetadataRecord::new()
            .with("fs_created", "2024-01-01T00:00:00")
            .with("pdf_author", "Alice")
            .with("pdf_error", "encrypted")
            .with("docx_title", "Plan");

        let docs = record.document_fields();
        assert_eq!(docs.len(), 2);
        assert!(docs.contains_key("pdf_author"));
        assert!(docs.contains_key("docx_title"));

        let errors = record.extraction_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("pdf_error"));
    }

    #[test]
    fn test_cross_check_prefers_office_fields() {
        let record = MetadataRecord::new()
            .with("fs_created", "2024-01-01T00:00:00")
            .with("pdf_creationdate", "D:20240101000000")
            .with("docx_created", "2023-12-31T00:00:00");

        let cross = record.cross_check();
        assert_eq!(
            cross.fs_created_vs_doc_created.document,
            Some(MetaValue::from("2023-12-31T00:00:00"))
        );
        assert!(cross.fs_modified_vs_doc_modified.filesystem.is_none());
        assert!(cross.fs_modified_vs_doc_modified.document.is_none());
    }

    #[test]
    fn test_display_is_verbatim_for_text() {
        assert_eq!(MetaValue::from("D:2023").to_string(), "D:2023");
        assert_eq!(MetaValue::Null.to_string(), "null");
    }
}
