//! Document format table.
//!
//! Every format-specific check looks up its field names here instead of
//! branching per format.

use serde::{Deserialize, Serialize};

/// Document formats with their own namespaced metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Xlsx,
    Pptx,
    Pdf,
}

/// Field names a format declares for authorship and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatFields {
    pub author: &'static str,
    pub title: &'static str,
    pub created: &'static str,
    pub modified: &'static str,
}

impl DocumentFormat {
    /// All formats, in the precedence used when picking a document-side value.
    pub const ALL: [DocumentFormat; 4] = [
        DocumentFormat::Docx,
        DocumentFormat::Xlsx,
        DocumentFormat::Pptx,
        DocumentFormat::Pdf,
    ];

    /// Resolve a file extension such as `.pdf` or `PDF`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().to_lowercase();
        match ext.strip_prefix('.').unwrap_or(ext.as_str()) {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "xlsx" => Some(DocumentFormat::Xlsx),
            "pptx" => Some(DocumentFormat::Pptx),
            _ => None,
        }
    }

    pub fn fields(self) -> FormatFields {
        match self {
            DocumentFormat::Pdf => FormatFields {
                author: "pdf_author",
                title: "pdf_title",
                created: "pdf_creationdate",
                modified: "pdf_moddate",
            },
            DocumentFormat::Docx => FormatFields {
                author: "docx_author",
                title: "docx_title",
                created: "docx_created",
                modified: "docx_modified",
            },
            DocumentFormat::Xlsx => FormatFields {
                author: "xlsx_author",
                title: "xlsx_title",
                created: "xlsx_created",
                modified: "xlsx_modified",
            },
            DocumentFormat::Pptx => FormatFields {
                author: "pptx_author",
                title: "pptx_title",
                created: "pptx_created",
                modified: "pptx_modified",
            },
        }
    }

    /// Canonical extension including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Docx => ".docx",
            DocumentFormat::Xlsx => ".xlsx",
            DocumentFormat::Pptx => ".pptx",
        }
    }

    /// Prefix shared by all keys this format's extractor produces.
    pub fn key_prefix(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf_",
            DocumentFormat::Docx => "docx_",
            DocumentFormat::Xlsx => "xlsx_",
            DocumentFormat::Pptx => "pptx_",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_resolution() {
        assert_eq!(DocumentFormat::from_extension(".pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension(".DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("xlsx"), Some(DocumentFormat::Xlsx));
        assert_eq!(DocumentFormat::from_extension(" .pptx "), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension(".doc"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }

    #[test]
    fn test_fields_share_key_prefix() {
        for format in DocumentFormat::ALL {
            let fields = format.fields();
            let prefix = format.key_prefix();
            assert!(fields.author.starts_with(prefix));
            assert!(fields.title.starts_with(prefix));
            assert!(fields.created.starts_with(prefix));
            assert!(fields.modified.starts_with(prefix));
        }
    }
}
