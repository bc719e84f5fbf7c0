//! Source document parsing and text extraction.
//!
//! Supported inputs: plain text, markdown, and PDF. Anything else is
//! rejected before text reaches the chunker; batch ingestion skips the
//! offending document and continues.

use grounded_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Document type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    PlainText,
    Markdown,
    Pdf,
    Unsupported,
}

impl DocumentType {
    /// Detect document type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("txt") => Self::PlainText,
            Some("md") | Some("markdown") => Self::Markdown,
            Some("pdf") => Self::Pdf,
            _ => Self::Unsupported,
        }
    }

    /// Whether this type can be ingested.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Markdown => "markdown",
            Self::Pdf => "pdf",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Parse a source file and return its raw text content.
///
/// Text and markdown are read as UTF-8 with invalid sequences replaced.
/// PDF pages are extracted and joined with blank lines so page boundaries
/// become section boundaries for the chunker.
pub fn parse_file(path: &Path) -> AppResult<String> {
    match DocumentType::from_path(path) {
        DocumentType::PlainText | DocumentType::Markdown => {
            let bytes = fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        DocumentType::Pdf => pdf_extract::extract_text(path)
            .map_err(|e| AppError::Parse(format!("Failed to extract PDF text from {:?}: {}", path, e))),
        DocumentType::Unsupported => Err(AppError::Unsupported(format!(
            "Unsupported file type: {:?}",
            path.extension().unwrap_or_default()
        ))),
    }
}
