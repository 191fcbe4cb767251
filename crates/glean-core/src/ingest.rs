//! Document kinds and turning decoded text into documents

use crate::config::PipelineConfig;
use crate::error::CoreError;
use crate::splitter::TextSplitter;
use glean_domain::{Document, DocumentId};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// PDF; text is decoded by the caller
    Pdf,
    /// Plain text
    Txt,
    /// Markdown, read as plain text
    Markdown,
    /// CSV, read as plain text
    Csv,
    /// Word document; paragraphs are decoded by the caller
    Docx,
    /// Excel workbook; cells are decoded by the caller
    Xlsx,
}

impl DocumentKind {
    /// Detect the kind from a file extension (case-insensitive).
    ///
    /// Anything unrecognized is `UnsupportedInput`, so rejection happens
    /// before any chunking.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" => Ok(DocumentKind::Txt),
            "md" | "markdown" => Ok(DocumentKind::Markdown),
            "csv" => Ok(DocumentKind::Csv),
            "docx" => Ok(DocumentKind::Docx),
            "xlsx" => Ok(DocumentKind::Xlsx),
            "" => Err(CoreError::UnsupportedInput(format!(
                "'{}' has no file extension (use PDF, DOCX, XLSX, TXT, MD or CSV)",
                path.display()
            ))),
            other => Err(CoreError::UnsupportedInput(format!(
                "unsupported file type '.{}' for '{}' (use PDF, DOCX, XLSX, TXT, MD or CSV)",
                other,
                path.display()
            ))),
        }
    }

    /// Short name recorded in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Txt => "txt",
            DocumentKind::Markdown => "md",
            DocumentKind::Csv => "csv",
            DocumentKind::Docx => "docx",
            DocumentKind::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chunk decoded `text` into a new document.
///
/// Text that is empty or only whitespace is `EmptyDocument`.
pub fn ingest_text(
    id: DocumentId,
    filename: impl Into<String>,
    text: &str,
    config: &PipelineConfig,
) -> Result<Document, CoreError> {
    let filename = filename.into();
    if text.trim().is_empty() {
        return Err(CoreError::EmptyDocument(filename));
    }

    let chunks = TextSplitter::from_config(config).split(text);
    info!(
        document_id = %id,
        "Ingested '{}' into {} chunks",
        filename,
        chunks.len()
    );
    Ok(Document::new(id, filename, chunks))
}
