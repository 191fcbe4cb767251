//! Reading input files into decoded text.

use crate::error::{CliError, Result};
use calamine::Reader;
use glean_core::DocumentKind;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An input file decoded to text
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Path as given
    pub path: PathBuf,
    /// Final path component
    pub filename: String,
    /// Detected kind
    pub kind: DocumentKind,
    /// Decoded text
    pub text: String,
}

/// Read `path` and decode it according to its extension.
///
/// Unsupported extensions are rejected before the file is read. Plain text
/// that is not valid UTF-8 is decoded lossily; PDF, Word and Excel files go
/// through their decoders.
pub fn load_document(path: impl AsRef<Path>) -> Result<LoadedDocument> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CliError::InvalidInput(format!(
            "Input not found: {}",
            path.display()
        )));
    }

    let kind = DocumentKind::from_path(path)?;
    let bytes = fs::read(path)?;
    let decoded = match kind {
        DocumentKind::Txt | DocumentKind::Markdown | DocumentKind::Csv => {
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        DocumentKind::Pdf => decode_pdf(&bytes),
        DocumentKind::Docx => decode_docx(&bytes),
        DocumentKind::Xlsx => decode_xlsx(&bytes),
    };
    let text = decoded.map_err(|message| CliError::Decode {
        kind,
        path: path.display().to_string(),
        message,
    })?;
    debug!("Decoded {} characters from {}", text.chars().count(), path.display());

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(LoadedDocument {
        path: path.to_path_buf(),
        filename,
        kind,
        text,
    })
}

fn decode_pdf(bytes: &[u8]) -> std::result::Result<String, String> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())?;
    Ok(text.trim().to_string())
}

/// Paragraph text, one line per paragraph
fn decode_docx(bytes: &[u8]) -> std::result::Result<String, String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text.trim().to_string())
}

/// Every sheet, one ` | `-joined line per non-empty row
fn decode_xlsx(bytes: &[u8]) -> std::result::Result<String, String> {
    let mut workbook =
        calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;

    let mut text = String::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| e.to_string())?;
        text.push_str(&format!("Sheet: {}\n", sheet_name));

        for row in range.rows() {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    calamine::Data::String(s) => s.clone(),
                    calamine::Data::Float(f) => f.to_string(),
                    calamine::Data::Int(i) => i.to_string(),
                    calamine::Data::Bool(b) => b.to_string(),
                    calamine::Data::DateTime(dt) => dt.to_string(),
                    _ => String::new(),
                })
                .collect();
            if cells.iter().any(|c| !c.is_empty()) {
                text.push_str(&cells.join(" | "));
                text.push('\n');
            }
        }
        text.push('\n');
    }
    Ok(text.trim().to_string())
}
