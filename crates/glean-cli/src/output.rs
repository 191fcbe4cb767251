//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use glean_core::{Answer, ExtractionPayload, ScoredChunk};
use glean_domain::{Chunk, ClauseReport, QaEntry, SectionValue};
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style, Width},
};

/// Characters of chunk or clause text shown in a table cell
const CELL_PREVIEW_CHARS: usize = 80;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the result of `process`: the report and where it was written.
    pub fn format_report(&self, report: &ClauseReport, written_to: &Path) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(&serde_json::json!({
                "documentId": report.document_id,
                "clausesCount": report.clauses.len(),
                "summaryKeys": ["executive", "legal", "procurement"],
                "outputFile": written_to.display().to_string(),
            }))?),
            OutputFormat::Quiet => Ok(written_to.display().to_string()),
            OutputFormat::Table => {
                let mut out = String::new();
                if report.clauses.is_empty() {
                    out.push_str(&self.colorize("No clauses found.", "yellow"));
                } else {
                    let mut builder = Builder::default();
                    builder.push_record(["Type", "Confidence", "Text"]);
                    for clause in &report.clauses {
                        builder.push_record([
                            clause.kind.clone(),
                            format!("{:.2}", clause.clamped_confidence()),
                            one_line(&clause.text, CELL_PREVIEW_CHARS),
                        ]);
                    }
                    out.push_str(&self.render(builder));
                }

                out.push_str("\n\n");
                for (audience, text) in [
                    ("Executive", &report.summary.executive),
                    ("Legal", &report.summary.legal),
                    ("Procurement", &report.summary.procurement),
                ] {
                    out.push_str(&self.colorize(audience, "cyan"));
                    out.push('\n');
                    out.push_str(if text.is_empty() { "(none)" } else { text.as_str() });
                    out.push_str("\n\n");
                }
                out.push_str(&self.success(&format!(
                    "Report {} written to {}",
                    report.document_id,
                    written_to.display()
                )));
                Ok(out)
            }
        }
    }

    /// Format a taxonomy extraction.
    pub fn format_extraction(&self, payload: &ExtractionPayload) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(payload)?),
            OutputFormat::Quiet => Ok(payload.raw_answer.clone()),
            OutputFormat::Table => {
                if payload.taxonomy.is_empty() {
                    return Ok(self.colorize(
                        "No sections recognized in the model answer.",
                        "yellow",
                    ));
                }

                let mut builder = Builder::default();
                builder.push_record(["Section", "Content"]);
                for (section, value) in payload.taxonomy.iter() {
                    if value.is_empty() {
                        continue;
                    }
                    builder.push_record([section.title().to_string(), section_text(value)]);
                }

                Ok(format!(
                    "{}\n{}",
                    self.render(builder),
                    self.info(&format!(
                        "{} chunk(s) in {:.1}s",
                        payload.chunks_used, payload.elapsed_seconds
                    ))
                ))
            }
        }
    }

    /// Format an answer.
    pub fn format_answer(&self, answer: &Answer) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(answer)?),
            OutputFormat::Quiet => Ok(answer.answer.clone()),
            OutputFormat::Table => {
                let sources: Vec<String> = answer.sources.iter().map(|s| s.to_string()).collect();
                Ok(format!(
                    "{}\n\n{}",
                    answer.answer,
                    self.info(&format!(
                        "Chunks used: [{}] in {:.1}s",
                        sources.join(", "),
                        answer.elapsed_seconds
                    ))
                ))
            }
        }
    }

    /// Format chunks in document order.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
            OutputFormat::Quiet => Ok(chunks
                .iter()
                .map(|c| c.source_index().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("No chunks.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Chars", "Overlap", "Text"]);
                for chunk in chunks {
                    let chars = if chunk.is_oversized() {
                        format!("{}*", chunk.char_len())
                    } else {
                        chunk.char_len().to_string()
                    };
                    builder.push_record([
                        chunk.source_index().to_string(),
                        chars,
                        chunk.overlap().to_string(),
                        one_line(chunk.text(), CELL_PREVIEW_CHARS),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format chunks ranked against a query.
    pub fn format_ranked(&self, ranked: &[ScoredChunk<'_>]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = ranked
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "sourceIndex": s.chunk.source_index(),
                            "score": s.score,
                            "text": s.chunk.text(),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(ranked
                .iter()
                .map(|s| s.chunk.source_index().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if ranked.is_empty() {
                    return Ok(self.colorize("No chunk matches the query.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Score", "Text"]);
                for scored in ranked {
                    builder.push_record([
                        scored.chunk.source_index().to_string(),
                        scored.score.to_string(),
                        one_line(scored.chunk.text(), CELL_PREVIEW_CHARS),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a chat log.
    pub fn format_history(&self, history: &[QaEntry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(history)?),
            OutputFormat::Quiet => Ok(history
                .iter()
                .map(|e| e.query.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if history.is_empty() {
                    return Ok(self.colorize("No questions asked yet.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Question", "Answer"]);
                for entry in history {
                    builder.push_record([
                        one_line(&entry.query, CELL_PREVIEW_CHARS),
                        one_line(&entry.answer, CELL_PREVIEW_CHARS),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(CELL_PREVIEW_CHARS)));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Multi-line cell text for a section value
fn section_text(value: &SectionValue) -> String {
    match value {
        SectionValue::Text(text) => text.clone(),
        SectionValue::Mapping(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n"),
        SectionValue::List(items) => items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Collapse whitespace and cut to `max_chars`, marking the cut with "..."
pub fn one_line(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
