//! Process command implementation.

use crate::cli::ProcessArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::loader::{load_document, LoadedDocument};
use crate::output::Formatter;
use glean_core::ExtractionPipeline;
use glean_domain::{ClauseReport, DocumentId, LlmProvider};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute the process command.
pub async fn execute_process(args: ProcessArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let loaded = load_document(&args.input)?;
    let out_dir = args.out.unwrap_or_else(|| config.output.dir.clone());

    let pipeline = ExtractionPipeline::new(config.provider(), config.pipeline.clone())?;
    let report = run_process(pipeline, loaded).await?;
    let written = write_report(&report, &out_dir)?;

    println!("{}", formatter.format_report(&report, &written)?);
    Ok(())
}

/// Extract clauses and summaries on the blocking pool.
pub async fn run_process<L>(pipeline: ExtractionPipeline<L>, loaded: LoadedDocument) -> Result<ClauseReport>
where
    L: LlmProvider + Send + 'static,
    L::Error: Display,
{
    let document_id = DocumentId::generate();
    let input_file = fs::canonicalize(&loaded.path)
        .unwrap_or_else(|_| loaded.path.clone())
        .display()
        .to_string();

    let report = tokio::task::spawn_blocking(move || {
        pipeline.process(&document_id, &input_file, loaded.kind.as_str(), &loaded.text)
    })
    .await
    .map_err(|e| CliError::Worker(e.to_string()))??;

    Ok(report)
}

/// Write `report` as pretty-printed JSON to `<out_dir>/<documentId>.json`.
pub fn write_report(report: &ClauseReport, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{}.json", report.document_id));
    fs::write(&path, serde_json::to_string_pretty(report)?)?;

    info!(
        document_id = %report.document_id,
        clauses = report.clauses.len(),
        "Wrote {}",
        path.display()
    );
    Ok(path)
}
