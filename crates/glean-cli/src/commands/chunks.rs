//! Chunks command implementation.

use crate::cli::ChunksArgs;
use crate::config::Config;
use crate::error::Result;
use crate::loader::load_document;
use crate::output::Formatter;
use glean_core::{ingest_text, LexicalRanker, PipelineConfig, ScoredChunk};
use glean_domain::{Document, DocumentId};

/// Execute the chunks command.
pub async fn execute_chunks(args: ChunksArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let loaded = load_document(&args.input)?;
    let document = chunk_document(&loaded.filename, &loaded.text, &config.pipeline)?;
    let limit = args.limit.unwrap_or(usize::MAX);

    match args.query {
        Some(query) => {
            let ranked = ranked_chunks(&document, &query, limit);
            println!("{}", formatter.format_ranked(&ranked)?);
        }
        None => {
            let shown = &document.chunks()[..limit.min(document.chunks().len())];
            println!("{}", formatter.format_chunks(shown)?);
        }
    }

    if args.limit.is_some_and(|l| l < document.chunks().len()) {
        eprintln!(
            "{}",
            formatter.info(&format!("{} chunk(s) in total", document.chunks().len()))
        );
    }
    Ok(())
}

/// Chunk `text` without registering it anywhere.
pub fn chunk_document(filename: &str, text: &str, pipeline: &PipelineConfig) -> Result<Document> {
    Ok(ingest_text(DocumentId::generate(), filename, text, pipeline)?)
}

/// Chunks matching `query`, best first; empty when nothing matches.
pub fn ranked_chunks<'a>(document: &'a Document, query: &str, limit: usize) -> Vec<ScoredChunk<'a>> {
    let mut ranked = LexicalRanker::new().score_all(query, document.chunks());
    ranked.truncate(limit);
    ranked
}
