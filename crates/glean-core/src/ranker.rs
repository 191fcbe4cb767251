//! Keyword-overlap ranking of chunks against a query

use glean_domain::Chunk;
use tracing::debug;

/// A chunk paired with its lexical overlap score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredChunk<'a> {
    /// The scored chunk
    pub chunk: &'a Chunk,
    /// Distinct query tokens found in the chunk
    pub score: usize,
}

/// Ranks chunks by how many distinct query words they contain.
///
/// Matching is lowercase substring containment with whitespace tokenization
/// and no stemming. Ties go to the earlier chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalRanker;

impl LexicalRanker {
    /// Create a ranker
    pub fn new() -> Self {
        Self
    }

    /// Top `top_k` chunks for `query`, best first.
    ///
    /// When the query is empty or nothing matches, returns the first
    /// `top_k` chunks in document order instead.
    pub fn rank<'a>(&self, query: &str, chunks: &'a [Chunk], top_k: usize) -> Vec<&'a Chunk> {
        let scored = self.score_all(query, chunks);
        if scored.is_empty() {
            debug!(
                "No chunk matched query '{}', returning first {} chunks",
                query,
                top_k.min(chunks.len())
            );
            return chunks.iter().take(top_k).collect();
        }
        scored.into_iter().take(top_k).map(|s| s.chunk).collect()
    }

    /// Matching chunks with scores, sorted by score then document order.
    ///
    /// Chunks scoring zero are left out; no fallback is applied.
    pub fn score_all<'a>(&self, query: &str, chunks: &'a [Chunk]) -> Vec<ScoredChunk<'a>> {
        let tokens = query_tokens(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk<'a>> = chunks
            .iter()
            .filter_map(|chunk| {
                let score = score_text(&tokens, chunk.text());
                (score > 0).then_some(ScoredChunk { chunk, score })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.chunk.source_index().cmp(&b.chunk.source_index()))
        });
        scored
    }
}

/// Lowercased, deduplicated whitespace tokens in first-seen order
fn query_tokens(query: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in query.to_lowercase().split_whitespace() {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

fn score_text(tokens: &[String], text: &str) -> usize {
    let text = text.to_lowercase();
    tokens.iter().filter(|t| text.contains(t.as_str())).count()
}
