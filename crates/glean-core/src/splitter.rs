//! Recursive text splitting into overlapping chunks
//!
//! Text is first cut into contiguous pieces by trying separators from the
//! largest structural unit (paragraph break) down to single characters. Each
//! separator stays attached to the end of the piece it terminates, so the
//! pieces concatenate back to the input. Pieces are then merged greedily into
//! chunks of at most `chunk_size` characters, each chunk after the first
//! starting with the last `overlap` characters of its predecessor.

use crate::config::{PipelineConfig, DEFAULT_SEPARATORS};
use glean_domain::Chunk;
use tracing::debug;

/// Splits raw text into ordered, overlapping chunks
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

/// A contiguous byte range of the input
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
    oversized: bool,
}

/// Chunk being assembled during the merge
struct Pending {
    start: usize,
    end: usize,
    chars: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Create a splitter with the default separators.
    ///
    /// A `chunk_size` of zero is treated as one, and `overlap` is capped
    /// below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a splitter from pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap).with_separators(config.separators.clone())
    }

    /// Replace the separator list (highest priority first).
    ///
    /// Without a trailing `""` entry, pieces that no separator can reduce are
    /// emitted as oversized chunks instead of being cut mid-unit.
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    /// Split `text` into chunks in document order
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        self.collect_pieces(text, 0, text.len(), &self.separators, &mut pieces);
        let chunks = self.merge(text, &pieces);

        debug!(
            "Split {} chars into {} pieces and {} chunks",
            text.chars().count(),
            pieces.len(),
            chunks.len()
        );
        chunks
    }

    fn collect_pieces(
        &self,
        text: &str,
        start: usize,
        end: usize,
        separators: &[String],
        out: &mut Vec<Piece>,
    ) {
        let span = &text[start..end];
        let chars = span.chars().count();
        if chars <= self.chunk_size {
            out.push(Piece { start, end, chars, oversized: false });
            return;
        }

        let Some(pos) = separators
            .iter()
            .position(|sep| sep.is_empty() || span.contains(sep.as_str()))
        else {
            out.push(Piece { start, end, chars, oversized: true });
            return;
        };

        let separator = separators[pos].as_str();
        if separator.is_empty() {
            self.cut_characters(span, start, out);
            return;
        }

        let remaining = &separators[pos + 1..];
        let mut piece_start = start;
        for (offset, _) in span.match_indices(separator) {
            let piece_end = start + offset + separator.len();
            self.collect_pieces(text, piece_start, piece_end, remaining, out);
            piece_start = piece_end;
        }
        if piece_start < end {
            self.collect_pieces(text, piece_start, end, remaining, out);
        }
    }

    /// Cut `span` into runs short enough to carry the full overlap
    fn cut_characters(&self, span: &str, base: usize, out: &mut Vec<Piece>) {
        let window = self.chunk_size - self.overlap;
        let mut piece_start = 0;
        let mut count = 0;
        for (offset, _) in span.char_indices() {
            if count == window {
                out.push(Piece {
                    start: base + piece_start,
                    end: base + offset,
                    chars: count,
                    oversized: false,
                });
                piece_start = offset;
                count = 0;
            }
            count += 1;
        }
        out.push(Piece {
            start: base + piece_start,
            end: base + span.len(),
            chars: count,
            oversized: false,
        });
    }

    fn merge(&self, text: &str, pieces: &[Piece]) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut pending: Option<Pending> = None;
        // Character length of the last emitted chunk, the overlap source
        let mut previous_chars = 0;

        for piece in pieces {
            if piece.oversized {
                if let Some(done) = pending.take() {
                    previous_chars = done.chars;
                    self.emit(text, done, false, &mut chunks);
                }
                previous_chars = piece.chars;
                self.emit(
                    text,
                    Pending { start: piece.start, end: piece.end, chars: piece.chars, overlap: 0 },
                    true,
                    &mut chunks,
                );
                continue;
            }

            match pending.as_mut() {
                Some(current) if current.chars + piece.chars <= self.chunk_size => {
                    current.end = piece.end;
                    current.chars += piece.chars;
                }
                _ => {
                    if let Some(done) = pending.take() {
                        previous_chars = done.chars;
                        self.emit(text, done, false, &mut chunks);
                    }
                    let overlap = if chunks.is_empty() {
                        0
                    } else {
                        self.overlap
                            .min(self.chunk_size - piece.chars)
                            .min(previous_chars)
                    };
                    pending = Some(Pending {
                        start: back_chars(text, piece.start, overlap),
                        end: piece.end,
                        chars: overlap + piece.chars,
                        overlap,
                    });
                }
            }
        }

        if let Some(done) = pending.take() {
            self.emit(text, done, false, &mut chunks);
        }
        chunks
    }

    fn emit(&self, text: &str, pending: Pending, oversized: bool, chunks: &mut Vec<Chunk>) {
        let chunk = Chunk::new(&text[pending.start..pending.end], chunks.len())
            .with_overlap(pending.overlap);
        chunks.push(if oversized { chunk.mark_oversized() } else { chunk });
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Byte offset `count` characters before `end`
fn back_chars(text: &str, end: usize, count: usize) -> usize {
    if count == 0 {
        return end;
    }
    text[..end]
        .char_indices()
        .rev()
        .nth(count - 1)
        .map(|(offset, _)| offset)
        .unwrap_or(0)
}
