//! Chunk module - bounded slices of document text

use serde::{Deserialize, Serialize};

/// A bounded contiguous slice of a document's text.
///
/// Chunks are immutable once created. Each chunk owns a copy of its text; the
/// leading `overlap` characters duplicate the tail of the previous chunk so a
/// query term landing on a boundary is still found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    text: String,
    source_index: usize,
    #[serde(default)]
    overlap: usize,
    #[serde(default)]
    oversized: bool,
}

impl Chunk {
    /// Create a chunk with no overlap prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use glean_domain::Chunk;
    ///
    /// let chunk = Chunk::new("Payment terms: net 30", 0);
    /// assert_eq!(chunk.text(), "Payment terms: net 30");
    /// assert_eq!(chunk.fresh_text(), chunk.text());
    /// ```
    pub fn new(text: impl Into<String>, source_index: usize) -> Self {
        Self {
            text: text.into(),
            source_index,
            overlap: 0,
            oversized: false,
        }
    }

    /// Set how many leading characters were copied from the previous chunk
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Flag this chunk as an atomic unit larger than the configured size
    pub fn mark_oversized(mut self) -> Self {
        self.oversized = true;
        self
    }

    /// Full chunk text, overlap prefix included
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position of this chunk in document order
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Number of leading characters shared with the previous chunk
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// True when the chunk could not be split down to the configured size
    pub fn is_oversized(&self) -> bool {
        self.oversized
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The part of the text this chunk contributes that no earlier chunk did.
    ///
    /// Concatenating `fresh_text()` over all chunks of a document yields the
    /// original text.
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((byte, _)) => &self.text[byte..],
            None if self.overlap == 0 => &self.text,
            None => "",
        }
    }
}
