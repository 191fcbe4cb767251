//! Document module - ingested files and their question/answer history

use crate::chunk::Chunk;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an ingested document.
///
/// Identifiers are generated by whoever ingests the document; the pipeline
/// never interprets them. `generate` produces a UUIDv7 in simple (hyphenless)
/// hex form, so ids sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use glean_domain::DocumentId;
    ///
    /// let id = DocumentId::generate();
    /// assert_eq!(id.as_str().len(), 32);
    /// ```
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().simple().to_string())
    }

    /// Wrap an externally supplied identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One question asked about a document and the answer it received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaEntry {
    /// The user's question
    pub query: String,

    /// The model's answer
    pub answer: String,

    /// Seconds since the Unix epoch when the answer was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl QaEntry {
    /// Create an entry without a timestamp
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
            timestamp: None,
        }
    }

    /// Attach a timestamp
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// An ingested document.
///
/// Chunks are assigned once at creation and never change. The chat log only
/// grows, one entry at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    filename: String,
    chunks: Vec<Chunk>,
    #[serde(default)]
    chat_log: Vec<QaEntry>,
}

impl Document {
    /// Create a document with an empty chat log
    pub fn new(id: DocumentId, filename: impl Into<String>, chunks: Vec<Chunk>) -> Self {
        Self {
            id,
            filename: filename.into(),
            chunks,
            chat_log: Vec::new(),
        }
    }

    /// Document identifier
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Original file name
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Chunks in document order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Questions and answers in the order they were asked
    pub fn chat_log(&self) -> &[QaEntry] {
        &self.chat_log
    }

    /// Append one entry to the chat log
    pub fn append_chat(&mut self, entry: QaEntry) {
        self.chat_log.push(entry);
    }

    /// Short listing view of this document
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
            chunk_count: self.chunks.len(),
        }
    }
}

/// Listing entry for a registered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Document identifier
    pub id: DocumentId,

    /// Original file name
    pub filename: String,

    /// Number of chunks
    pub chunk_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_ids_sort_chronologically() {
        let a = DocumentId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = DocumentId::generate();
        assert!(a < b);
    }

    #[test]
    fn test_chat_log_appends_in_order() {
        let mut doc = Document::new(DocumentId::new("doc_1"), "nda.pdf", vec![Chunk::new("text", 0)]);
        doc.append_chat(QaEntry::new("q1", "a1"));
        doc.append_chat(QaEntry::new("q2", "a2").at(42));

        assert_eq!(doc.chat_log().len(), 2);
        assert_eq!(doc.chat_log()[0].query, "q1");
        assert_eq!(doc.chat_log()[1].timestamp, Some(42));
        assert_eq!(doc.chunks().len(), 1);
    }

    #[test]
    fn test_summary() {
        let doc = Document::new(
            DocumentId::new("doc_2"),
            "msa.txt",
            vec![Chunk::new("a", 0), Chunk::new("b", 1)],
        );
        let summary = doc.summary();
        assert_eq!(summary.id.as_str(), "doc_2");
        assert_eq!(summary.filename, "msa.txt");
        assert_eq!(summary.chunk_count, 2);
    }

    #[test]
    fn test_qa_entry_omits_missing_timestamp() {
        let json = serde_json::to_string(&QaEntry::new("q", "a")).unwrap();
        assert_eq!(json, r#"{"query":"q","answer":"a"}"#);
    }
}
