//! Result types produced by the pipeline

use glean_domain::{DocumentId, QaEntry, Taxonomy};
use serde::{Deserialize, Serialize};

/// Result of one taxonomy extraction.
///
/// Re-running extraction produces a fresh payload; payloads are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionPayload {
    /// Document the extraction ran over
    pub document_id: DocumentId,

    /// Model output as received
    pub raw_answer: String,

    /// Sections recovered from the model output
    pub taxonomy: Taxonomy,

    /// Chunks sent to the model
    pub chunks_used: usize,

    /// Wall-clock seconds spent in the model call
    pub elapsed_seconds: f64,
}

/// Answer to one question about a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// The question as asked
    pub query: String,

    /// Model answer
    pub answer: String,

    /// Number of chunks sent as context
    pub relevant_chunks: usize,

    /// `source_index` of each context chunk, in ranked order
    pub sources: Vec<usize>,

    /// Wall-clock seconds spent in the model call
    pub elapsed_seconds: f64,
}

impl Answer {
    /// Chat-log entry for this answer, stamped with `timestamp`
    pub fn to_entry(&self, timestamp: u64) -> QaEntry {
        QaEntry::new(self.query.clone(), self.answer.clone()).at(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_field_names() {
        let payload = ExtractionPayload {
            document_id: DocumentId::new("doc-1"),
            raw_answer: "SCOPE\nWidgets".to_string(),
            taxonomy: Taxonomy::empty(),
            chunks_used: 1,
            elapsed_seconds: 0.5,
        };
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["documentId"], json!("doc-1"));
        assert_eq!(value["rawAnswer"], json!("SCOPE\nWidgets"));
        assert_eq!(value["chunksUsed"], json!(1));
        assert_eq!(value["taxonomy"]["scope"], json!(""));
        assert_eq!(value["taxonomy"]["risks_assumptions"], json!([]));
    }

    #[test]
    fn test_answer_to_entry() {
        let answer = Answer {
            query: "Who pays?".to_string(),
            answer: "The buyer.".to_string(),
            relevant_chunks: 2,
            sources: vec![4, 1],
            elapsed_seconds: 0.1,
        };
        let entry = answer.to_entry(1_700_000_000);
        assert_eq!(entry.query, "Who pays?");
        assert_eq!(entry.answer, "The buyer.");
        assert_eq!(entry.timestamp, Some(1_700_000_000));
    }
}
