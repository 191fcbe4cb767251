//! Clause module - labeled contract excerpts and the persisted report

use serde::{Deserialize, Deserializer, Serialize};

/// A labeled excerpt of contract text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Clause type (e.g. "Termination", "Indemnity")
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Excerpt text
    #[serde(default)]
    pub text: String,

    /// Model confidence in [0, 1]
    #[serde(default, deserialize_with = "loose_confidence")]
    pub confidence: f64,
}

/// Accept a number or a numeric string; anything else reads as 0
fn loose_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Number(value) => value,
        Loose::Text(text) => text.trim().parse().unwrap_or(0.0),
        Loose::Other(_) => 0.0,
    })
}

impl Clause {
    /// Confidence clamped into [0, 1]; NaN becomes 0
    pub fn clamped_confidence(&self) -> f64 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }
}

/// Summaries written for three audiences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summaries {
    /// Executive summary
    #[serde(default)]
    pub executive: String,

    /// Legal summary
    #[serde(default)]
    pub legal: String,

    /// Procurement summary
    #[serde(default)]
    pub procurement: String,
}

/// Report persisted by the command-line `process` command.
///
/// Field names are part of the on-disk format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseReport {
    /// Generated document identifier
    pub document_id: String,

    /// Path of the processed input file
    pub input_file: String,

    /// Detected document type ("pdf", "txt", ...)
    pub document_type: String,

    /// Extracted clauses
    pub clauses: Vec<Clause>,

    /// Audience summaries
    pub summary: Summaries,
}
