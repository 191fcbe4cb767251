//! Prompt templates for extraction, question answering, clauses and summaries

use glean_domain::{Chunk, Section, SectionShape};

/// Marker inserted where a long document was cut for a prompt
pub const TRUNCATION_MARKER: &str = "\n\n[...truncated...]\n\n";

/// Characters reserved at the end of the head when truncating
const HEAD_RESERVE: usize = 1_000;

/// Characters kept from the end of a truncated document
const TAIL_CHARS: usize = 800;

/// A system prompt and a user prompt for one LLM call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Instructions and output format
    pub system: String,
    /// Task input (document context, question, text)
    pub user: String,
}

impl Prompt {
    /// Taxonomy extraction over the given chunks.
    ///
    /// Asks for one heading line per section followed by `key: value`, list
    /// or text lines, which is what `TaxonomyMapper` reads back.
    pub fn extraction(chunks: &[&Chunk]) -> Self {
        let mut system = String::from(EXTRACTION_INSTRUCTIONS);
        system.push_str("\n\nUse exactly these headings, each on its own line, in this order:\n");
        for section in Section::ALL {
            let layout = match section.shape() {
                SectionShape::Text => "one line of free text",
                SectionShape::Mapping => "one `Key: Value` line per detail",
                SectionShape::List => "one line per item",
            };
            system.push_str(&format!("{}\n  ({})\n", section.title(), layout));
        }
        system.push_str(EXTRACTION_FOOTER);

        let mut user = String::from("Document context:\n<context>\n");
        user.push_str(&join_chunks(chunks));
        user.push_str("\n</context>\n\nExtract and categorize all available legal information from the document.");

        Self { system, user }
    }

    /// Question answering over ranked chunks
    pub fn question(chunks: &[&Chunk], query: &str) -> Self {
        let mut user = String::from("Document context:\n<context>\n");
        user.push_str(&join_chunks(chunks));
        user.push_str("\n</context>\n\nQuestion: ");
        user.push_str(query);
        user.push_str("\n\nProvide a clear, concise answer based strictly on the document context.");

        Self {
            system: QA_INSTRUCTIONS.to_string(),
            user,
        }
    }

    /// Clause extraction over the whole document text
    pub fn clauses(text: &str, char_limit: usize) -> Self {
        Self {
            system: CLAUSE_INSTRUCTIONS.to_string(),
            user: format!(
                "Extract clauses from the following contract text. \
                 Use types such as Termination, Indemnity, Confidentiality, Governing Law, etc. \
                 Provide a confidence in [0,1].\n\nTEXT:\n{}",
                truncate_for_prompt(text, char_limit)
            ),
        }
    }

    /// Executive, legal and procurement summaries of the document text
    pub fn summaries(text: &str, char_limit: usize) -> Self {
        Self {
            system: SUMMARY_INSTRUCTIONS.to_string(),
            user: format!(
                "Create three short summaries (<=120 words each) for executive, legal, \
                 and procurement audiences.\n\nTEXT:\n{}",
                truncate_for_prompt(text, char_limit)
            ),
        }
    }
}

/// Shorten `text` to fit a prompt.
///
/// Text longer than `max_chars` keeps its first `max_chars - 1000` and last
/// 800 characters around [`TRUNCATION_MARKER`]. Shorter text is returned
/// unchanged.
pub fn truncate_for_prompt(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(HEAD_RESERVE)).collect();
    let tail: String = text.chars().skip(total.saturating_sub(TAIL_CHARS)).collect();
    format!("{}{}{}", head, TRUNCATION_MARKER, tail)
}

/// Chunk texts joined by blank lines
pub fn join_chunks(chunks: &[&Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text())
        .collect::<Vec<_>>()
        .join("\n\n")
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert legal document analyst. Extract and categorize the key details of the given legal document accurately and completely.
Even if a term is not mentioned verbatim, identify phrases or concepts with the same meaning.

Cover:
- Parties involved: full legal names, addresses, emails and phone numbers
- Contract start date, end date and key milestones (renewal deadlines, review periods)
- Scope: purpose, key obligations, deliverables, exclusions
- Service levels: performance metrics, response times, standards
- Penalties: triggering conditions, monetary or legal consequences, what counts as breach
- Confidentiality obligations, their duration and scope
- Renewal conditions, termination grounds and notice periods
- Payment terms, pricing, invoicing, late payment penalties and refunds
- Risks, mitigations and stated assumptions"#;

const EXTRACTION_FOOTER: &str = r#"
Do not repeat a heading name inside the content lines.
If a section has no relevant information, write "N/A" under its heading."#;

const QA_INSTRUCTIONS: &str =
    "You are a legal document assistant. Provide precise and contextual answers.";

const CLAUSE_INSTRUCTIONS: &str = r#"You are a contracts analyst. Extract clauses and map to a standard taxonomy. Return STRICT JSON with the schema: {"clauses":[{"type":string,"text":string,"confidence":number}]} only."#;

const SUMMARY_INSTRUCTIONS: &str = r#"You produce succinct summaries for different audiences. Return STRICT JSON: {"executive": string, "legal": string, "procurement": string}."#;
