//! Bucket free-text model output into taxonomy sections

use glean_domain::{Section, SectionValue, Taxonomy};

/// Maps heading-structured model text onto a [`Taxonomy`].
///
/// A line whose normalized form contains a section name switches the current
/// section and is not stored. Following lines are stored according to the
/// section's shape:
///
/// - mapping: `key: value` split on the first colon; a repeated key keeps
///   its first position and takes the later value; lines without a colon
///   are ignored
/// - list: each line appended
/// - text: each line replaces the previous value
///
/// Lines before the first heading are dropped. Mapping never fails.
#[derive(Debug, Clone)]
pub struct TaxonomyMapper {
    headings: Vec<(Section, String)>,
}

impl TaxonomyMapper {
    /// Create a mapper for the fixed section set
    pub fn new() -> Self {
        Self {
            headings: Section::ALL
                .into_iter()
                .map(|section| (section, normalize(&section.name().replace('_', " "))))
                .collect(),
        }
    }

    /// Map raw model text to a taxonomy
    pub fn map(&self, raw: &str) -> Taxonomy {
        let mut taxonomy = Taxonomy::empty();
        let mut current: Option<Section> = None;

        for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(section) = self.heading(line) {
                current = Some(section);
                continue;
            }
            let Some(section) = current else {
                continue;
            };

            match taxonomy.get_mut(section) {
                SectionValue::Mapping(map) => {
                    if let Some((key, value)) = line.split_once(':') {
                        map.insert(key.trim().to_string(), value.trim().to_string());
                    }
                }
                SectionValue::List(items) => items.push(line.to_string()),
                SectionValue::Text(text) => *text = line.to_string(),
            }
        }

        taxonomy
    }

    /// First section, in enumeration order, whose name occurs in `line`
    pub fn heading(&self, line: &str) -> Option<Section> {
        let normalized = normalize(line);
        if normalized.is_empty() {
            return None;
        }
        self.headings
            .iter()
            .find(|(_, name)| normalized.contains(name.as_str()))
            .map(|(section, _)| *section)
    }
}

impl Default for TaxonomyMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Map raw model text to a taxonomy with a default mapper
pub fn map_to_taxonomy(raw: &str) -> Taxonomy {
    TaxonomyMapper::new().map(raw)
}

/// Uppercase, collapse punctuation runs to single spaces and drop the
/// connective "AND", so "Risks & Assumptions" and "risks_assumptions" agree.
fn normalize(text: &str) -> String {
    let upper: String = text
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    upper
        .split_whitespace()
        .filter(|word| *word != "AND")
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidentiality_and_risks() {
        let raw = "CONFIDENTIALITY\nDuration: 5 years\nRISKS & ASSUMPTIONS\nVendor lock-in";
        let taxonomy = map_to_taxonomy(raw);

        let confidentiality = taxonomy.mapping(Section::Confidentiality).unwrap();
        assert_eq!(confidentiality.len(), 1);
        assert_eq!(confidentiality.get("Duration"), Some("5 years"));
        assert_eq!(
            taxonomy.list(Section::RisksAssumptions).unwrap(),
            &["Vendor lock-in".to_string()]
        );
    }

    #[test]
    fn test_text_before_heading_is_dropped() {
        let raw = "Sure, here is the analysis.\nNote: preliminary\nSCOPE\nManaged network services";
        let taxonomy = map_to_taxonomy(raw);

        assert_eq!(taxonomy.text(Section::Scope), Some("Managed network services"));
        for (section, value) in taxonomy.iter() {
            if section != Section::Scope {
                assert!(value.is_empty(), "{} should be empty", section.name());
            }
        }
    }

    #[test]
    fn test_unmapped_text_yields_empty_taxonomy() {
        assert!(map_to_taxonomy("").is_empty());
        assert!(map_to_taxonomy("nothing recognizable\nat all").is_empty());
    }

    #[test]
    fn test_mapping_last_write_wins_and_first_colon_split() {
        let raw = "COMMERCIAL TERMS\nPayment: net 30\nPayment: net 45\nInvoice time: 09:00 UTC\nno colon here";
        let taxonomy = map_to_taxonomy(raw);
        let terms = taxonomy.mapping(Section::CommercialTerms).unwrap();

        assert_eq!(terms.len(), 2);
        assert_eq!(terms.get("Payment"), Some("net 45"));
        assert_eq!(terms.get("Invoice time"), Some("09:00 UTC"));
    }

    #[test]
    fn test_mapping_keeps_model_order() {
        let raw = "ENTITIES AND CONTACTS
Vendor: Acme Ltd
Customer: Globex
Address: 1 Main St";
        let taxonomy = map_to_taxonomy(raw);
        let entities = taxonomy.mapping(Section::EntitiesAndContacts).unwrap();

        assert_eq!(entities.keys().collect::<Vec<_>>(), ["Vendor", "Customer", "Address"]);
    }

    #[test]
    fn test_text_section_keeps_last_line() {
        let raw = "SCOPE\nFirst line\n\nSecond line";
        assert_eq!(map_to_taxonomy(raw).text(Section::Scope), Some("Second line"));
    }

    #[test]
    fn test_list_sections_keep_order() {
        let raw = "### 4. SLA Clauses\n- 99.9% uptime\n- 4h response\n#### Penalty clauses\n- Service credits";
        let taxonomy = map_to_taxonomy(raw);

        assert_eq!(
            taxonomy.list(Section::SlaClauses).unwrap(),
            &["- 99.9% uptime".to_string(), "- 4h response".to_string()]
        );
        assert_eq!(
            taxonomy.list(Section::PenaltyClauses).unwrap(),
            &["- Service credits".to_string()]
        );
    }

    #[test]
    fn test_headings_tolerate_markup_and_connectives() {
        let mapper = TaxonomyMapper::new();
        assert_eq!(mapper.heading("**Entities & Contacts**"), Some(Section::EntitiesAndContacts));
        assert_eq!(mapper.heading("ENTITIES AND CONTACTS"), Some(Section::EntitiesAndContacts));
        assert_eq!(mapper.heading("7. Renewal & Termination Clause"), Some(Section::RenewalTermination));
        assert_eq!(mapper.heading("contract_timeline"), Some(Section::ContractTimeline));
        assert_eq!(mapper.heading("Duration: 5 years"), None);
        assert_eq!(mapper.heading("---"), None);
    }

    #[test]
    fn test_ambiguous_heading_picks_first_in_enumeration_order() {
        let mapper = TaxonomyMapper::new();
        assert_eq!(
            mapper.heading("SCOPE AND CONFIDENTIALITY"),
            Some(Section::Scope)
        );
        assert_eq!(
            mapper.heading("Commercial terms, risks and assumptions"),
            Some(Section::CommercialTerms)
        );
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let raw = "ENTITIES AND CONTACTS\nVendor: Acme Ltd\nCONTRACT TIMELINE\nStart: 2024-01-01\nRISKS & ASSUMPTIONS\nCurrency risk";
        let mapper = TaxonomyMapper::new();
        assert_eq!(mapper.map(raw), mapper.map(raw));
    }
}
