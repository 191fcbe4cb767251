//! Taxonomy module - the fixed set of contract sections extraction fills in

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A named section of the extraction taxonomy.
///
/// The set is closed. Declaration order is the tie-break order when a heading
/// line matches more than one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Parties, legal names, addresses and contact details
    EntitiesAndContacts,
    /// Effective, expiry and milestone dates
    ContractTimeline,
    /// Purpose, obligations and deliverables
    Scope,
    /// Service levels and response times
    SlaClauses,
    /// Conditions that trigger penalties
    PenaltyClauses,
    /// Confidentiality obligations and their duration
    Confidentiality,
    /// Renewal conditions, termination grounds and notice periods
    RenewalTermination,
    /// Pricing, invoicing and payment terms
    CommercialTerms,
    /// Risks, mitigations and assumptions
    RisksAssumptions,
}

/// The value shape a section holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionShape {
    /// One free-text string
    Text,
    /// Sub-key to value pairs
    Mapping,
    /// Ordered list of strings
    List,
}

impl Section {
    /// Every section, in enumeration order
    pub const ALL: [Section; 9] = [
        Section::EntitiesAndContacts,
        Section::ContractTimeline,
        Section::Scope,
        Section::SlaClauses,
        Section::PenaltyClauses,
        Section::Confidentiality,
        Section::RenewalTermination,
        Section::CommercialTerms,
        Section::RisksAssumptions,
    ];

    /// Snake-case key used in JSON output
    pub fn name(&self) -> &'static str {
        match self {
            Section::EntitiesAndContacts => "entities_and_contacts",
            Section::ContractTimeline => "contract_timeline",
            Section::Scope => "scope",
            Section::SlaClauses => "sla_clauses",
            Section::PenaltyClauses => "penalty_clauses",
            Section::Confidentiality => "confidentiality",
            Section::RenewalTermination => "renewal_termination",
            Section::CommercialTerms => "commercial_terms",
            Section::RisksAssumptions => "risks_assumptions",
        }
    }

    /// Heading text the extraction prompt asks the model to use
    pub fn title(&self) -> &'static str {
        match self {
            Section::EntitiesAndContacts => "ENTITIES AND CONTACTS",
            Section::ContractTimeline => "CONTRACT TIMELINE",
            Section::Scope => "SCOPE",
            Section::SlaClauses => "SLA CLAUSES",
            Section::PenaltyClauses => "PENALTY CLAUSES",
            Section::Confidentiality => "CONFIDENTIALITY",
            Section::RenewalTermination => "RENEWAL & TERMINATION",
            Section::CommercialTerms => "COMMERCIAL TERMS",
            Section::RisksAssumptions => "RISKS & ASSUMPTIONS",
        }
    }

    /// Shape of the value stored under this section
    pub fn shape(&self) -> SectionShape {
        match self {
            Section::Scope => SectionShape::Text,
            Section::SlaClauses | Section::PenaltyClauses | Section::RisksAssumptions => {
                SectionShape::List
            }
            _ => SectionShape::Mapping,
        }
    }

    /// Parse a snake-case section name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Sub-key to value pairs, kept in the order keys were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    /// No fields
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set `key` to `value`. A key already present keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no key is set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys and values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
                let mut fields = Fields::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    fields.insert(key, value);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// Value held by one taxonomy section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionValue {
    /// Free text
    Text(String),
    /// Sub-key to value pairs
    Mapping(Fields),
    /// Ordered entries
    List(Vec<String>),
}

impl SectionValue {
    /// Empty value of the given shape
    pub fn empty(shape: SectionShape) -> Self {
        match shape {
            SectionShape::Text => SectionValue::Text(String::new()),
            SectionShape::Mapping => SectionValue::Mapping(Fields::new()),
            SectionShape::List => SectionValue::List(Vec::new()),
        }
    }

    /// Shape of this value
    pub fn shape(&self) -> SectionShape {
        match self {
            SectionValue::Text(_) => SectionShape::Text,
            SectionValue::Mapping(_) => SectionShape::Mapping,
            SectionValue::List(_) => SectionShape::List,
        }
    }

    /// True when nothing has been stored
    pub fn is_empty(&self) -> bool {
        match self {
            SectionValue::Text(text) => text.is_empty(),
            SectionValue::Mapping(map) => map.is_empty(),
            SectionValue::List(items) => items.is_empty(),
        }
    }
}

/// Structured extraction result: every section, always present.
///
/// Serializes as a JSON object keyed by section name in enumeration order,
/// each value an object, array or string according to the section's shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<Section, SectionValue>")]
pub struct Taxonomy {
    sections: [SectionValue; 9],
}

impl Taxonomy {
    /// A taxonomy with every section empty
    pub fn empty() -> Self {
        Self {
            sections: Section::ALL.map(|s| SectionValue::empty(s.shape())),
        }
    }

    /// Value stored under a section
    pub fn get(&self, section: Section) -> &SectionValue {
        &self.sections[section.index()]
    }

    /// Mutable access to a section's value
    pub fn get_mut(&mut self, section: Section) -> &mut SectionValue {
        &mut self.sections[section.index()]
    }

    /// Free-text value, if the section is a text section
    pub fn text(&self, section: Section) -> Option<&str> {
        match self.get(section) {
            SectionValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Mapping value, if the section is a mapping section
    pub fn mapping(&self, section: Section) -> Option<&Fields> {
        match self.get(section) {
            SectionValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// List value, if the section is a list section
    pub fn list(&self, section: Section) -> Option<&[String]> {
        match self.get(section) {
            SectionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True when no section holds anything
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(SectionValue::is_empty)
    }

    /// Iterate sections with their values in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (Section, &SectionValue)> {
        Section::ALL.into_iter().zip(self.sections.iter())
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for Taxonomy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Section::ALL.len()))?;
        for (section, value) in self.iter() {
            map.serialize_entry(section.name(), value)?;
        }
        map.end()
    }
}

impl TryFrom<BTreeMap<Section, SectionValue>> for Taxonomy {
    type Error = String;

    fn try_from(values: BTreeMap<Section, SectionValue>) -> Result<Self, Self::Error> {
        let mut taxonomy = Taxonomy::empty();
        for (section, value) in values {
            if value.shape() != section.shape() {
                return Err(format!(
                    "section '{}' expects {:?}, got {:?}",
                    section.name(),
                    section.shape(),
                    value.shape()
                ));
            }
            *taxonomy.get_mut(section) = value;
        }
        Ok(taxonomy)
    }
}
