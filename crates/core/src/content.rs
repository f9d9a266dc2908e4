//! Structured-document representation
//!
//! This is the shape the host hands to `save` and receives back from
//! `read`: an ordered list of sections, each holding either a single
//! anonymous record or an ordered list of named records, every value a
//! scalar string.
//!
//! Record order inside a named section is significant and survives the
//! round trip (it is persisted as explicit sequence values, never inferred
//! from row order). Section order is not significant; reconstruction
//! returns sections sorted by kind.

use crate::catalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A keyed record inside a section
///
/// `name` is blank for the single record of an unnamed section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Record {
    /// Instance name, blank for unnamed sections
    pub name: String,
    /// Attribute key -> scalar value
    pub values: BTreeMap<String, String>,
}

impl Record {
    /// Create a named record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Set an attribute, returning `self` for chaining
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set an attribute in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read an attribute
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// An ordered named sub-collection (or an anonymous singleton)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Entity kind, e.g. `"TEXT"`, `"PREFERENCE"`, `"ATTACHMENT"`
    pub kind: String,
    /// Whether records are named and repeatable
    pub named: bool,
    /// Records in insertion order
    pub records: Vec<Record>,
}

impl Section {
    /// Create an empty named section
    pub fn named(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            named: true,
            records: Vec::new(),
        }
    }

    /// Create an unnamed section holding one anonymous record
    pub fn unnamed(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            named: false,
            records: vec![Record::default()],
        }
    }

    /// Append a record (named sections)
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Find a record by instance name
    pub fn record(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.name == name)
    }

    /// The single record of an unnamed section
    pub fn singleton(&self) -> Option<&Record> {
        if self.named {
            None
        } else {
            self.records.first()
        }
    }

    /// The single record of an unnamed section, mutable
    pub fn singleton_mut(&mut self) -> Option<&mut Record> {
        if self.named {
            None
        } else {
            self.records.first_mut()
        }
    }
}

/// A complete structured document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DocContent {
    /// Sections; order is not significant
    pub sections: Vec<Section>,
}

impl DocContent {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document whose body text is `body`
    pub fn with_text(body: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.set_body_text(body);
        doc
    }

    /// Find a section by kind
    pub fn section(&self, kind: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Find a section by kind, mutable
    pub fn section_mut(&mut self, kind: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.kind == kind)
    }

    /// Find or create a section
    pub fn ensure_section(&mut self, kind: &str, named: bool) -> &mut Section {
        if let Some(idx) = self.sections.iter().position(|s| s.kind == kind) {
            return &mut self.sections[idx];
        }
        self.sections.push(if named {
            Section::named(kind)
        } else {
            Section::unnamed(kind)
        });
        self.sections.last_mut().unwrap()
    }

    /// The document body text, if any
    pub fn body_text(&self) -> Option<&str> {
        self.section(catalog::TEXT_KIND)?
            .singleton()?
            .get(catalog::TEXT_KEY)
    }

    /// Set the document body text
    pub fn set_body_text(&mut self, body: impl Into<String>) {
        self.ensure_section(catalog::TEXT_KIND, false)
            .singleton_mut()
            .unwrap()
            .set(catalog::TEXT_KEY, body);
    }

    /// Set a preference entry (used by access rules among others)
    pub fn set_preference(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let section = self.ensure_section(catalog::PREFERENCE_KIND, true);
        let key = key.into();
        if let Some(rec) = section.records.iter_mut().find(|r| r.name == key) {
            rec.set(catalog::VALUE_KEY, value);
        } else {
            section.push(Record::new(key).with(catalog::VALUE_KEY, value));
        }
    }

    /// Normalize section order (sorted by kind) for comparisons
    ///
    /// Reconstruction returns sections in this order; normalizing both
    /// sides makes round-trip equality checks direct.
    pub fn normalized(mut self) -> Self {
        self.sections.sort_by(|a, b| a.kind.cmp(&b.kind));
        self
    }
}
