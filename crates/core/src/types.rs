//! Identifier and identity types
//!
//! This module defines the interned identifier newtypes and the two faces of
//! a document identity:
//! - NameId: interned string (dense, assigned by the backend, never reused)
//! - FieldId: interned attribute coordinate
//! - RevisionId: revision row identifier
//! - RevTag: which namespace a revision row currently lives in
//! - DocKey: interned identity (container id + document-name id)
//! - DocPath: textual identity as supplied by the host

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned string identifier
///
/// Assigned by the Name table on first reference, dense and additive-only.
/// An id is never renumbered or deleted once handed out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct NameId(pub u64);

impl NameId {
    /// Id of the empty string, reserved at schema creation.
    ///
    /// The empty string is itself a valid name meaning "no value"; it is the
    /// first entry of the well-known catalog and therefore always id 1.
    pub const EMPTY: NameId = NameId(1);

    /// Raw id value
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Interned attribute-coordinate identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Revision row identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RevisionId(pub u64);

impl RevisionId {
    /// The single root sentinel row anchoring the container hierarchy.
    pub const ROOT: RevisionId = RevisionId(1);
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Revision namespace tag
///
/// Every revision row carries exactly one tag; a save or rollback moves rows
/// between namespaces by retagging instead of rewriting them. Attribute rows
/// carry a copy of their owning revision's tag so bulk retagging never has to
/// touch the value payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RevTag {
    /// The single sentinel row anchoring the container hierarchy
    Root = 0,
    /// The current visible revision of a document
    Latest = 1,
    /// A superseded revision, retained for history
    Superseded = 2,
    /// A placeholder with no real content (identity reserved before first save)
    Dangling = 3,
}

impl RevTag {
    /// Byte representation (stable, part of the persisted layout)
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for RevTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RevTag::Root => "root",
            RevTag::Latest => "latest",
            RevTag::Superseded => "superseded",
            RevTag::Dangling => "dangling",
        };
        write!(f, "{}", s)
    }
}

/// Interned document identity: container id + document-name id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocKey {
    /// Container name id
    pub container: NameId,
    /// Document name id
    pub name: NameId,
}

impl DocKey {
    /// Create a key from its two interned parts
    pub fn new(container: NameId, name: NameId) -> Self {
        Self { container, name }
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}

/// Textual document identity as supplied by the host
///
/// Containers form a hierarchy through `/`-separated names
/// (`"projects/alpha"` is a child of `"projects"`). The document name is a
/// single segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocPath {
    /// Container name, possibly `/`-separated
    pub container: String,
    /// Document name
    pub name: String,
}

impl DocPath {
    /// Create a path from container and document names
    pub fn new(container: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            name: name.into(),
        }
    }

    /// Whether both parts are present
    ///
    /// A save against an invalid path is rejected up front; the legacy
    /// behavior of silently ignoring it is preserved as a typed error the
    /// host can match on (see `Error::IdentityMissing`).
    pub fn is_valid(&self) -> bool {
        !self.container.is_empty() && !self.name.is_empty()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}

/// Attribute coordinate: where a scalar value lives inside a document
///
/// The four parts are (entity kind, named-instance flag, instance name or
/// blank, attribute key), all interned through the Name table. The blank
/// instance name is `NameId::EMPTY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldCoord {
    /// Entity kind (section kind), interned
    pub kind: NameId,
    /// Whether the section holds named, repeatable records
    pub named: bool,
    /// Instance name for named sections, `NameId::EMPTY` otherwise
    pub instance: NameId,
    /// Attribute key, interned
    pub key: NameId,
}

impl FieldCoord {
    /// Create a coordinate
    pub fn new(kind: NameId, named: bool, instance: NameId, key: NameId) -> Self {
        Self {
            kind,
            named,
            instance,
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_id_is_one() {
        assert_eq!(NameId::EMPTY.get(), 1);
    }

    #[test]
    fn test_rev_tag_bytes_are_stable() {
        assert_eq!(RevTag::Root.as_byte(), 0);
        assert_eq!(RevTag::Latest.as_byte(), 1);
        assert_eq!(RevTag::Superseded.as_byte(), 2);
        assert_eq!(RevTag::Dangling.as_byte(), 3);
    }

    #[test]
    fn test_doc_path_validity() {
        assert!(DocPath::new("projects", "Roadmap").is_valid());
        assert!(!DocPath::new("", "Roadmap").is_valid());
        assert!(!DocPath::new("projects", "").is_valid());
    }

    #[test]
    fn test_doc_path_display() {
        let path = DocPath::new("projects/alpha", "Roadmap");
        assert_eq!(path.to_string(), "projects/alpha/Roadmap");
    }

    #[test]
    fn test_doc_key_ordering_by_container_then_name() {
        let a = DocKey::new(NameId(2), NameId(9));
        let b = DocKey::new(NameId(3), NameId(1));
        assert!(a < b);
    }
}
