//! Row types of the persisted layout

use folio_core::{
    AccessScope, DocKey, DuckType, FieldCoord, FieldId, NameId, Permission, RevTag, RevisionId,
    Timestamp,
};
use serde::{Deserialize, Serialize};

/// A row of the Field table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    /// Field id
    pub id: FieldId,
    /// The unique coordinate
    pub coord: FieldCoord,
    /// Permanent value-kind classifier, fixed at first assignment
    pub kind: folio_core::FieldKind,
}

/// A row of the Revision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRow {
    /// Revision id
    pub id: RevisionId,
    /// Which namespace this row currently lives in
    pub tag: RevTag,
    /// Container name id
    pub container: NameId,
    /// Document name id
    pub name: NameId,
    /// Version number, contiguous from 1 per lineage (0 for placeholders)
    pub version: u32,
    /// Modification timestamp
    pub modified: Timestamp,
    /// Author name id
    pub author: NameId,
    /// Comment name id (`NameId::EMPTY` for none)
    pub comment: NameId,
    /// The revision this one superseded, if any
    pub supersedes: Option<RevisionId>,
}

impl RevisionRow {
    /// The interned identity of this row
    pub fn key(&self) -> DocKey {
        DocKey::new(self.container, self.name)
    }
}

/// A row of the text projection (always written for every value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRow {
    /// Copy of the owning revision's namespace tag
    pub tag: RevTag,
    /// Per-value classification; also the replay sort key
    pub duck: DuckType,
    /// The value, byte-for-byte as supplied (trailing whitespace intact)
    pub value: String,
}

/// A row of the numeric projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRow {
    /// Copy of the owning revision's namespace tag
    pub tag: RevTag,
    /// Parsed numeric value
    pub value: f64,
}

/// A row of the datetime projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeRow {
    /// Copy of the owning revision's namespace tag
    pub tag: RevTag,
    /// Parsed calendar value
    pub value: Timestamp,
}

/// A row of the Access table
///
/// Captured wholesale from a document's own preferences at save time;
/// all rows for a revision are discarded and recreated on every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRow {
    /// Revision the rule was captured from
    pub revision: RevisionId,
    /// Container of that revision at capture time
    pub container: NameId,
    /// Cascade scope the rule applies at
    pub scope: AccessScope,
    /// Deny, allow, or the synthesized remainder-deny
    pub permission: Permission,
    /// Access mode name id (e.g. VIEW, EDIT)
    pub mode: NameId,
    /// Principal name id the rule names
    pub principal: NameId,
}

/// A row of the Lock table; at most one per document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRow {
    /// Holder principal name id
    pub holder: NameId,
    /// When the lock was taken
    pub taken: Timestamp,
}

/// A row of the Lease table; at most one per document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRow {
    /// Holder principal name id
    pub holder: NameId,
    /// When the lease was taken
    pub taken: Timestamp,
    /// When it stops being relevant; the sweep reclaims it after this
    pub expires: Timestamp,
}
