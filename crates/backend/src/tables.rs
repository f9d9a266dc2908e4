//! The table set and its schema-creation seed

use crate::rows::{
    AccessRow, DateTimeRow, FieldRow, LeaseRow, LockRow, NumericRow, RevisionRow, TextRow,
};
use folio_core::{
    catalog, DocKey, FieldCoord, FieldId, NameId, RevTag, RevisionId, Timestamp,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Name table: unique string <-> dense id, additive only
#[derive(Debug, Default)]
pub(crate) struct NameTable {
    pub by_string: HashMap<String, NameId>,
    pub by_id: HashMap<NameId, String>,
    next: u64,
}

impl NameTable {
    /// Insert-if-absent; returns true when a row was created.
    ///
    /// Idempotent on purpose: a duplicate insert caused by a concurrent
    /// resolver is not an error, the final id comes from the re-read.
    pub fn insert_if_absent(&mut self, name: &str) -> bool {
        if self.by_string.contains_key(name) {
            return false;
        }
        self.next += 1;
        let id = NameId(self.next);
        self.by_string.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
        true
    }
}

/// Field table: unique coordinate <-> dense id + permanent value kind
#[derive(Debug, Default)]
pub(crate) struct FieldTable {
    pub by_coord: HashMap<FieldCoord, FieldId>,
    pub rows: HashMap<FieldId, FieldRow>,
    next: u64,
}

impl FieldTable {
    /// Insert-if-absent; the proposed kind only sticks on first creation.
    pub fn insert_if_absent(&mut self, coord: FieldCoord, kind: folio_core::FieldKind) -> bool {
        if self.by_coord.contains_key(&coord) {
            return false;
        }
        self.next += 1;
        let id = FieldId(self.next);
        self.by_coord.insert(coord, id);
        self.rows.insert(id, FieldRow { id, coord, kind });
        true
    }
}

/// Lease table with an expiry index so the sweep is O(expired), not
/// O(total rows)
#[derive(Debug, Default)]
pub(crate) struct LeaseTable {
    pub rows: HashMap<DocKey, LeaseRow>,
    expiry: BTreeMap<Timestamp, HashSet<DocKey>>,
}

impl LeaseTable {
    pub fn put(&mut self, key: DocKey, row: LeaseRow) {
        self.remove(&key);
        self.expiry.entry(row.expires).or_default().insert(key);
        self.rows.insert(key, row);
    }

    pub fn remove(&mut self, key: &DocKey) -> bool {
        match self.rows.remove(key) {
            Some(old) => {
                if let Some(keys) = self.expiry.get_mut(&old.expires) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.expiry.remove(&old.expires);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Delete every lease with `expires <= now`, returning the count
    pub fn remove_expired(&mut self, now: Timestamp) -> usize {
        let expired: Vec<DocKey> = self
            .expiry
            .range(..=now)
            .flat_map(|(_, keys)| keys.iter().copied())
            .collect();
        for key in &expired {
            self.rows.remove(key);
        }
        let stale: Vec<Timestamp> = self.expiry.range(..=now).map(|(ts, _)| *ts).collect();
        for ts in stale {
            self.expiry.remove(&ts);
        }
        expired.len()
    }
}

/// The full table set guarded by the backend's lock
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub names: NameTable,
    pub fields: FieldTable,
    pub revisions: BTreeMap<RevisionId, RevisionRow>,
    pub next_revision: u64,
    pub text: BTreeMap<(RevisionId, FieldId), TextRow>,
    pub numeric: BTreeMap<(RevisionId, FieldId), NumericRow>,
    pub datetime: BTreeMap<(RevisionId, FieldId), DateTimeRow>,
    pub access: Vec<AccessRow>,
    pub locks: HashMap<DocKey, LockRow>,
    pub leases: LeaseTable,
}

impl Tables {
    /// Schema creation: seed the well-known catalogs and the root
    /// sentinel row.
    ///
    /// Catalog order fixes the ids; the sentinel always gets revision
    /// id 1 so `RevisionId::ROOT` holds.
    pub fn seeded() -> Self {
        let mut t = Tables::default();
        for name in catalog::WELL_KNOWN_NAMES {
            t.names.insert_if_absent(name);
        }
        debug_assert_eq!(t.names.by_string[catalog::EMPTY_NAME], NameId::EMPTY);
        for (kind, named, instance, key, value_kind) in catalog::WELL_KNOWN_FIELDS {
            let coord = FieldCoord::new(
                t.names.by_string[*kind],
                *named,
                t.names.by_string[*instance],
                t.names.by_string[*key],
            );
            t.fields.insert_if_absent(coord, *value_kind);
        }
        t.next_revision = 1;
        t.revisions.insert(
            RevisionId::ROOT,
            RevisionRow {
                id: RevisionId::ROOT,
                tag: RevTag::Root,
                container: NameId::EMPTY,
                name: NameId::EMPTY,
                version: 0,
                modified: Timestamp::EPOCH,
                author: NameId::EMPTY,
                comment: NameId::EMPTY,
                supersedes: None,
            },
        );
        t
    }

    /// Allocate the next revision id
    pub fn allocate_revision(&mut self) -> RevisionId {
        self.next_revision += 1;
        RevisionId(self.next_revision)
    }
}
