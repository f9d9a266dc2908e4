//! Transaction handles and the typed statement surface
//!
//! `ReadTxn` wraps the shared lock, `WriteTxn` the exclusive lock. Both
//! expose the read statements through the `Statements` trait so protocol
//! code can run its lookups inside either kind of transaction.
//!
//! `WriteTxn::commit` is an explicit checkpoint. There is no automatic
//! rollback: statements apply as they are issued, and a handle dropped
//! without committing only logs the fact. Sequences that must be atomic
//! rely on the exclusive lock being held for the whole request.

use crate::query;
use crate::rows::{
    AccessRow, DateTimeRow, FieldRow, LeaseRow, LockRow, NumericRow, RevisionRow, TextRow,
};
use crate::tables::Tables;
use folio_core::{
    DocKey, DuckType, FieldCoord, FieldId, FieldKind, NameId, RevTag, RevisionId, Timestamp,
};
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

mod sealed {
    use crate::tables::Tables;

    pub trait Sealed {
        fn tables(&self) -> &Tables;
    }
}

/// Read statements available inside any transaction
///
/// Implemented by `ReadTxn` and `WriteTxn` only; each method is one typed
/// query against the table set.
pub trait Statements: sealed::Sealed {
    /// Batch name lookup; absent strings are simply not in the result
    fn lookup_names(&self, wanted: &[&str]) -> Vec<(String, NameId)> {
        query::lookup_names(self.tables(), wanted)
    }

    /// Reverse name lookup
    fn name_by_id(&self, id: NameId) -> Option<String> {
        query::name_by_id(self.tables(), id)
    }

    /// Batch field lookup by coordinate
    fn lookup_fields(&self, wanted: &[FieldCoord]) -> Vec<FieldRow> {
        query::lookup_fields(self.tables(), wanted)
    }

    /// Batch field lookup by id
    fn fields_by_ids(&self, wanted: &[FieldId]) -> Vec<FieldRow> {
        query::fields_by_ids(self.tables(), wanted)
    }

    /// Current visible revision of a document, if it exists
    fn latest(&self, key: DocKey) -> Option<RevisionRow> {
        query::latest(self.tables(), key)
    }

    /// Placeholder row for a reserved identity, if any
    fn dangling(&self, key: DocKey) -> Option<RevisionRow> {
        query::dangling(self.tables(), key)
    }

    /// Newest superseded revision of a lineage (the rollback target)
    fn superseded_newest(&self, key: DocKey) -> Option<RevisionRow> {
        query::superseded_newest(self.tables(), key)
    }

    /// Explicit-version lookup: `version >= wanted`, closest match
    fn best_match(&self, key: DocKey, wanted: u32) -> Option<RevisionRow> {
        query::best_match(self.tables(), key, wanted)
    }

    /// Every revision row of an identity (any namespace but Root)
    fn revisions_for(&self, key: DocKey) -> Vec<RevisionRow> {
        query::revisions_for(self.tables(), key)
    }

    /// Visible documents of a container
    fn latest_in_container(&self, container: NameId) -> Vec<RevisionRow> {
        query::latest_in_container(self.tables(), container)
    }

    /// Distinct containers holding at least one visible document
    fn containers(&self) -> Vec<NameId> {
        query::containers(self.tables())
    }

    /// Text rows of one revision ordered by (duck type, field id)
    fn text_rows(&self, rev: RevisionId) -> Vec<(FieldId, DuckType, String)> {
        query::text_rows(self.tables(), rev)
    }

    /// Numeric projection of one value, if written
    fn numeric_value(&self, rev: RevisionId, field: FieldId) -> Option<f64> {
        query::numeric_value(self.tables(), rev, field)
    }

    /// Datetime projection of one value, if written
    fn datetime_value(&self, rev: RevisionId, field: FieldId) -> Option<Timestamp> {
        query::datetime_value(self.tables(), rev, field)
    }

    /// Access rules captured from one revision
    fn access_rules_for(&self, rev: RevisionId) -> Vec<AccessRow> {
        query::access_rules_for(self.tables(), rev)
    }

    /// Bulk load: document-scope rules of every visible document in a
    /// container
    fn document_rules_in_container(&self, container: NameId) -> Vec<AccessRow> {
        query::document_rules_in_container(self.tables(), container)
    }

    /// Backend-side candidate narrowing for text search
    fn scan_body_text(
        &self,
        container: NameId,
        field: FieldId,
        pred: impl Fn(&str) -> bool,
    ) -> Vec<(NameId, String)> {
        query::scan_body_text(self.tables(), container, field, pred)
    }

    /// Current lock row of a document, if held
    fn lock(&self, key: DocKey) -> Option<LockRow> {
        query::lock(self.tables(), key)
    }

    /// Current lease row of a document, if set
    fn lease(&self, key: DocKey) -> Option<LeaseRow> {
        query::lease(self.tables(), key)
    }
}

/// Read-only transaction (shared lock)
pub struct ReadTxn<'a> {
    guard: RwLockReadGuard<'a, Tables>,
}

impl<'a> ReadTxn<'a> {
    pub(crate) fn new(guard: RwLockReadGuard<'a, Tables>) -> Self {
        Self { guard }
    }
}

impl sealed::Sealed for ReadTxn<'_> {
    fn tables(&self) -> &Tables {
        &self.guard
    }
}

impl Statements for ReadTxn<'_> {}

/// Writing transaction (exclusive lock held until drop)
pub struct WriteTxn<'a> {
    guard: RwLockWriteGuard<'a, Tables>,
    id: u64,
    committed: bool,
}

impl sealed::Sealed for WriteTxn<'_> {
    fn tables(&self) -> &Tables {
        &self.guard
    }
}

impl Statements for WriteTxn<'_> {}

impl<'a> WriteTxn<'a> {
    pub(crate) fn new(guard: RwLockWriteGuard<'a, Tables>, id: u64) -> Self {
        debug!(txn = id, "begin write transaction");
        Self {
            guard,
            id,
            committed: false,
        }
    }

    /// Commit checkpoint: marks the boundary and releases the lock
    pub fn commit(mut self) {
        self.committed = true;
        debug!(txn = self.id, "commit");
    }

    // ======================== Name table ========================

    /// Insert-if-absent; duplicates from concurrent resolvers are not
    /// errors, the final id comes from the re-read pass
    pub fn insert_name_if_absent(&mut self, name: &str) -> bool {
        self.guard.names.insert_if_absent(name)
    }

    // ======================== Field table ========================

    /// Insert-if-absent; the proposed kind sticks only on first creation
    pub fn insert_field_if_absent(&mut self, coord: FieldCoord, kind: FieldKind) -> bool {
        self.guard.fields.insert_if_absent(coord, kind)
    }

    // ======================== Revision table ========================

    /// Insert a new revision row, allocating its id
    #[allow(clippy::too_many_arguments)]
    pub fn insert_revision(
        &mut self,
        tag: RevTag,
        key: DocKey,
        version: u32,
        modified: Timestamp,
        author: NameId,
        comment: NameId,
        supersedes: Option<RevisionId>,
    ) -> RevisionId {
        let id = self.guard.allocate_revision();
        self.guard.revisions.insert(
            id,
            RevisionRow {
                id,
                tag,
                container: key.container,
                name: key.name,
                version,
                modified,
                author,
                comment,
                supersedes,
            },
        );
        id
    }

    /// Bulk retag: flips the revision row AND all its attribute rows in
    /// one statement, leaving the value payloads untouched
    pub fn retag_revision(&mut self, rev: RevisionId, tag: RevTag) {
        if let Some(row) = self.guard.revisions.get_mut(&rev) {
            row.tag = tag;
        }
        let range = (rev, FieldId(0))..=(rev, FieldId(u64::MAX));
        for (_, row) in self.guard.text.range_mut(range.clone()) {
            row.tag = tag;
        }
        for (_, row) in self.guard.numeric.range_mut(range.clone()) {
            row.tag = tag;
        }
        for (_, row) in self.guard.datetime.range_mut(range) {
            row.tag = tag;
        }
    }

    /// Refresh author/timestamp/comment on an existing row (amend path)
    pub fn update_revision_meta(
        &mut self,
        rev: RevisionId,
        author: NameId,
        modified: Timestamp,
        comment: NameId,
    ) {
        if let Some(row) = self.guard.revisions.get_mut(&rev) {
            row.author = author;
            row.modified = modified;
            row.comment = comment;
        }
    }

    /// Rewrite only the identity columns (rename path); history rows are
    /// deliberately left under the old identity
    pub fn update_revision_identity(&mut self, rev: RevisionId, key: DocKey) {
        if let Some(row) = self.guard.revisions.get_mut(&rev) {
            row.container = key.container;
            row.name = key.name;
        }
    }

    /// Delete one revision row (its attribute rows are a separate
    /// statement)
    pub fn delete_revision_row(&mut self, rev: RevisionId) {
        self.guard.revisions.remove(&rev);
    }

    // ======================== Attribute tables ========================

    /// Bulk multi-row insert into the text projection
    pub fn insert_text_rows(
        &mut self,
        rev: RevisionId,
        tag: RevTag,
        rows: Vec<(FieldId, DuckType, String)>,
    ) {
        for (field, duck, value) in rows {
            self.guard
                .text
                .insert((rev, field), TextRow { tag, duck, value });
        }
    }

    /// Bulk multi-row insert into the numeric projection
    pub fn insert_numeric_rows(
        &mut self,
        rev: RevisionId,
        tag: RevTag,
        rows: Vec<(FieldId, f64)>,
    ) {
        for (field, value) in rows {
            self.guard
                .numeric
                .insert((rev, field), NumericRow { tag, value });
        }
    }

    /// Bulk multi-row insert into the datetime projection
    pub fn insert_datetime_rows(
        &mut self,
        rev: RevisionId,
        tag: RevTag,
        rows: Vec<(FieldId, Timestamp)>,
    ) {
        for (field, value) in rows {
            self.guard
                .datetime
                .insert((rev, field), DateTimeRow { tag, value });
        }
    }

    /// Delete every attribute row of one revision across all three
    /// projections
    pub fn delete_attribute_rows(&mut self, rev: RevisionId) {
        let range = (rev, FieldId(0))..=(rev, FieldId(u64::MAX));
        let keys: Vec<_> = self.guard.text.range(range.clone()).map(|(k, _)| *k).collect();
        for k in keys {
            self.guard.text.remove(&k);
        }
        let keys: Vec<_> = self
            .guard
            .numeric
            .range(range.clone())
            .map(|(k, _)| *k)
            .collect();
        for k in keys {
            self.guard.numeric.remove(&k);
        }
        let keys: Vec<_> = self.guard.datetime.range(range).map(|(k, _)| *k).collect();
        for k in keys {
            self.guard.datetime.remove(&k);
        }
    }

    // ======================== Access table ========================

    /// Discard and recreate every rule row of a revision
    pub fn replace_access_rules(&mut self, rev: RevisionId, rules: Vec<AccessRow>) {
        self.guard.access.retain(|r| r.revision != rev);
        self.guard.access.extend(rules);
    }

    /// Discard the rule rows of a revision (purge path)
    pub fn delete_access_rules(&mut self, rev: RevisionId) {
        self.guard.access.retain(|r| r.revision != rev);
    }

    // ======================== Lock / Lease tables ========================

    /// Upsert-style acquire: returns the existing row on conflict, `None`
    /// when the lock was taken
    pub fn try_insert_lock(
        &mut self,
        key: DocKey,
        holder: NameId,
        taken: Timestamp,
    ) -> Option<LockRow> {
        match self.guard.locks.get(&key) {
            Some(existing) => Some(*existing),
            None => {
                self.guard.locks.insert(key, LockRow { holder, taken });
                None
            }
        }
    }

    /// Delete a lock if (and only if) the holder matches
    pub fn delete_lock(&mut self, key: DocKey, holder: NameId) -> bool {
        match self.guard.locks.get(&key) {
            Some(row) if row.holder == holder => {
                self.guard.locks.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Unconditional lock delete (purge path)
    pub fn delete_lock_row(&mut self, key: DocKey) {
        self.guard.locks.remove(&key);
    }

    /// Upsert a lease row
    pub fn put_lease(&mut self, key: DocKey, row: LeaseRow) {
        self.guard.leases.put(key, row);
    }

    /// Delete a lease row
    pub fn delete_lease(&mut self, key: DocKey) -> bool {
        self.guard.leases.remove(&key)
    }

    /// Expiry sweep: delete every lease past its expiry, returning the
    /// count
    pub fn delete_expired_leases(&mut self, now: Timestamp) -> usize {
        self.guard.leases.remove_expired(now)
    }
}

impl Drop for WriteTxn<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // Applied statements stay applied; callers abort by stopping.
            warn!(txn = self.id, "write transaction dropped without commit");
        }
    }
}
