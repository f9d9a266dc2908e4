//! Read statements over the table set
//!
//! Shared by both transaction handles; each function is one typed query.

use crate::rows::{AccessRow, FieldRow, LeaseRow, LockRow, RevisionRow};
use crate::tables::Tables;
use folio_core::{
    AccessScope, DocKey, DuckType, FieldCoord, FieldId, NameId, RevTag, RevisionId, Timestamp,
};
use std::collections::BTreeSet;

pub(crate) fn lookup_names(t: &Tables, wanted: &[&str]) -> Vec<(String, NameId)> {
    wanted
        .iter()
        .filter_map(|s| t.names.by_string.get(*s).map(|id| (s.to_string(), *id)))
        .collect()
}

pub(crate) fn name_by_id(t: &Tables, id: NameId) -> Option<String> {
    t.names.by_id.get(&id).cloned()
}

pub(crate) fn lookup_fields(t: &Tables, wanted: &[FieldCoord]) -> Vec<FieldRow> {
    wanted
        .iter()
        .filter_map(|c| t.fields.by_coord.get(c))
        .filter_map(|id| t.fields.rows.get(id))
        .copied()
        .collect()
}

pub(crate) fn fields_by_ids(t: &Tables, wanted: &[FieldId]) -> Vec<FieldRow> {
    wanted
        .iter()
        .filter_map(|id| t.fields.rows.get(id))
        .copied()
        .collect()
}

/// The current visible revision; the Dangling and Root namespaces never
/// match here.
pub(crate) fn latest(t: &Tables, key: DocKey) -> Option<RevisionRow> {
    t.revisions
        .values()
        .find(|r| r.tag == RevTag::Latest && r.key() == key)
        .copied()
}

pub(crate) fn dangling(t: &Tables, key: DocKey) -> Option<RevisionRow> {
    t.revisions
        .values()
        .find(|r| r.tag == RevTag::Dangling && r.key() == key)
        .copied()
}

/// The newest superseded revision of a lineage (rollback target)
pub(crate) fn superseded_newest(t: &Tables, key: DocKey) -> Option<RevisionRow> {
    t.revisions
        .values()
        .filter(|r| r.tag == RevTag::Superseded && r.key() == key)
        .max_by_key(|r| r.version)
        .copied()
}

/// Explicit-version lookup: Latest + Superseded, `version >= wanted`,
/// closest (smallest) match wins.
pub(crate) fn best_match(t: &Tables, key: DocKey, wanted: u32) -> Option<RevisionRow> {
    t.revisions
        .values()
        .filter(|r| matches!(r.tag, RevTag::Latest | RevTag::Superseded))
        .filter(|r| r.key() == key && r.version >= wanted)
        .min_by_key(|r| r.version)
        .copied()
}

pub(crate) fn revisions_for(t: &Tables, key: DocKey) -> Vec<RevisionRow> {
    t.revisions
        .values()
        .filter(|r| r.key() == key && r.tag != RevTag::Root)
        .copied()
        .collect()
}

pub(crate) fn latest_in_container(t: &Tables, container: NameId) -> Vec<RevisionRow> {
    t.revisions
        .values()
        .filter(|r| r.tag == RevTag::Latest && r.container == container)
        .copied()
        .collect()
}

/// Distinct containers holding at least one visible document
pub(crate) fn containers(t: &Tables) -> Vec<NameId> {
    let set: BTreeSet<NameId> = t
        .revisions
        .values()
        .filter(|r| r.tag == RevTag::Latest)
        .map(|r| r.container)
        .collect();
    set.into_iter().collect()
}

/// Text-projection rows of one revision, ordered by (duck type, field id)
/// so sequence rows replay first
pub(crate) fn text_rows(t: &Tables, rev: RevisionId) -> Vec<(FieldId, DuckType, String)> {
    let mut rows: Vec<(FieldId, DuckType, String)> = t
        .text
        .range((rev, FieldId(0))..=(rev, FieldId(u64::MAX)))
        .map(|((_, field), row)| (*field, row.duck, row.value.clone()))
        .collect();
    rows.sort_by_key(|(field, duck, _)| (*duck, *field));
    rows
}

pub(crate) fn numeric_value(t: &Tables, rev: RevisionId, field: FieldId) -> Option<f64> {
    t.numeric.get(&(rev, field)).map(|r| r.value)
}

pub(crate) fn datetime_value(t: &Tables, rev: RevisionId, field: FieldId) -> Option<Timestamp> {
    t.datetime.get(&(rev, field)).map(|r| r.value)
}

pub(crate) fn access_rules_for(t: &Tables, rev: RevisionId) -> Vec<AccessRow> {
    t.access.iter().filter(|r| r.revision == rev).copied().collect()
}

/// Document-scope rules of every visible document in one container, in a
/// single statement (the resolver's bulk load)
pub(crate) fn document_rules_in_container(t: &Tables, container: NameId) -> Vec<AccessRow> {
    t.access
        .iter()
        .filter(|r| r.container == container && r.scope == AccessScope::Document)
        .filter(|r| {
            t.revisions
                .get(&r.revision)
                .is_some_and(|rev| rev.tag == RevTag::Latest)
        })
        .copied()
        .collect()
}

/// Narrow text-search candidates with a backend-side predicate over the
/// body text of every visible document in the container
pub(crate) fn scan_body_text<F>(
    t: &Tables,
    container: NameId,
    field: FieldId,
    pred: F,
) -> Vec<(NameId, String)>
where
    F: Fn(&str) -> bool,
{
    latest_in_container(t, container)
        .into_iter()
        .filter_map(|rev| {
            t.text
                .get(&(rev.id, field))
                .filter(|row| pred(&row.value))
                .map(|row| (rev.name, row.value.clone()))
        })
        .collect()
}

pub(crate) fn lock(t: &Tables, key: DocKey) -> Option<LockRow> {
    t.locks.get(&key).copied()
}

pub(crate) fn lease(t: &Tables, key: DocKey) -> Option<LeaseRow> {
    t.leases.rows.get(&key).copied()
}
