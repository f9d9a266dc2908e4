//! Revision Store for FolioDB
//!
//! The per-document state machine over the Revision table:
//!
//! ```text
//! dangling ──(first save)──> latest ──(new save)──> superseded
//!                              ^                        │
//!                              └──────(rollback)────────┘
//! ```
//!
//! Saves and rollbacks move rows between namespaces by bulk retagging
//! (revision row plus its attribute rows) instead of rewriting content;
//! renames touch only the identity columns and deliberately leave
//! history under the pre-rename identity.
//!
//! Every protocol here runs inside the caller's transaction; nothing in
//! this crate opens or commits one.

#![warn(missing_docs)]
#![warn(clippy::all)]

use folio_backend::{RevisionRow, Statements, WriteTxn};
use folio_core::{DocKey, Error, NameId, Result, RevTag, RevisionId, Timestamp};
use tracing::{debug, info};

/// What a save protocol produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The revision row now tagged Latest
    pub revision: RevisionId,
    /// Its version number
    pub version: u32,
    /// The previous Latest row, now Superseded (absent on first save and
    /// on amends)
    pub superseded: Option<RevisionId>,
}

/// Whether a document currently exists (a Latest row is found)
pub fn exists(txn: &impl Statements, key: DocKey) -> bool {
    txn.latest(key).is_some()
}

/// Save a new revision
///
/// Computes the next version (previous + 1, or 1 for a first save; an
/// explicit override wins), inserts the new Latest row, then bulk-retags
/// the previous Latest and its attribute rows to Superseded. A Dangling
/// placeholder for the identity is consumed. The caller decomposes
/// content into the returned revision afterwards, inside the same
/// transaction.
pub fn save_new(
    txn: &mut WriteTxn<'_>,
    key: DocKey,
    author: NameId,
    comment: NameId,
    at: Timestamp,
    explicit_version: Option<u32>,
) -> SaveOutcome {
    if let Some(placeholder) = txn.dangling(key) {
        txn.delete_attribute_rows(placeholder.id);
        txn.delete_revision_row(placeholder.id);
    }
    let previous = txn.latest(key);
    let version =
        explicit_version.unwrap_or_else(|| previous.map(|p| p.version + 1).unwrap_or(1));
    let revision = txn.insert_revision(
        RevTag::Latest,
        key,
        version,
        at,
        author,
        comment,
        previous.map(|p| p.id),
    );
    if let Some(prev) = previous {
        txn.retag_revision(prev.id, RevTag::Superseded);
    }
    debug!(%revision, version, "save");
    SaveOutcome {
        revision,
        version,
        superseded: previous.map(|p| p.id),
    }
}

/// Amend the current revision in place
///
/// No new version: the Latest row keeps its number, its attribute rows
/// are deleted here and the caller re-decomposes content under the same
/// revision id. Author, timestamp and comment refresh. Used for
/// non-substantive corrections that should not add history noise.
pub fn amend(
    txn: &mut WriteTxn<'_>,
    row: RevisionRow,
    author: NameId,
    comment: NameId,
    at: Timestamp,
) -> SaveOutcome {
    txn.delete_attribute_rows(row.id);
    txn.update_revision_meta(row.id, author, at, comment);
    debug!(revision = %row.id, version = row.version, "amend in place");
    SaveOutcome {
        revision: row.id,
        version: row.version,
        superseded: None,
    }
}

/// Roll back to the previous revision
///
/// Fatal when the current version is 1 or no Superseded row exists for
/// this identity (after a rename the history keeps the old identity, so
/// a freshly renamed document has nothing to roll back to under its new
/// name). The promoted row and its attribute rows retag to Latest; the
/// old Latest row and its attribute rows are deleted.
pub fn rollback(txn: &mut WriteTxn<'_>, key: DocKey) -> Result<u32> {
    let Some(current) = txn.latest(key) else {
        let (container, name) = identity_strings(txn, key);
        return Err(Error::DocumentNotFound { container, name });
    };
    let previous = if current.version <= 1 {
        None
    } else {
        txn.superseded_newest(key)
    };
    let Some(previous) = previous else {
        let (container, name) = identity_strings(txn, key);
        return Err(Error::RollbackUnavailable { container, name });
    };
    txn.retag_revision(previous.id, RevTag::Latest);
    txn.delete_attribute_rows(current.id);
    txn.delete_revision_row(current.id);
    info!(
        restored = %previous.id,
        version = previous.version,
        discarded = %current.id,
        "rollback"
    );
    Ok(previous.version)
}

/// Rename or move a document
///
/// Rewrites only the identity columns of the Latest row. Historical
/// Superseded rows keep the old identity: renaming does not rewrite
/// history, old revisions stay associated with the pre-rename identity.
/// Leases on the document are not consulted here; a host wanting the
/// conflict warning checks the lease before calling.
pub fn rename(txn: &mut WriteTxn<'_>, old: DocKey, new: DocKey) -> Result<()> {
    let Some(current) = txn.latest(old) else {
        let (container, name) = identity_strings(txn, old);
        return Err(Error::DocumentNotFound { container, name });
    };
    if txn.latest(new).is_some() {
        let (container, name) = identity_strings(txn, new);
        return Err(Error::InvalidOperation(format!(
            "rename target already exists: {}/{}",
            container, name
        )));
    }
    txn.update_revision_identity(current.id, new);
    info!(revision = %current.id, "rename");
    Ok(())
}

/// Reserve an identity before its first save
///
/// Inserts a Dangling placeholder (version 0, no content) unless the
/// document or a placeholder already exists. The first real save
/// consumes it.
pub fn reserve(txn: &mut WriteTxn<'_>, key: DocKey, at: Timestamp) -> Option<RevisionId> {
    if txn.latest(key).is_some() || txn.dangling(key).is_some() {
        return None;
    }
    let id = txn.insert_revision(
        RevTag::Dangling,
        key,
        0,
        at,
        NameId::EMPTY,
        NameId::EMPTY,
        None,
    );
    debug!(revision = %id, "reserve");
    Some(id)
}

/// Erase a document entirely
///
/// Deletes every revision row of the identity with its attribute rows
/// and access rules, plus any lock or lease. Administrative; there is no
/// undo.
pub fn purge(txn: &mut WriteTxn<'_>, key: DocKey) -> usize {
    let rows = txn.revisions_for(key);
    for row in &rows {
        txn.delete_attribute_rows(row.id);
        txn.delete_access_rules(row.id);
        txn.delete_revision_row(row.id);
    }
    txn.delete_lock_row(key);
    txn.delete_lease(key);
    info!(revisions = rows.len(), "purge");
    rows.len()
}

/// Find the revision to serve for an explicit version request
///
/// Searches Latest and Superseded with `version >= wanted` and returns
/// the closest (smallest) match; Dangling never matches. `None` means
/// not found, including requests above the newest version.
pub fn lookup_version(txn: &impl Statements, key: DocKey, wanted: u32) -> Option<RevisionRow> {
    txn.best_match(key, wanted)
}

fn identity_strings(txn: &impl Statements, key: DocKey) -> (String, String) {
    let container = txn.name_by_id(key.container).unwrap_or_default();
    let name = txn.name_by_id(key.name).unwrap_or_default();
    (container, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_backend::Backend;

    fn key() -> DocKey {
        DocKey::new(NameId(100), NameId(101))
    }

    #[test]
    fn test_versions_are_contiguous_with_single_latest() {
        let backend = Backend::open();
        let mut txn = backend.write();
        for expected in 1..=5u32 {
            let outcome = save_new(
                &mut txn,
                key(),
                NameId::EMPTY,
                NameId::EMPTY,
                Timestamp::from_secs(expected as u64),
                None,
            );
            assert_eq!(outcome.version, expected);
        }
        let all = txn.revisions_for(key());
        let mut versions: Vec<u32> = all.iter().map(|r| r.version).collect();
        versions.sort_unstable();
        assert_eq!(versions, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            all.iter().filter(|r| r.tag == RevTag::Latest).count(),
            1
        );
        txn.commit();
    }

    #[test]
    fn test_explicit_version_override() {
        let backend = Backend::open();
        let mut txn = backend.write();
        let outcome = save_new(
            &mut txn,
            key(),
            NameId::EMPTY,
            NameId::EMPTY,
            Timestamp::EPOCH,
            Some(7),
        );
        assert_eq!(outcome.version, 7);
        txn.commit();
    }

    #[test]
    fn test_amend_keeps_version() {
        let backend = Backend::open();
        let mut txn = backend.write();
        save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        let row = txn.latest(key()).unwrap();
        let outcome = amend(&mut txn, row, NameId(9), NameId::EMPTY, Timestamp::from_secs(10));
        assert_eq!(outcome.version, 2);
        let refreshed = txn.latest(key()).unwrap();
        assert_eq!(refreshed.version, 2);
        assert_eq!(refreshed.author, NameId(9));
        txn.commit();
    }

    #[test]
    fn test_rollback_steps_back_exactly_one() {
        let backend = Backend::open();
        let mut txn = backend.write();
        for _ in 0..3 {
            save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        }
        let restored = rollback(&mut txn, key()).unwrap();
        assert_eq!(restored, 2);
        assert_eq!(txn.latest(key()).unwrap().version, 2);
        // The discarded version 3 row is gone, not superseded.
        assert!(txn.revisions_for(key()).iter().all(|r| r.version != 3));
        txn.commit();
    }

    #[test]
    fn test_rollback_at_version_one_is_fatal() {
        let backend = Backend::open();
        let mut txn = backend.write();
        save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        assert!(matches!(
            rollback(&mut txn, key()),
            Err(Error::RollbackUnavailable { .. })
        ));
        txn.commit();
    }

    #[test]
    fn test_rollback_without_document_is_not_found() {
        let backend = Backend::open();
        let mut txn = backend.write();
        assert!(matches!(
            rollback(&mut txn, key()),
            Err(Error::DocumentNotFound { .. })
        ));
        txn.commit();
    }

    #[test]
    fn test_rename_leaves_history_behind() {
        let backend = Backend::open();
        let mut txn = backend.write();
        save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        let new_key = DocKey::new(NameId(100), NameId(200));
        rename(&mut txn, key(), new_key).unwrap();

        assert!(txn.latest(key()).is_none());
        assert_eq!(txn.latest(new_key).unwrap().version, 2);
        // History stayed under the old identity, so the renamed lineage
        // has nothing to roll back to.
        assert!(txn.superseded_newest(key()).is_some());
        assert!(matches!(
            rollback(&mut txn, new_key),
            Err(Error::RollbackUnavailable { .. })
        ));
        txn.commit();
    }

    #[test]
    fn test_rename_onto_existing_target_fails() {
        let backend = Backend::open();
        let mut txn = backend.write();
        let other = DocKey::new(NameId(100), NameId(200));
        save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        save_new(&mut txn, other, NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        assert!(matches!(
            rename(&mut txn, key(), other),
            Err(Error::InvalidOperation(_))
        ));
        txn.commit();
    }

    #[test]
    fn test_reserve_then_first_save_consumes_placeholder() {
        let backend = Backend::open();
        let mut txn = backend.write();
        let placeholder = reserve(&mut txn, key(), Timestamp::EPOCH).unwrap();
        assert!(reserve(&mut txn, key(), Timestamp::EPOCH).is_none());
        assert!(!exists(&txn, key()));

        let outcome = save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        assert_eq!(outcome.version, 1);
        assert!(txn.revisions_for(key()).iter().all(|r| r.id != placeholder));
        txn.commit();
    }

    #[test]
    fn test_lookup_version_closest_at_or_above() {
        let backend = Backend::open();
        let mut txn = backend.write();
        for _ in 0..3 {
            save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        }
        assert_eq!(lookup_version(&txn, key(), 1).unwrap().version, 1);
        assert_eq!(lookup_version(&txn, key(), 3).unwrap().version, 3);
        assert!(lookup_version(&txn, key(), 4).is_none());
        txn.commit();
    }

    #[test]
    fn test_purge_erases_everything() {
        let backend = Backend::open();
        let mut txn = backend.write();
        for _ in 0..2 {
            save_new(&mut txn, key(), NameId::EMPTY, NameId::EMPTY, Timestamp::EPOCH, None);
        }
        txn.try_insert_lock(key(), NameId(5), Timestamp::EPOCH);
        assert_eq!(purge(&mut txn, key()), 2);
        assert!(txn.revisions_for(key()).is_empty());
        assert!(txn.lock(key()).is_none());
        txn.commit();
    }
}
