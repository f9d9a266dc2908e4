//! Advisory lock and lease primitives for FolioDB
//!
//! Both are per-document markers, never enforcement:
//! - a **lock** is a short-lived, non-blocking mutual-exclusion marker;
//!   failure to acquire comes back as data, and callers retry or give up.
//!   There is no wait queue.
//! - a **lease** is a longer-lived editing reservation with an expiry.
//!   Conflict detection and the response to it (warn vs. block) belong to
//!   the caller. Abandoned leases are reclaimed only by the periodic
//!   expiry sweep.
//!
//! This layer never holds more than one lock at a time on behalf of a
//! caller, so no deadlock avoidance is needed.

#![warn(missing_docs)]
#![warn(clippy::all)]

use folio_backend::{LeaseRow, Statements, WriteTxn};
use folio_core::{DocKey, NameId, Timestamp};
use tracing::debug;

/// Result of a lock acquisition attempt
///
/// Advisory data, not an error: `Held` tells the caller who to retry
/// after or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The lock is now held by the requester
    Acquired,
    /// Somebody else got there first
    Held {
        /// Current holder
        holder: NameId,
        /// When they took it
        since: Timestamp,
    },
}

/// Try to take the advisory lock on a document
///
/// Upsert keyed by document identity: at most one row per document.
/// Re-acquiring a lock already held by the same holder refreshes it.
pub fn try_lock(txn: &mut WriteTxn<'_>, key: DocKey, holder: NameId, at: Timestamp) -> LockOutcome {
    match txn.try_insert_lock(key, holder, at) {
        None => {
            debug!(%key, %holder, "lock acquired");
            LockOutcome::Acquired
        }
        Some(existing) if existing.holder == holder => LockOutcome::Acquired,
        Some(existing) => LockOutcome::Held {
            holder: existing.holder,
            since: existing.taken,
        },
    }
}

/// Release a lock; true when a row held by `holder` was deleted
pub fn unlock(txn: &mut WriteTxn<'_>, key: DocKey, holder: NameId) -> bool {
    let released = txn.delete_lock(key, holder);
    if released {
        debug!(%key, %holder, "lock released");
    }
    released
}

/// Current lease on a document, if any
pub fn lease(txn: &impl Statements, key: DocKey) -> Option<LeaseRow> {
    txn.lease(key)
}

/// Set or clear a document's lease
///
/// `Some` upserts the single lease row, `None` deletes it.
pub fn set_lease(txn: &mut WriteTxn<'_>, key: DocKey, lease: Option<LeaseRow>) {
    match lease {
        Some(row) => {
            debug!(%key, holder = %row.holder, "lease set");
            txn.put_lease(key, row);
        }
        None => {
            debug!(%key, "lease cleared");
            txn.delete_lease(key);
        }
    }
}

/// Expiry sweep: delete every lease with `expires <= now`
///
/// Returns the number of reclaimed leases. This is the only path that
/// cleans up after operations that never released their lease.
pub fn sweep_expired(txn: &mut WriteTxn<'_>, now: Timestamp) -> usize {
    let reclaimed = txn.delete_expired_leases(now);
    if reclaimed > 0 {
        debug!(reclaimed, "lease sweep");
    }
    reclaimed
}
