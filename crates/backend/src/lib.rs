//! Relational backend for FolioDB
//!
//! This crate realizes the persisted layout as typed in-memory tables:
//! - Name table (string unique, id)
//! - Field table (coordinate unique, id, value kind)
//! - Revision table (id, tag, container, name, version, metadata)
//! - Three attribute projections (text, numeric, datetime) keyed by
//!   (revision id, field id)
//! - Access rule table, Lock table, Lease table
//!
//! Statements are typed methods on the transaction handles instead of
//! string-assembled SQL; there is no placeholder bookkeeping anywhere.
//!
//! ## Transaction model
//!
//! One logical transaction per request. `WriteTxn` holds the table-set
//! write lock for its whole lifetime, so writers serialize; statements
//! apply immediately and `commit()` is an explicit checkpoint. Dropping a
//! `WriteTxn` without committing logs a warning but does NOT undo applied
//! statements: the caller must abort explicitly or accept that earlier
//! steps (dictionary inserts in particular, which are idempotent and
//! additive) stay committed.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod query;
pub mod rows;
mod tables;
pub mod txn;

pub use rows::{AccessRow, FieldRow, LeaseRow, LockRow, RevisionRow};
pub use txn::{ReadTxn, Statements, WriteTxn};

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tables::Tables;

/// The backend: the shared table set plus transaction bookkeeping
///
/// Cheap to share via `Arc`; every layer above holds one and opens
/// short-lived `ReadTxn`/`WriteTxn` handles against it.
pub struct Backend {
    tables: RwLock<Tables>,
    next_txn: AtomicU64,
}

impl Backend {
    /// Open a fresh backend with the well-known catalogs seeded and the
    /// root sentinel revision in place
    pub fn open() -> Arc<Self> {
        Arc::new(Self {
            tables: RwLock::new(Tables::seeded()),
            next_txn: AtomicU64::new(1),
        })
    }

    /// Begin a read-only transaction (shared lock)
    pub fn read(&self) -> ReadTxn<'_> {
        ReadTxn::new(self.tables.read())
    }

    /// Begin a writing transaction (exclusive lock, held until drop)
    pub fn write(&self) -> WriteTxn<'_> {
        let id = self.next_txn.fetch_add(1, Ordering::SeqCst);
        WriteTxn::new(self.tables.write(), id)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
