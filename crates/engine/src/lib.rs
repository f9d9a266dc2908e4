//! Engine facade for FolioDB
//!
//! `Folio` ties the layers together and is what a host talks to:
//! save/read/rollback/rename and their variants, access checks, advisory
//! locks and leases, enumeration, and text search.
//!
//! A save request flows Name Dictionary -> Field Dictionary -> Revision
//! Store -> Attribute Value Store -> Access rule capture inside one
//! transaction; reads flow Revision Store -> Attribute Value Store;
//! access checks go through the resolver independently at any time.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod database;
mod search;

pub use config::FolioConfig;
pub use database::{Folio, Lease, LockStatus, ReadVersion, RevisionInfo, SaveOptions};
pub use search::SearchOptions;
