//! FolioDB: a revisioned structured-document storage core
//!
//! FolioDB persists hierarchical named documents (grouped into
//! containers) with full revision history, using dictionary encoding for
//! names and attribute coordinates, typed projection of scalar values,
//! and a scope-cascading access resolver. It is the storage core beneath
//! a document/wiki-style application; rendering, blob storage and request
//! dispatch live in the host.
//!
//! The [`Folio`] facade is the whole API for most hosts:
//!
//! ```
//! use foliodb::{DocContent, DocPath, Folio, ReadVersion, SaveOptions, StaticDirectory};
//! use std::sync::Arc;
//!
//! # fn demo() -> foliodb::Result<()> {
//! let folio = Folio::open(Arc::new(StaticDirectory::new()));
//! let path = DocPath::new("projects", "Roadmap");
//! folio.save(&path, &DocContent::with_text("v1"), "alice", &SaveOptions::new())?;
//! let (content, is_latest) = folio.read(&path, ReadVersion::Latest)?;
//! assert_eq!(content.body_text(), Some("v1"));
//! assert!(is_latest);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```
//!
//! Layer crates, re-exported here for embedders that need to reach
//! below the facade:
//! - `folio-core`: shared types, classifier tags, error hierarchy
//! - `folio-backend`: typed tables and transaction boundaries
//! - `folio-dictionary`: name/field interning with process-lifetime caches
//! - `folio-revision`, `folio-attribute`, `folio-access`,
//!   `folio-concurrency`: the component protocols
//! - `folio-engine`: the [`Folio`] facade

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use folio_access::{AccessResolver, Directory, ResolverConfig, StaticDirectory};
pub use folio_backend::Backend;
pub use folio_core::{
    AccessDecision, AccessScope, AccessTarget, DocContent, DocKey, DocPath, DuckType, Error,
    FieldCoord, FieldId, FieldKind, NameId, Permission, Record, Result, RevTag, RevisionId,
    Section, Timestamp,
};
pub use folio_dictionary::{FieldDictionary, NameDictionary};
pub use folio_engine::{
    Folio, FolioConfig, Lease, LockStatus, ReadVersion, RevisionInfo, SaveOptions, SearchOptions,
};
