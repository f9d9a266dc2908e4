//! Core types for FolioDB
//!
//! This crate defines the foundational types shared by every layer:
//! - NameId / FieldId / RevisionId: dense interned identifiers
//! - RevTag: revision namespace (Root, Latest, Superseded, Dangling)
//! - DocKey / DocPath: document identity, interned and textual
//! - Timestamp: microsecond-precision time
//! - DocContent / Section / Record: the structured-document representation
//! - FieldKind / DuckType: value classification tags
//! - AccessScope / Permission / AccessDecision: access-control vocabulary
//! - Error: error type hierarchy
//! - catalog: the fixed well-known name and field catalogs

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod catalog;
pub mod content;
pub mod error;
pub mod timestamp;
pub mod types;
pub mod value;

pub use access::{AccessDecision, AccessScope, AccessTarget, Permission};
pub use content::{DocContent, Record, Section};
pub use error::{Error, Result};
pub use timestamp::Timestamp;
pub use types::{DocKey, DocPath, FieldCoord, FieldId, NameId, RevTag, RevisionId};
pub use value::{DuckType, FieldKind};
