//! Error types for FolioDB
//!
//! One error enum shared by every crate, with `thiserror` providing the
//! `Display` and `Error` implementations. Advisory outcomes (lock held,
//! lease conflict) are NOT errors; they are returned as data by the
//! concurrency layer.

use crate::types::{FieldId, NameId};
use thiserror::Error;

/// Result type alias used throughout FolioDB
pub type Result<T> = std::result::Result<T, Error>;

/// Error hierarchy
///
/// Backend statement failures are fatal defects, not transient conditions;
/// nothing in this core retries them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No revision matched the requested identity/version
    #[error("document not found: {container}/{name}")]
    DocumentNotFound {
        /// Container name
        container: String,
        /// Document name
        name: String,
    },

    /// Rollback requested with nothing to roll back to
    #[error("no prior revision to roll back to for {container}/{name}")]
    RollbackUnavailable {
        /// Container name
        container: String,
        /// Document name
        name: String,
    },

    /// Container or document name missing on a mutating operation
    ///
    /// The original system silently ignored such saves. That behavior is
    /// preserved knowingly as a typed error instead of being silently
    /// "fixed": `legacy_noop` is true exactly where the original would
    /// have dropped the request, so a host can match on it and discard.
    #[error("document or container identity missing")]
    IdentityMissing {
        /// True where the legacy behavior was a silent no-op
        legacy_noop: bool,
    },

    /// An interned name id with no backing row
    #[error("unknown name id: {0}")]
    UnknownName(NameId),

    /// An interned field id with no backing row
    #[error("unknown field id: {0}")]
    UnknownField(FieldId),

    /// A backend statement failed; propagated immediately, never retried
    #[error("backend statement failed: {0}")]
    Backend(String),

    /// Invalid operation or state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}
