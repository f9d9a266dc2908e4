//! Access Resolver for FolioDB
//!
//! Two halves:
//! - `rules`: extraction of `(ALLOW|DENY)(ROOT|SPACE|DOC)<MODE>` entries
//!   from a document's own preferences at save time, including the
//!   normalization quirks, and their capture into the Access table.
//! - `resolver`: scope-cascading evaluation (admin bypass, then root,
//!   container, document scopes; first decisive match wins) with
//!   per-scope memoization and a bulk per-container load of
//!   document-scope rules.
//!
//! Group membership comes from the host through the [`Directory`] trait;
//! a principal's effective identity set (itself, its transitive groups,
//! and the implicit everyone-group) is computed once per principal and
//! cached for the resolver's lifetime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod directory;
pub mod resolver;
pub mod rules;

pub use directory::{Directory, StaticDirectory};
pub use resolver::{AccessResolver, ResolverConfig};
pub use rules::capture;
