//! Interning dictionaries for FolioDB
//!
//! Two dictionaries with the same three-pass resolve protocol:
//! - `NameDictionary`: string -> NameId
//! - `FieldDictionary`: attribute coordinate -> FieldId + value kind
//!
//! Resolution is (1) batch lookup against cache and backend, (2)
//! insert-if-absent for whatever is still missing, (3) re-lookup to read
//! the final ids. Duplicate inserts from concurrent resolvers are not
//! errors; the re-read converges every process on one id.
//!
//! Caches are explicit objects with process lifetime, shared behind `Arc`,
//! populated only on successful resolution and never invalidated — names
//! and fields are immutable once assigned, so a cached entry cannot go
//! stale.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fields;
pub mod names;

pub use fields::{FieldDictionary, FieldEntry};
pub use names::NameDictionary;
