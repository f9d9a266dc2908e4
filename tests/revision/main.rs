//! Revision lifecycle integration tests
//!
//! Save/read/rollback/rename through the facade, explicit-version
//! lookups, and content round-trips.

#[path = "../common/mod.rs"]
mod common;

mod lifecycle;
mod rename_amend;
mod roundtrip;
