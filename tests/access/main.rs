//! Access control integration tests
//!
//! The scope cascade through the facade: site, container and document
//! rules, groups, and denial reasons.

#[path = "../common/mod.rs"]
mod common;

mod cascade;
