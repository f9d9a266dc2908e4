//! Concurrency integration tests
//!
//! Advisory locks and leases through the facade, the lease expiry
//! sweep, and dictionary convergence under concurrent resolvers.

#[path = "../common/mod.rs"]
mod common;

mod dictionary_races;
mod locks_leases;
