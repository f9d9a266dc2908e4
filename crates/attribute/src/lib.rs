//! Attribute Value Store for FolioDB
//!
//! Decomposes a structured document into typed attribute rows at save
//! time and reconstructs it on read:
//! - `classify`: the explicit ordered value classifier (numeric parse
//!   first, date parse second, numeric precedence when both succeed)
//! - `encode_seq`/`decode_seq`: explicit sub-collection sequence values,
//!   persisted as data so insertion order never depends on row order
//! - `decompose`: write path, grouped bulk inserts per projection
//! - `reconstruct`: read path, replay in duck-type order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
mod decompose;
mod reconstruct;

pub use classify::{classify, decode_seq, encode_seq, parse_date, parse_numeric};
pub use decompose::decompose;
pub use reconstruct::reconstruct;
