//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]

use foliodb::{DocContent, DocPath, Folio, StaticDirectory};
use std::sync::{Arc, Once};

static INIT_TRACING: Once = Once::new();

/// Initialize logging once for the whole suite
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A fresh store with an empty directory
pub fn folio() -> Folio {
    init_tracing();
    Folio::open(Arc::new(StaticDirectory::new()))
}

/// A fresh store with the given directory
pub fn folio_with(directory: StaticDirectory) -> Folio {
    init_tracing();
    Folio::open(Arc::new(directory))
}

/// Shorthand document path
pub fn path(container: &str, name: &str) -> DocPath {
    DocPath::new(container, name)
}

/// A document with the given body text
pub fn doc(body: &str) -> DocContent {
    DocContent::with_text(body)
}
