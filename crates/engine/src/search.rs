//! Text search over document bodies
//!
//! The backend narrows candidates with a predicate over the body-text
//! projection of every visible document in the container; the engine then
//! finalizes exact line-level matches. A malformed pattern never fails
//! the request: the backend predicate degrades to match-everything and
//! the line filter falls back to literal substring matching, deferring
//! precision rather than erroring.

use crate::database::Folio;
use folio_core::{catalog, FieldCoord, NameId, Result};
use folio_backend::Statements;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Options for a text search
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Match case exactly; the default folds case
    pub case_sensitive: bool,
}

impl SearchOptions {
    /// Default options: case-insensitive
    pub fn new() -> Self {
        Self::default()
    }

    /// Match case exactly
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }
}

enum LineFilter {
    Pattern(Regex),
    /// Fallback for malformed patterns: literal substring
    Literal { needle: String, fold: bool },
}

impl LineFilter {
    fn matches(&self, line: &str) -> bool {
        match self {
            LineFilter::Pattern(re) => re.is_match(line),
            LineFilter::Literal { needle, fold } => {
                if *fold {
                    line.to_lowercase().contains(needle)
                } else {
                    line.contains(needle)
                }
            }
        }
    }
}

impl Folio {
    /// Search document bodies in a container
    ///
    /// Returns document name -> matching lines, sorted by name. The
    /// pattern is a regular expression; an invalid one degrades to
    /// literal matching instead of failing.
    pub fn text_search(
        &self,
        pattern: &str,
        container: &str,
        options: &SearchOptions,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let txn = self.backend().read();
        let ids = self.names().lookup_existing(&txn, &[container]);
        let Some(container_id) = ids.get(container).copied() else {
            return Ok(BTreeMap::new());
        };
        let Some(body_field) = self.body_field(&txn) else {
            return Ok(BTreeMap::new());
        };

        let wrapped = if options.case_sensitive {
            pattern.to_string()
        } else {
            format!("(?i){}", pattern)
        };
        let filter = match Regex::new(&wrapped) {
            Ok(re) => LineFilter::Pattern(re),
            Err(err) => {
                debug!(pattern, %err, "malformed search pattern, degrading to literal");
                LineFilter::Literal {
                    needle: if options.case_sensitive {
                        pattern.to_string()
                    } else {
                        pattern.to_lowercase()
                    },
                    fold: !options.case_sensitive,
                }
            }
        };

        // Backend-side narrowing; maximally permissive for the fallback.
        let candidates = txn.scan_body_text(container_id, body_field, |body| match &filter {
            LineFilter::Pattern(re) => re.is_match(body),
            LineFilter::Literal { .. } => true,
        });

        let mut out = BTreeMap::new();
        for (name_id, body) in candidates {
            let lines: Vec<String> = body
                .lines()
                .filter(|line| filter.matches(line))
                .map(str::to_string)
                .collect();
            if !lines.is_empty() {
                out.insert(self.names().name_of(&txn, name_id)?, lines);
            }
        }
        Ok(out)
    }

    /// Field id of the body-text coordinate (catalog-seeded)
    fn body_field(&self, txn: &impl Statements) -> Option<folio_core::FieldId> {
        let ids = self
            .names()
            .lookup_existing(txn, &[catalog::TEXT_KIND, catalog::TEXT_KEY]);
        let kind = ids.get(catalog::TEXT_KIND)?;
        let key = ids.get(catalog::TEXT_KEY)?;
        let coord = FieldCoord::new(*kind, false, NameId::EMPTY, *key);
        self.fields()
            .lookup_existing(txn, &[coord])
            .get(&coord)
            .map(|entry| entry.id)
    }
}
