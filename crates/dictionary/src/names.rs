//! The Name Dictionary: string -> stable NameId

use dashmap::DashMap;
use folio_backend::{Statements, WriteTxn};
use folio_core::{catalog, Error, NameId, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Interns strings to stable integer ids
///
/// Forward and reverse caches live for the process; entries are inserted
/// on successful resolution and never removed. Ids are immutable once
/// assigned, so the caches cannot go stale.
#[derive(Debug, Default)]
pub struct NameDictionary {
    forward: DashMap<String, NameId>,
    reverse: DashMap<NameId, String>,
}

impl NameDictionary {
    /// Create a dictionary with the empty-string mapping prewarmed
    ///
    /// The empty string is a permanently reserved name meaning "no
    /// value"; resolving it never touches the backend.
    pub fn new() -> Arc<Self> {
        let dict = Self::default();
        dict.remember(catalog::EMPTY_NAME.to_string(), NameId::EMPTY);
        Arc::new(dict)
    }

    fn remember(&self, name: String, id: NameId) {
        self.reverse.insert(id, name.clone());
        self.forward.insert(name, id);
    }

    /// Resolve strings to ids, creating ids for previously unseen strings
    ///
    /// Three passes: batch lookup (cache, then one backend query),
    /// insert-if-absent for the remainder, then re-lookup for the final
    /// ids. A duplicate insert racing another process is not an error.
    pub fn resolve(
        &self,
        txn: &mut WriteTxn<'_>,
        wanted: &[&str],
    ) -> Result<HashMap<String, NameId>> {
        let mut out = HashMap::with_capacity(wanted.len());
        let mut missing: Vec<&str> = Vec::new();
        let mut seen = HashSet::new();
        for s in wanted {
            if !seen.insert(*s) {
                continue;
            }
            match self.forward.get(*s) {
                Some(id) => {
                    out.insert(s.to_string(), *id);
                }
                None => missing.push(*s),
            }
        }
        if missing.is_empty() {
            return Ok(out);
        }

        // Pass 1: one batched lookup for everything the cache lacks.
        for (s, id) in txn.lookup_names(&missing) {
            self.remember(s.clone(), id);
            out.insert(s, id);
        }
        missing.retain(|s| !out.contains_key(*s));

        // Pass 2: idempotent inserts for the truly new strings.
        for s in &missing {
            let inserted = txn.insert_name_if_absent(s);
            trace!(name = *s, inserted, "name insert-if-absent");
        }

        // Pass 3: re-read to obtain the final ids, whoever created them.
        for (s, id) in txn.lookup_names(&missing) {
            self.remember(s.clone(), id);
            out.insert(s, id);
        }
        if let Some(s) = missing.iter().find(|s| !out.contains_key(**s)) {
            return Err(Error::Backend(format!(
                "name {:?} unresolved after insert",
                s
            )));
        }
        Ok(out)
    }

    /// Resolve a single string
    pub fn resolve_one(&self, txn: &mut WriteTxn<'_>, name: &str) -> Result<NameId> {
        let map = self.resolve(txn, &[name])?;
        map.get(name)
            .copied()
            .ok_or_else(|| Error::Backend(format!("name {:?} unresolved", name)))
    }

    /// Lookup without creating: absent strings are absent from the result
    pub fn lookup_existing(
        &self,
        txn: &impl Statements,
        wanted: &[&str],
    ) -> HashMap<String, NameId> {
        let mut out = HashMap::with_capacity(wanted.len());
        let mut missing: Vec<&str> = Vec::new();
        for s in wanted {
            match self.forward.get(*s) {
                Some(id) => {
                    out.insert(s.to_string(), *id);
                }
                None => missing.push(*s),
            }
        }
        for (s, id) in txn.lookup_names(&missing) {
            self.remember(s.clone(), id);
            out.insert(s, id);
        }
        out
    }

    /// Reverse lookup of one id
    pub fn name_of(&self, txn: &impl Statements, id: NameId) -> Result<String> {
        if let Some(name) = self.reverse.get(&id) {
            return Ok(name.clone());
        }
        match txn.name_by_id(id) {
            Some(name) => {
                self.remember(name.clone(), id);
                Ok(name)
            }
            None => Err(Error::UnknownName(id)),
        }
    }

    /// Reverse lookup of a batch of ids
    pub fn names_of(
        &self,
        txn: &impl Statements,
        ids: &[NameId],
    ) -> Result<HashMap<NameId, String>> {
        let mut out = HashMap::with_capacity(ids.len());
        for id in ids {
            out.insert(*id, self.name_of(txn, *id)?);
        }
        Ok(out)
    }
}
