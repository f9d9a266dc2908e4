//! The Field Dictionary: attribute coordinate -> FieldId + value kind

use dashmap::DashMap;
use folio_backend::{Statements, WriteTxn};
use folio_core::{Error, FieldCoord, FieldId, FieldKind, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// A resolved field: its id and the stored (permanent) value kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEntry {
    /// Field id
    pub id: FieldId,
    /// The value kind recorded at first creation; later proposals lose
    pub kind: FieldKind,
}

/// Interns attribute coordinates, same protocol as the Name Dictionary
///
/// The value-kind classifier rides along on creation only: whatever kind
/// the first writer proposed is what the field keeps. This layer does not
/// check that later writers agree — that is a caller-honored invariant.
#[derive(Debug, Default)]
pub struct FieldDictionary {
    forward: DashMap<FieldCoord, FieldEntry>,
    reverse: DashMap<FieldId, (FieldCoord, FieldKind)>,
}

impl FieldDictionary {
    /// Create an empty dictionary
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn remember(&self, coord: FieldCoord, entry: FieldEntry) {
        self.forward.insert(coord, entry);
        self.reverse.insert(entry.id, (coord, entry.kind));
    }

    /// Resolve coordinates to field entries, creating missing fields with
    /// their proposed kinds
    pub fn resolve(
        &self,
        txn: &mut WriteTxn<'_>,
        wanted: &[(FieldCoord, FieldKind)],
    ) -> Result<HashMap<FieldCoord, FieldEntry>> {
        let mut out = HashMap::with_capacity(wanted.len());
        let mut missing: Vec<(FieldCoord, FieldKind)> = Vec::new();
        let mut seen = HashSet::new();
        for (coord, kind) in wanted {
            if !seen.insert(*coord) {
                continue;
            }
            match self.forward.get(coord) {
                Some(entry) => {
                    out.insert(*coord, *entry);
                }
                None => missing.push((*coord, *kind)),
            }
        }
        if missing.is_empty() {
            return Ok(out);
        }

        // Pass 1: one batched lookup.
        let coords: Vec<FieldCoord> = missing.iter().map(|(c, _)| *c).collect();
        for row in txn.lookup_fields(&coords) {
            let entry = FieldEntry {
                id: row.id,
                kind: row.kind,
            };
            self.remember(row.coord, entry);
            out.insert(row.coord, entry);
        }
        missing.retain(|(c, _)| !out.contains_key(c));

        // Pass 2: idempotent creation; the proposed kind only sticks for
        // the winner of the race.
        for (coord, kind) in &missing {
            let inserted = txn.insert_field_if_absent(*coord, *kind);
            trace!(?coord, inserted, "field insert-if-absent");
        }

        // Pass 3: re-read final ids and stored kinds.
        let coords: Vec<FieldCoord> = missing.iter().map(|(c, _)| *c).collect();
        for row in txn.lookup_fields(&coords) {
            let entry = FieldEntry {
                id: row.id,
                kind: row.kind,
            };
            self.remember(row.coord, entry);
            out.insert(row.coord, entry);
        }
        if let Some((coord, _)) = missing.iter().find(|(c, _)| !out.contains_key(c)) {
            return Err(Error::Backend(format!(
                "field {:?} unresolved after insert",
                coord
            )));
        }
        Ok(out)
    }

    /// Lookup without creating (read paths)
    pub fn lookup_existing(
        &self,
        txn: &impl Statements,
        wanted: &[FieldCoord],
    ) -> HashMap<FieldCoord, FieldEntry> {
        let mut out = HashMap::with_capacity(wanted.len());
        let mut missing: Vec<FieldCoord> = Vec::new();
        for coord in wanted {
            match self.forward.get(coord) {
                Some(entry) => {
                    out.insert(*coord, *entry);
                }
                None => missing.push(*coord),
            }
        }
        for row in txn.lookup_fields(&missing) {
            let entry = FieldEntry {
                id: row.id,
                kind: row.kind,
            };
            self.remember(row.coord, entry);
            out.insert(row.coord, entry);
        }
        out
    }

    /// Reverse lookup of a batch of ids in one backend read
    ///
    /// Reconstruction calls this once per revision for whatever ids its
    /// cache lacks.
    pub fn entries_for(
        &self,
        txn: &impl Statements,
        ids: &[FieldId],
    ) -> Result<HashMap<FieldId, (FieldCoord, FieldKind)>> {
        let mut out = HashMap::with_capacity(ids.len());
        let mut missing: Vec<FieldId> = Vec::new();
        for id in ids {
            match self.reverse.get(id) {
                Some(entry) => {
                    out.insert(*id, *entry);
                }
                None => missing.push(*id),
            }
        }
        for row in txn.fields_by_ids(&missing) {
            self.remember(
                row.coord,
                FieldEntry {
                    id: row.id,
                    kind: row.kind,
                },
            );
            out.insert(row.id, (row.coord, row.kind));
        }
        if let Some(id) = missing.iter().find(|id| !out.contains_key(id)) {
            return Err(Error::UnknownField(*id));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_backend::Backend;
    use folio_core::NameId;

    fn coord(kind: u64, named: bool, instance: u64, key: u64) -> FieldCoord {
        FieldCoord::new(NameId(kind), named, NameId(instance), NameId(key))
    }

    #[test]
    fn test_resolve_creates_then_reuses() {
        let backend = Backend::open();
        let dict = FieldDictionary::new();
        let c = coord(3, true, 1, 8);

        let mut txn = backend.write();
        let first = dict.resolve(&mut txn, &[(c, FieldKind::Opaque)]).unwrap()[&c];
        let second = dict.resolve(&mut txn, &[(c, FieldKind::Opaque)]).unwrap()[&c];
        txn.commit();
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_kind_assignment_is_permanent() {
        let backend = Backend::open();
        let c = coord(3, true, 1, 8);

        let first = FieldDictionary::new();
        let mut txn = backend.write();
        first.resolve(&mut txn, &[(c, FieldKind::Numeric)]).unwrap();
        txn.commit();

        // A later writer proposing a different kind sees the stored one.
        let second = FieldDictionary::new();
        let mut txn = backend.write();
        let entry = second.resolve(&mut txn, &[(c, FieldKind::Date)]).unwrap()[&c];
        txn.commit();
        assert_eq!(entry.kind, FieldKind::Numeric);
    }

    #[test]
    fn test_entries_for_batch_reverse_lookup() {
        let backend = Backend::open();
        let dict = FieldDictionary::new();
        let c1 = coord(3, true, 1, 8);
        let c2 = coord(3, false, 1, 9);

        let mut txn = backend.write();
        let resolved = dict
            .resolve(&mut txn, &[(c1, FieldKind::Opaque), (c2, FieldKind::Date)])
            .unwrap();
        txn.commit();

        let fresh = FieldDictionary::new();
        let read = backend.read();
        let ids: Vec<FieldId> = resolved.values().map(|e| e.id).collect();
        let entries = fresh.entries_for(&read, &ids).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[&resolved[&c2].id].0, c2);
    }

    #[test]
    fn test_unknown_field_id_is_an_error() {
        let backend = Backend::open();
        let dict = FieldDictionary::new();
        let read = backend.read();
        assert!(matches!(
            dict.entries_for(&read, &[FieldId(777)]),
            Err(Error::UnknownField(_))
        ));
    }
}
