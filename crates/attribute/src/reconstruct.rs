//! Read path: typed attribute rows -> structured content

use crate::classify::decode_seq;
use folio_backend::Statements;
use folio_core::{
    DocContent, DuckType, FieldId, NameId, Record, Result, RevisionId, Section,
};
use folio_dictionary::{FieldDictionary, NameDictionary};
use std::collections::HashMap;

/// Rebuild a document's content from the attribute rows of `rev`
///
/// Rows arrive ordered by duck type, so every sequence row replays before
/// any scalar row: the sequence pass establishes each named section's
/// length and per-index instance names, and the scalar pass then fills
/// records located by instance name. Field ids missing from the cache are
/// resolved with one batched dictionary lookup. Sections come back sorted
/// by kind; record order inside a named section is the saved insertion
/// order.
pub fn reconstruct(
    txn: &impl Statements,
    names: &NameDictionary,
    fields: &FieldDictionary,
    rev: RevisionId,
) -> Result<DocContent> {
    let rows = txn.text_rows(rev);

    let field_ids: Vec<FieldId> = rows.iter().map(|(field, _, _)| *field).collect();
    let entries = fields.entries_for(txn, &field_ids)?;

    let mut name_ids: Vec<NameId> = Vec::new();
    for (coord, _) in entries.values() {
        name_ids.push(coord.kind);
        name_ids.push(coord.instance);
        name_ids.push(coord.key);
    }
    let strings = names.names_of(txn, &name_ids)?;

    let mut content = DocContent::new();
    let mut section_of: HashMap<NameId, usize> = HashMap::new();
    let mut record_of: HashMap<(NameId, NameId), usize> = HashMap::new();

    let mut ensure_section = |content: &mut DocContent,
                              section_of: &mut HashMap<NameId, usize>,
                              kind: NameId,
                              named: bool|
     -> usize {
        *section_of.entry(kind).or_insert_with(|| {
            content.sections.push(if named {
                Section::named(strings[&kind].clone())
            } else {
                Section::unnamed(strings[&kind].clone())
            });
            content.sections.len() - 1
        })
    };

    for (field, duck, value) in rows {
        let (coord, _) = entries[&field];
        match duck {
            DuckType::Sequence => {
                let Some(index) = decode_seq(&value) else {
                    continue;
                };
                let s = ensure_section(&mut content, &mut section_of, coord.kind, true);
                let section = &mut content.sections[s];
                if section.records.len() <= index {
                    section.records.resize_with(index + 1, Record::default);
                }
                section.records[index].name = strings[&coord.instance].clone();
                record_of.insert((coord.kind, coord.instance), index);
            }
            _ if coord.named => {
                let s = ensure_section(&mut content, &mut section_of, coord.kind, true);
                let section = &mut content.sections[s];
                let index = match record_of.get(&(coord.kind, coord.instance)) {
                    Some(index) => *index,
                    None => {
                        // Scalar row without its sequence row: tolerated,
                        // the record lands after the sequenced ones.
                        section.records.push(Record::new(strings[&coord.instance].clone()));
                        let index = section.records.len() - 1;
                        record_of.insert((coord.kind, coord.instance), index);
                        index
                    }
                };
                section.records[index].set(strings[&coord.key].clone(), value);
            }
            _ => {
                let s = ensure_section(&mut content, &mut section_of, coord.kind, false);
                let section = &mut content.sections[s];
                if let Some(record) = section.singleton_mut() {
                    record.set(strings[&coord.key].clone(), value);
                }
            }
        }
    }

    content.sections.sort_by(|a, b| a.kind.cmp(&b.kind));
    Ok(content)
}
