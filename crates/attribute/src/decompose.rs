//! Write path: structured content -> typed attribute rows

use crate::classify::{classify, encode_seq, parse_date, parse_numeric};
use folio_backend::WriteTxn;
use folio_core::{
    catalog, DocContent, DuckType, FieldCoord, FieldId, FieldKind, NameId, Result, RevTag,
    RevisionId, Timestamp,
};
use folio_dictionary::{FieldDictionary, NameDictionary};
use std::borrow::Cow;
use tracing::debug;

struct PlannedRow<'a> {
    coord: FieldCoord,
    duck: DuckType,
    value: Cow<'a, str>,
}

/// Decompose a document's content into attribute rows for `rev`
///
/// Every repeatable (named) section gets explicit sequence rows starting
/// at zero, so insertion order is recoverable from data rather than row
/// order. Every scalar is classified and lands in the text projection
/// always, plus the numeric and/or datetime projections when its parse
/// succeeds. Rows are grouped by (duck type, field id) and written as
/// bulk multi-row inserts, one statement per projection.
pub fn decompose(
    txn: &mut WriteTxn<'_>,
    names: &NameDictionary,
    fields: &FieldDictionary,
    rev: RevisionId,
    tag: RevTag,
    content: &DocContent,
) -> Result<()> {
    // One batched name resolution for every string the coordinates need.
    let mut wanted: Vec<&str> = vec![catalog::SEQ_KEY];
    for section in &content.sections {
        wanted.push(&section.kind);
        for record in &section.records {
            if section.named {
                wanted.push(&record.name);
            }
            for key in record.values.keys() {
                wanted.push(key);
            }
        }
    }
    let ids = names.resolve(txn, &wanted)?;
    let id_of = |s: &str| -> NameId { ids[s] };
    let seq_key = id_of(catalog::SEQ_KEY);

    // Plan rows; each value's classification doubles as the proposed
    // field kind for first-time creation.
    let mut planned: Vec<PlannedRow<'_>> = Vec::new();
    let mut wants: Vec<(FieldCoord, FieldKind)> = Vec::new();
    for section in &content.sections {
        let kind_id = id_of(&section.kind);
        for (index, record) in section.records.iter().enumerate() {
            let instance = if section.named {
                id_of(&record.name)
            } else {
                NameId::EMPTY
            };
            if section.named {
                let coord = FieldCoord::new(kind_id, true, instance, seq_key);
                wants.push((coord, FieldKind::Opaque));
                planned.push(PlannedRow {
                    coord,
                    duck: DuckType::Sequence,
                    value: Cow::Owned(encode_seq(index)),
                });
            }
            for (key, value) in &record.values {
                let coord = FieldCoord::new(kind_id, section.named, instance, id_of(key));
                let duck = classify(value);
                wants.push((coord, FieldKind::for_duck(duck)));
                planned.push(PlannedRow {
                    coord,
                    duck,
                    value: Cow::Borrowed(value),
                });
            }
        }
    }
    let entries = fields.resolve(txn, &wants)?;

    let mut text: Vec<(FieldId, DuckType, String)> = Vec::with_capacity(planned.len());
    let mut numeric: Vec<(FieldId, f64)> = Vec::new();
    let mut datetime: Vec<(FieldId, Timestamp)> = Vec::new();
    for row in planned {
        let field = entries[&row.coord].id;
        if row.duck.is_numeric() {
            if let Some(v) = parse_numeric(&row.value) {
                numeric.push((field, v));
            }
        }
        if row.duck.is_date() {
            if let Some(v) = parse_date(&row.value) {
                datetime.push((field, v));
            }
        }
        text.push((field, row.duck, row.value.into_owned()));
    }

    // Group by (duck type, field id) so each bulk insert is one run.
    text.sort_by_key(|(field, duck, _)| (*duck, *field));
    numeric.sort_by_key(|(field, _)| *field);
    datetime.sort_by_key(|(field, _)| *field);

    debug!(
        %rev,
        text = text.len(),
        numeric = numeric.len(),
        datetime = datetime.len(),
        "decompose"
    );
    txn.insert_text_rows(rev, tag, text);
    txn.insert_numeric_rows(rev, tag, numeric);
    txn.insert_datetime_rows(rev, tag, datetime);
    Ok(())
}
