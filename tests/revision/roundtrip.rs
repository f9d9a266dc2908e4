//! Content round-trips through decomposition and reconstruction

use crate::common::{doc, folio, path};
use foliodb::{DocContent, ReadVersion, Record, SaveOptions};

#[test]
fn structured_content_round_trips() {
    let folio = folio();
    let p = path("projects", "Roadmap");

    let mut content = DocContent::with_text("# Roadmap\n\nplain body text\n");
    let attachments = content.ensure_section("ATTACHMENT", true);
    attachments.push(
        Record::new("diagram.png")
            .with("size", "20480")
            .with("uploaded", "2026-08-05"),
    );
    attachments.push(Record::new("notes.txt").with("size", "96"));
    let fields = content.ensure_section("FIELD", true);
    fields.push(Record::new("Priority").with("value", "3"));
    fields.push(Record::new("Owner").with("value", "alice"));
    let content = content.normalized();

    folio.save(&p, &content, "alice", &SaveOptions::new()).unwrap();
    let (rebuilt, _) = folio.read(&p, ReadVersion::Latest).unwrap();
    assert_eq!(rebuilt, content);
}

#[test]
fn numeric_string_round_trips_byte_for_byte() {
    let folio = folio();
    let p = path("projects", "Numbers");

    // Classified numeric, stored with trailing whitespace intact.
    let mut content = DocContent::new();
    content
        .ensure_section("FIELD", true)
        .push(Record::new("total").with("value", "0042.50  "));

    folio.save(&p, &content, "alice", &SaveOptions::new()).unwrap();
    let (rebuilt, _) = folio.read(&p, ReadVersion::Latest).unwrap();
    assert_eq!(
        rebuilt.sections[0].record("total").unwrap().get("value"),
        Some("0042.50  ")
    );
}

#[test]
fn record_order_survives_many_entries() {
    let folio = folio();
    let p = path("projects", "Steps");

    let mut content = DocContent::new();
    let steps = content.ensure_section("STEP", true);
    let names: Vec<String> = (0..25).rev().map(|n| format!("step-{:02}", n)).collect();
    for name in &names {
        steps.push(Record::new(name.clone()));
    }

    folio.save(&p, &content, "alice", &SaveOptions::new()).unwrap();
    let (rebuilt, _) = folio.read(&p, ReadVersion::Latest).unwrap();
    let got: Vec<&str> = rebuilt.sections[0]
        .records
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    let expected: Vec<&str> = names.iter().map(String::as_str).collect();
    assert_eq!(got, expected);
}

#[test]
fn superseded_revisions_keep_their_content() {
    let folio = folio();
    let p = path("projects", "Doc");
    folio
        .save(&p, &doc("original with trailing space \n"), "alice", &SaveOptions::new())
        .unwrap();
    folio.save(&p, &doc("rewritten"), "alice", &SaveOptions::new()).unwrap();

    let (old, _) = folio.read(&p, ReadVersion::Number(1)).unwrap();
    assert_eq!(old.body_text(), Some("original with trailing space \n"));
}
