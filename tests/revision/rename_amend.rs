//! Rename and amend-in-place behavior

use crate::common::{doc, folio, path};
use foliodb::{Error, ReadVersion, SaveOptions};

#[test]
fn amend_in_place_keeps_the_version_number() {
    let folio = folio();
    let p = path("projects", "Roadmap");
    folio.save(&p, &doc("draft"), "alice", &SaveOptions::new()).unwrap();
    folio.save(&p, &doc("second"), "alice", &SaveOptions::new()).unwrap();

    let v = folio
        .save(
            &p,
            &doc("second, typo fixed"),
            "bob",
            &SaveOptions::new().amend_in_place(),
        )
        .unwrap();
    assert_eq!(v, 2);

    let info = folio.info(&p, ReadVersion::Latest).unwrap();
    assert_eq!(info.version, 2);
    assert_eq!(info.author, "bob");
    let (content, _) = folio.read(&p, ReadVersion::Latest).unwrap();
    assert_eq!(content.body_text(), Some("second, typo fixed"));

    // History did not grow: version 1 is still the only prior revision.
    let (content, _) = folio.read(&p, ReadVersion::Number(1)).unwrap();
    assert_eq!(content.body_text(), Some("draft"));
}

#[test]
fn amend_on_a_fresh_document_saves_version_one() {
    let folio = folio();
    let p = path("projects", "New");
    let v = folio
        .save(&p, &doc("x"), "alice", &SaveOptions::new().amend_in_place())
        .unwrap();
    assert_eq!(v, 1);
}

#[test]
fn rename_moves_identity_but_not_history() {
    let folio = folio();
    let old = path("projects", "Old");
    let new = path("archive", "New");
    folio.save(&old, &doc("v1"), "alice", &SaveOptions::new()).unwrap();
    folio.save(&old, &doc("v2"), "alice", &SaveOptions::new()).unwrap();

    folio.rename(&old, &new).unwrap();
    assert!(!folio.exists(&old));
    assert!(folio.exists(&new));
    let (content, _) = folio.read(&new, ReadVersion::Latest).unwrap();
    assert_eq!(content.body_text(), Some("v2"));

    // Old revisions stay under the pre-rename identity.
    let (content, is_latest) = folio.read(&old, ReadVersion::Number(1)).unwrap();
    assert_eq!(content.body_text(), Some("v1"));
    assert!(!is_latest);
}

#[test]
fn rename_onto_an_existing_document_fails() {
    let folio = folio();
    let a = path("projects", "A");
    let b = path("projects", "B");
    folio.save(&a, &doc("a"), "alice", &SaveOptions::new()).unwrap();
    folio.save(&b, &doc("b"), "alice", &SaveOptions::new()).unwrap();
    assert!(matches!(
        folio.rename(&a, &b),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn save_continues_numbering_after_rename() {
    let folio = folio();
    let old = path("projects", "Old");
    let new = path("projects", "New");
    folio.save(&old, &doc("v1"), "alice", &SaveOptions::new()).unwrap();
    folio.save(&old, &doc("v2"), "alice", &SaveOptions::new()).unwrap();
    folio.rename(&old, &new).unwrap();
    let v = folio.save(&new, &doc("v3"), "alice", &SaveOptions::new()).unwrap();
    assert_eq!(v, 3);
}
