//! Save / read / rollback lifecycle

use crate::common::{doc, folio, path};
use foliodb::{Error, ReadVersion, SaveOptions};

#[test]
fn sequential_saves_number_contiguously() {
    let folio = folio();
    let p = path("projects", "Roadmap");
    for expected in 1..=4u32 {
        let v = folio
            .save(&p, &doc(&format!("body {}", expected)), "alice", &SaveOptions::new())
            .unwrap();
        assert_eq!(v, expected);
    }
    let info = folio.info(&p, ReadVersion::Latest).unwrap();
    assert_eq!(info.version, 4);
}

#[test]
fn save_read_rollback_scenario() {
    let folio = folio();
    let p = path("C", "D");

    folio.save(&p, &doc("v1"), "U1", &SaveOptions::new()).unwrap();
    let (content, is_latest) = folio.read(&p, ReadVersion::Latest).unwrap();
    assert_eq!(content.body_text(), Some("v1"));
    assert!(is_latest);
    assert_eq!(folio.info(&p, ReadVersion::Latest).unwrap().author, "U1");

    folio.save(&p, &doc("v2"), "U2", &SaveOptions::new()).unwrap();
    let (content, is_latest) = folio.read(&p, ReadVersion::Latest).unwrap();
    assert_eq!(content.body_text(), Some("v2"));
    assert!(is_latest);
    assert_eq!(folio.info(&p, ReadVersion::Latest).unwrap().author, "U2");

    // The original payload is still served for an explicit version.
    let (content, is_latest) = folio.read(&p, ReadVersion::Number(1)).unwrap();
    assert_eq!(content.body_text(), Some("v1"));
    assert!(!is_latest);

    let restored = folio.rollback(&p, "U1").unwrap();
    assert_eq!(restored, 1);
    let (content, is_latest) = folio.read(&p, ReadVersion::Latest).unwrap();
    assert_eq!(content.body_text(), Some("v1"));
    assert!(is_latest);
    assert_eq!(folio.info(&p, ReadVersion::Latest).unwrap().author, "U1");
}

#[test]
fn rollback_decreases_by_exactly_one_step() {
    let folio = folio();
    let p = path("projects", "Roadmap");
    for n in 1..=3u32 {
        folio
            .save(&p, &doc(&format!("v{}", n)), "alice", &SaveOptions::new())
            .unwrap();
    }
    assert_eq!(folio.rollback(&p, "alice").unwrap(), 2);
    assert_eq!(folio.rollback(&p, "alice").unwrap(), 1);
    assert!(matches!(
        folio.rollback(&p, "alice"),
        Err(Error::RollbackUnavailable { .. })
    ));
}

#[test]
fn rollback_of_missing_document_is_not_found() {
    let folio = folio();
    assert!(matches!(
        folio.rollback(&path("projects", "Nope"), "alice"),
        Err(Error::DocumentNotFound { .. })
    ));
}

#[test]
fn explicit_version_reads_serve_closest_at_or_above() {
    let folio = folio();
    let p = path("projects", "Roadmap");
    for n in 1..=3u32 {
        folio
            .save(&p, &doc(&format!("v{}", n)), "alice", &SaveOptions::new())
            .unwrap();
    }
    let (content, _) = folio.read(&p, ReadVersion::Number(2)).unwrap();
    assert_eq!(content.body_text(), Some("v2"));
    // Above the newest version nothing matches.
    assert!(matches!(
        folio.read(&p, ReadVersion::Number(9)),
        Err(Error::DocumentNotFound { .. })
    ));
}

#[test]
fn forced_timestamp_is_recorded() {
    let folio = folio();
    let p = path("projects", "Roadmap");
    let at = foliodb::Timestamp::from_secs(1_700_000_000);
    folio
        .save(&p, &doc("x"), "alice", &SaveOptions::new().force_timestamp(at))
        .unwrap();
    assert_eq!(folio.info(&p, ReadVersion::Latest).unwrap().modified, at);
}
