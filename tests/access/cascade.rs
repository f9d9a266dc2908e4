//! The scope cascade end to end

use crate::common::{doc, folio, folio_with, path};
use foliodb::{AccessTarget, DocContent, SaveOptions, StaticDirectory};

fn target(container: &str, name: &str) -> AccessTarget {
    AccessTarget::Document(path(container, name))
}

#[test]
fn unconfigured_store_permits_by_default() {
    let folio = folio();
    folio
        .save(&path("docs", "Page"), &doc("x"), "alice", &SaveOptions::new())
        .unwrap();
    let decision = folio
        .check_access("anyone", "VIEW", &target("docs", "Page"))
        .unwrap();
    assert!(decision.permitted);
    assert!(decision.reason.is_none());
}

#[test]
fn empty_document_deny_list_permits_everyone() {
    let folio = folio();
    let mut content = doc("x");
    content.set_preference("DENYDOCVIEW", "");
    folio
        .save(&path("docs", "Open"), &content, "alice", &SaveOptions::new())
        .unwrap();
    assert!(folio
        .check_access("random", "VIEW", &target("docs", "Open"))
        .unwrap()
        .permitted);
}

#[test]
fn container_allow_list_denies_everyone_else() {
    let directory = StaticDirectory::new().with_member("GroupA", "alice");
    let folio = folio_with(directory);

    let mut prefs = DocContent::new();
    prefs.set_preference("ALLOWSPACEVIEW", "GroupA");
    folio
        .save(&path("docs", "Preferences"), &prefs, "admin", &SaveOptions::new())
        .unwrap();
    folio
        .save(&path("docs", "Page"), &doc("x"), "alice", &SaveOptions::new())
        .unwrap();

    assert!(folio
        .check_access("alice", "VIEW", &target("docs", "Page"))
        .unwrap()
        .permitted);

    let denied = folio
        .check_access("bob", "VIEW", &target("docs", "Page"))
        .unwrap();
    assert!(!denied.permitted);
    let reason = denied.reason.unwrap();
    assert!(reason.contains("container-scope"), "reason: {}", reason);
}

#[test]
fn document_deny_beats_container_allow() {
    let directory = StaticDirectory::new().with_member("GroupA", "alice");
    let folio = folio_with(directory);

    let mut prefs = DocContent::new();
    prefs.set_preference("ALLOWSPACEVIEW", "GroupA");
    folio
        .save(&path("docs", "Preferences"), &prefs, "admin", &SaveOptions::new())
        .unwrap();

    let mut page = doc("secret");
    page.set_preference("DENYDOCVIEW", "alice");
    folio
        .save(&path("docs", "Secret"), &page, "admin", &SaveOptions::new())
        .unwrap();

    let denied = folio
        .check_access("alice", "VIEW", &target("docs", "Secret"))
        .unwrap();
    assert!(!denied.permitted);
    assert!(denied.reason.unwrap().contains("document-scope"));
}

#[test]
fn site_rules_apply_before_everything_else() {
    let folio = folio();
    let mut site = DocContent::new();
    site.set_preference("DENYROOTEDIT", "mallory");
    folio
        .save(&path("Site", "Defaults"), &site, "admin", &SaveOptions::new())
        .unwrap();
    folio
        .save(&path("docs", "Page"), &doc("x"), "alice", &SaveOptions::new())
        .unwrap();

    let denied = folio
        .check_access("mallory", "EDIT", &target("docs", "Page"))
        .unwrap();
    assert!(!denied.permitted);
    assert!(denied.reason.unwrap().contains("root-scope"));
    // Root-scope rules also answer bare root-target checks.
    assert!(!folio
        .check_access("mallory", "EDIT", &AccessTarget::Root)
        .unwrap()
        .permitted);
    assert!(folio
        .check_access("alice", "EDIT", &AccessTarget::Root)
        .unwrap()
        .permitted);
}

#[test]
fn administrators_bypass_every_rule() {
    let folio = folio_with(StaticDirectory::new().with_admin("root"));
    let mut page = doc("x");
    page.set_preference("DENYDOCVIEW", "root");
    folio
        .save(&path("docs", "Page"), &page, "admin", &SaveOptions::new())
        .unwrap();
    assert!(folio
        .check_access("root", "VIEW", &target("docs", "Page"))
        .unwrap()
        .permitted);
}

#[test]
fn rules_are_recaptured_wholesale_on_save() {
    let folio = folio();
    let p = path("docs", "Page");
    let mut restricted = doc("x");
    restricted.set_preference("DENYDOCVIEW", "bob");
    folio.save(&p, &restricted, "alice", &SaveOptions::new()).unwrap();
    assert!(!folio
        .check_access("bob", "VIEW", &target("docs", "Page"))
        .unwrap()
        .permitted);

    // Saving without the preference drops the old rule set entirely.
    folio.save(&p, &doc("x"), "alice", &SaveOptions::new()).unwrap();
    assert!(folio
        .check_access("bob", "VIEW", &target("docs", "Page"))
        .unwrap()
        .permitted);
}

#[test]
fn modes_are_independent() {
    let folio = folio();
    let mut page = doc("x");
    page.set_preference("DENYDOCEDIT", "bob");
    folio
        .save(&path("docs", "Page"), &page, "alice", &SaveOptions::new())
        .unwrap();
    assert!(!folio
        .check_access("bob", "EDIT", &target("docs", "Page"))
        .unwrap()
        .permitted);
    assert!(folio
        .check_access("bob", "VIEW", &target("docs", "Page"))
        .unwrap()
        .permitted);
}
