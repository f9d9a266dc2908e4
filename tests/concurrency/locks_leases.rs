//! Advisory locks and leases through the facade

use crate::common::{doc, folio, path};
use foliodb::{Lease, LockStatus, SaveOptions, Timestamp};

#[test]
fn lock_conflict_comes_back_as_data() {
    let folio = folio();
    let p = path("docs", "Page");
    assert_eq!(folio.try_lock(&p, "alice").unwrap(), LockStatus::Acquired);
    match folio.try_lock(&p, "bob").unwrap() {
        LockStatus::Held { holder, .. } => assert_eq!(holder, "alice"),
        LockStatus::Acquired => panic!("lock should be held"),
    }
    // Release and the other party gets it.
    assert!(folio.unlock(&p, "alice").unwrap());
    assert_eq!(folio.try_lock(&p, "bob").unwrap(), LockStatus::Acquired);
}

#[test]
fn unlock_by_a_non_holder_is_refused() {
    let folio = folio();
    let p = path("docs", "Page");
    folio.try_lock(&p, "alice").unwrap();
    assert!(!folio.unlock(&p, "bob").unwrap());
    assert!(!folio.unlock(&path("docs", "Other"), "alice").unwrap());
}

#[test]
fn lease_set_get_clear() {
    let folio = folio();
    let p = path("docs", "Page");
    assert_eq!(folio.lease(&p).unwrap(), None);

    let lease = Lease {
        holder: "alice".to_string(),
        taken: Timestamp::from_secs(100),
        expires: Timestamp::from_secs(400),
    };
    folio.set_lease(&p, Some(lease.clone())).unwrap();
    assert_eq!(folio.lease(&p).unwrap(), Some(lease));

    folio.set_lease(&p, None).unwrap();
    assert_eq!(folio.lease(&p).unwrap(), None);
}

#[test]
fn sweep_reclaims_abandoned_leases_at_expiry() {
    let folio = folio();
    let p = path("docs", "Abandoned");
    let expires = Timestamp::from_secs(1000);
    folio
        .set_lease(
            &p,
            Some(Lease {
                holder: "alice".to_string(),
                taken: Timestamp::from_secs(1),
                expires,
            }),
        )
        .unwrap();

    // Before expiry the lease survives a sweep.
    assert_eq!(folio.sweep_leases(Timestamp::from_secs(999)).unwrap(), 0);
    assert!(folio.lease(&p).unwrap().is_some());

    // At T+1 past expiry it is reclaimed.
    assert_eq!(folio.sweep_leases(Timestamp::from_secs(1001)).unwrap(), 1);
    assert_eq!(folio.lease(&p).unwrap(), None);
}

#[test]
fn leases_do_not_block_saves() {
    let folio = folio();
    let p = path("docs", "Page");
    folio
        .set_lease(
            &p,
            Some(Lease {
                holder: "alice".to_string(),
                taken: Timestamp::from_secs(1),
                expires: Timestamp::from_secs(1000),
            }),
        )
        .unwrap();
    // Advisory only: another author may still save; the host decides
    // whether to warn first.
    let v = folio.save(&p, &doc("x"), "bob", &SaveOptions::new()).unwrap();
    assert_eq!(v, 1);
}
