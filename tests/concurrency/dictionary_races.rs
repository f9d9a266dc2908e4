//! Dictionary convergence under concurrent resolvers
//!
//! Two resolvers with separate caches racing on the same new string must
//! converge on one id; duplicate inserts are never surfaced as errors.

use foliodb::{Backend, NameDictionary};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_processes_converge_on_one_id() {
    let backend = Backend::open();
    let barrier = Arc::new(Barrier::new(8));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let backend = backend.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            // Separate cache per "process".
            let dict = NameDictionary::new();
            barrier.wait();
            let mut txn = backend.write();
            let id = dict.resolve_one(&mut txn, "hotly-contended").unwrap();
            txn.commit();
            id
        }));
    }
    let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]), "ids diverged: {:?}", ids);
}

#[test]
fn repeated_resolution_is_stable_across_caches() {
    let backend = Backend::open();
    let first = {
        let dict = NameDictionary::new();
        let mut txn = backend.write();
        let id = dict.resolve_one(&mut txn, "stable-name").unwrap();
        txn.commit();
        id
    };
    for _ in 0..3 {
        let dict = NameDictionary::new();
        let mut txn = backend.write();
        let id = dict.resolve_one(&mut txn, "stable-name").unwrap();
        txn.commit();
        assert_eq!(id, first);
    }
}

#[test]
fn mixed_batches_resolve_known_and_new_names_together() {
    let backend = Backend::open();
    let dict = NameDictionary::new();
    let mut txn = backend.write();
    let warmup = dict.resolve_one(&mut txn, "existing").unwrap();
    let batch = dict
        .resolve(&mut txn, &["existing", "brand-new", "another-new"])
        .unwrap();
    txn.commit();
    assert_eq!(batch["existing"], warmup);
    assert_ne!(batch["brand-new"], batch["another-new"]);
}
