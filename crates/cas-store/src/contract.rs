//! Behaviour every backend must share, run against each one from its tests.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use cas_object::{Object, ObjectId, ObjectType};

use crate::error::StoreError;
use crate::traits::ObjectStore;

pub(crate) const HELLO_ID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

pub(crate) fn hello() -> Object {
    Object::blob(b"hello\n".to_vec())
}

pub(crate) fn known_vector(store: &dyn ObjectStore) {
    let id = store.put(&hello()).unwrap();
    assert_eq!(id.to_hex(), HELLO_ID);

    let got = store.get(&id).unwrap();
    assert_eq!(got, hello());
}

pub(crate) fn roundtrip_all_types(store: &dyn ObjectStore) {
    for kind in ObjectType::ALL {
        let obj = Object::new(kind, format!("{kind} payload\0with nul").into_bytes());
        let id = store.put(&obj).unwrap();
        assert_eq!(id, obj.id());
        assert_eq!(store.get(&id).unwrap(), obj);
    }
}

pub(crate) fn exists_after_put(store: &dyn ObjectStore) {
    let id = store.put(&hello()).unwrap();
    assert!(store.exists(&id).unwrap());
    assert!(!store.exists(&ObjectId::null()).unwrap());
}

pub(crate) fn duplicate_put_is_idempotent(store: &dyn ObjectStore, count: impl Fn() -> usize) {
    let before = count();
    let id1 = store.put(&hello()).unwrap();
    let id2 = store.put(&hello()).unwrap();
    assert_eq!(id1, id2);
    assert_eq!(count(), before + 1);
}

pub(crate) fn get_missing_is_not_found(store: &dyn ObjectStore) {
    match store.get(&ObjectId::null()) {
        Err(StoreError::NotFound(id)) => assert!(id.is_null()),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

pub(crate) fn concurrent_distinct_puts<S>(store: Arc<S>, count: impl Fn(&S) -> usize)
where
    S: ObjectStore + 'static,
{
    const WORKERS: usize = 8;
    const PER_WORKER: usize = 16;

    let handles: Vec<_> = (0..WORKERS)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..PER_WORKER)
                    .map(|i| {
                        let obj = Object::blob(format!("worker {w} object {i}").into_bytes());
                        (store.put(&obj).unwrap(), obj)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for h in handles {
        for (id, obj) in h.join().expect("worker should not panic") {
            assert!(seen.insert(id));
            assert_eq!(store.get(&id).unwrap(), obj);
        }
    }
    assert_eq!(seen.len(), WORKERS * PER_WORKER);
    assert_eq!(count(store.as_ref()), WORKERS * PER_WORKER);
}

pub(crate) fn concurrent_identical_puts<S>(store: Arc<S>, count: impl Fn(&S) -> usize)
where
    S: ObjectStore + 'static,
{
    const WORKERS: usize = 8;

    let before = count(store.as_ref());
    let start = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let store = Arc::clone(&store);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                store.put(&hello()).unwrap()
            })
        })
        .collect();

    for h in handles {
        let id = h.join().expect("worker should not panic");
        assert_eq!(id.to_hex(), HELLO_ID);
    }
    assert_eq!(count(store.as_ref()), before + 1);
    assert_eq!(store.get(&hello().id()).unwrap(), hello());
}

pub(crate) fn flush_removes_everything(store: &dyn ObjectStore, count: impl Fn() -> usize) {
    let a = store.put(&Object::blob(b"a".to_vec())).unwrap();
    store.put(&Object::blob(b"b".to_vec())).unwrap();
    let stored = count();
    assert!(stored >= 2);

    assert_eq!(store.flush().unwrap(), stored);
    assert_eq!(count(), 0);
    assert!(!store.exists(&a).unwrap());
}
