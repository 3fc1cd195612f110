// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests for the context module.

use super::{ContextStore, ContextValue};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn test_add_and_delete_context() {
    let store = ContextStore::new();
    store.set("key1", "value1");
    store.set("key2", 2);
    store.set_all([
        ("key3", ContextValue::from(3.0)),
        ("key4", ContextValue::from(true)),
    ]);

    let mut expected: HashMap<String, String> = [
        ("key1", "value1"),
        ("key2", "2"),
        ("key3", "3"),
        ("key4", "true"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(store.snapshot(), expected);

    store.delete("key1");
    expected.remove("key1");
    assert_eq!(store.snapshot(), expected);
}

#[test]
fn test_delete_absent_key_is_noop() {
    let store = ContextStore::new();
    store.set("a", 1);
    store.delete("missing");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_later_write_wins() {
    let store = ContextStore::new();
    store.set("req", "1");
    store.set("req", "2");
    store.set_all([("req", "3"), ("req", "4")]);
    assert_eq!(store.get("req").as_deref(), Some("4"));
}

#[test]
fn test_snapshot_is_independent() {
    let store = ContextStore::new();
    store.set("a", 1);
    let mut snapshot = store.snapshot();
    snapshot.insert("b".to_string(), "2".to_string());
    snapshot.remove("a");

    assert_eq!(store.get("a").as_deref(), Some("1"));
    assert_eq!(store.get("b"), None);
}

#[test]
fn test_clone_is_deep() {
    let original = ContextStore::new();
    original.set("a", 1);
    let copy = original.clone();

    copy.set("b", 2);
    original.set("c", 3);

    assert_eq!(original.get("b"), None);
    assert_eq!(copy.get("c"), None);
    assert_eq!(copy.get("a").as_deref(), Some("1"));
}

#[test]
fn test_concurrent_writers_and_readers() {
    let store = Arc::new(ContextStore::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    store.set(format!("t{t}-{i}"), i);
                    let _ = store.snapshot();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread should not panic");
    }
    assert_eq!(store.len(), 800);
}

#[derive(Debug, Clone)]
enum Op {
    Add(String, i32),
    AddMany(Vec<(String, i32)>),
    Delete(String),
}

fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key(), any::<i32>()).prop_map(|(k, v)| Op::Add(k, v)),
        prop::collection::vec((key(), any::<i32>()), 0..4).prop_map(Op::AddMany),
        key().prop_map(Op::Delete),
    ]
}

proptest! {
    /// The store behaves like a plain map where later writes to a key override earlier ones.
    #[test]
    fn test_store_matches_model(ops in prop::collection::vec(op(), 0..40)) {
        let store = ContextStore::new();
        let mut model: HashMap<String, String> = HashMap::new();
        for op in ops {
            match op {
                Op::Add(k, v) => {
                    store.set(k.clone(), v);
                    model.insert(k, v.to_string());
                }
                Op::AddMany(pairs) => {
                    store.set_all(pairs.clone());
                    for (k, v) in pairs {
                        model.insert(k, v.to_string());
                    }
                }
                Op::Delete(k) => {
                    store.delete(&k);
                    model.remove(&k);
                }
            }
        }
        prop_assert_eq!(store.snapshot(), model);
    }
}
