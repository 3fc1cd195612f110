// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-logger key/value context.

use super::value::ContextValue;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe map from key to rendered value.
///
/// Reads ([`snapshot`](ContextStore::snapshot), [`get`](ContextStore::get)) share a read
/// lock; mutations take the write lock. Cloning produces a deep copy, never a shared map.
///
/// ```
/// use ctxlog::context::ContextStore;
///
/// let store = ContextStore::new();
/// store.set("user", "alice");
/// store.set("attempt", 2);
/// store.delete("user");
///
/// let snapshot = store.snapshot();
/// assert_eq!(snapshot.len(), 1);
/// assert_eq!(snapshot["attempt"], "2");
/// ```
#[derive(Debug, Default)]
pub struct ContextStore {
    entries: RwLock<HashMap<String, String>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a copy of `entries`.
    pub fn from_snapshot(entries: HashMap<String, String>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<ContextValue>) {
        let value = value.into().into_string();
        self.write().insert(key.into(), value);
    }

    /// Stores every pair; later pairs win over earlier pairs with the same key.
    pub fn set_all<I, K, V>(&self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ContextValue>,
    {
        // render before locking so Display impls never run under the lock
        let rendered: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into().into_string()))
            .collect();
        self.write().extend(rendered);
    }

    /// Removes `key`. Absent keys are ignored.
    pub fn delete(&self, key: &str) {
        self.write().remove(key);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    /// An independent copy of the current entries.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clone for ContextStore {
    fn clone(&self) -> Self {
        Self::from_snapshot(self.snapshot())
    }
}

/*
Boilerplate notes for ContextStore:

- Clone: implemented as a deep copy, a store is never shared between loggers
- PartialEq: NOT implemented, comparing live stores races with writers; compare snapshots
- Default: derived, the empty store
*/
