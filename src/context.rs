// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value context attached to every record a logger emits.
//!
//! This module provides the two building blocks of logger context:
//!
//! - [`ContextValue`]: a value already rendered to text. Values are converted when they are
//!   added, so a logger never holds a live reference into caller data.
//! - [`ContextStore`]: the thread-safe map owned by each [`Logger`](crate::Logger).
//!
//! Loggers expose the store through `add_context`, `add_contexts`, `delete_context` and
//! `get_all_contexts`; forking a logger deep-copies its store.
//!
//! ```rust
//! use ctxlog::context::{ContextStore, ContextValue};
//!
//! let store = ContextStore::new();
//! store.set_all([("key3", ContextValue::from(3.0)), ("key4", ContextValue::from(true))]);
//!
//! let copy = store.clone();
//! copy.set("key5", "only in the copy");
//!
//! assert_eq!(store.len(), 2);
//! assert_eq!(copy.len(), 3);
//! assert_eq!(store.get("key3").as_deref(), Some("3"));
//! ```

mod store;
mod value;

#[cfg(test)]
mod tests;

pub use store::ContextStore;
pub use value::ContextValue;
