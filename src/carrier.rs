// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-scoped propagation of loggers and trace correlation.
//!
//! A [`Carrier`] is an immutable, parent-linked chain of typed values that is passed down a
//! call chain. Deriving a carrier never changes the original, so a request handler can bind
//! its own logger without affecting its caller.
//!
//! # Binding loggers
//!
//! ```rust
//! use ctxlog::carrier::{Carrier, bind_logger, bind_forked_logger, logger_from_carrier};
//! use ctxlog::{Logger, MemorySink};
//! use std::sync::Arc;
//!
//! let logger = Logger::new(Arc::new(MemorySink::new()));
//! logger.add_context("service", "billing");
//!
//! let request = bind_logger(&Carrier::new(), logger.clone());
//! assert_eq!(logger_from_carrier(&request), logger);
//!
//! // a sub-operation gets its own logger that starts from the caller's context
//! let sub = bind_forked_logger(&request);
//! logger_from_carrier(&sub).add_context("step", "charge");
//! assert!(!logger.get_all_contexts().contains_key("step"));
//! ```
//!
//! # Unbound carriers
//!
//! [`logger_from_carrier`] on a carrier without a logger creates a new logger from the
//! process-wide [`LoggerFactory`](crate::factory::LoggerFactory) and tags it with
//! `type=defaultLoggerFromCtx`. Every such lookup creates a new logger; nothing is cached.

use crate::Logger;
use crate::factory;
use std::any::Any;
use std::fmt::Write;
use std::sync::Arc;

/// Context key under which [`logger_from_carrier`] tags loggers it had to create.
pub const DEFAULT_LOGGER_KEY: &str = "type";
/// Value of [`DEFAULT_LOGGER_KEY`] on created loggers.
pub const DEFAULT_LOGGER_TAG: &str = "defaultLoggerFromCtx";

/// Request-scoped, immutable key/value chain. Values are keyed by their type.
#[derive(Clone, Default)]
pub struct Carrier {
    node: Option<Arc<Node>>,
}

struct Node {
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

impl Carrier {
    /// An empty carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /**
    Derives a carrier that additionally holds `value`.

    A value of the same type further up the chain is shadowed, not replaced.
    */
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Carrier {
        Carrier {
            node: Some(Arc::new(Node {
                value: Arc::new(value),
                parent: self.node.clone(),
            })),
        }
    }

    /// The nearest value of type `T`.
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let mut current = self.node.as_deref();
        while let Some(node) = current {
            if let Some(value) = node.value.downcast_ref::<T>() {
                return Some(value);
            }
            current = node.parent.as_deref();
        }
        None
    }

    /// Derives a carrier holding the active span.
    pub fn with_span(&self, span: SpanContext) -> Carrier {
        self.with_value(span)
    }

    /// The active span, if one is present and valid.
    pub fn span_context(&self) -> Option<SpanContext> {
        self.value::<SpanContext>()
            .copied()
            .filter(SpanContext::is_valid)
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.node.as_deref();
        while let Some(node) = current {
            depth += 1;
            current = node.parent.as_deref();
        }
        depth
    }
}

impl std::fmt::Debug for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carrier")
            .field("values", &self.depth())
            .field("span", &self.span_context())
            .field("has_logger", &self.value::<BoundLogger>().is_some())
            .finish()
    }
}

/// Distributed-trace correlation ids of the active span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanContext {
    trace_id: [u8; 16],
    span_id: [u8; 8],
}

impl SpanContext {
    pub const fn new(trace_id: [u8; 16], span_id: [u8; 8]) -> Self {
        Self { trace_id, span_id }
    }

    pub fn trace_id(&self) -> [u8; 16] {
        self.trace_id
    }

    pub fn span_id(&self) -> [u8; 8] {
        self.span_id
    }

    /// All-zero ids mean "no span".
    pub fn is_valid(&self) -> bool {
        self.trace_id != [0; 16] && self.span_id != [0; 8]
    }

    /// The trace id as 32 lowercase hex digits.
    pub fn trace_id_hex(&self) -> String {
        hex(&self.trace_id)
    }

    /// The span id as 16 lowercase hex digits.
    pub fn span_id_hex(&self) -> String {
        hex(&self.span_id)
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // writing into a String never fails
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Private key type; no other carrier consumer can name it.
struct BoundLogger(Logger);

/// Derives a carrier with `logger` bound to it.
pub fn bind_logger(carrier: &Carrier, logger: Logger) -> Carrier {
    carrier.with_value(BoundLogger(logger))
}

/**
The logger bound to `carrier`.

If none is bound, a new logger is created by the process-wide factory and tagged with
`type=defaultLoggerFromCtx`.  Two lookups on an unbound carrier return two different loggers.
*/
pub fn logger_from_carrier(carrier: &Carrier) -> Logger {
    if let Some(BoundLogger(logger)) = carrier.value::<BoundLogger>() {
        return logger.clone();
    }
    let logger = factory::create_logger();
    logger.add_context(DEFAULT_LOGGER_KEY, DEFAULT_LOGGER_TAG);
    logger
}

/// A fork of the logger bound to `carrier`.
pub fn fork_logger_from_carrier(carrier: &Carrier) -> Logger {
    logger_from_carrier(carrier).fork()
}

/// Derives a carrier holding a fork of `carrier`'s logger.
pub fn bind_forked_logger(carrier: &Carrier) -> Carrier {
    bind_logger(carrier, fork_logger_from_carrier(carrier))
}

/**
A fresh carrier bound to a deferred logger.

The deferred logger replays through a logger from the process-wide factory.  Typical test
usage keeps the carrier for the test body and calls
`logger_from_carrier(&carrier).show_stored_logs()` when the test fails.
*/
pub fn deferred_carrier() -> Carrier {
    bind_logger(&Carrier::new(), Logger::deferred(factory::create_logger()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;

    #[derive(Debug, PartialEq)]
    struct RequestId(u32);

    #[test]
    fn test_carrier_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Carrier>();
    }

    #[test]
    fn test_values_are_scoped() {
        let base = Carrier::new().with_value(RequestId(1));
        let child = base.with_value(RequestId(2));
        assert_eq!(base.value::<RequestId>(), Some(&RequestId(1)));
        assert_eq!(child.value::<RequestId>(), Some(&RequestId(2)));
        assert_eq!(Carrier::new().value::<RequestId>(), None);
    }

    #[test]
    fn test_lookup_walks_parents() {
        let carrier = Carrier::new().with_value(RequestId(7)).with_value("unrelated");
        assert_eq!(carrier.value::<RequestId>(), Some(&RequestId(7)));
        assert_eq!(carrier.value::<&str>(), Some(&"unrelated"));
    }

    #[test]
    fn test_bound_logger_is_returned() {
        let logger = Logger::new(Arc::new(MemorySink::new()));
        let carrier = bind_logger(&Carrier::new(), logger.clone());
        assert_eq!(logger_from_carrier(&carrier), logger);
        assert!(format!("{carrier:?}").contains("has_logger: true"));
    }

    #[test]
    fn test_bound_logger_is_invisible_to_other_types() {
        let logger = Logger::new(Arc::new(MemorySink::new()));
        let carrier = bind_logger(&Carrier::new(), logger);
        assert!(carrier.value::<Logger>().is_none());
    }

    #[test]
    fn test_fork_from_carrier_is_independent() {
        let logger = Logger::new(Arc::new(MemorySink::new()));
        logger.add_context("a", 1);
        let carrier = bind_logger(&Carrier::new(), logger.clone());

        let fork = fork_logger_from_carrier(&carrier);
        fork.add_context("b", 2);
        assert_ne!(fork, logger);
        assert_eq!(logger.get_all_contexts().len(), 1);
        assert_eq!(fork.get_all_contexts()["a"], "1");
    }

    #[test]
    fn test_bind_forked_logger_leaves_parent_carrier() {
        let logger = Logger::new(Arc::new(MemorySink::new()));
        let parent = bind_logger(&Carrier::new(), logger.clone());
        let child = bind_forked_logger(&parent);

        assert_eq!(logger_from_carrier(&parent), logger);
        assert_ne!(logger_from_carrier(&child), logger);
    }

    #[test]
    fn test_span_context() {
        let span = SpanContext::new(
            [
                0x4b, 0xf9, 0x2f, 0x35, 0x77, 0xb3, 0x4d, 0xa6, 0xa3, 0xce, 0x92, 0x9d, 0x0e,
                0x0e, 0x47, 0x36,
            ],
            [0x00, 0xf0, 0x67, 0xaa, 0x0b, 0xa9, 0x02, 0xb7],
        );
        assert!(span.is_valid());
        assert_eq!(span.trace_id_hex(), "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(span.span_id_hex(), "00f067aa0ba902b7");

        let carrier = Carrier::new().with_span(span);
        assert_eq!(carrier.span_context(), Some(span));
    }

    #[test]
    fn test_invalid_span_is_absent() {
        let carrier = Carrier::new().with_span(SpanContext::new([1; 16], [0; 8]));
        assert_eq!(carrier.span_context(), None);
    }
}
