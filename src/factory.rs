// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide logger factory.
//!
//! When code asks a [`Carrier`](crate::carrier::Carrier) for a logger and none was bound,
//! a logger is created by the factory installed here.
//!
//! # Default Behavior
//!
//! Until [`set_logger_factory`] is called, the factory is a [`SinkFactory`] over a single
//! [`ConsoleSink`] at [`Level::Debug`](crate::Level::Debug). Every logger it creates shares
//! that sink, and therefore its threshold.
//!
//! # Thread Safety
//!
//! All functions in this module are thread-safe. The factory slot is an `RwLock` read on
//! every creation and written only when the factory is replaced.
//!
//! # Examples
//!
//! ## Installing a factory
//!
//! ```
//! use ctxlog::factory::{SinkFactory, set_logger_factory, create_logger};
//! use ctxlog::MemorySink;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! set_logger_factory(Arc::new(SinkFactory::new(sink.clone())));
//!
//! create_logger().info("from a factory logger");
//! assert_eq!(sink.drain_logs(), "from a factory logger");
//! ```
//!
//! ## Forwarding to `tracing`
//!
//! ```
//! use ctxlog::factory::{SinkFactory, set_logger_factory};
//! use ctxlog::TracingSink;
//! use std::sync::Arc;
//!
//! set_logger_factory(Arc::new(SinkFactory::new(Arc::new(TracingSink::new()))));
//! ```
//!
//! # Logger Lifecycle
//!
//! Factories are reference-counted. Replacing the factory does not affect loggers that were
//! already created; they keep writing to the sink they were created with.

use crate::Logger;
use crate::console_sink::ConsoleSink;
use crate::sink::{ProcessExit, Sink, Terminate};
use std::fmt::Debug;
use std::sync::{Arc, OnceLock, RwLock};

/// Creates loggers for carriers that have none bound.
pub trait LoggerFactory: Debug + Send + Sync {
    fn create_logger(&self) -> Logger;
}

/// A factory whose loggers all write to one shared sink.
#[derive(Debug, Clone)]
pub struct SinkFactory {
    sink: Arc<dyn Sink>,
    terminator: Arc<dyn Terminate>,
}

impl SinkFactory {
    /// Loggers write to `sink` and exit the process after a fatal record.
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self::with_terminator(sink, Arc::new(ProcessExit))
    }

    pub fn with_terminator(sink: Arc<dyn Sink>, terminator: Arc<dyn Terminate>) -> Self {
        Self { sink, terminator }
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }
}

impl Default for SinkFactory {
    fn default() -> Self {
        Self::new(Arc::new(ConsoleSink::new()))
    }
}

impl LoggerFactory for SinkFactory {
    fn create_logger(&self) -> Logger {
        Logger::with_terminator(self.sink.clone(), self.terminator.clone())
    }
}

/// Static storage for the process-wide factory.
static LOGGER_FACTORY: OnceLock<RwLock<Arc<dyn LoggerFactory>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<dyn LoggerFactory>> {
    LOGGER_FACTORY.get_or_init(|| RwLock::new(Arc::new(SinkFactory::default())))
}

/// The currently installed factory.
pub fn logger_factory() -> Arc<dyn LoggerFactory> {
    slot().read().unwrap_or_else(|e| e.into_inner()).clone()
}

/**
Replaces the process-wide factory.

Previous factories are dropped once no other reference remains.
*/
pub fn set_logger_factory(factory: Arc<dyn LoggerFactory>) {
    *slot().write().unwrap_or_else(|e| e.into_inner()) = factory;
}

/// Creates a logger with the currently installed factory.
pub fn create_logger() -> Logger {
    // release the lock before running factory code
    let factory = logger_factory();
    factory.create_logger()
}
