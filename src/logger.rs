// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Logger`] handle: context, emission, forking and deferred replay.

use crate::Level;
use crate::carrier::Carrier;
use crate::context::{ContextStore, ContextValue};
use crate::log_record::LogRecord;
use crate::sink::{ProcessExit, Sink, Terminate};
use crate::timer::Timers;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Exit status passed to [`Terminate`] after a fatal record.
const FATAL_EXIT_CODE: i32 = 1;

/// Printed before a deferred transcript.
const REPLAY_BANNER: &str = "\n**** LOGS BEFORE ERROR";

/**
A structured logger.

A `Logger` owns a key/value context that is attached to every record it emits, and routes
records either

- **directly** to a shared [`Sink`] (see [`Logger::new`]), or
- into a **deferred** buffer that is replayed on demand through another logger
  (see [`Logger::deferred`]).

`Logger` is a handle: [`Clone`] gives another handle to the *same* logger, sharing its
context.  To derive an independent logger use [`fork`](Logger::fork), which copies the
context and keeps the routing.

# Examples

## Context and forks

```rust
use ctxlog::{Logger, MemorySink};
use std::sync::Arc;

let sink = Arc::new(MemorySink::new());
let a = Logger::new(sink.clone());
a.add_context("req", "1");

let b = a.fork();
b.add_context("req", "2");

assert_eq!(a.get_all_contexts()["req"], "1");
assert_eq!(b.get_all_contexts()["req"], "2");

ctxlog::info!(b, "handled {} items", 3);
let records = sink.drain_records();
assert_eq!(records[0].message(), "handled 3 items");
assert_eq!(records[0].context()["req"], "2");
```

## Deferred replay

```rust
use ctxlog::{Level, Logger, MemorySink};
use std::sync::Arc;

let out = Arc::new(MemorySink::new());
let root = Logger::deferred(Logger::new(out.clone()));
let per_request = root.fork();
per_request.add_context("request", 7);

root.info("suite started");
per_request.error("request failed");
assert!(out.is_empty());

root.show_stored_logs();
let replayed = out.drain_records();
assert_eq!(replayed.len(), 2);
assert_eq!(replayed[1].level(), Level::Error);
assert_eq!(replayed[1].context()["request"], "7");
```
*/
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    context: ContextStore,
    timers: Timers,
    route: Route,
}

enum Route {
    Direct {
        sink: Arc<dyn Sink>,
        terminator: Arc<dyn Terminate>,
    },
    Deferred(Deferred),
}

/// A node of a deferred clone tree.
struct Deferred {
    /// Replays go through forks of this logger.
    out: Logger,
    /// The logger this one was forked from.
    parent: Option<Logger>,
    /// Top of the tree; `None` when this node is the root.
    root: Option<Logger>,
    /// Only the root's buffer is ever appended to.
    buffer: RwLock<Vec<LogRecord>>,
}

impl LoggerInner {
    fn take_parent(&mut self) -> Option<Logger> {
        match &mut self.route {
            Route::Deferred(deferred) => deferred.parent.take(),
            Route::Direct { .. } => None,
        }
    }
}

impl Drop for LoggerInner {
    // frees the parent chain one node at a time, at any depth
    fn drop(&mut self) {
        let mut next = self.take_parent();
        while let Some(parent) = next {
            next = Arc::into_inner(parent.inner).and_then(|mut inner| inner.take_parent());
        }
    }
}

impl Deferred {
    fn read(&self) -> RwLockReadGuard<'_, Vec<LogRecord>> {
        self.buffer.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<LogRecord>> {
        self.buffer.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Logger {
    /// Creates a logger that writes to `sink` and exits the process after a fatal record.
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self::with_terminator(sink, Arc::new(ProcessExit))
    }

    /// Creates a logger that writes to `sink` and calls `terminator` after a fatal record.
    pub fn with_terminator(sink: Arc<dyn Sink>, terminator: Arc<dyn Terminate>) -> Self {
        Self::from_route(
            ContextStore::new(),
            Timers::default(),
            Route::Direct { sink, terminator },
        )
    }

    /**
    Creates the root of a deferred clone tree.

    Records emitted by this logger or any of its forks are buffered in this logger until
    [`show_stored_logs`](Logger::show_stored_logs) replays them through `out`.  Nothing is
    filtered while buffering, and fatal records never terminate the process.
    */
    pub fn deferred(out: Logger) -> Self {
        Self::from_route(
            ContextStore::new(),
            Timers::default(),
            Route::Deferred(Deferred {
                out,
                parent: None,
                root: None,
                buffer: RwLock::new(Vec::new()),
            }),
        )
    }

    fn from_route(context: ContextStore, timers: Timers, route: Route) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                context,
                timers,
                route,
            }),
        }
    }

    // CONTEXT

    /// Adds `key` to the context, replacing any previous value.
    pub fn add_context(&self, key: impl Into<String>, value: impl Into<ContextValue>) -> &Self {
        self.inner.context.set(key, value);
        self
    }

    /// Adds every pair to the context.
    pub fn add_contexts<I, K, V>(&self, pairs: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ContextValue>,
    {
        self.inner.context.set_all(pairs);
        self
    }

    /// Removes `key` from the context if present.
    pub fn delete_context(&self, key: &str) -> &Self {
        self.inner.context.delete(key);
        self
    }

    /// A copy of the current context.
    pub fn get_all_contexts(&self) -> HashMap<String, String> {
        self.inner.context.snapshot()
    }

    /**
    Adds `traceID` and `spanID` from the carrier's active span, if there is one.

    Mutates this logger; it does not fork.
    */
    pub fn set_ctx(&self, carrier: &Carrier) -> &Self {
        if let Some(span) = carrier.span_context() {
            self.inner.context.set_all([
                ("traceID", span.trace_id_hex()),
                ("spanID", span.span_id_hex()),
            ]);
        }
        self
    }

    // LEVEL

    /**
    Sets the threshold of the underlying sink.

    The sink is shared by every fork, so the threshold applies to all of them.  If the sink
    cannot represent `level` a warning is logged and the threshold is left unchanged.  On a
    deferred logger this does nothing: buffering ignores levels.
    */
    pub fn set_level(&self, level: Level) -> &Self {
        if let Route::Direct { sink, .. } = &self.inner.route {
            if let Err(err) = sink.set_level(level) {
                self.warn(format_args!("Invalid logging level: {level} ({err})"));
            }
        }
        self
    }

    /// Like [`set_level`](Logger::set_level), from a numeric level code.
    pub fn set_level_code(&self, code: i32) -> &Self {
        if let Route::Direct { .. } = &self.inner.route {
            match Level::try_from(code) {
                Ok(level) => {
                    self.set_level(level);
                }
                Err(_) => self.warn(format_args!("Invalid logging level: {code}")),
            }
        }
        self
    }

    /// The sink's threshold, or `None` for a deferred logger.
    pub fn level(&self) -> Option<Level> {
        match &self.inner.route {
            Route::Direct { sink, .. } => Some(sink.level()),
            Route::Deferred(_) => None,
        }
    }

    // LOGGING

    pub fn trace(&self, message: impl Display) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    /**
    Logs at [Level::Fatal].

    A direct logger then flushes its sink and invokes its [`Terminate`]; by default the
    process exits with status 1.  A deferred logger only buffers the record.
    */
    pub fn fatal(&self, message: impl Display) {
        self.log(Level::Fatal, message);
    }

    /// Logs at [Level::Error], appending `": "` and the error text when `err` is present.
    pub fn error_catch(&self, err: Option<&dyn Error>, message: impl Display) {
        self.log(Level::Error, catch_message(err, message));
    }

    /// Logs at [Level::Fatal], appending `": "` and the error text when `err` is present.
    pub fn fatal_catch(&self, err: Option<&dyn Error>, message: impl Display) {
        self.log(Level::Fatal, catch_message(err, message));
    }

    /// Logs `message` at `level` with the current context.
    pub fn log(&self, level: Level, message: impl Display) {
        self.emit(level, message);
        if level == Level::Fatal {
            if let Route::Direct { sink, terminator } = &self.inner.route {
                sink.prepare_to_die();
                terminator.terminate(FATAL_EXIT_CODE);
            }
        }
    }

    /// Commits or buffers one record. Never terminates.
    fn emit(&self, level: Level, message: impl Display) {
        match &self.inner.route {
            Route::Direct { sink, .. } => {
                if sink.enabled(level) {
                    sink.commit(LogRecord::new(
                        level,
                        message.to_string(),
                        self.inner.context.snapshot(),
                    ));
                }
            }
            Route::Deferred(_) => {
                self.store(LogRecord::new(
                    level,
                    message.to_string(),
                    self.inner.context.snapshot(),
                ));
            }
        }
    }

    /// Hands `record` to the parent, hop by hop, until it reaches the root, which appends it.
    fn store(&self, record: LogRecord) {
        let mut current = self;
        loop {
            let Route::Deferred(deferred) = &current.inner.route else {
                return;
            };
            match &deferred.parent {
                Some(parent) => current = parent,
                None => {
                    deferred.write().push(record);
                    return;
                }
            }
        }
    }

    // TIMER

    /// Starts (or restarts) the timer `label`.
    pub fn timer_start(&self, label: &str) -> &Self {
        self.inner.timers.start(label);
        self
    }

    /// Time elapsed since `label` was started on this logger or the one it was forked from.
    pub fn timer_duration(&self, label: &str) -> Option<Duration> {
        self.inner.timers.elapsed(label)
    }

    /// Logs the elapsed time of `label` at [Level::Warn].
    pub fn timer_print(&self, label: &str) {
        match self.timer_duration(label) {
            Some(elapsed) => self.warn(format_args!("Timer {label}: {elapsed:?}")),
            None => self.warn(format_args!("Unknown timer with label \"{label}\"")),
        }
    }

    // BASE

    /**
    Creates an independent logger with a copy of this logger's context and timers.

    The fork writes to the same sink.  A fork of a deferred logger joins its clone tree:
    whatever the fork emits is buffered at the tree's root.
    */
    pub fn fork(&self) -> Logger {
        let route = match &self.inner.route {
            Route::Direct { sink, terminator } => Route::Direct {
                sink: sink.clone(),
                terminator: terminator.clone(),
            },
            Route::Deferred(deferred) => Route::Deferred(Deferred {
                out: deferred.out.clone(),
                parent: Some(self.clone()),
                root: Some(deferred.root.clone().unwrap_or_else(|| self.clone())),
                buffer: RwLock::new(Vec::new()),
            }),
        };
        Self::from_route(
            self.inner.context.clone(),
            self.inner.timers.clone(),
            route,
        )
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.inner.route, Route::Deferred(_))
    }

    /// The root of this logger's clone tree; the logger itself when it is not a deferred fork.
    pub fn root(&self) -> Logger {
        match &self.inner.route {
            Route::Deferred(Deferred { root: Some(root), .. }) => root.clone(),
            _ => self.clone(),
        }
    }

    /// The logger this one was forked from, for deferred forks.
    pub fn parent(&self) -> Option<Logger> {
        match &self.inner.route {
            Route::Deferred(deferred) => deferred.parent.clone(),
            Route::Direct { .. } => None,
        }
    }

    // DEFERRED

    /// A copy of the records buffered in this logger, oldest first.
    ///
    /// Only a tree's root holds records; forks always return an empty list.
    pub fn stored_logs(&self) -> Vec<LogRecord> {
        match &self.inner.route {
            Route::Deferred(deferred) => deferred.read().clone(),
            Route::Direct { .. } => Vec::new(),
        }
    }

    /**
    Replays the buffered records through the output logger, oldest first.

    Each record is emitted at its original level by a fresh fork of the output logger
    carrying the record's context.  The buffer is kept, so calling this again replays
    everything again.  Replayed fatal records do not terminate.  Appends from other threads
    wait until the replay is finished.

    Call it on [`root`](Logger::root) to replay the whole tree.
    */
    pub fn show_stored_logs(&self) {
        let Route::Deferred(deferred) = &self.inner.route else {
            return;
        };
        let buffer = deferred.read();
        eprintln!("{REPLAY_BANNER}");
        for record in buffer.iter() {
            let local = deferred.out.fork();
            local.add_contexts(record.context().iter());
            local.emit(record.level(), record.message());
        }
    }
}

fn catch_message(err: Option<&dyn Error>, message: impl Display) -> String {
    match err {
        Some(err) => format!("{message}: {err}"),
        None => message.to_string(),
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Logger");
        s.field("context", &self.inner.context.snapshot());
        match &self.inner.route {
            Route::Direct { sink, .. } => s.field("sink", sink),
            Route::Deferred(deferred) => s
                .field("deferred", &true)
                .field("is_root", &deferred.parent.is_none())
                .field("stored", &deferred.read().len()),
        };
        s.finish()
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Logger {}

impl Hash for Logger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

/*
Boilerplate notes for Logger:

- Clone: handle clone, both handles are the same logger.  `fork` is the deep copy.
- PartialEq/Eq/Hash: identity of the logger, not of its context
- Default: NOT implemented, a logger needs a sink; see `factory::create_logger`
- Display: NOT implemented
- Send/Sync: automatic, everything inside is behind locks or atomics
- Drop: on the inner, unlinks deferred parent chains iteratively
*/
