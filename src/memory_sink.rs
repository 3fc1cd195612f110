// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! This module provides an in-memory sink for testing and debugging purposes.
//! The `MemorySink` captures committed records in memory rather than writing them to a
//! terminal or a subscriber, making it ideal for:
//!
//! - Unit testing code that logs through ctxlog
//! - Serving as the output of a deferred logger whose replay you want to inspect
//! - Programmatically examining log output
//!
//! ## Architecture
//!
//! The sink keeps a `Mutex<Vec<LogRecord>>` and its own [`Threshold`]. Records below the
//! threshold never reach [`Sink::commit`], because loggers check [`Sink::enabled`] first.

use crate::Level;
use crate::level::{LevelError, LevelMap, Threshold};
use crate::log_record::LogRecord;
use crate::sink::Sink;
use std::sync::{Mutex, MutexGuard};

/// A sink that stores records in a `Vec<LogRecord>`.
///
/// # Thread Safety
///
/// The `MemorySink` is thread-safe and is usually shared as `Arc<MemorySink>` between the
/// logger under test and the assertions. All operations on the buffer are protected by a
/// mutex.
///
/// # Example
///
/// ```rust
/// use ctxlog::{Level, Logger, MemorySink};
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = Logger::new(sink.clone());
/// logger.add_context("user", "alice");
/// ctxlog::info!(logger, "logged in after {} attempts", 2);
///
/// let records = sink.drain_records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].message(), "logged in after 2 attempts");
/// assert_eq!(records[0].context()["user"], "alice");
/// ```
///
/// # Missing levels
///
/// [`MemorySink::without_levels`] emulates a backend that lacks some severities (for
/// example a backend with no trace level), so that code paths handling unmapped levels can
/// be exercised.
#[derive(Debug)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
    threshold: Threshold,
    missing: Vec<Level>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: derived, required by Sink
// - Default: implemented with obvious zero-value (empty buffer, Trace threshold)
// - Clone: NOT implemented, sinks are shared through Arc and a copy would split the buffer
// - PartialEq/Eq/Hash: NOT implemented, equality of live buffers is racy
// - Send/Sync: automatic through Mutex and atomics

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    /// Creates a sink that accepts every level.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            threshold: Threshold::new(Level::Trace),
            missing: Vec::new(),
        }
    }

    /// Creates a sink whose level map has no entry for any of `missing`.
    pub fn without_levels(missing: &[Level]) -> Self {
        Self {
            missing: missing.to_vec(),
            ..Self::new()
        }
    }

    /// A copy of every record captured so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Removes and returns every record captured so far.
    pub fn drain_records(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    /// Drains all records into a single string, one rendered record per line.
    ///
    /// ```rust
    /// use ctxlog::{Logger, MemorySink};
    /// use std::sync::Arc;
    ///
    /// let sink = Arc::new(MemorySink::new());
    /// let logger = Logger::new(sink.clone());
    /// logger.info("First message");
    /// logger.warn("Second message");
    ///
    /// assert_eq!(sink.drain_logs(), "First message\nSecond message");
    /// assert_eq!(sink.drain_logs(), "");
    /// ```
    pub fn drain_logs(&self) -> String {
        self.drain_records()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LevelMap for MemorySink {
    type Native = Level;

    fn map_level(&self, level: Level) -> Option<Level> {
        (!self.missing.contains(&level)).then_some(level)
    }
}

impl Sink for MemorySink {
    fn commit(&self, record: LogRecord) {
        self.lock().push(record);
    }

    fn enabled(&self, level: Level) -> bool {
        self.threshold.allows(level)
    }

    fn set_level(&self, level: Level) -> Result<(), LevelError> {
        self.threshold.set_mapped(self, level).map(|_| ())
    }

    fn level(&self) -> Level {
        self.threshold.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(level: Level, message: &str) -> LogRecord {
        LogRecord::new(level, message, HashMap::new())
    }

    #[test]
    fn test_memory_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemorySink>();
    }

    #[test]
    fn test_commit_and_drain() {
        let sink = MemorySink::new();
        sink.commit(record(Level::Info, "one"));
        sink.commit(record(Level::Error, "two"));
        assert_eq!(sink.len(), 2);

        let drained = sink.drain_records();
        assert_eq!(drained[0].message(), "one");
        assert_eq!(drained[1].level(), Level::Error);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_threshold() {
        let sink = MemorySink::new();
        assert!(sink.enabled(Level::Trace));
        sink.set_level(Level::Warn).unwrap();
        assert_eq!(sink.level(), Level::Warn);
        assert!(!sink.enabled(Level::Info));
        assert!(sink.enabled(Level::Warn));
    }

    #[test]
    fn test_missing_levels_are_unmapped() {
        let sink = MemorySink::without_levels(&[Level::Trace]);
        assert_eq!(
            sink.set_level(Level::Trace),
            Err(LevelError::Unmapped(Level::Trace))
        );
        assert_eq!(sink.level(), Level::Trace);
        assert_eq!(sink.set_level(Level::Debug), Ok(()));
        assert_eq!(sink.level(), Level::Debug);
    }
}
