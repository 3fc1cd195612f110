// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tracing` adapter.

use crate::Level;
use crate::level::{LevelError, LevelMap, Threshold};
use crate::log_record::LogRecord;
use crate::sink::Sink;

/// Sink that forwards records to the `tracing` crate.
///
/// This adapter lets an application that already installed a `tracing` subscriber receive
/// ctxlog records. The message becomes the event message and the context is attached as a
/// single `context` field rendered as `key=value` pairs. `tracing` has no fatal level, so
/// [`Level::Fatal`] is emitted as `ERROR` with `fatal = true`.
///
/// # Example
///
/// ```ignore
/// use ctxlog::{Logger, TracingSink};
/// use std::sync::Arc;
///
/// // Assumes a tracing subscriber is already initialized
/// let logger = Logger::new(Arc::new(TracingSink::new()));
/// logger.add_context("req", 42);
/// logger.info("Using tracing backend");
/// ```
#[derive(Debug)]
pub struct TracingSink {
    threshold: Threshold,
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingSink {
    /// Create a new tracing sink that passes every level on to the subscriber.
    pub fn new() -> Self {
        Self {
            threshold: Threshold::new(Level::Trace),
        }
    }
}

impl LevelMap for TracingSink {
    type Native = tracing::Level;

    fn map_level(&self, level: Level) -> Option<tracing::Level> {
        Some(match level {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error | Level::Fatal => tracing::Level::ERROR,
        })
    }
}

impl Sink for TracingSink {
    fn commit(&self, record: LogRecord) {
        let Some(native) = self.map_level(record.level()) else {
            return;
        };
        let context = record.context_fields();
        let message = record.message();
        match native {
            tracing::Level::TRACE => tracing::trace!(context = %context, "{}", message),
            tracing::Level::DEBUG => tracing::debug!(context = %context, "{}", message),
            tracing::Level::INFO => tracing::info!(context = %context, "{}", message),
            tracing::Level::WARN => tracing::warn!(context = %context, "{}", message),
            _ if record.level() == Level::Fatal => {
                tracing::error!(context = %context, fatal = true, "{}", message)
            }
            _ => tracing::error!(context = %context, "{}", message),
        }
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
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_tracing_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingSink>();
    }

    #[test]
    fn test_levels_map_to_tracing() {
        let sink = TracingSink::new();
        assert_eq!(sink.map_level(Level::Trace), Some(tracing::Level::TRACE));
        assert_eq!(sink.map_level(Level::Warn), Some(tracing::Level::WARN));
        assert_eq!(sink.map_level(Level::Fatal), Some(tracing::Level::ERROR));
    }

    #[test]
    fn test_commit_reaches_subscriber() {
        let sink = TracingSink::new();
        let output = capture(|| {
            let context = HashMap::from([("req".to_string(), "42".to_string())]);
            sink.commit(LogRecord::new(Level::Warn, "cache miss", context));
            sink.commit(LogRecord::new(Level::Fatal, "gave up", HashMap::new()));
        });
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("cache miss"), "{output}");
        assert!(output.contains("context=req=42"), "{output}");
        assert!(output.contains("gave up"), "{output}");
        assert!(output.contains("fatal=true"), "{output}");
    }

    #[test]
    fn test_threshold() {
        let sink = TracingSink::new();
        assert!(sink.enabled(Level::Trace));
        sink.set_level(Level::Error).unwrap();
        assert!(!sink.enabled(Level::Warn));
        assert!(sink.enabled(Level::Fatal));
    }
}
