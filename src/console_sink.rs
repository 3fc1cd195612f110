// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::level::{LevelError, LevelMap, Threshold};
use crate::log_record::LogRecord;
use crate::sink::Sink;
use colored::Colorize;
use std::io::Write;
use std::sync::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const MESSAGE_WIDTH: usize = 44;

type Writer = Mutex<Box<dyn Write + Send>>;

/**
A reference sink that writes text lines to the console.

Each line looks like

```text
WARN[2024-05-01T12:00:00.123] cache miss                                   key=users req=42
```

Records at [Level::Warn] and above go to the error stream, everything else to the output
stream, so that `2>` redirection captures problems only.  The default threshold is
[Level::Debug].
*/
pub struct ConsoleSink {
    out: Writer,
    err: Writer,
    threshold: Threshold,
    colors: bool,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: implemented by hand, the writers are opaque
// - Default: implemented, stdout/stderr with colors
// - Clone/Copy: NOT implemented, the sink owns its writers
// - PartialEq/Eq/Hash: NOT implemented, no meaningful identity beyond the Arc
// - Send/Sync: automatic, writers are Send behind a Mutex

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("threshold", &self.threshold.get())
            .field("colors", &self.colors)
            .finish_non_exhaustive()
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink {
    /// Writes to stdout and stderr, colored when the terminal supports it.
    pub fn new() -> Self {
        Self {
            colors: true,
            ..Self::with_writers(Box::new(std::io::stdout()), Box::new(std::io::stderr()))
        }
    }

    /// Writes to the given streams without colors.
    pub fn with_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            threshold: Threshold::new(Level::Debug),
            colors: false,
        }
    }

    /// Turns level coloring on or off.
    pub fn colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Sets the initial threshold.
    pub fn threshold(self, level: Level) -> Self {
        self.threshold.set(level);
        self
    }

    fn render(&self, tag: &str, record: &LogRecord) -> String {
        let tag = if self.colors {
            match record.level() {
                Level::Trace | Level::Debug => tag.white().to_string(),
                Level::Info => tag.cyan().to_string(),
                Level::Warn => tag.yellow().to_string(),
                Level::Error | Level::Fatal => tag.red().to_string(),
            }
        } else {
            tag.to_string()
        };
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        if record.context().is_empty() {
            format!("{tag}[{timestamp}] {}\n", record.message())
        } else {
            format!(
                "{tag}[{timestamp}] {:<width$} {}\n",
                record.message(),
                record.context_fields(),
                width = MESSAGE_WIDTH
            )
        }
    }
}

impl LevelMap for ConsoleSink {
    type Native = &'static str;

    fn map_level(&self, level: Level) -> Option<&'static str> {
        Some(match level {
            Level::Trace => "TRAC",
            Level::Debug => "DEBU",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERRO",
            Level::Fatal => "FATA",
        })
    }
}

impl Sink for ConsoleSink {
    fn commit(&self, record: LogRecord) {
        let Some(tag) = self.map_level(record.level()) else {
            return;
        };
        let line = self.render(tag, &record);
        let writer = if record.level() >= Level::Warn {
            &self.err
        } else {
            &self.out
        };
        let mut writer = writer.lock().unwrap_or_else(|e| e.into_inner());
        // nowhere to report a failing console
        let _ = writer.write_all(line.as_bytes());
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

    fn prepare_to_die(&self) {
        for writer in [&self.out, &self.err] {
            let _ = writer.lock().unwrap_or_else(|e| e.into_inner()).flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

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

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn sink() -> (ConsoleSink, SharedBuf, SharedBuf) {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let sink = ConsoleSink::with_writers(Box::new(out.clone()), Box::new(err.clone()));
        (sink, out, err)
    }

    #[test]
    fn test_console_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConsoleSink>();
    }

    #[test]
    fn test_streams_split_by_level() {
        let (sink, out, err) = sink();
        sink.commit(LogRecord::new(Level::Info, "hello", HashMap::new()));
        sink.commit(LogRecord::new(Level::Warn, "careful", HashMap::new()));

        let out = out.contents();
        let err = err.contents();
        assert!(out.starts_with("INFO["), "{out}");
        assert!(out.ends_with("] hello\n"), "{out}");
        assert!(err.starts_with("WARN["), "{err}");
        assert!(!out.contains("careful"));
    }

    #[test]
    fn test_context_fields_rendered() {
        let (sink, out, _err) = sink();
        let context = HashMap::from([("req".to_string(), "7".to_string())]);
        sink.commit(LogRecord::new(Level::Debug, "step", context));
        let line = out.contents();
        assert!(line.starts_with("DEBU["), "{line}");
        assert!(line.trim_end().ends_with("req=7"), "{line}");
    }

    #[test]
    fn test_default_threshold_is_debug() {
        let (sink, _out, _err) = sink();
        assert_eq!(sink.level(), Level::Debug);
        assert!(!sink.enabled(Level::Trace));
        let sink = sink.threshold(Level::Error);
        assert!(!sink.enabled(Level::Warn));
        assert!(sink.enabled(Level::Fatal));
    }

    #[test]
    fn test_every_level_is_mapped() {
        let (sink, _out, _err) = sink();
        for level in Level::ALL {
            assert_eq!(sink.set_level(level), Ok(()));
            assert_eq!(sink.level(), level);
        }
    }
}
