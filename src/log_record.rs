// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log record type for the ctxlog logging system.
//!
//! A [`LogRecord`] is what a [`Logger`](crate::Logger) hands to a [`Sink`](crate::Sink): a
//! level, the already formatted message, and a frozen copy of the logger's context at the
//! moment of emission. Deferred loggers keep records in this same form until replay.
//!
//! # Example
//!
//! ```rust
//! use ctxlog::{Level, LogRecord};
//! use std::collections::HashMap;
//!
//! let context = HashMap::from([("req".to_string(), "42".to_string())]);
//! let record = LogRecord::new(Level::Info, "request finished", context);
//!
//! assert_eq!(record.level(), Level::Info);
//! assert_eq!(record.to_string(), "request finished req=42");
//! ```

use crate::Level;
use std::collections::HashMap;
use std::fmt::Display;

/**
A log record.

The context is a snapshot, not a view: changing the originating logger after the record was
created does not change the record.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    level: Level,
    message: String,
    context: HashMap<String, String>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>, context: HashMap<String, String>) -> Self {
        Self {
            level,
            message: message.into(),
            context,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    /// Context entries ordered by key, for stable rendering.
    pub fn sorted_context(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .context
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /**
    Renders the context as `key=value` pairs separated by spaces.

    Values that contain anything besides letters, digits and `-._/@^+` are quoted.
    */
    pub fn context_fields(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.sorted_context() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(key);
            out.push('=');
            if needs_quoting(value) {
                out.push_str(&format!("{:?}", value));
            } else {
                out.push_str(value);
            }
        }
        out
    }

    pub fn into_parts(self) -> (Level, String, HashMap<String, String>) {
        (self.level, self.message, self.context)
    }
}

fn needs_quoting(value: &str) -> bool {
    let plain = |c: char| c.is_alphanumeric() || "-._/@^+".contains(c);
    value.is_empty() || !value.chars().all(plain)
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        if !self.context.is_empty() {
            write!(f, " {}", self.context_fields())?;
        }
        Ok(())
    }
}
/*
Boilerplate notes for LogRecord:

IMPLEMENTED:
- Debug/Clone: derived, records are copied into deferred buffers and replay
- PartialEq/Eq: derived, tests compare transcripts record by record
- Display: message followed by the sorted context fields

NOT IMPLEMENTED:
- Hash: HashMap is not Hash
- Default: a record without a level makes no sense
- Ord/PartialOrd: buffer order is insertion order, not a property of the record
*/

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_display_without_context() {
        let record = LogRecord::new(Level::Warn, "plain", HashMap::new());
        assert_eq!(record.to_string(), "plain");
    }

    #[test]
    fn test_fields_are_sorted_and_quoted() {
        let record = LogRecord::new(
            Level::Info,
            "done",
            ctx(&[("b", "two words"), ("a", "1"), ("c", "")]),
        );
        assert_eq!(record.context_fields(), "a=1 b=\"two words\" c=\"\"");
    }

    #[test]
    fn test_into_parts() {
        let record = LogRecord::new(Level::Error, "boom", ctx(&[("k", "v")]));
        let (level, message, context) = record.into_parts();
        assert_eq!(level, Level::Error);
        assert_eq!(message, "boom");
        assert_eq!(context["k"], "v");
    }
}
