// SPDX-License-Identifier: MIT OR Apache-2.0

//! Formatting macros for [`Logger`](crate::Logger) emission.
//!
//! Each macro takes a logger expression followed by `format!`-style arguments and forwards
//! a `format_args!` value to the matching method, so the message is only rendered if the
//! logger actually commits or buffers it.
//!
//! ```
//! use ctxlog::{Logger, MemorySink};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = Logger::new(sink.clone());
//! let user = "alice";
//! ctxlog::warn!(logger, "{user} retried {} times", 3);
//! assert_eq!(sink.drain_logs(), "alice retried 3 times");
//! ```

/// Logs at [`Level::Trace`](crate::Level::Trace) with `format!` syntax.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.trace(format_args!($($arg)+))
    };
}

/// Logs at [`Level::Debug`](crate::Level::Debug) with `format!` syntax.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(format_args!($($arg)+))
    };
}

/// Logs at [`Level::Info`](crate::Level::Info) with `format!` syntax.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(format_args!($($arg)+))
    };
}

/// Logs at [`Level::Warn`](crate::Level::Warn) with `format!` syntax.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(format_args!($($arg)+))
    };
}

/// Logs at [`Level::Error`](crate::Level::Error) with `format!` syntax.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(format_args!($($arg)+))
    };
}

/// Logs at [`Level::Fatal`](crate::Level::Fatal) with `format!` syntax.
///
/// See [`Logger::fatal`](crate::Logger::fatal) for what happens afterwards.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format_args!($($arg)+))
    };
}

/// Logs at Error, appending the error text when the `Option<&dyn Error>` is `Some`.
///
/// ```
/// use ctxlog::{Logger, MemorySink};
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = Logger::new(sink.clone());
/// let err = std::io::Error::other("connection reset");
/// ctxlog::error_catch!(logger, Some(&err), "upload {} failed", 12);
/// assert_eq!(sink.drain_logs(), "upload 12 failed: connection reset");
/// ```
#[macro_export]
macro_rules! error_catch {
    ($logger:expr, $err:expr, $($arg:tt)+) => {
        $logger.error_catch($err, format_args!($($arg)+))
    };
}

/// Logs at Fatal, appending the error text when the `Option<&dyn Error>` is `Some`.
#[macro_export]
macro_rules! fatal_catch {
    ($logger:expr, $err:expr, $($arg:tt)+) => {
        $logger.fatal_catch($err, format_args!($($arg)+))
    };
}
