// SPDX-License-Identifier: MIT OR Apache-2.0

//! Severity levels, thresholds and the backend level-mapping contract.
//!
//! [`Level`] is the abstract severity every ctxlog API speaks. Backends translate it into
//! their own identifiers through [`LevelMap`], and keep their active cut-off in a
//! [`Threshold`].
//!
//! Levels can be read from configuration either by name or by numeric code:
//!
//! ```
//! use ctxlog::Level;
//!
//! assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
//! assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warn);
//! assert_eq!(Level::try_from(20).unwrap(), Level::Error);
//! assert!(Level::Debug < Level::Info);
//! ```

use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Severity of a log record, ordered from most verbose to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Step-by-step detail, usually disabled
    Trace,
    /// Information useful while debugging
    Debug,
    /// Normal operation
    Info,
    /// Suspicious condition
    Warn,
    /// Runtime error
    Error,
    /// Unrecoverable error; the production path terminates the process
    Fatal,
}

/// Errors produced while interpreting a level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    /// The name is not one of the known level names.
    #[error("unknown logging level name {0:?}")]
    UnknownName(String),
    /// The number is not one of the known level codes.
    #[error("unknown logging level code {0}")]
    UnknownCode(i32),
    /// The backend has no counterpart for this level.
    #[error("logging level {0} has no counterpart in this backend")]
    Unmapped(Level),
}

impl Level {
    /// Every level, in ascending severity.
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Numeric code of the level.
    ///
    /// Codes are spaced by four so that hosts can slot their own levels in between.
    pub const fn code(self) -> i32 {
        match self {
            Level::Trace => 4,
            Level::Debug => 8,
            Level::Info => 12,
            Level::Warn => 16,
            Level::Error => 20,
            Level::Fatal => 24,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    /// Reads a level from the environment variable `var`.
    ///
    /// Returns `Ok(None)` when the variable is unset, so callers can fall back to a default.
    ///
    /// ```
    /// use ctxlog::Level;
    ///
    /// let level = Level::from_env("CTXLOG_DOC_UNSET_VARIABLE").unwrap().unwrap_or(Level::Info);
    /// assert_eq!(level, Level::Info);
    /// ```
    pub fn from_env(var: &str) -> Result<Option<Level>, LevelError> {
        match std::env::var(var) {
            Ok(value) => value.parse().map(Some),
            Err(_) => Ok(None),
        }
    }

    const fn index(self) -> u8 {
        self as u8
    }

    const fn from_index(index: u8) -> Level {
        match index {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Fatal,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(LevelError::UnknownName(s.to_string())),
        }
    }
}

impl TryFrom<i32> for Level {
    type Error = LevelError;

    fn try_from(code: i32) -> Result<Self, LevelError> {
        Level::ALL
            .into_iter()
            .find(|level| level.code() == code)
            .ok_or(LevelError::UnknownCode(code))
    }
}

impl From<Level> for i32 {
    fn from(level: Level) -> Self {
        level.code()
    }
}

/*
Boilerplate notes for Level:

- Copy/Clone/Eq/Ord/Hash: derived, levels are plain tags and ordering is the whole point
- Default: NOT implemented, each backend picks its own default threshold
- Display/FromStr: implemented with the lowercase names so config round-trips
*/

/// Translation from [`Level`] to a backend's native level identifiers.
///
/// A backend that cannot represent some level returns `None`; callers treat that as
/// [`LevelError::Unmapped`] and leave the active threshold unchanged.
pub trait LevelMap {
    /// The backend's own level type.
    type Native: Copy + Debug;

    /// Maps `level`, or returns `None` if the backend has no counterpart.
    fn map_level(&self, level: Level) -> Option<Self::Native>;
}

/**
The active cut-off of a backend.

Records below the threshold are suppressed.  The value is atomic so that a sink shared by
many loggers can be reconfigured from any thread without locking the emission path.
*/
#[derive(Debug)]
pub struct Threshold(AtomicU8);

impl Threshold {
    pub const fn new(level: Level) -> Self {
        Self(AtomicU8::new(level.index()))
    }

    pub fn get(&self) -> Level {
        Level::from_index(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, level: Level) {
        self.0.store(level.index(), Ordering::Relaxed);
    }

    /// Whether a record at `level` passes the threshold.
    #[inline]
    pub fn allows(&self, level: Level) -> bool {
        level >= self.get()
    }

    /// Maps `level` through `map` and, if the backend knows it, makes it the new threshold.
    pub fn set_mapped<M: LevelMap>(&self, map: &M, level: Level) -> Result<M::Native, LevelError> {
        let native = map.map_level(level).ok_or(LevelError::Unmapped(level))?;
        self.set(level);
        Ok(native)
    }
}
