// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::level::LevelError;
use crate::log_record::LogRecord;
use std::fmt::Debug;

/**
A destination for log records.

A sink is shared by every logger forked from the same origin, so all methods take `&self`
and implementations synchronize internally.
*/
pub trait Sink: Debug + Send + Sync {
    /**
        Writes the record to the backend.

        Loggers only call this for levels where [Self::enabled] returned true.  Failures are
        the sink's business; nothing is reported back to the logger.
    */
    fn commit(&self, record: LogRecord);

    /**
    Whether a record at `level` would currently be written.

    Loggers consult this before snapshotting context and formatting the message.
    */
    fn enabled(&self, level: Level) -> bool;

    /**
    Sets the active threshold.

    Returns [LevelError::Unmapped] if the backend cannot represent `level`; the threshold is
    then left unchanged.
    */
    fn set_level(&self, level: Level) -> Result<(), LevelError>;

    /// The active threshold.
    fn level(&self) -> Level;

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn prepare_to_die(&self) {}
}

/**
What a logger does after emitting a fatal record.

Production loggers use [ProcessExit]; tests inject an implementation that records the call
instead of ending the test process.
*/
pub trait Terminate: Debug + Send + Sync {
    fn terminate(&self, code: i32);
}

/// Exits the process with the given status code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code)
    }
}

/*
Boilerplate notes.

# Sink

Clone on Sink doesn't make sense, sinks are shared through Arc.
PartialEq and Eq: unclear whether we'd mean data equality or provenance, so no.
Default is not necessarily sensible since who knows how the sink is constructed
(does it need a writer, etc.)
Send/Sync are required, a sink is reached from every thread holding a logger.
*/
