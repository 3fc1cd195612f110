//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# ctxlog

ctxlog is a structured logging facade that carries key/value context from logger to logger,
and can hold back everything it logs until you ask to see it.

# The problem

Services tag their logs with request ids, user ids, retry counts and so on.  Passing those
tags to every log call is noisy, and stashing them in a global makes concurrent requests
trample each other.  Tests have the opposite problem: a passing test should be quiet, but a
failing one should show everything that led up to the failure, in order, with the tags each
line had at the time.

# The model

A [`Logger`] owns a *context*: a map from key to text value that is attached to every record
it emits.  Deriving a logger for a sub-operation is [`Logger::fork`]: the fork starts with a
copy of the context and writes to the same [`Sink`], but from then on the two contexts are
independent.

```rust
use ctxlog::{Logger, MemorySink};
use std::sync::Arc;

let sink = Arc::new(MemorySink::new());
let request = Logger::new(sink.clone());
request.add_context("req", "1");

let retry = request.fork();
retry.add_context("attempt", 2);
ctxlog::warn!(retry, "upstream returned {}", 503);

let records = sink.drain_records();
assert_eq!(records[0].to_string(), "upstream returned 503 attempt=2 req=1");
assert!(!request.get_all_contexts().contains_key("attempt"));
```

# Sinks

A sink is where records go.  Three ship with the crate:

| Sink            | Writes to                                   | Default threshold |
|-----------------|---------------------------------------------|-------------------|
| [`ConsoleSink`] | stdout, or stderr for warn and above        | debug             |
| [`TracingSink`] | the `tracing` subscriber of the application | trace             |
| [`MemorySink`]  | a vector, for inspection in tests           | trace             |

Each sink translates [`Level`] into its own levels through [`LevelMap`].  Setting a level the
backend cannot represent logs a warning and leaves the threshold alone.

# Deferred loggers

[`Logger::deferred`] creates a logger that buffers instead of writing.  Its forks form a
clone tree, and every record from anywhere in the tree is appended to the root's buffer, so
the buffer is one time-ordered transcript.  [`Logger::show_stored_logs`] replays the
transcript through a real logger, each record with the context it was emitted with.

```rust
use ctxlog::{Logger, MemorySink};
use std::sync::Arc;

let out = Arc::new(MemorySink::new());
let root = Logger::deferred(Logger::new(out.clone()));
let child = root.fork();
child.add_context("step", "login");

root.info("test started");
child.error("login failed");

// nothing is written until replay
assert!(out.is_empty());
root.show_stored_logs();
assert_eq!(out.drain_logs(), "test started\nlogin failed step=login");
```

Fatal records on a deferred logger are only buffered, so a failing test keeps running and
can still replay its transcript.  On a direct logger, fatal records flush the sink and then
call the logger's [`Terminate`] capability, which exits the process unless replaced.

# Carriers

A [`carrier::Carrier`] passes a logger implicitly through a call chain, together with the
trace correlation ids of the active span.  See the [`carrier`] module.

# Multithreading

Loggers, sinks and carriers are `Send + Sync`.  Contexts and deferred buffers are guarded by
reader/writer locks, so concurrent emission from many forks is safe and the root buffer keeps
the order in which records arrived.
*/

mod macros;

mod level;
mod log_record;
mod sink;
mod memory_sink;
mod console_sink;
mod tracing_sink;
mod timer;
mod logger;
pub mod context;
pub mod carrier;
pub mod factory;

pub use level::{Level, LevelError, LevelMap, Threshold};
pub use log_record::LogRecord;
pub use sink::{ProcessExit, Sink, Terminate};
pub use memory_sink::MemorySink;
pub use console_sink::ConsoleSink;
pub use tracing_sink::TracingSink;
pub use logger::Logger;
