// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
Named stopwatches carried by a logger.

A logger can start a timer under a label and later report how long ago that was.  Timers are
copied when a logger is forked, so a fork can report on intervals its parent started.
*/

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(crate) struct Timers {
    started: RwLock<HashMap<String, Instant>>,
}

impl Timers {
    /// Starts (or restarts) the timer named `label`.
    pub(crate) fn start(&self, label: &str) {
        self.started
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(label.to_string(), Instant::now());
    }

    /// Time since `label` was started, if it was.
    pub(crate) fn elapsed(&self, label: &str) -> Option<Duration> {
        self.started
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(label)
            .map(Instant::elapsed)
    }
}

impl Clone for Timers {
    fn clone(&self) -> Self {
        Self {
            started: RwLock::new(
                self.started
                    .read()
                    .unwrap_or_else(|e| e.into_inner())
                    .clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_timer() {
        let timers = Timers::default();
        assert_eq!(timers.elapsed("nothing"), None);
    }

    #[test]
    fn test_elapsed_grows() {
        let timers = Timers::default();
        timers.start("load");
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = timers.elapsed("load").expect("timer was started");
        assert!(elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn test_clone_copies_start_times() {
        let timers = Timers::default();
        timers.start("a");
        let copy = timers.clone();
        copy.start("b");
        assert!(copy.elapsed("a").is_some());
        assert!(timers.elapsed("b").is_none());
    }
}
