//! Stopwatch timers attached to projects.
use serde::{Deserialize, Serialize};

/// A named stopwatch belonging to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    /// Identifier, unique within the owning project's list
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Whether the stopwatch is currently running
    #[serde(default)]
    pub is_running: bool,
    /// When the current run started (ms since epoch); only meaningful while running
    #[serde(default)]
    pub start_time: i64,
    /// Accumulated milliseconds of all finished runs
    #[serde(default)]
    pub elapsed: i64,
}

impl Timer {
    /// Creates a stopped timer with nothing accumulated
    pub fn new(id: u64, name: String) -> Self {
        Timer {
            id,
            name,
            is_running: false,
            start_time: 0,
            elapsed: 0,
        }
    }

    /// Flips between running and stopped, returning the new running state.
    ///
    /// Starting records `now_ms` as the start time and leaves `elapsed`
    /// alone. Stopping folds the current run into `elapsed`.
    pub fn toggle(&mut self, now_ms: i64) -> bool {
        if self.is_running {
            self.elapsed = self.elapsed.saturating_add(self.active_time(now_ms));
            self.is_running = false;
        } else {
            self.start_time = now_ms;
            self.is_running = true;
        }
        self.is_running
    }

    /// Milliseconds since the last start, never negative
    pub fn active_time(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.start_time).max(0)
    }

    /// Total tracked time as of `now_ms`, including the current run
    pub fn total_elapsed(&self, now_ms: i64) -> i64 {
        if self.is_running {
            self.elapsed.saturating_add(self.active_time(now_ms))
        } else {
            self.elapsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_keeps_elapsed() {
        let mut timer = Timer::new(1, "focus".to_string());
        timer.elapsed = 500;

        assert!(timer.toggle(10_000));
        assert_eq!(timer.start_time, 10_000);
        assert_eq!(timer.elapsed, 500);
    }

    #[test]
    fn stop_accumulates_run() {
        let mut timer = Timer::new(1, "focus".to_string());
        timer.toggle(10_000);

        assert!(!timer.toggle(12_500));
        assert_eq!(timer.elapsed, 2_500);

        timer.toggle(20_000);
        timer.toggle(21_000);
        assert_eq!(timer.elapsed, 3_500);
    }

    #[test]
    fn clock_going_backwards_adds_nothing() {
        let mut timer = Timer::new(1, "skewed".to_string());
        timer.toggle(10_000);
        timer.toggle(9_000);
        assert_eq!(timer.elapsed, 0);
        assert!(!timer.is_running);
    }

    #[test]
    fn total_includes_current_run_only_while_running() {
        let mut timer = Timer::new(1, "focus".to_string());
        timer.elapsed = 1_000;
        timer.start_time = 5_000;
        assert_eq!(timer.total_elapsed(8_000), 1_000);

        timer.is_running = true;
        assert_eq!(timer.total_elapsed(8_000), 4_000);
    }

    #[test]
    fn legacy_fields_default() {
        let timer: Timer = serde_json::from_str(r#"{"id":7}"#).unwrap();
        assert_eq!(timer, Timer::new(7, String::new()));
    }
}
