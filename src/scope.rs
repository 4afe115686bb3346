//! Scoped begin/end logging around a unit of work.
//!
//! [`run_logged`] writes a `scope_enter` record, runs the given closure,
//! and guarantees a matching `scope_exit` record on every path out of the
//! closure, including error returns and unwinding. The exit record is
//! emitted from a drop guard, so no early return can skip it.

use crate::events::{Event, EventAction, EventLog};
use serde_json::json;

/// Writes the `scope_exit` record when dropped.
struct ScopeGuard<'a> {
    log: &'a EventLog,
    name: &'a str,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let event =
            Event::new(EventAction::ScopeExit).with_details(json!({ "scope": self.name }));
        self.log.append_best_effort(&event);
    }
}

/// Run `work` with enter/exit records around it.
///
/// Log-write failures are best-effort and never affect the result of
/// `work`.
pub fn run_logged<T>(log: &EventLog, name: &str, work: impl FnOnce() -> T) -> T {
    let event = Event::new(EventAction::ScopeEnter).with_details(json!({ "scope": name }));
    log.append_best_effort(&event);

    let _guard = ScopeGuard { log, name };
    work()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use tempfile::TempDir;

    fn read_actions(log: &EventLog) -> Vec<String> {
        std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(|line| {
                let value: Value = serde_json::from_str(line).unwrap();
                value["action"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn emits_enter_and_exit_around_work() {
        let dir = TempDir::new().unwrap();
        let log = EventLog::new(dir.path().join("run.ndjson"));

        let result = run_logged(&log, "batch", || 42);

        assert_eq!(result, 42);
        assert_eq!(read_actions(&log), vec!["scope_enter", "scope_exit"]);
    }

    #[test]
    fn exit_is_emitted_when_work_returns_an_error() {
        let dir = TempDir::new().unwrap();
        let log = EventLog::new(dir.path().join("run.ndjson"));

        let result: Result<(), &str> = run_logged(&log, "batch", || Err("boom"));

        assert!(result.is_err());
        assert_eq!(read_actions(&log), vec!["scope_enter", "scope_exit"]);
    }

    #[test]
    fn exit_is_emitted_when_work_unwinds() {
        let dir = TempDir::new().unwrap();
        let log = EventLog::new(dir.path().join("run.ndjson"));

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            run_logged(&log, "batch", || {
                panic!("boom");
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(read_actions(&log), vec!["scope_enter", "scope_exit"]);
    }

    #[test]
    fn scope_name_is_recorded_in_details() {
        let dir = TempDir::new().unwrap();
        let log = EventLog::new(dir.path().join("run.ndjson"));

        run_logged(&log, "fanout run", || ());

        let content = std::fs::read_to_string(log.path()).unwrap();
        let first: Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first["details"]["scope"], "fanout run");
    }
}
