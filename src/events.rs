//! Structured run logging for fanout.
//!
//! Launch records and child failures are appended as NDJSON (one JSON
//! object per line) so a failed batch can be reproduced from its log.
//! The runner talks to the log through the [`LaunchLog`] trait and the
//! sink is injected through `RunOptions`; success is intentionally silent,
//! only launch records and failures are written.
//!
//! # Record Format
//!
//! Each record is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: the record kind (launch, child_exit, scope_enter, scope_exit)
//! - `actor`: the owner string (e.g., `user@HOST`)
//! - `details`: freeform object with action-specific details

use crate::error::{FanoutError, Result};
use crate::template::BuiltCommand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log sink interface the batch runner reports into.
///
/// The runner only calls these from its single coordinating thread, but
/// sinks are shared across batches, so implementations must be `Sync`.
pub trait LaunchLog: Send + Sync {
    /// Called once per command, immediately before the child is spawned.
    fn launched(&self, command: &BuiltCommand);

    /// Called for every child observed to exit non-zero during join.
    fn exited_nonzero(&self, command: &BuiltCommand, exit_code: i32);
}

/// A sink that drops every record. The default when no log is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLog;

impl LaunchLog for NopLog {
    fn launched(&self, _command: &BuiltCommand) {}

    fn exited_nonzero(&self, _command: &BuiltCommand, _exit_code: i32) {}
}

/// Kinds of records in the NDJSON run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// A command is about to be spawned.
    Launch,
    /// A child exited non-zero.
    ChildExit,
    /// A logged scope was entered.
    ScopeEnter,
    /// A logged scope was left (on any path, including unwinding).
    ScopeExit,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Launch => write!(f, "launch"),
            EventAction::ChildExit => write!(f, "child_exit"),
            EventAction::ScopeEnter => write!(f, "scope_enter"),
            EventAction::ScopeExit => write!(f, "scope_exit"),
        }
    }
}

/// One record of the run log.
///
/// Events are serialized as single-line JSON objects and appended to the
/// log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The record kind.
    pub action: EventAction,

    /// The actor who produced the record (e.g., `user@HOST`).
    pub actor: String,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| FanoutError::UserError(format!("failed to serialize event to JSON: {}", e)))
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append-only NDJSON run log backed by a file.
///
/// This is the concrete [`LaunchLog`] the CLI wires in via `--log-file`.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    /// Create a log handle. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event as a single JSON line with a trailing newline.
    ///
    /// The file is created if it doesn't exist.
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                FanoutError::UserError(format!(
                    "failed to open log file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            FanoutError::UserError(format!(
                "failed to write event to '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Best-effort append for paths that must not fail the run.
    ///
    /// A log-write failure is reported to stderr as a warning; the batch
    /// outcome is never affected by it.
    pub(crate) fn append_best_effort(&self, event: &Event) {
        if let Err(err) = self.append(event) {
            eprintln!("Warning: failed to write run log: {}", err);
        }
    }
}

impl LaunchLog for EventLog {
    fn launched(&self, command: &BuiltCommand) {
        let event = Event::new(EventAction::Launch).with_details(json!({
            "argv": command.argv(),
            "rendered": command.to_string(),
        }));
        self.append_best_effort(&event);
    }

    fn exited_nonzero(&self, command: &BuiltCommand, exit_code: i32) {
        let event = Event::new(EventAction::ChildExit).with_details(json!({
            "argv": command.argv(),
            "exit_code": exit_code,
        }));
        self.append_best_effort(&event);
    }
}
