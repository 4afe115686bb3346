//! The batch runner: build, launch, and join templated commands.
//!
//! A [`Batch`] pairs one template with a validated set of substitution
//! records and turns each record into one child process. All children are
//! spawned from a single coordinating thread without waiting on one
//! another; parallelism comes from OS process scheduling. The coordinator
//! blocks only in the join phase, once per handle, in launch order.
//!
//! # Ordering and failure policy
//!
//! - Launch order follows batch order; join order follows launch order.
//!   Completion order is unspecified.
//! - Every child is joined unconditionally, so a failing child never
//!   leaves siblings unwaited.
//! - **First failure wins**: the first non-zero exit observed in join
//!   order becomes the reported `ExitFailure`. Every non-zero exit is
//!   still reported to the log sink, so later failures are not silently
//!   dropped.
//! - A spawn-time OS error aborts the batch immediately; children
//!   launched before it are not cancelled (no cancellation exists at
//!   this layer).

use crate::error::{FanoutError, Result};
use crate::events::{LaunchLog, NopLog};
use crate::subs::{self, SubEntry};
use crate::template::{BuiltCommand, Template};
use std::collections::VecDeque;
use std::fs::File;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;

/// Options controlling how a batch is validated and run.
#[derive(Clone)]
pub struct RunOptions {
    /// Whether a non-zero child exit fails the run. Disabling this turns
    /// the batch into fire-and-forget: children are still all joined, but
    /// their exit codes are ignored.
    pub check_rc: bool,

    /// Shared stdout sink applied uniformly to every child. `None`
    /// inherits the parent's stdout. The file is created at launch time,
    /// never during validation.
    pub stdout: Option<PathBuf>,

    /// Whether construction launches and joins immediately. When
    /// disabled, the caller can inspect `built_commands()` first and call
    /// `run()` later.
    pub autorun: bool,

    /// Maximum number of simultaneously running children. `None` is
    /// unbounded; set a bound for large batches.
    pub max_in_flight: Option<usize>,

    /// Log sink receiving one launch record per command and one record
    /// per non-zero exit.
    pub log: Arc<dyn LaunchLog>,
}

impl std::fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("check_rc", &self.check_rc)
            .field("stdout", &self.stdout)
            .field("autorun", &self.autorun)
            .field("max_in_flight", &self.max_in_flight)
            .finish_non_exhaustive()
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            check_rc: true,
            stdout: None,
            autorun: true,
            max_in_flight: None,
            log: Arc::new(NopLog),
        }
    }
}

/// A running child process paired with the command that produced it.
struct LaunchHandle {
    child: Child,
    command: BuiltCommand,
}

/// Recorded outcome of a completed launch-and-join cycle.
#[derive(Debug, Clone)]
enum Outcome {
    Success,
    Failed {
        command: BuiltCommand,
        exit_code: i32,
    },
}

/// A validated batch of templated commands.
///
/// Construction validates the batch and builds every command before any
/// process is spawned; a malformed batch fails with zero OS side effects.
#[derive(Debug)]
pub struct Batch {
    commands: Vec<BuiltCommand>,
    options: RunOptions,
    outcome: Option<Outcome>,
}

impl Batch {
    /// Validate `entries` against `template`, build every command, and —
    /// unless `options.autorun` is disabled — launch and join them
    /// immediately. Run failures surface from here when autorun is on.
    pub fn new(template: &Template, entries: &[SubEntry], options: RunOptions) -> Result<Self> {
        let records = subs::validate(template, entries)?;
        let commands = records
            .iter()
            .map(|record| template.substitute(record))
            .collect();

        let mut batch = Self {
            commands,
            options,
            outcome: None,
        };
        if batch.options.autorun {
            batch.run()?;
        }
        Ok(batch)
    }

    /// The built commands, in batch order.
    ///
    /// Usable whether or not the batch has run; repeated calls return the
    /// same commands.
    pub fn built_commands(&self) -> &[BuiltCommand] {
        &self.commands
    }

    /// Launch and join the batch if it has not completed yet.
    ///
    /// A completed batch re-reports its recorded outcome without
    /// relaunching anything. A spawn failure does not mark the batch
    /// completed.
    pub fn run(&mut self) -> Result<()> {
        if self.outcome.is_none() {
            let outcome = self.launch_and_join()?;
            self.outcome = Some(outcome);
        }
        self.report_outcome()
    }

    /// Convert the recorded outcome into the caller-visible result,
    /// honoring `check_rc`.
    fn report_outcome(&self) -> Result<()> {
        match &self.outcome {
            Some(Outcome::Failed { command, exit_code }) if self.options.check_rc => {
                Err(FanoutError::ExitFailure {
                    command: command.clone(),
                    exit_code: *exit_code,
                })
            }
            _ => Ok(()),
        }
    }

    /// Spawn one child per command, then wait on every handle in launch
    /// order.
    fn launch_and_join(&self) -> Result<Outcome> {
        if self.options.max_in_flight == Some(0) {
            return Err(FanoutError::UserError(
                "max_in_flight must be at least 1".to_string(),
            ));
        }

        // Open the shared sink once; every child gets a clone of the same
        // handle, so all output interleaves into a single destination.
        let sink = match &self.options.stdout {
            Some(path) => Some(File::create(path).map_err(|e| {
                FanoutError::UserError(format!(
                    "failed to create stdout sink '{}': {}",
                    path.display(),
                    e
                ))
            })?),
            None => None,
        };

        let mut in_flight: VecDeque<LaunchHandle> = VecDeque::new();
        let mut first_failure: Option<(BuiltCommand, i32)> = None;

        for command in &self.commands {
            // Admission gate: with a bound set, make room by joining the
            // oldest outstanding child before spawning the next one.
            if let Some(cap) = self.options.max_in_flight {
                while in_flight.len() >= cap {
                    let Some(handle) = in_flight.pop_front() else {
                        break;
                    };
                    self.join_one(handle, &mut first_failure)?;
                }
            }

            self.options.log.launched(command);

            let mut cmd = Command::new(command.program());
            cmd.args(command.args());
            if let Some(file) = &sink {
                let handle = file.try_clone().map_err(|e| {
                    FanoutError::UserError(format!("failed to clone stdout sink: {}", e))
                })?;
                cmd.stdout(Stdio::from(handle));
            }

            let child = cmd.spawn().map_err(|source| FanoutError::SpawnFailure {
                command: command.clone(),
                source,
            })?;
            in_flight.push_back(LaunchHandle {
                child,
                command: command.clone(),
            });
        }

        while let Some(handle) = in_flight.pop_front() {
            self.join_one(handle, &mut first_failure)?;
        }

        Ok(match first_failure {
            Some((command, exit_code)) => Outcome::Failed { command, exit_code },
            None => Outcome::Success,
        })
    }

    /// Wait one handle to completion, recording the first non-zero exit.
    fn join_one(
        &self,
        mut handle: LaunchHandle,
        first_failure: &mut Option<(BuiltCommand, i32)>,
    ) -> Result<()> {
        let status = handle.child.wait().map_err(|e| {
            FanoutError::UserError(format!("failed to wait on `{}`: {}", handle.command, e))
        })?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            self.options.log.exited_nonzero(&handle.command, exit_code);
            if first_failure.is_none() {
                *first_failure = Some((handle.command, exit_code));
            }
        }

        Ok(())
    }
}
