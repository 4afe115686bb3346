//! Command implementations for fanout.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the shared helper that turns CLI input into a
//! substitution batch.

mod plan;
mod run;

use crate::cli::Command;
use crate::error::{FanoutError, Result};
use crate::subs::{self, SubEntry};
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Plan(args) => plan::cmd_plan(args),
    }
}

/// Build the substitution batch from positional values or a batch file.
pub(crate) fn gather_entries(
    values: &[String],
    subs_file: Option<&Path>,
) -> Result<Vec<SubEntry>> {
    match subs_file {
        Some(path) => subs::load_entries(path),
        None if values.is_empty() => Err(FanoutError::UserError(
            "no substitution values given; pass values after the template or use --subs-file"
                .to_string(),
        )),
        None => Ok(values.iter().map(|v| SubEntry::from(v.clone())).collect()),
    }
}
