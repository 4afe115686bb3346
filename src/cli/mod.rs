//! CLI argument parsing for fanout.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fanout: run one command template against many substitution values as
/// parallel child processes.
///
/// A template is a single shell-quoted string in which the token `{}`
/// marks a substitution slot:
///
///   fanout run 'gzip -k {}' a.log b.log c.log
///
/// Multi-slot templates take their values from a YAML or JSON batch file
/// of fixed-length records:
///
///   fanout run 'cp {} {}' --subs-file pairs.yaml
#[derive(Parser, Debug)]
#[command(name = "fanout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for fanout.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch every built command and wait for all of them.
    ///
    /// Children are spawned without waiting on one another; the batch
    /// fails if any child exits non-zero (unless --no-check-rc).
    Run(RunArgs),

    /// Print the built commands without launching anything.
    ///
    /// One shell-quoted command per line, in batch order. Useful as a
    /// dry run before `fanout run`.
    Plan(PlanArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Command template; the token `{}` marks a substitution slot.
    pub template: String,

    /// Substitution values, one command per value (single-slot templates).
    pub values: Vec<String>,

    /// YAML or JSON file with substitution values or fixed-length records.
    #[arg(long, conflicts_with = "values")]
    pub subs_file: Option<PathBuf>,

    /// Redirect every child's stdout into this file.
    #[arg(long)]
    pub stdout: Option<PathBuf>,

    /// Ignore child exit codes; the run only fails on spawn errors.
    #[arg(long)]
    pub no_check_rc: bool,

    /// Maximum number of children running at once (default: unbounded).
    #[arg(long)]
    pub max_procs: Option<usize>,

    /// Append NDJSON launch/exit records to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Arguments for the `plan` command.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Command template; the token `{}` marks a substitution slot.
    pub template: String,

    /// Substitution values, one command per value (single-slot templates).
    pub values: Vec<String>,

    /// YAML or JSON file with substitution values or fixed-length records.
    #[arg(long, conflicts_with = "values")]
    pub subs_file: Option<PathBuf>,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
