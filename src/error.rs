//! Error types for the fanout CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use crate::template::BuiltCommand;
use thiserror::Error;

/// Main error type for fanout operations.
///
/// The first four variants are pre-launch validation failures: they are
/// detected before any child process is spawned, so a batch that fails
/// validation has zero side effects on the OS. `SpawnFailure` and
/// `ExitFailure` are post-launch outcomes.
#[derive(Error, Debug)]
pub enum FanoutError {
    /// Template is empty, unparseable, or contains no substitution slots.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Substitution batch mixes bare strings and records.
    #[error("substitution batch mixes bare strings and records; use one form for the whole batch")]
    HeterogeneousBatch,

    /// Records in the batch differ in length from one another.
    #[error("substitution record {index} has {found} values, but earlier records have {expected}")]
    ArityMismatch {
        /// Length of the first record in the batch.
        expected: usize,
        /// Length of the offending record.
        found: usize,
        /// Zero-based position of the offending record in the batch.
        index: usize,
    },

    /// Record length does not equal the template's slot count.
    #[error("template has {slots} slot(s) but each record carries {arity} value(s)")]
    PlaceholderCountMismatch {
        /// Number of `{}` slots in the template.
        slots: usize,
        /// Length of the records in the batch.
        arity: usize,
    },

    /// The OS refused to create a child process.
    #[error("failed to spawn `{command}`: {source}\nFix: ensure the command is installed and in PATH.")]
    SpawnFailure {
        /// The command that could not be started.
        command: BuiltCommand,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// A launched child terminated with a non-zero exit code.
    #[error("command `{command}` exited with code {exit_code}")]
    ExitFailure {
        /// The command that failed.
        command: BuiltCommand,
        /// The child's exit code (-1 if terminated by a signal).
        exit_code: i32,
    },

    /// User provided invalid arguments or input files.
    #[error("{0}")]
    UserError(String),
}

impl FanoutError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            FanoutError::InvalidTemplate(_)
            | FanoutError::HeterogeneousBatch
            | FanoutError::ArityMismatch { .. }
            | FanoutError::PlaceholderCountMismatch { .. }
            | FanoutError::UserError(_) => exit_codes::USER_ERROR,
            FanoutError::ExitFailure { .. } => exit_codes::CHILD_FAILURE,
            FanoutError::SpawnFailure { .. } => exit_codes::SPAWN_FAILURE,
        }
    }
}

/// Result type alias for fanout operations.
pub type Result<T> = std::result::Result<T, FanoutError>;
