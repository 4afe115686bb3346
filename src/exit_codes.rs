//! Exit code constants for the fanout CLI.
//!
//! - 0: Success
//! - 1: User error (bad template, malformed batch, bad invocation)
//! - 2: Child failure (a launched command exited non-zero)
//! - 3: Spawn failure (the OS refused to start a child process)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: invalid template, malformed batch, or bad arguments.
pub const USER_ERROR: i32 = 1;

/// Child failure: a launched command exited with a non-zero code.
pub const CHILD_FAILURE: i32 = 2;

/// Spawn failure: missing executable, permission denied, or similar.
pub const SPAWN_FAILURE: i32 = 3;
