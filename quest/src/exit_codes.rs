//! Stable exit codes for quest CLI commands.

/// Command succeeded, or `check` returned `valid`/`warning` feedback.
pub const OK: i32 = 0;
/// Command failed due to invalid config, input files or other errors.
pub const INVALID: i32 = 1;
/// `quest check` returned `error` feedback for the given step.
pub const BLOCKED: i32 = 2;
