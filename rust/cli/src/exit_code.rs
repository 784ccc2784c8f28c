//! Process exit codes returned by [`crate::run`].

/// Command completed.
pub const SUCCESS: i32 = 0;

/// Usage error, invalid input, failed validation or I/O failure.
pub const ERROR: i32 = 2;

/// Input closed or interrupted before the command finished.
pub const INTERRUPTED: i32 = 130;
