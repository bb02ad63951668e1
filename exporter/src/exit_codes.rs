//! Stable exit codes for the `export-tdesc` command.

/// Export finished, or usage was printed for an empty module name.
pub const OK: i32 = 0;
/// The export run ended in the failed state.
pub const FAILED: i32 = 1;
/// Invalid invocation, configuration, or host catalog.
pub const INVALID: i32 = 2;
