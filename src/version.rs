//! Format versioning constants for chat scripts.

/// Current schema version for JSON chat scripts.
/// Increment MINOR for compatible changes, MAJOR for breaking changes.
pub const SCRIPT_SCHEMA_VERSION: &str = "1.0";
