//! Exit code mappings
//!
//! Failed external commands propagate their own exit status. Every other
//! error maps to a fixed code so scripts and CI can tell them apart.

use super::Error;
use std::io::ErrorKind;

/// Generic failure (IO, JSON)
pub const EXIT_FAILURE: i32 = 1;
/// Bad invocation (extra arguments, missing task name)
pub const EXIT_USAGE: i32 = 2;
/// Invalid or unreadable recipe.toml
pub const EXIT_CONFIG: i32 = 3;
/// Unknown task or cyclic prerequisites
pub const EXIT_TASK_GRAPH: i32 = 5;
/// Program exists but could not be executed
pub const EXIT_CANNOT_EXECUTE: i32 = 126;
/// Program not found
pub const EXIT_NOT_FOUND: i32 = 127;

/// Map an error to the process exit code
///
/// # Examples
///
/// ```
/// use recipe::error::codes::{error_to_exit_code, EXIT_TASK_GRAPH};
/// use recipe::error::Error;
///
/// let err = Error::CyclicDependency { cycle: vec!["a".into(), "a".into()] };
/// assert_eq!(error_to_exit_code(&err), EXIT_TASK_GRAPH);
/// ```
pub fn error_to_exit_code(error: &Error) -> i32 {
    match error {
        Error::Io(_) | Error::Json(_) => EXIT_FAILURE,
        Error::Usage(_) => EXIT_USAGE,
        Error::Config(_) => EXIT_CONFIG,
        Error::UnknownTask { .. } | Error::CyclicDependency { .. } => EXIT_TASK_GRAPH,
        // A zero status can't represent failure; fall back to the generic code
        Error::ExternalCommand { exit_code, .. } if *exit_code != 0 => *exit_code,
        Error::ExternalCommand { .. } => EXIT_FAILURE,
        Error::Spawn { source, .. } if source.kind() == ErrorKind::NotFound => EXIT_NOT_FOUND,
        Error::Spawn { .. } => EXIT_CANNOT_EXECUTE,
    }
}
