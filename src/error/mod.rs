pub mod codes;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),

    #[error("{}", unknown_task_message(.name, .required_by.as_deref(), .suggestions))]
    UnknownTask {
        name: String,
        /// Task whose prerequisite list names the missing task
        required_by: Option<String>,
        /// "Did you mean" candidates
        suggestions: Vec<String>,
    },

    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Task '{task}': `{command}` failed with exit code {exit_code}")]
    ExternalCommand {
        task: String,
        command: String,
        exit_code: i32,
        /// Captured stdout and stderr, interleaved as written
        output: String,
    },

    #[error("Task '{task}': failed to start `{program}`: {source}")]
    Spawn {
        task: String,
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

fn unknown_task_message(name: &str, required_by: Option<&str>, suggestions: &[String]) -> String {
    let mut msg = match required_by {
        Some(parent) => format!("Task '{}' requires unknown task '{}'", parent, name),
        None => format!("Unknown task '{}'", name),
    };
    if !suggestions.is_empty() {
        msg.push_str(&format!("\n\nDid you mean '{}'?", suggestions.join("', '")));
    }
    msg
}

impl Error {
    /// Process exit code to report for this error
    pub fn exit_code(&self) -> i32 {
        codes::error_to_exit_code(self)
    }
}
