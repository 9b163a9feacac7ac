pub mod command;
#[cfg(unix)]
mod process_group;
pub mod runner;
pub mod verbosity;

pub use command::CommandSpec;

use crate::error::{Error, Result};
use runner::{run_command, RunOptions, Tee};
use std::path::{Path, PathBuf};
use std::time::Duration;
use verbosity::Verbosity;

/// Outcome of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit status (0 = success)
    pub exit_code: i32,
    /// Captured stdout and stderr, interleaved as written
    pub output: String,
    /// Wall-clock time
    pub duration: Duration,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs one external command at a time on behalf of a task.
///
/// Returns `Ok` for any command that ran, whatever its exit status; `Err`
/// only when the command could not be started.
pub trait CommandExecutor {
    fn execute(&mut self, task: &str, command: &CommandSpec) -> Result<CommandOutcome>;
}

/// Executes commands as real subprocesses
#[derive(Debug)]
pub struct ProcessExecutor {
    /// Project root; commands run here unless they set their own `cwd`
    working_dir: PathBuf,
    /// Optional per-command timeout
    timeout: Option<Duration>,
    /// Copy command output to the terminal while it runs
    stream_output: bool,
    /// Stdout carries a JSON report, so teed output goes to stderr
    stdout_reserved: bool,
    verbosity: Verbosity,
}

impl ProcessExecutor {
    pub fn new(working_dir: &Path, verbosity: Verbosity) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            timeout: None,
            stream_output: verbosity.should_stream_output(),
            stdout_reserved: false,
            verbosity,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stream_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }

    pub fn with_stdout_reserved(mut self, reserved: bool) -> Self {
        self.stdout_reserved = reserved;
        self
    }

    /// Whether output already reached the terminal while commands ran
    pub fn streams_output(&self) -> bool {
        self.stream_output
    }

    /// Where `command`'s output is teed, if anywhere
    ///
    /// Interactive commands are always teed so their prompts are visible.
    fn tee_for(&self, command: &CommandSpec) -> Option<Tee> {
        if !self.stream_output && !command.interactive {
            return None;
        }
        Some(if self.stdout_reserved {
            Tee::Stderr
        } else {
            Tee::Stdout
        })
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&mut self, task: &str, command: &CommandSpec) -> Result<CommandOutcome> {
        if self.verbosity.should_echo_commands() {
            eprintln!("\u{25b8} {}: {}", task, command);
        }
        if self.verbosity.should_show_execution_details() {
            eprintln!("  Working dir: {}", self.working_dir.display());
            for (key, value) in &command.env {
                eprintln!("  Env: {}={}", key, value);
            }
            if let Some(timeout) = self.timeout {
                eprintln!("  Timeout: {}s", timeout.as_secs());
            }
        }

        let mut options = RunOptions::new()
            .with_working_dir(&self.working_dir)
            .with_tee(self.tee_for(command));
        if let Some(timeout) = self.timeout {
            options = options.with_timeout(timeout);
        }

        let result = run_command(command, options).map_err(|source| Error::Spawn {
            task: task.to_string(),
            program: command.program.clone(),
            source,
        })?;

        if !result.completed {
            tracing::warn!(task, exit_code = result.exit_code, "command was terminated by a signal");
        }

        Ok(CommandOutcome {
            exit_code: result.exit_code,
            output: result.output,
            duration: result.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success_is_exit_zero() {
        assert!(CommandOutcome::default().is_success());
        let failed = CommandOutcome {
            exit_code: 2,
            ..CommandOutcome::default()
        };
        assert!(!failed.is_success());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_executor_runs_in_working_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut executor = ProcessExecutor::new(temp.path(), Verbosity::Quiet);
        let outcome = executor
            .execute("where", &CommandSpec::new("pwd"))
            .unwrap();
        assert!(outcome.is_success());
        let reported = std::path::PathBuf::from(outcome.output.trim_end());
        assert_eq!(
            reported.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_process_executor_reports_spawn_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut executor = ProcessExecutor::new(temp.path(), Verbosity::Quiet);
        let err = executor
            .execute("broken", &CommandSpec::new("/nonexistent/recipe-test-binary"))
            .unwrap_err();
        match err {
            Error::Spawn { task, program, .. } => {
                assert_eq!(task, "broken");
                assert_eq!(program, "/nonexistent/recipe-test-binary");
            }
            other => panic!("Expected Spawn error, got {:?}", other),
        }
    }

    #[test]
    fn test_stream_output_follows_verbosity() {
        let dir = Path::new(".");
        assert!(!ProcessExecutor::new(dir, Verbosity::Default).streams_output());
        assert!(ProcessExecutor::new(dir, Verbosity::Verbose).streams_output());
        assert!(ProcessExecutor::new(dir, Verbosity::Default)
            .with_stream_output(true)
            .streams_output());
    }

    #[test]
    fn test_interactive_commands_are_always_teed() {
        let dir = Path::new(".");
        let prompt = CommandSpec::new("poetry").arg("publish").interactive(true);
        let plain = CommandSpec::new("poetry").arg("build");

        let quiet = ProcessExecutor::new(dir, Verbosity::Quiet);
        assert_eq!(quiet.tee_for(&plain), None);
        assert_eq!(quiet.tee_for(&prompt), Some(Tee::Stdout));

        let json = ProcessExecutor::new(dir, Verbosity::Default)
            .with_stream_output(false)
            .with_stdout_reserved(true);
        assert_eq!(json.tee_for(&prompt), Some(Tee::Stderr));

        let streaming = ProcessExecutor::new(dir, Verbosity::Verbose);
        assert_eq!(streaming.tee_for(&plain), Some(Tee::Stdout));
    }
}
