//! Task execution engine
//!
//! Runs a resolved plan one command at a time and stops at the first failure.

use crate::error::{Error, Result};
use crate::executor::{CommandExecutor, CommandSpec};
use crate::task::plan::ExecutionPlan;
use crate::task::TaskGraph;
use std::time::Duration;

/// Lifecycle of one task within an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not started (never reached if an earlier command failed)
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        }
    }
}

/// Result of running a single command
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Task the command belongs to
    pub task: String,
    pub command: CommandSpec,
    pub success: bool,
    pub exit_code: i32,
    /// Stdout and stderr, interleaved as written
    pub output: String,
    pub duration: Duration,
}

/// Result of running a task with its prerequisites
#[derive(Debug)]
pub struct TaskResult {
    /// Name of the requested task
    pub name: String,
    /// Whether all commands succeeded
    pub success: bool,
    /// Exit code (0 if all succeeded, the failing command's code otherwise)
    pub exit_code: i32,
    /// Total duration for all commands
    pub duration: Duration,
    /// Results for the commands that ran, in order
    pub command_results: Vec<CommandResult>,
    /// Final state of every planned task, in plan order
    pub task_states: Vec<(String, TaskState)>,
    /// Set when a command could not be started at all
    pub spawn_error: Option<Error>,
}

impl TaskResult {
    /// Create a successful empty result
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            exit_code: 0,
            duration: Duration::ZERO,
            command_results: vec![],
            task_states: vec![],
            spawn_error: None,
        }
    }

    /// Add a command result
    pub fn add_result(&mut self, result: CommandResult) {
        if !result.success && self.success {
            self.success = false;
            self.exit_code = result.exit_code;
        }
        self.duration += result.duration;
        self.command_results.push(result);
    }

    /// The command that failed, if any
    pub fn failure(&self) -> Option<&CommandResult> {
        self.command_results.iter().find(|r| !r.success)
    }

    /// Planned tasks that never started
    pub fn skipped_tasks(&self) -> Vec<&str> {
        self.task_states
            .iter()
            .filter(|(_, state)| *state == TaskState::Pending)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Get the number of successful commands
    pub fn success_count(&self) -> usize {
        self.command_results.iter().filter(|r| r.success).count()
    }

    /// Get the number of failed commands
    pub fn failed_count(&self) -> usize {
        self.command_results.iter().filter(|r| !r.success).count()
    }

    /// End the run because a command could not be started
    fn fail_to_start(&mut self, err: Error) {
        self.success = false;
        self.exit_code = err.exit_code();
        self.spawn_error = Some(err);
    }

    /// The error that ended the run, if any
    pub fn into_error(self) -> Option<Error> {
        if let Some(err) = self.spawn_error {
            return Some(err);
        }
        self.command_results
            .into_iter()
            .find(|r| !r.success)
            .map(|f| Error::ExternalCommand {
                task: f.task,
                command: f.command.to_string(),
                exit_code: f.exit_code,
                output: f.output,
            })
    }

    fn set_state(&mut self, task: &str, state: TaskState) {
        if let Some(entry) = self.task_states.iter_mut().find(|(name, _)| name == task) {
            entry.1 = state;
        }
    }
}

/// Task execution context
pub struct TaskExecutor<'a, E: CommandExecutor> {
    /// The task graph
    graph: &'a TaskGraph,
    /// Runs the external commands
    executor: &'a mut E,
}

impl<'a, E: CommandExecutor> TaskExecutor<'a, E> {
    /// Create a new task executor
    pub fn new(graph: &'a TaskGraph, executor: &'a mut E) -> Self {
        Self { graph, executor }
    }

    /// Resolve a task without running anything
    pub fn plan(&self, task_name: &str) -> Result<ExecutionPlan> {
        self.graph.resolve(task_name)
    }

    /// Execute a task by name
    ///
    /// Unknown names and cycles fail before any command runs. A command that
    /// exits non-zero or cannot be started is not an `Err`: it ends the run
    /// and is reported in the returned `TaskResult`, next to the commands
    /// that already ran.
    pub fn execute(&mut self, task_name: &str) -> Result<TaskResult> {
        let plan = self.plan(task_name)?;
        self.execute_plan(&plan)
    }

    /// Execute an already-resolved plan
    pub fn execute_plan(&mut self, plan: &ExecutionPlan) -> Result<TaskResult> {
        let mut result = TaskResult::empty(&plan.target);
        result.task_states = plan
            .tasks
            .iter()
            .map(|t| (t.name.clone(), TaskState::Pending))
            .collect();

        for task in &plan.tasks {
            result.set_state(&task.name, TaskState::Running);
            tracing::info!(task = %task.name, commands = task.commands.len(), "running task");

            for command in &task.commands {
                let outcome = match self.executor.execute(&task.name, command) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::info!(task = %task.name, error = %e, "command could not start");
                        result.set_state(&task.name, TaskState::Failed);
                        result.fail_to_start(e);
                        return Ok(result);
                    }
                };

                let success = outcome.is_success();
                result.add_result(CommandResult {
                    task: task.name.clone(),
                    command: command.clone(),
                    success,
                    exit_code: outcome.exit_code,
                    output: outcome.output,
                    duration: outcome.duration,
                });

                // Stop on first failure
                if !success {
                    tracing::info!(task = %task.name, exit_code = result.exit_code, "command failed");
                    result.set_state(&task.name, TaskState::Failed);
                    return Ok(result);
                }
            }

            result.set_state(&task.name, TaskState::Succeeded);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::CommandOutcome;
    use crate::task::Task;

    /// Records every command and fails the one at `fail_at` (0-indexed)
    struct RecordingExecutor {
        calls: Vec<(String, String)>,
        fail_at: Option<(usize, i32)>,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            Self {
                calls: vec![],
                fail_at: None,
            }
        }

        fn failing_at(index: usize, exit_code: i32) -> Self {
            Self {
                calls: vec![],
                fail_at: Some((index, exit_code)),
            }
        }
    }

    impl CommandExecutor for RecordingExecutor {
        fn execute(&mut self, task: &str, command: &CommandSpec) -> Result<CommandOutcome> {
            let index = self.calls.len();
            self.calls.push((task.to_string(), command.to_string()));
            match self.fail_at {
                Some((at, code)) if at == index => Ok(CommandOutcome {
                    exit_code: code,
                    output: "partial\nboom\n".to_string(),
                    duration: Duration::from_millis(5),
                }),
                _ => Ok(CommandOutcome {
                    duration: Duration::from_millis(5),
                    ..CommandOutcome::default()
                }),
            }
        }
    }

    fn graph() -> TaskGraph {
        let echo = |s: &str| CommandSpec::new("echo").arg(s);
        TaskGraph::from_tasks(vec![
            Task::new("a").with_commands(vec![echo("a1"), echo("a2")]),
            Task::new("b").with_deps(["a"]).with_commands(vec![echo("b1")]),
            Task::new("c")
                .with_deps(["a", "b"])
                .with_commands(vec![echo("c1"), echo("c2")]),
        ])
    }

    #[test]
    fn test_task_result_empty() {
        let result = TaskResult::empty("test");
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.success_count(), 0);
        assert_eq!(result.failed_count(), 0);
        assert!(result.failure().is_none());
        assert!(result.into_error().is_none());
    }

    #[test]
    fn test_runs_every_command_once_in_order() {
        let graph = graph();
        let mut recorder = RecordingExecutor::new();
        let result = TaskExecutor::new(&graph, &mut recorder).execute("c").unwrap();

        assert!(result.success);
        assert_eq!(result.command_results.len(), 5);
        assert_eq!(result.duration, Duration::from_millis(25));
        let commands: Vec<_> = recorder.calls.iter().map(|(_, c)| c.as_str()).collect();
        assert_eq!(
            commands,
            vec!["echo a1", "echo a2", "echo b1", "echo c1", "echo c2"]
        );
        assert!(result
            .task_states
            .iter()
            .all(|(_, s)| *s == TaskState::Succeeded));
    }

    #[test]
    fn test_kth_failure_stops_run() {
        let graph = graph();
        // Third command (echo b1) fails
        let mut recorder = RecordingExecutor::failing_at(2, 7);
        let result = TaskExecutor::new(&graph, &mut recorder).execute("c").unwrap();

        assert_eq!(recorder.calls.len(), 3);
        assert!(!result.success);
        assert_eq!(result.exit_code, 7);
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failed_count(), 1);

        let failure = result.failure().unwrap();
        assert_eq!(failure.task, "b");
        assert_eq!(failure.output, "partial\nboom\n");

        assert_eq!(
            result.task_states,
            vec![
                ("a".to_string(), TaskState::Succeeded),
                ("b".to_string(), TaskState::Failed),
                ("c".to_string(), TaskState::Pending),
            ]
        );
        assert_eq!(result.skipped_tasks(), vec!["c"]);
    }

    #[test]
    fn test_failure_converts_to_external_command_error() {
        let graph = graph();
        let mut recorder = RecordingExecutor::failing_at(0, 2);
        let result = TaskExecutor::new(&graph, &mut recorder).execute("a").unwrap();

        match result.into_error() {
            Some(Error::ExternalCommand {
                task,
                command,
                exit_code,
                output,
            }) => {
                assert_eq!(task, "a");
                assert_eq!(command, "echo a1");
                assert_eq!(exit_code, 2);
                assert_eq!(output, "partial\nboom\n");
            }
            other => panic!("Expected ExternalCommand, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_task_runs_nothing() {
        let graph = graph();
        let mut recorder = RecordingExecutor::new();
        let err = TaskExecutor::new(&graph, &mut recorder)
            .execute("nope")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTask { .. }));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_cycle_runs_nothing() {
        let graph = TaskGraph::from_tasks(vec![
            Task::new("x")
                .with_deps(["y"])
                .with_commands(vec![CommandSpec::new("true")]),
            Task::new("y")
                .with_deps(["x"])
                .with_commands(vec![CommandSpec::new("true")]),
        ]);
        let mut recorder = RecordingExecutor::new();
        let err = TaskExecutor::new(&graph, &mut recorder)
            .execute("x")
            .unwrap_err();
        assert!(matches!(err, Error::CyclicDependency { .. }));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn test_noop_task_succeeds() {
        let graph = TaskGraph::builtin();
        let mut recorder = RecordingExecutor::new();
        let result = TaskExecutor::new(&graph, &mut recorder)
            .execute("test")
            .unwrap();
        assert!(result.success);
        assert!(recorder.calls.is_empty());
        assert_eq!(
            result.task_states,
            vec![("test".to_string(), TaskState::Succeeded)]
        );
    }

    #[test]
    fn test_spawn_error_keeps_completed_commands() {
        /// Runs commands until it meets `missing`, which it cannot start
        struct MissingProgram {
            missing: &'static str,
            ran: usize,
        }
        impl CommandExecutor for MissingProgram {
            fn execute(&mut self, task: &str, command: &CommandSpec) -> Result<CommandOutcome> {
                if command.to_string() == self.missing {
                    return Err(Error::Spawn {
                        task: task.to_string(),
                        program: command.program.clone(),
                        source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                    });
                }
                self.ran += 1;
                Ok(CommandOutcome::default())
            }
        }

        let graph = graph();
        let mut executor = MissingProgram {
            missing: "echo b1",
            ran: 0,
        };
        let result = TaskExecutor::new(&graph, &mut executor)
            .execute("c")
            .unwrap();

        assert_eq!(executor.ran, 2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 127);
        assert_eq!(result.command_results.len(), 2);
        assert!(result.command_results.iter().all(|r| r.success));
        assert!(result.failure().is_none());
        assert_eq!(
            result.task_states,
            vec![
                ("a".to_string(), TaskState::Succeeded),
                ("b".to_string(), TaskState::Failed),
                ("c".to_string(), TaskState::Pending),
            ]
        );
        assert!(matches!(
            result.into_error(),
            Some(Error::Spawn { ref program, .. }) if program == "echo"
        ));
    }
}
