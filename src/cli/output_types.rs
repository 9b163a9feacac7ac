//! Output types for CLI commands
//!
//! Each command builds one of these structs and serializes it with
//! `CommandOutput::to_json` when `--format json` is selected.

use crate::task::executor::TaskResult;
use crate::task::plan::ExecutionPlan;
use crate::task::{task_description, Task};
use serde::Serialize;

/// Trait for command outputs that can be serialized to JSON
pub trait CommandOutput: Serialize {
    /// Serialize to pretty-printed JSON string
    fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// =============================================================================
// TaskOutput
// =============================================================================

/// Output for running a task
#[derive(Debug, Serialize)]
pub struct TaskOutput {
    /// Name of the requested task
    pub task_name: String,
    /// Whether all commands succeeded
    pub success: bool,
    /// Exit code (0=success)
    pub exit_code: i32,
    /// Total execution time in seconds
    pub duration_secs: f64,
    /// Number of commands that ran
    pub command_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    /// Final state of each planned task, in plan order
    pub tasks: Vec<TaskStateOutput>,
    /// Planned tasks that never started
    pub skipped: Vec<String>,
    /// Results for individual commands
    pub commands: Vec<CommandResultOutput>,
    /// Why the run stopped, when a command could not be started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutput for TaskOutput {}

impl From<&TaskResult> for TaskOutput {
    fn from(result: &TaskResult) -> Self {
        Self {
            task_name: result.name.clone(),
            success: result.success,
            exit_code: result.exit_code,
            duration_secs: result.duration.as_secs_f64(),
            command_count: result.command_results.len(),
            success_count: result.success_count(),
            failed_count: result.failed_count(),
            tasks: result
                .task_states
                .iter()
                .map(|(name, state)| TaskStateOutput {
                    name: name.clone(),
                    state: state.as_str().to_string(),
                })
                .collect(),
            skipped: result
                .skipped_tasks()
                .into_iter()
                .map(String::from)
                .collect(),
            commands: result
                .command_results
                .iter()
                .map(|r| CommandResultOutput {
                    task: r.task.clone(),
                    command: r.command.to_string(),
                    success: r.success,
                    exit_code: r.exit_code,
                    duration_secs: r.duration.as_secs_f64(),
                    output: if r.success { None } else { Some(r.output.clone()) },
                })
                .collect(),
            error: result.spawn_error.as_ref().map(ToString::to_string),
        }
    }
}

/// State of one task after the run
#[derive(Debug, Serialize)]
pub struct TaskStateOutput {
    pub name: String,
    /// pending, running, succeeded or failed
    pub state: String,
}

/// Individual command result within a task run
#[derive(Debug, Serialize)]
pub struct CommandResultOutput {
    /// Task the command belongs to
    pub task: String,
    /// Command line as displayed
    pub command: String,
    pub success: bool,
    pub exit_code: i32,
    /// Execution time in seconds
    pub duration_secs: f64,
    /// Captured output, only for the failing command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

// =============================================================================
// PlanOutput
// =============================================================================

/// Output for `--dry-run`
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub task_name: String,
    /// Task names in execution order
    pub tasks: Vec<String>,
    /// Commands in execution order
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Serialize)]
pub struct PlanStep {
    pub task: String,
    pub command: String,
}

impl CommandOutput for PlanOutput {}

impl From<&ExecutionPlan> for PlanOutput {
    fn from(plan: &ExecutionPlan) -> Self {
        Self {
            task_name: plan.target.clone(),
            tasks: plan.task_names().into_iter().map(String::from).collect(),
            steps: plan
                .steps()
                .map(|(task, command)| PlanStep {
                    task: task.to_string(),
                    command: command.to_string(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// TaskListOutput
// =============================================================================

/// Output for `recipe --list`
#[derive(Debug, Serialize)]
pub struct TaskListOutput {
    /// Number of tasks defined
    pub task_count: usize,
    /// "builtin" or the config file the tasks came from
    pub source: String,
    /// List of task info
    pub tasks: Vec<TaskInfo>,
}

/// Information about a single task
#[derive(Debug, Serialize)]
pub struct TaskInfo {
    /// Task name
    pub name: String,
    /// Task description
    pub description: String,
    /// Direct prerequisites, in declared order
    pub deps: Vec<String>,
}

impl From<&Task> for TaskInfo {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            description: task_description(task),
            deps: task.deps.clone(),
        }
    }
}

impl CommandOutput for TaskListOutput {}

// =============================================================================
// InitOutput
// =============================================================================

/// Output for `recipe init`
#[derive(Debug, Serialize)]
pub struct InitOutput {
    /// 'success' or 'error'
    pub status: String,
    /// Path of the written config file
    pub path: std::path::PathBuf,
}

impl CommandOutput for InitOutput {}
