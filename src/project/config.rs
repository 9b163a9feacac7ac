//! recipe.toml configuration file parsing and validation
//!
//! Handles loading, parsing, and validating project configuration from `recipe.toml`.
//! All fields have sensible defaults, so an empty or missing config file works.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "recipe.toml";

/// Project configuration loaded from recipe.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Project-level settings
    pub project: ProjectSection,
    /// Execution settings
    pub run: RunSection,
    /// Task definitions (replace the built-in recipes when non-empty)
    pub tasks: TasksSection,
}

/// Project-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectSection {
    /// Project name (for display purposes)
    pub name: Option<String>,
    /// Project description
    pub description: Option<String>,
}

/// Execution settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSection {
    /// Per-command timeout in seconds (0 disables the timeout)
    pub timeout_seconds: u64,
    /// When to show the output of external commands
    pub show_output: ShowOutput,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            timeout_seconds: 0,
            show_output: ShowOutput::OnFailure,
        }
    }
}

impl RunSection {
    /// Configured timeout, if any
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_seconds > 0).then(|| std::time::Duration::from_secs(self.timeout_seconds))
    }
}

/// When command output reaches the terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShowOutput {
    /// Stream output live while the command runs
    Always,
    /// Print the captured output of the failing command only
    #[default]
    OnFailure,
    /// Never print command output
    Never,
}

/// Task definitions keyed by task name
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TasksSection {
    #[serde(flatten)]
    pub tasks: HashMap<String, TaskDef>,
}

/// Task definition - supports multiple formats via untagged enum
///
/// # Examples
///
/// Simple format (a single command line):
/// ```toml
/// clean = "rm -rf dist/ build/"
/// ```
///
/// Sequence format (command lines run in order):
/// ```toml
/// setup = ["poetry install", "poetry run pre-commit install"]
/// ```
///
/// Detailed format (prerequisites, description, structured commands):
/// ```toml
/// lint = { deps = ["black", "flake8"], description = "Run all linters" }
/// docs = { commands = [{ argv = ["sphinx-build", ".", "_build"], cwd = "docs" }] }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TaskDef {
    /// Simple: one command line - `clean = "rm -rf dist/"`
    Simple(String),
    /// Sequence: commands run in order - `setup = ["poetry install", "..."]`
    Sequence(Vec<CommandDef>),
    /// Detailed: object form with prerequisites and description
    Detailed(DetailedTask),
}

/// Detailed task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedTask {
    /// Human-readable description of the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tasks that must complete before this one, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
    /// Commands to run, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandDef>,
    /// Commands may prompt; their output is shown live whatever `show_output` says
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub interactive: bool,
}

/// A single command as written in recipe.toml
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CommandDef {
    /// Command line, split with shell-word rules (never run through a shell)
    Line(String),
    /// Structured form with explicit argv
    Detailed {
        argv: Vec<String>,
        /// Working directory relative to the project root
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<PathBuf>,
        /// Extra environment variables
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
}

impl TaskDef {
    /// Prerequisite task names, in declared order
    pub fn deps(&self) -> &[String] {
        match self {
            TaskDef::Simple(_) | TaskDef::Sequence(_) => &[],
            TaskDef::Detailed(detailed) => &detailed.deps,
        }
    }

    /// Command definitions, in declared order
    pub fn commands(&self) -> Vec<CommandDef> {
        match self {
            TaskDef::Simple(line) => vec![CommandDef::Line(line.clone())],
            TaskDef::Sequence(commands) => commands.clone(),
            TaskDef::Detailed(detailed) => detailed.commands.clone(),
        }
    }

    /// Description, if one was given
    pub fn description(&self) -> Option<&str> {
        match self {
            TaskDef::Detailed(detailed) => detailed.description.as_deref(),
            _ => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, TaskDef::Detailed(detailed) if detailed.interactive)
    }
}

/// Load configuration from recipe.toml in the project root.
///
/// Returns `None` if the config file doesn't exist.
/// Returns an error if the file exists but is invalid TOML.
///
/// # Examples
/// ```ignore
/// let config = load_config(Path::new("/path/to/project"))?;
/// if let Some(config) = config {
///     println!("{} tasks", config.tasks.tasks.len());
/// }
/// ```
pub fn load_config(project_root: &Path) -> Result<Option<Config>> {
    let config_path = project_root.join(CONFIG_FILE);

    if !config_path.exists() {
        return Ok(None);
    }

    load_config_file(&config_path).map(Some)
}

/// Load configuration from an explicit file path.
pub fn load_config_file(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read {}: {}",
            config_path.display(),
            e
        ))
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse {}: {}",
            config_path.display(),
            format_toml_error(&e)
        ))
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Format TOML parse error with position information
fn format_toml_error(err: &toml::de::Error) -> String {
    if let Some(span) = err.span() {
        format!("at position {}-{}: {}", span.start, span.end, err.message())
    } else {
        err.message().to_string()
    }
}

/// Validate configuration values.
///
/// Task names must be non-empty and every structured command needs a program.
/// Prerequisite references are checked when a task is resolved, so an
/// undefined name surfaces as an unknown task.
fn validate_config(config: &Config) -> Result<()> {
    for (name, def) in &config.tasks.tasks {
        if name.trim().is_empty() {
            return Err(Error::Config("Task names must not be empty".to_string()));
        }
        for command in def.commands() {
            if let CommandDef::Detailed { argv, .. } = &command {
                if argv.first().map_or(true, |p| p.is_empty()) {
                    return Err(Error::Config(format!(
                        "Task '{}': command has an empty argv",
                        name
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Generate a template recipe.toml with commented defaults.
///
/// Used by `recipe init` to create a discoverable config file.
pub fn generate_config_template() -> &'static str {
    r#"# recipe project configuration

[project]
# name = "alexapy"
# description = "Build recipes"

[run]
# Per-command timeout in seconds (0 = no timeout)
timeout_seconds = 0
# "always" streams command output, "on-failure" prints it when a command fails
show_output = "on-failure"

# Task definitions. When this table has entries it replaces the built-in
# recipes entirely (see `recipe --list` without this file).
# [tasks]
# clean = "rm -rf dist/ build/"
# setup = ["poetry install", "poetry run pre-commit install"]
# black = "poetry run black alexapy"
# flake8 = "poetry run flake8 alexapy"
# lint = { deps = ["black", "flake8"], description = "Run all linters" }
# docs = { commands = [{ argv = ["poetry", "run", "sphinx-build", ".", "_build"], cwd = "docs" }] }
# publish = { commands = ["poetry run semantic-release publish"], interactive = true }
"#
}
