//! Task management module
//!
//! Provides the task set, validation, dependency resolution, and execution
//! for `recipe <TASK>`.

pub mod builtin;
pub mod executor;
pub mod plan;

use crate::error::{Error, Result};
use crate::executor::CommandSpec;
use crate::project::config::{TaskDef, TasksSection};
use crate::project::Project;
use std::collections::{HashMap, HashSet};

/// A named unit of work: prerequisites first, then its own commands in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub description: Option<String>,
    /// Prerequisite task names, in declared order
    pub deps: Vec<String>,
    /// Commands, in declared order
    pub commands: Vec<CommandSpec>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deps: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_commands(mut self, commands: Vec<CommandSpec>) -> Self {
        self.commands = commands;
        self
    }

    /// Build a task from its recipe.toml definition
    pub fn from_def(name: &str, def: &TaskDef) -> Result<Self> {
        let interactive = def.is_interactive();
        let commands = def
            .commands()
            .iter()
            .map(|c| CommandSpec::from_def(name, c).map(|spec| spec.interactive(interactive)))
            .collect::<Result<Vec<_>>>()?;
        let mut task = Task::new(name)
            .with_deps(def.deps().iter().cloned())
            .with_commands(commands);
        task.description = def.description().map(str::to_string);
        Ok(task)
    }
}

/// The immutable set of tasks for one process
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: HashMap<String, Task>,
}

impl TaskGraph {
    /// Create a TaskGraph from tasks; a later duplicate name replaces an earlier one
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// Create a TaskGraph from the `[tasks]` table of recipe.toml
    pub fn from_config(section: &TasksSection) -> Result<Self> {
        let tasks = section
            .tasks
            .iter()
            .map(|(name, def)| Task::from_def(name, def))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_tasks(tasks))
    }

    /// The built-in recipes
    pub fn builtin() -> Self {
        Self::from_tasks(builtin::builtin_tasks())
    }

    /// Tasks for a project: its own `[tasks]` table when present, else the built-ins
    pub fn for_project(project: &Project) -> Result<Self> {
        match project.config {
            Some(ref config) if !config.tasks.tasks.is_empty() => {
                Self::from_config(&config.tasks)
            }
            _ => Ok(Self::builtin()),
        }
    }

    /// Check if a task exists
    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Get a task by name
    pub fn get_task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// List all tasks sorted by name
    pub fn list_tasks(&self) -> Vec<&Task> {
        let mut tasks: Vec<_> = self.tasks.values().collect();
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        tasks
    }

    /// Get the number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolve `name` into its dependency-first execution plan
    pub fn resolve(&self, name: &str) -> Result<plan::ExecutionPlan> {
        plan::ExecutionPlan::resolve(self, name)
    }

    /// Validate the whole graph: every prerequisite exists and there are no cycles.
    ///
    /// Running a task only checks the part of the graph it reaches; this
    /// checks everything.
    pub fn validate(&self) -> Result<()> {
        self.validate_references()?;
        self.validate_no_cycles()
    }

    /// Validate that all prerequisite references exist
    fn validate_references(&self) -> Result<()> {
        for task in self.list_tasks() {
            for dep in &task.deps {
                if !self.tasks.contains_key(dep) {
                    return Err(self.unknown_task(dep, Some(&task.name)));
                }
            }
        }
        Ok(())
    }

    /// Validate that there are no cycles in the task graph using DFS
    fn validate_no_cycles(&self) -> Result<()> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for task in self.list_tasks() {
            if !visited.contains(task.name.as_str()) {
                if let Some(cycle) =
                    self.detect_cycle(&task.name, &mut visited, &mut rec_stack, &mut path)
                {
                    return Err(Error::CyclicDependency { cycle });
                }
            }
        }

        Ok(())
    }

    /// DFS-based cycle detection
    fn detect_cycle<'g>(
        &'g self,
        name: &'g str,
        visited: &mut HashSet<&'g str>,
        rec_stack: &mut HashSet<&'g str>,
        path: &mut Vec<&'g str>,
    ) -> Option<Vec<String>> {
        visited.insert(name);
        rec_stack.insert(name);
        path.push(name);

        if let Some(task) = self.tasks.get(name) {
            for dep in &task.deps {
                if !visited.contains(dep.as_str()) {
                    if let Some(cycle) = self.detect_cycle(dep, visited, rec_stack, path) {
                        return Some(cycle);
                    }
                } else if rec_stack.contains(dep.as_str()) {
                    let start = path.iter().position(|n| *n == dep.as_str()).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
            }
        }

        path.pop();
        rec_stack.remove(name);
        None
    }

    /// Build an `UnknownTask` error with "did you mean" suggestions
    pub(crate) fn unknown_task(&self, name: &str, required_by: Option<&str>) -> Error {
        Error::UnknownTask {
            name: name.to_string(),
            required_by: required_by.map(str::to_string),
            suggestions: self
                .find_similar(name)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Find similar task names for "did you mean" suggestions
    pub fn find_similar(&self, name: &str) -> Vec<&str> {
        let name_lower = name.to_lowercase();
        let first_char: String = name_lower.chars().take(1).collect();
        let mut similar: Vec<_> = self
            .tasks
            .keys()
            .filter(|k| {
                let k_lower = k.to_lowercase();
                // Same first letter, substring either way, or small edit distance
                (!first_char.is_empty() && k_lower.starts_with(&first_char))
                    || k_lower.contains(&name_lower)
                    || name_lower.contains(&k_lower)
                    || levenshtein_distance(&k_lower, &name_lower) <= 2
            })
            .map(|s| s.as_str())
            .collect();
        similar.sort_by_key(|k| (levenshtein_distance(&k.to_lowercase(), &name_lower), *k));
        similar.truncate(3);
        similar
    }
}

/// Simple Levenshtein distance implementation
#[allow(clippy::needless_range_loop)]
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut matrix = vec![vec![0usize; n + 1]; m + 1];

    for i in 0..=m {
        matrix[i][0] = i;
    }
    for j in 0..=n {
        matrix[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[m][n]
}

/// Get a description for a task
pub fn task_description(task: &Task) -> String {
    if let Some(ref desc) = task.description {
        return desc.clone();
    }
    match (task.deps.len(), task.commands.len()) {
        (0, 0) => "No-op".to_string(),
        (0, 1) => format!("Run `{}`", task.commands[0]),
        (0, n) => format!("Run {} commands", n),
        (_, 0) => format!("Run {}", task.deps.join(", ")),
        (_, n) => format!("Run {}, then {} command(s)", task.deps.join(", "), n),
    }
}
