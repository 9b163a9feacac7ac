//! Dependency resolution
//!
//! Turns a task name into the ordered list of tasks to run: prerequisites
//! depth-first in declared order, each task at most once, the target last.
//! Unknown names and cycles are reported here, before anything runs.

use super::{Task, TaskGraph};
use crate::error::{Error, Result};
use crate::executor::CommandSpec;
use std::collections::HashSet;

/// The resolved, deduplicated task sequence for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Task that was requested
    pub target: String,
    /// Tasks in execution order (prerequisites first, target last)
    pub tasks: Vec<Task>,
}

impl ExecutionPlan {
    /// Resolve `target` against `graph`
    ///
    /// # Examples
    ///
    /// ```
    /// use recipe::task::plan::ExecutionPlan;
    /// use recipe::task::TaskGraph;
    ///
    /// let plan = ExecutionPlan::resolve(&TaskGraph::builtin(), "lint").unwrap();
    /// assert_eq!(
    ///     plan.task_names(),
    ///     vec!["black", "flake8", "docstyle", "pylint", "typing", "lint"]
    /// );
    /// ```
    pub fn resolve(graph: &TaskGraph, target: &str) -> Result<Self> {
        let mut resolver = Resolver {
            graph,
            done: HashSet::new(),
            stack: Vec::new(),
            order: Vec::new(),
        };
        resolver.visit(target, None)?;

        let names: Vec<&str> = resolver.order.iter().map(|t| t.name.as_str()).collect();
        tracing::debug!(task = target, plan = ?names, "resolved plan");

        Ok(Self {
            target: target.to_string(),
            tasks: resolver.order.into_iter().cloned().collect(),
        })
    }

    /// Task names in execution order
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Every command in execution order, paired with its task name
    pub fn steps(&self) -> impl Iterator<Item = (&str, &CommandSpec)> {
        self.tasks
            .iter()
            .flat_map(|t| t.commands.iter().map(move |c| (t.name.as_str(), c)))
    }

    /// Total number of commands
    pub fn command_count(&self) -> usize {
        self.tasks.iter().map(|t| t.commands.len()).sum()
    }
}

/// State for a single resolution; dropped when `resolve` returns
struct Resolver<'g> {
    graph: &'g TaskGraph,
    /// Tasks already placed in `order`
    done: HashSet<&'g str>,
    /// Current DFS path, for cycle reporting
    stack: Vec<&'g str>,
    order: Vec<&'g Task>,
}

impl<'g> Resolver<'g> {
    fn visit(&mut self, name: &str, required_by: Option<&str>) -> Result<()> {
        if self.done.contains(name) {
            return Ok(());
        }
        if let Some(start) = self.stack.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> = self.stack[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Err(Error::CyclicDependency { cycle });
        }

        let graph = self.graph;
        let task = graph
            .get_task(name)
            .ok_or_else(|| graph.unknown_task(name, required_by))?;

        self.stack.push(&task.name);
        for dep in &task.deps {
            self.visit(dep, Some(&task.name))?;
        }
        self.stack.pop();

        self.done.insert(&task.name);
        self.order.push(task);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str, deps: &[&str], commands: &[&str]) -> Task {
        Task::new(name).with_deps(deps.iter().copied()).with_commands(
            commands
                .iter()
                .map(|c| CommandSpec::parse(c).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_lint_resolves_prerequisites_in_order() {
        let plan = ExecutionPlan::resolve(&TaskGraph::builtin(), "lint").unwrap();
        assert_eq!(
            plan.task_names(),
            vec!["black", "flake8", "docstyle", "pylint", "typing", "lint"]
        );
        // lint has no commands of its own
        assert_eq!(plan.command_count(), 5);
        let programs: Vec<_> = plan.steps().map(|(_, c)| c.args[1].as_str()).collect();
        assert_eq!(programs, vec!["black", "flake8", "pydocstyle", "pylint", "mypy"]);
    }

    #[test]
    fn test_diamond_runs_shared_prerequisite_once() {
        let graph = TaskGraph::from_tasks(vec![
            task("base", &[], &["echo base"]),
            task("left", &["base"], &["echo left"]),
            task("right", &["base"], &["echo right"]),
            task("top", &["left", "right"], &["echo top"]),
        ]);
        let plan = ExecutionPlan::resolve(&graph, "top").unwrap();
        assert_eq!(plan.task_names(), vec!["base", "left", "right", "top"]);
        assert_eq!(plan.command_count(), 4);
    }

    #[test]
    fn test_nested_prerequisites_depth_first() {
        let graph = TaskGraph::from_tasks(vec![
            task("a", &["b", "d"], &["echo a"]),
            task("b", &["c"], &["echo b"]),
            task("c", &[], &["echo c"]),
            task("d", &[], &["echo d1", "echo d2"]),
        ]);
        let plan = ExecutionPlan::resolve(&graph, "a").unwrap();
        assert_eq!(plan.task_names(), vec!["c", "b", "d", "a"]);

        let steps: Vec<_> = plan
            .steps()
            .map(|(t, c)| format!("{}:{}", t, c.args[0]))
            .collect();
        assert_eq!(steps, vec!["c:c", "b:b", "d:d1", "d:d2", "a:a"]);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let graph = TaskGraph::builtin();
        let first = ExecutionPlan::resolve(&graph, "release").unwrap();
        let second = ExecutionPlan::resolve(&graph, "release").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.task_names(), vec!["bump", "publish", "release"]);
    }

    #[test]
    fn test_unknown_target() {
        let err = ExecutionPlan::resolve(&TaskGraph::builtin(), "lnt").unwrap_err();
        match err {
            Error::UnknownTask {
                name,
                required_by,
                suggestions,
            } => {
                assert_eq!(name, "lnt");
                assert!(required_by.is_none());
                assert!(suggestions.contains(&"lint".to_string()));
            }
            other => panic!("Expected UnknownTask, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_prerequisite() {
        let graph = TaskGraph::from_tasks(vec![task("lint", &["black", "mypy"], &[])]);
        match ExecutionPlan::resolve(&graph, "lint").unwrap_err() {
            Error::UnknownTask {
                name, required_by, ..
            } => {
                assert_eq!(name, "black");
                assert_eq!(required_by.as_deref(), Some("lint"));
            }
            other => panic!("Expected UnknownTask, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_reported_with_path() {
        let graph = TaskGraph::from_tasks(vec![
            task("a", &["b"], &["echo a"]),
            task("b", &["c"], &["echo b"]),
            task("c", &["a"], &["echo c"]),
        ]);
        match ExecutionPlan::resolve(&graph, "a").unwrap_err() {
            Error::CyclicDependency { cycle } => assert_eq!(cycle, vec!["a", "b", "c", "a"]),
            other => panic!("Expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_cycle_does_not_block_other_tasks() {
        let graph = TaskGraph::from_tasks(vec![
            task("ok", &[], &["echo ok"]),
            task("x", &["y"], &[]),
            task("y", &["x"], &[]),
        ]);
        assert!(ExecutionPlan::resolve(&graph, "ok").is_ok());
        assert!(ExecutionPlan::resolve(&graph, "x").is_err());
    }

    #[test]
    fn test_noop_task_has_empty_plan_body() {
        let plan = ExecutionPlan::resolve(&TaskGraph::builtin(), "coverage").unwrap();
        assert_eq!(plan.task_names(), vec!["coverage"]);
        assert_eq!(plan.command_count(), 0);
    }
}
