//! `recipe list` / `recipe --list` implementation
//!
//! Lists the available tasks with their descriptions.

use crate::cli::output_format::OutputFormat;
use crate::cli::output_types::{CommandOutput, TaskInfo, TaskListOutput};
use crate::cli::GlobalArgs;
use crate::error::Result;
use crate::project::config::CONFIG_FILE;
use crate::task::{task_description, TaskGraph};
use crate::utils::output::print_warning;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let project = global.project()?;
    let graph = TaskGraph::for_project(&project)?;
    let source = if project.has_custom_tasks() {
        global
            .config
            .clone()
            .unwrap_or_else(|| project.root.join(CONFIG_FILE))
            .display()
            .to_string()
    } else {
        "builtin".to_string()
    };

    // Listing still works for a broken graph; running will report the error
    let problem = graph.validate().err();
    if let Some(ref err) = problem {
        tracing::warn!(error = %err, "task graph is invalid");
    }

    let tasks = graph.list_tasks();

    match global.format {
        OutputFormat::Json => {
            let output = TaskListOutput {
                task_count: tasks.len(),
                source,
                tasks: tasks.iter().map(|t| TaskInfo::from(*t)).collect(),
            };
            println!("{}", output.to_json());
        }
        OutputFormat::Human => {
            if let Some(err) = problem {
                print_warning(&err.to_string());
            }
            if tasks.is_empty() {
                println!("No tasks defined.");
                return Ok(());
            }
            let width = tasks.iter().map(|t| t.name.len()).max().unwrap_or(0).max(15);
            println!("Available tasks ({}):", source);
            println!();
            for task in &tasks {
                println!("  {:<width$} {}", task.name, task_description(task), width = width);
            }
        }
    }

    Ok(())
}
