//! Running a task from the command line
//!
//! `recipe <TASK>` resolves the task, runs its plan and reports the result.

use crate::cli::output_format::OutputFormat;
use crate::cli::output_types::{CommandOutput, PlanOutput, TaskOutput};
use crate::cli::GlobalArgs;
use crate::error::{Error, Result};
use crate::executor::verbosity::Verbosity;
use crate::executor::ProcessExecutor;
use crate::project::config::{RunSection, ShowOutput};
use crate::task::executor::{TaskExecutor, TaskResult};
use crate::task::plan::ExecutionPlan;
use crate::task::TaskGraph;
use crate::utils::output::{print_captured, print_failure, print_success};

/// Run `task_name`. Any words after the task name are rejected.
pub fn execute(task_name: &str, extra: &[String], global: &GlobalArgs, dry_run: bool) -> Result<()> {
    if !extra.is_empty() {
        return Err(Error::Usage(format!(
            "Task '{}' takes no arguments (got: {})",
            task_name,
            extra.join(" ")
        )));
    }

    let project = global.project()?;
    let graph = TaskGraph::for_project(&project)?;
    let run = project
        .config
        .as_ref()
        .map(|c| c.run.clone())
        .unwrap_or_default();

    if dry_run {
        let plan = graph.resolve(task_name)?;
        print_plan(&plan, global.format);
        return Ok(());
    }

    let verbosity = global.verbosity();
    let streamed = should_stream(&run, verbosity, global.format);
    let mut executor = ProcessExecutor::new(&project.root, verbosity)
        .with_timeout(run.timeout())
        .with_stream_output(streamed)
        .with_stdout_reserved(global.format.is_machine_readable());

    let result = TaskExecutor::new(&graph, &mut executor).execute(task_name)?;

    match global.format {
        OutputFormat::Json => println!("{}", TaskOutput::from(&result).to_json()),
        OutputFormat::Human => report(&result, &run, verbosity, streamed),
    }

    match result.into_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Whether command output is teed to the terminal while it runs
fn should_stream(run: &RunSection, verbosity: Verbosity, format: OutputFormat) -> bool {
    if format.is_machine_readable() || verbosity.is_quiet() {
        return false;
    }
    match run.show_output {
        ShowOutput::Always => true,
        ShowOutput::Never => false,
        ShowOutput::OnFailure => verbosity.should_stream_output(),
    }
}

/// Whether the failing command's captured output is printed afterwards
fn should_print_failure_output(run: &RunSection, verbosity: Verbosity, streamed: bool) -> bool {
    !streamed && !verbosity.is_quiet() && run.show_output == ShowOutput::OnFailure
}

fn report(result: &TaskResult, run: &RunSection, verbosity: Verbosity, streamed: bool) {
    let secs = result.duration.as_secs_f64();

    if result.success {
        if verbosity.is_quiet() {
            return;
        }
        print_success(&format!("Task '{}'  ({:.2}s)", result.name, secs));
        if result.command_results.len() > 1 {
            println!(
                "      {} commands executed successfully",
                result.command_results.len()
            );
        }
        return;
    }

    print_failure(&format!("Task '{}'  ({:.2}s)", result.name, secs));
    eprintln!(
        "      {}/{} commands succeeded",
        result.success_count(),
        result.command_results.len()
    );

    if let Some(failed) = result.failure() {
        eprintln!(
            "      FAIL  {}: {} (exit code {})",
            failed.task, failed.command, failed.exit_code
        );
        if should_print_failure_output(run, verbosity, streamed || failed.command.interactive)
            && !failed.output.is_empty()
        {
            print_captured(&failed.output);
        }
    }

    let skipped = result.skipped_tasks();
    if !skipped.is_empty() && !verbosity.is_quiet() {
        eprintln!("      Skipped: {}", skipped.join(", "));
    }
}

fn print_plan(plan: &ExecutionPlan, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", PlanOutput::from(plan).to_json()),
        OutputFormat::Human => {
            println!("Plan for '{}':", plan.target);
            for task in &plan.tasks {
                if task.commands.is_empty() {
                    println!("  {}  (no commands)", task.name);
                    continue;
                }
                println!("  {}", task.name);
                for command in &task.commands {
                    println!("      {}", command);
                }
            }
            println!();
            println!(
                "{} task(s), {} command(s)",
                plan.tasks.len(),
                plan.command_count()
            );
        }
    }
}
