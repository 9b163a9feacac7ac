use clap::{Parser, Subcommand};
use recipe::cli::{self, GlobalArgs};
use recipe::error::{Error, Result};
use recipe::utils::{logging, output};
use std::ffi::OsString;
use std::process;

#[derive(Parser)]
#[command(name = "recipe")]
#[command(version)]
#[command(about = "Run project build recipes with their prerequisites")]
#[command(
    long_about = "recipe runs named tasks. Each task lists prerequisite tasks and a sequence \
of external commands. Prerequisites run first, each at most once, and the first failing \
command stops the run with that command's exit code."
)]
#[command(after_help = "\
Examples:
  recipe --list                  Show available tasks
  recipe lint                    Run black, flake8, docstyle, pylint and typing
  recipe --dry-run release       Show what release would run
  recipe init                    Write a recipe.toml template")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// List available tasks
    #[arg(long)]
    list: bool,

    /// Print the resolved plan without running any command
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available tasks
    List,
    /// Write a recipe.toml template
    Init(cli::init::InitArgs),
    /// Run a task by name
    #[command(external_subcommand)]
    Task(Vec<OsString>),
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(_) if cli.list => Err(Error::Usage(
            "--list cannot be combined with a subcommand".to_string(),
        )),
        Some(Commands::List) => cli::list::execute(&cli.global),
        Some(Commands::Init(args)) => cli::init::execute(args, &cli.global),
        Some(Commands::Task(words)) => {
            let words: Vec<String> = words
                .iter()
                .map(|w| w.to_string_lossy().into_owned())
                .collect();
            match words.split_first() {
                Some((name, extra)) => cli::task::execute(name, extra, &cli.global, cli.dry_run),
                None => Err(Error::Usage("No task specified".to_string())),
            }
        }
        None if cli.list => cli::list::execute(&cli.global),
        None => Err(Error::Usage(
            "No task specified. Use --list to see available tasks.".to_string(),
        )),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.global.verbosity());

    if let Err(e) = run(&cli) {
        // The task report already names the failing command
        if !matches!(e, Error::ExternalCommand { .. }) {
            output::print_error(&e);
        }
        process::exit(e.exit_code());
    }
}
