//! Command-line front end
//!
//! Every task name is accepted as a subcommand; `list` and `init` are the
//! only fixed ones.

pub mod init;
pub mod list;
pub mod output_format;
pub mod output_types;
pub mod task;

use crate::executor::verbosity::Verbosity;
use crate::project::Project;
use clap::Args;
use output_format::OutputFormat;
use std::path::PathBuf;

/// Flags accepted before any subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase output (-v streams command output, -vv adds debug logs)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format: human (default) or json
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Use this recipe file instead of searching for recipe.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Locate the project, honoring `--config`
    pub fn project(&self) -> crate::error::Result<Project> {
        match &self.config {
            Some(path) => Project::from_config_file(path),
            None => Project::find(),
        }
    }
}
