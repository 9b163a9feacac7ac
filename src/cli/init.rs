//! `recipe init` command implementation
//!
//! Writes a commented recipe.toml into the current directory.

use crate::cli::output_format::OutputFormat;
use crate::cli::output_types::{CommandOutput, InitOutput};
use crate::cli::GlobalArgs;
use crate::error::{Error, Result};
use crate::project::config::{generate_config_template, CONFIG_FILE};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  recipe init                             Write recipe.toml here
  recipe init --force                     Overwrite an existing recipe.toml")]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Overwrite an existing recipe.toml
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let dir = args.path.as_deref().unwrap_or_else(|| Path::new("."));
    let path = write_template(dir, args.force)?;

    match global.format {
        OutputFormat::Json => {
            let output = InitOutput {
                status: "success".to_string(),
                path,
            };
            println!("{}", output.to_json());
        }
        OutputFormat::Human => {
            if !global.quiet {
                println!("Initialized {}", path.display());
            }
        }
    }
    Ok(())
}

/// Write the template into `dir`, returning the file path
pub fn write_template(dir: &Path, force: bool) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists at {}. Use --force to overwrite.",
            CONFIG_FILE,
            path.display()
        )));
    }
    std::fs::write(&path, generate_config_template()).map_err(|e| {
        Error::Config(format!("Failed to write {}: {}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), "wrote config template");
    Ok(path)
}
