pub mod config;
pub mod root;

pub use config::Config;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// A project directory with its optional recipe.toml.
#[derive(Debug)]
pub struct Project {
    /// Path to the project root directory
    pub root: PathBuf,
    /// Configuration loaded from recipe.toml (None if no config file)
    pub config: Option<Config>,
}

impl Project {
    /// Find the project by walking up from the current working directory.
    ///
    /// Falls back to the working directory itself when no marker is found,
    /// so the built-in recipes still run from anywhere.
    pub fn find() -> Result<Project> {
        let cwd = std::env::current_dir()?;
        Self::find_from(&cwd)
    }

    /// Find the project starting from a specific directory.
    pub fn find_from(start_dir: &Path) -> Result<Project> {
        match root::find_project_root(start_dir)? {
            Some(root_info) => {
                tracing::debug!(
                    root = %root_info.path.display(),
                    marker = %root_info.marker,
                    "found project root"
                );
                let config = config::load_config(&root_info.path)?;
                Ok(Project {
                    root: root_info.path,
                    config,
                })
            }
            None => Ok(Project {
                root: start_dir.to_path_buf(),
                config: None,
            }),
        }
    }

    /// Load the project from an explicit config file; its directory is the root.
    pub fn from_config_file(path: &Path) -> Result<Project> {
        if !path.is_file() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = config::load_config_file(path)?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Project {
            root,
            config: Some(config),
        })
    }

    /// Whether recipe.toml defines its own tasks
    pub fn has_custom_tasks(&self) -> bool {
        self.config
            .as_ref()
            .is_some_and(|c| !c.tasks.tasks.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_from_without_markers_uses_start_dir() {
        let temp = TempDir::new().unwrap();
        let project = Project::find_from(temp.path()).unwrap();
        assert_eq!(project.root, temp.path());
        assert!(project.config.is_none());
        assert!(!project.has_custom_tasks());
    }

    #[test]
    fn test_find_from_loads_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("recipe.toml"),
            "[tasks]\nhello = \"echo hello\"\n",
        )
        .unwrap();
        let nested = temp.path().join("src");
        fs::create_dir(&nested).unwrap();

        let project = Project::find_from(&nested).unwrap();
        assert_eq!(project.root, temp.path().canonicalize().unwrap());
        assert!(project.has_custom_tasks());
    }

    #[test]
    fn test_from_config_file_missing() {
        let temp = TempDir::new().unwrap();
        let err = Project::from_config_file(&temp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_from_config_file_sets_root() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.toml");
        fs::write(&path, "[tasks]\nhello = \"echo hello\"\n").unwrap();

        let project = Project::from_config_file(&path).unwrap();
        assert_eq!(project.root, temp.path());
        assert!(project.has_custom_tasks());
    }
}
