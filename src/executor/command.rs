//! Structured external commands
//!
//! A command is a program plus its argument list. String forms from
//! recipe.toml are split with POSIX shell-word rules; nothing is ever handed
//! to a shell, so globbing, pipes and `&&` have no special meaning.

use crate::error::{Error, Result};
use crate::project::config::CommandDef;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path, resolved through PATH when bare
    pub program: String,
    /// Arguments, passed verbatim
    pub args: Vec<String>,
    /// Working directory relative to the project root
    pub cwd: Option<PathBuf>,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
    /// Reads from the terminal; output is always shown live
    pub interactive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Split a command line into program and arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use recipe::executor::command::CommandSpec;
    ///
    /// let cmd = CommandSpec::parse("poetry run pylint 'my pkg'").unwrap();
    /// assert_eq!(cmd.program, "poetry");
    /// assert_eq!(cmd.args, vec!["run", "pylint", "my pkg"]);
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = shlex::split(line).ok_or_else(|| {
            Error::Config(format!("Invalid command line (unbalanced quotes): {}", line))
        })?;
        if words.is_empty() {
            return Err(Error::Config("Empty command line".to_string()));
        }
        let program = words.remove(0);
        Ok(Self::new(program).args(words))
    }

    /// Build a command from its recipe.toml form
    pub fn from_def(task: &str, def: &CommandDef) -> Result<Self> {
        let in_task = |e: Error| match e {
            Error::Config(msg) => Error::Config(format!("Task '{}': {}", task, msg)),
            other => other,
        };
        match def {
            CommandDef::Line(line) => Self::parse(line).map_err(in_task),
            CommandDef::Detailed { argv, cwd, env } => {
                let (program, args) = argv.split_first().ok_or_else(|| {
                    Error::Config(format!("Task '{}': command has an empty argv", task))
                })?;
                let mut spec = Self::new(program.clone()).args(args.iter().cloned());
                spec.cwd = cwd.clone();
                spec.env = env.clone();
                Ok(spec)
            }
        }
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-quoted rendering, for display only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(&self.program).chain(self.args.iter());
        let rendered: Vec<String> = words
            .map(|w| {
                shlex::try_quote(w)
                    .map(|q| q.into_owned())
                    .unwrap_or_else(|_| w.clone())
            })
            .collect();
        write!(f, "{}", rendered.join(" "))?;
        if let Some(ref cwd) = self.cwd {
            write!(f, "  (in {})", cwd.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let cmd = CommandSpec::parse("poetry run black alexapy").unwrap();
        assert_eq!(cmd.program, "poetry");
        assert_eq!(cmd.args, vec!["run", "black", "alexapy"]);
        assert!(cmd.cwd.is_none());
    }

    #[test]
    fn test_parse_quotes() {
        let cmd = CommandSpec::parse(r#"sh -c "exit 3""#).unwrap();
        assert_eq!(cmd.program, "sh");
        assert_eq!(cmd.args, vec!["-c", "exit 3"]);
    }

    #[test]
    fn test_parse_unbalanced_quotes() {
        let err = CommandSpec::parse("echo 'oops").unwrap_err();
        assert!(err.to_string().contains("unbalanced quotes"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(CommandSpec::parse("   ").is_err());
    }

    #[test]
    fn test_from_def_detailed() {
        let def = CommandDef::Detailed {
            argv: vec!["sphinx-build".to_string(), ".".to_string(), "_build".to_string()],
            cwd: Some(PathBuf::from("docs")),
            env: BTreeMap::from([("SPHINXOPTS".to_string(), "-W".to_string())]),
        };
        let cmd = CommandSpec::from_def("docs", &def).unwrap();
        assert_eq!(cmd.program, "sphinx-build");
        assert_eq!(cmd.args, vec![".", "_build"]);
        assert_eq!(cmd.cwd, Some(PathBuf::from("docs")));
        assert_eq!(cmd.env.get("SPHINXOPTS").map(String::as_str), Some("-W"));
    }

    #[test]
    fn test_from_def_names_task_on_error() {
        let err = CommandSpec::from_def("docs", &CommandDef::Line("echo \"x".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("Task 'docs'"));
    }

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = CommandSpec::new("sh").arg("-c").arg("exit 3");
        let rendered = cmd.to_string();
        assert!(rendered.starts_with("sh -c "));
        assert_eq!(CommandSpec::parse(&rendered).unwrap(), cmd);

        let cmd = CommandSpec::new("make").arg("html").with_cwd("docs");
        assert_eq!(cmd.to_string(), "make html  (in docs)");
    }
}
