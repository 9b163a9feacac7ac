//! Built-in recipes for a poetry-managed Python package
//!
//! Used when the project has no `[tasks]` table of its own.

use super::Task;
use crate::executor::CommandSpec;

/// Package directory the linters and type checker run against
pub const PACKAGE_DIR: &str = "alexapy";

struct BuiltinCommand {
    argv: &'static [&'static str],
    cwd: Option<&'static str>,
    interactive: bool,
}

const fn run(argv: &'static [&'static str]) -> BuiltinCommand {
    BuiltinCommand {
        argv,
        cwd: None,
        interactive: false,
    }
}

const fn run_in(cwd: &'static str, argv: &'static [&'static str]) -> BuiltinCommand {
    BuiltinCommand {
        argv,
        cwd: Some(cwd),
        interactive: false,
    }
}

/// A command that may ask the user for input
const fn prompt(argv: &'static [&'static str]) -> BuiltinCommand {
    BuiltinCommand {
        argv,
        cwd: None,
        interactive: true,
    }
}

struct Recipe {
    name: &'static str,
    description: &'static str,
    deps: &'static [&'static str],
    commands: &'static [BuiltinCommand],
}

const RECIPES: &[Recipe] = &[
    Recipe {
        name: "clean",
        description: "Remove build artifacts",
        deps: &[],
        commands: &[run(&[
            "rm",
            "-rf",
            "dist/",
            "build/",
            ".egg",
            "alexapy.egg-info/",
        ])],
    },
    Recipe {
        name: "setup",
        description: "Install dependencies and pre-commit hooks",
        deps: &[],
        commands: &[
            run(&["poetry", "install"]),
            run(&["poetry", "run", "pre-commit", "install"]),
        ],
    },
    Recipe {
        name: "black",
        description: "Format check with black",
        deps: &[],
        commands: &[run(&["poetry", "run", "black", PACKAGE_DIR])],
    },
    Recipe {
        name: "flake8",
        description: "Style lint with flake8",
        deps: &[],
        commands: &[run(&["poetry", "run", "flake8", PACKAGE_DIR])],
    },
    Recipe {
        name: "docstyle",
        description: "Docstring style check with pydocstyle",
        deps: &[],
        commands: &[run(&["poetry", "run", "pydocstyle", PACKAGE_DIR])],
    },
    Recipe {
        name: "pylint",
        description: "Static analysis with pylint",
        deps: &[],
        commands: &[run(&["poetry", "run", "pylint", PACKAGE_DIR])],
    },
    Recipe {
        name: "typing",
        description: "Type check with mypy",
        deps: &[],
        commands: &[run(&["poetry", "run", "mypy", PACKAGE_DIR])],
    },
    Recipe {
        name: "lint",
        description: "Run every linter and the type checker",
        deps: &["black", "flake8", "docstyle", "pylint", "typing"],
        commands: &[],
    },
    Recipe {
        name: "docs",
        description: "Build the documentation site",
        deps: &[],
        commands: &[
            run(&[
                "poetry",
                "export",
                "--dev",
                "--without-hashes",
                "-f",
                "requirements.txt",
                "--output",
                "docs/requirements.txt",
            ]),
            run_in(
                "docs",
                &["poetry", "run", "sphinx-build", "-b", "html", ".", "_build/html"],
            ),
        ],
    },
    Recipe {
        name: "check_vulns",
        description: "Scan locked dependencies for known vulnerabilities",
        deps: &[],
        commands: &[
            run(&[
                "poetry",
                "export",
                "--dev",
                "--without-hashes",
                "-f",
                "requirements.txt",
                "--output",
                "requirements-audit.txt",
            ]),
            run(&[
                "poetry",
                "run",
                "safety",
                "check",
                "--file",
                "requirements-audit.txt",
            ]),
        ],
    },
    Recipe {
        name: "bump",
        description: "Bump the version and update the changelog",
        deps: &[],
        commands: &[prompt(&["poetry", "run", "semantic-release", "version"])],
    },
    Recipe {
        name: "publish",
        description: "Publish the release",
        deps: &[],
        commands: &[prompt(&["poetry", "run", "semantic-release", "publish"])],
    },
    Recipe {
        name: "release",
        description: "Bump the version, then publish",
        deps: &["bump", "publish"],
        commands: &[],
    },
    Recipe {
        name: "coverage",
        description: "Coverage report (currently a no-op)",
        deps: &[],
        commands: &[],
    },
    Recipe {
        name: "test",
        description: "Test suite (currently a no-op)",
        deps: &[],
        commands: &[],
    },
];

/// The built-in task set
pub fn builtin_tasks() -> Vec<Task> {
    RECIPES
        .iter()
        .map(|recipe| {
            let commands = recipe
                .commands
                .iter()
                .map(|c| {
                    let mut argv = c.argv.iter().copied();
                    let program = argv.next().unwrap_or_default();
                    let spec = CommandSpec::new(program)
                        .args(argv)
                        .interactive(c.interactive);
                    match c.cwd {
                        Some(dir) => spec.with_cwd(dir),
                        None => spec,
                    }
                })
                .collect();
            Task::new(recipe.name)
                .with_description(recipe.description)
                .with_deps(recipe.deps.iter().copied())
                .with_commands(commands)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let tasks = builtin_tasks();
        let names: HashSet<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tasks.len());
    }

    #[test]
    fn test_every_command_has_a_program() {
        for task in builtin_tasks() {
            for command in &task.commands {
                assert!(!command.program.is_empty(), "task {}", task.name);
            }
        }
    }

    #[test]
    fn test_every_dependency_is_defined() {
        let tasks = builtin_tasks();
        let names: HashSet<_> = tasks.iter().map(|t| t.name.clone()).collect();
        for task in &tasks {
            for dep in &task.deps {
                assert!(names.contains(dep), "{} -> {}", task.name, dep);
            }
        }
    }

    #[test]
    fn test_only_release_steps_are_interactive() {
        let interactive: Vec<_> = builtin_tasks()
            .into_iter()
            .filter(|t| t.commands.iter().any(|c| c.interactive))
            .map(|t| t.name)
            .collect();
        assert_eq!(interactive, vec!["bump", "publish"]);
    }

    #[test]
    fn test_lint_prerequisites() {
        let tasks = builtin_tasks();
        let lint = tasks.iter().find(|t| t.name == "lint").unwrap();
        assert_eq!(
            lint.deps,
            vec!["black", "flake8", "docstyle", "pylint", "typing"]
        );
        assert!(lint.commands.is_empty());
    }

    #[test]
    fn test_noop_tasks() {
        let tasks = builtin_tasks();
        for name in ["coverage", "test"] {
            let task = tasks.iter().find(|t| t.name == name).unwrap();
            assert!(task.commands.is_empty());
            assert!(task.deps.is_empty());
        }
    }

    #[test]
    fn test_docs_builds_inside_docs_dir() {
        let tasks = builtin_tasks();
        let docs = tasks.iter().find(|t| t.name == "docs").unwrap();
        assert_eq!(docs.commands.len(), 2);
        assert!(docs.commands[0].cwd.is_none());
        assert_eq!(
            docs.commands[1].cwd.as_deref(),
            Some(std::path::Path::new("docs"))
        );
    }
}
