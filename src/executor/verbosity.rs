/// Verbosity levels for task output
///
/// Controls how much is printed while external commands run.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Suppress everything except errors (for CI/batch)
    ///
    /// ```bash
    /// recipe lint --quiet
    /// ```
    Quiet = 0,

    /// Echo each command, print captured output only when a command fails
    ///
    /// ```bash
    /// recipe lint
    /// ```
    #[default]
    Default = 1,

    /// Stream command output in real-time
    ///
    /// ```bash
    /// recipe lint -v
    /// ```
    Verbose = 2,

    /// Stream output and log resolution and spawn details
    ///
    /// ```bash
    /// recipe lint -vv
    /// ```
    VeryVerbose = 3,
}

impl Verbosity {
    /// Build from the `-v` count and `--quiet` flag
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Verbosity::Quiet;
        }
        match verbose {
            0 => Verbosity::Default,
            1 => Verbosity::Verbose,
            _ => Verbosity::VeryVerbose,
        }
    }

    /// Should command output be streamed while it runs? (-v, -vv)
    pub fn should_stream_output(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }

    /// Should each command line be echoed before it runs?
    pub fn should_echo_commands(&self) -> bool {
        !self.is_quiet()
    }

    /// Should we show execution details (working dir, env, exit codes)?
    pub fn should_show_execution_details(&self) -> bool {
        matches!(self, Verbosity::VeryVerbose)
    }

    /// Is any output suppressed?
    pub fn is_quiet(&self) -> bool {
        matches!(self, Verbosity::Quiet)
    }

    /// Default tracing filter directive for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Default => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verbosity::Quiet => write!(f, "quiet"),
            Verbosity::Default => write!(f, "default"),
            Verbosity::Verbose => write!(f, "verbose"),
            Verbosity::VeryVerbose => write!(f, "very-verbose"),
        }
    }
}
