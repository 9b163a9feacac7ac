//! External process management
//!
//! This module handles:
//! - Spawning a command directly (no shell) in its own process group
//! - Capturing stdout and stderr through one pipe, in the order written
//! - Waiting for completion, with an optional timeout
//! - Collecting exit codes (128 + signal when killed)

use super::command::CommandSpec;
#[cfg(unix)]
use super::process_group::{self, ForegroundGroup};
use std::io::{self, PipeReader, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Time between SIGTERM and SIGKILL for a timed-out command
const KILL_GRACE: Duration = Duration::from_secs(5);

/// Result of running one external command
#[derive(Debug)]
pub struct RunResult {
    /// The exit code (128 + signal if the process was killed)
    pub exit_code: i32,
    /// Captured stdout and stderr, interleaved as written
    pub output: String,
    /// How long the command took to run
    pub duration: Duration,
    /// Whether the process exited on its own (not killed by a signal)
    pub completed: bool,
}

/// Where captured output is copied while the command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tee {
    Stdout,
    /// Used when stdout is reserved for machine-readable output
    Stderr,
}

/// Options for running a command
#[derive(Debug, Default)]
pub struct RunOptions<'a> {
    /// Base directory; the command's own `cwd` is joined onto it
    pub working_dir: Option<&'a Path>,
    /// Optional timeout (kill if exceeded)
    pub timeout: Option<Duration>,
    /// Copy output to the terminal as it arrives
    pub tee: Option<Tee>,
}

impl<'a> RunOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: &'a Path) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_tee(mut self, tee: Option<Tee>) -> Self {
        self.tee = tee;
        self
    }
}

/// Run a command to completion, capturing its output
///
/// Stdin is inherited. On unix the command leads a new process group that
/// owns the terminal while it runs, so prompts can read their answers, and
/// an interrupt sent to recipe is passed on to the group. The interrupted
/// command exits with 130 and is reported like any other failure. Prompts
/// are only visible when output is teed (see [`Tee`]).
///
/// # Example
///
/// ```no_run
/// use recipe::executor::command::CommandSpec;
/// use recipe::executor::runner::{run_command, RunOptions};
///
/// let cmd = CommandSpec::new("poetry").args(["run", "flake8", "alexapy"]);
/// let result = run_command(&cmd, RunOptions::new())?;
///
/// println!("Exit code: {}", result.exit_code);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run_command(spec: &CommandSpec, options: RunOptions) -> io::Result<RunResult> {
    let start = Instant::now();

    // Both streams share one pipe so the capture keeps their relative order
    let (reader, writer) = io::pipe()?;

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.envs(&spec.env);
    cmd.stdin(Stdio::inherit());
    cmd.stdout(writer.try_clone()?);
    cmd.stderr(writer);

    let dir = match (options.working_dir, spec.cwd.as_deref()) {
        (Some(base), Some(rel)) => Some(base.join(rel)),
        (Some(base), None) => Some(base.to_path_buf()),
        (None, Some(rel)) => Some(rel.to_path_buf()),
        (None, None) => None,
    };
    if let Some(ref dir) = dir {
        cmd.current_dir(dir);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    tracing::debug!(program = %spec.program, args = ?spec.args, dir = ?dir, "spawning");
    let spawned = cmd.spawn();
    // The write ends held by `cmd` must close or the reader never sees EOF
    drop(cmd);
    let mut child = spawned?;

    #[cfg(unix)]
    let foreground = ForegroundGroup::enter(child.id());

    let reader = capture(reader, options.tee);

    let waited = match options.timeout {
        Some(timeout) => wait_with_timeout(&mut child, timeout),
        None => child.wait(),
    };

    #[cfg(unix)]
    drop(foreground);

    let exit_status = waited?;
    let output = join_capture(reader);
    let duration = start.elapsed();

    let exit_code = exit_code_from_status(&exit_status);
    let completed = exit_status.code().is_some();
    tracing::debug!(program = %spec.program, exit_code, ?duration, "finished");

    Ok(RunResult {
        exit_code,
        output,
        duration,
        completed,
    })
}

/// Drain the output pipe on its own thread, optionally copying each chunk
fn capture(mut pipe: PipeReader, tee: Option<Tee>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut sink: Option<Box<dyn Write>> = match tee {
            Some(Tee::Stdout) => Some(Box::new(io::stdout())),
            Some(Tee::Stderr) => Some(Box::new(io::stderr())),
            None => None,
        };
        let mut captured = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    captured.extend_from_slice(&buf[..n]);
                    if let Some(ref mut sink) = sink {
                        let _ = sink.write_all(&buf[..n]);
                        let _ = sink.flush();
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        captured
    })
}

fn join_capture(handle: JoinHandle<Vec<u8>>) -> String {
    handle
        .join()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Wait for process with timeout
///
/// If the timeout expires, the command's whole process group gets SIGTERM.
/// Whatever is left of the group gets SIGKILL once the leader exits or
/// after `KILL_GRACE`, whichever comes first.
/// Uses channel-based cancellation so the watchdog is cleanly stopped when
/// the process exits before the timeout.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<ExitStatus> {
    use std::sync::mpsc;

    #[cfg(unix)]
    let pgid = child.id() as i32;

    let (tx, rx) = mpsc::channel::<()>();

    let watchdog = thread::spawn(move || {
        if rx.recv_timeout(timeout).is_err() {
            tracing::warn!(?timeout, "command timed out, terminating its process group");
            #[cfg(unix)]
            {
                process_group::signal_group(pgid, libc::SIGTERM);
                let _ = rx.recv_timeout(KILL_GRACE);
                if process_group::group_alive(pgid) {
                    process_group::signal_group(pgid, libc::SIGKILL);
                }
            }
        }
    });

    let status = child.wait()?;
    let _ = tx.send(());
    let _ = watchdog.join();

    Ok(status)
}

/// Extract exit code from ExitStatus
///
/// On Unix, handles both normal exits and signals:
/// - Normal exit: return code
/// - Signal: 128 + signal number
fn exit_code_from_status(status: &ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(code) = status.code() {
            code
        } else if let Some(signal) = status.signal() {
            128 + signal
        } else {
            -1
        }
    }

    #[cfg(not(unix))]
    {
        status.code().unwrap_or(-1)
    }
}
