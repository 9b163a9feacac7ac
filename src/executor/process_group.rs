//! Process-group handling for spawned commands (unix only)
//!
//! Every command is the leader of its own process group, so a timeout can
//! stop the command together with anything it started. While a command runs
//! it owns the controlling terminal, if recipe was in the foreground, and
//! SIGINT/SIGTERM delivered to recipe are passed on to its group.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Once;

/// Group currently running in the foreground, 0 when none
static FOREGROUND_GROUP: AtomicI32 = AtomicI32::new(0);
static INSTALL_FORWARDING: Once = Once::new();

extern "C" fn forward_signal(signal: libc::c_int) {
    let pgid = FOREGROUND_GROUP.load(Ordering::SeqCst);
    // SAFETY: kill, signal and raise are async-signal-safe
    unsafe {
        if pgid > 0 {
            libc::kill(-pgid, signal);
        } else {
            libc::signal(signal, libc::SIG_DFL);
            libc::raise(signal);
        }
    }
}

fn install_forwarding() {
    INSTALL_FORWARDING.call_once(|| {
        let handler = forward_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        // SAFETY: the handler only touches an atomic and async-signal-safe calls
        unsafe {
            libc::signal(libc::SIGINT, handler);
            libc::signal(libc::SIGTERM, handler);
        }
    });
}

/// Send `signal` to every process in group `pgid`
pub fn signal_group(pgid: i32, signal: libc::c_int) -> bool {
    // SAFETY: a negative pid addresses the group; no memory is involved
    unsafe { libc::kill(-pgid, signal) == 0 }
}

/// Whether any process of group `pgid` is still around
pub fn group_alive(pgid: i32) -> bool {
    signal_group(pgid, 0)
}

/// Run `f` with SIGTTOU ignored, so a background recipe can take the
/// terminal back instead of being stopped
fn without_sigttou<T>(f: impl FnOnce() -> T) -> T {
    // SAFETY: swapping a signal disposition and restoring it afterwards
    let previous = unsafe { libc::signal(libc::SIGTTOU, libc::SIG_IGN) };
    let value = f();
    unsafe { libc::signal(libc::SIGTTOU, previous) };
    value
}

/// A spawned command's group, in the foreground until dropped
#[derive(Debug)]
pub struct ForegroundGroup {
    pgid: i32,
    owns_terminal: bool,
}

impl ForegroundGroup {
    /// Hand the terminal and forwarded signals to the group led by `pid`
    pub fn enter(pid: u32) -> Self {
        let pgid = pid as i32;
        install_forwarding();
        FOREGROUND_GROUP.store(pgid, Ordering::SeqCst);

        // SAFETY: plain terminal ioctls on stdin
        let owns_terminal = unsafe {
            libc::isatty(libc::STDIN_FILENO) == 1
                && libc::tcgetpgrp(libc::STDIN_FILENO) == libc::getpgrp()
        };
        if owns_terminal {
            without_sigttou(|| unsafe { libc::tcsetpgrp(libc::STDIN_FILENO, pgid) });
            // The command may have read the terminal before it owned it
            signal_group(pgid, libc::SIGCONT);
        }

        Self { pgid, owns_terminal }
    }

    pub fn pgid(&self) -> i32 {
        self.pgid
    }
}

impl Drop for ForegroundGroup {
    fn drop(&mut self) {
        if self.owns_terminal {
            // SAFETY: restoring our own group as the terminal's foreground
            without_sigttou(|| unsafe { libc::tcsetpgrp(libc::STDIN_FILENO, libc::getpgrp()) });
        }
        let _ = FOREGROUND_GROUP.compare_exchange(self.pgid, 0, Ordering::SeqCst, Ordering::SeqCst);
    }
}
