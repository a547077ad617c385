// Signal management for process termination

use anyhow::Result;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use procfs::process::Process;
use std::thread;
use std::time::Duration;

/// How long a process gets to honour SIGTERM before SIGKILL follows
const GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Polling step while waiting for a signalled process to go away
const EXIT_POLL_STEP: Duration = Duration::from_millis(50);

/// Strategy for killing processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillStrategy {
    /// Send SIGTERM first, escalate to SIGKILL if the process lingers
    Graceful,
    /// Send SIGKILL immediately
    #[default]
    Forceful,
}

/// Result of a kill operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillResult {
    /// Process was successfully terminated
    Success,
    /// Process had already exited when we got to it
    AlreadyDead,
    /// Permission denied (typically need root)
    PermissionDenied,
    /// Process not found
    NotFound,
    /// Other error occurred
    Error(String),
}

impl KillResult {
    /// Only an actual termination counts; everything else is reported as a failure
    pub fn is_success(&self) -> bool {
        matches!(self, KillResult::Success)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &str {
        match self {
            KillResult::Success => "successfully terminated",
            KillResult::AlreadyDead => "already dead",
            KillResult::PermissionDenied => "permission denied",
            KillResult::NotFound => "not found",
            KillResult::Error(msg) => msg,
        }
    }
}

/// Send a signal to a process
fn send_signal(pid: i32, signal: Signal) -> KillResult {
    match signal::kill(Pid::from_raw(pid), signal) {
        Ok(()) => KillResult::Success,
        Err(nix::errno::Errno::ESRCH) => KillResult::NotFound,
        Err(nix::errno::Errno::EPERM) => KillResult::PermissionDenied,
        Err(e) => KillResult::Error(format!("signal error: {}", e)),
    }
}

/// Check if a process is still alive.
///
/// Zombies count as dead: they still answer `kill(pid, 0)` but have already
/// stopped running and only wait for their parent to reap them.
fn is_process_alive(pid: i32) -> bool {
    match Process::new(pid).and_then(|p| p.stat()) {
        Ok(stat) => !matches!(stat.state, 'Z' | 'X' | 'x'),
        Err(_) => false,
    }
}

/// Wait up to `limit` for the process to go away
fn wait_for_exit(pid: i32, limit: Duration) -> bool {
    let mut waited = Duration::ZERO;
    while waited < limit {
        thread::sleep(EXIT_POLL_STEP);
        waited += EXIT_POLL_STEP;
        if !is_process_alive(pid) {
            log::debug!("Process {} exited after {}ms", pid, waited.as_millis());
            return true;
        }
    }
    false
}

/// Kill a single process using the specified strategy
///
/// # Arguments
/// * `pid` - Process ID to kill
/// * `strategy` - Whether to use graceful (SIGTERM) or forceful (SIGKILL) termination
///
/// # Returns
/// Result containing the KillResult enum describing the outcome
pub fn kill_process(pid: i32, strategy: KillStrategy) -> Result<KillResult> {
    log::debug!("Attempting to kill process {} (strategy: {:?})", pid, strategy);

    if !is_process_alive(pid) {
        log::debug!("Process {} is already dead", pid);
        return Ok(KillResult::AlreadyDead);
    }

    let result = match strategy {
        KillStrategy::Graceful => kill_graceful(pid),
        KillStrategy::Forceful => kill_forceful(pid),
    };
    Ok(result)
}

/// Kill a process gracefully using SIGTERM
fn kill_graceful(pid: i32) -> KillResult {
    log::debug!("Sending SIGTERM to process {}", pid);

    let result = send_signal(pid, Signal::SIGTERM);
    if !result.is_success() {
        return result;
    }

    if wait_for_exit(pid, GRACE_PERIOD) {
        return KillResult::Success;
    }

    log::warn!(
        "Process {} did not respond to SIGTERM, escalating to SIGKILL",
        pid
    );
    kill_forceful(pid)
}

/// Kill a process forcefully using SIGKILL
fn kill_forceful(pid: i32) -> KillResult {
    log::debug!("Sending SIGKILL to process {}", pid);

    let result = send_signal(pid, Signal::SIGKILL);
    if !result.is_success() {
        return result;
    }

    if wait_for_exit(pid, EXIT_POLL_STEP * 10) {
        KillResult::Success
    } else {
        log::error!("Process {} still alive after SIGKILL", pid);
        KillResult::Error("process survived SIGKILL".to_string())
    }
}
