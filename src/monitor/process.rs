// Process enumeration and termination backed by /proc

use crate::killer::{kill_process, KillResult, KillStrategy};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use procfs::process::Process;
use std::path::Path;

/// Longest name the kernel keeps in `/proc/<pid>/stat` (TASK_COMM_LEN - 1)
const COMM_MAX_LEN: usize = 15;

/// One process as seen during a single pass. Never kept across passes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSnapshot {
    pub name: String,
    pub pid: i32,
    pub start_time: DateTime<Local>,
    pub has_exited: bool,
}

/// Where processes come from and how they are terminated
pub trait ProcessSource: Send {
    /// All processes currently running under `name`. Empty is a normal result.
    fn list_processes(&self, name: &str) -> Result<Vec<ProcessSnapshot>>;

    /// Terminate one process. Failures are reported through `KillResult`
    /// or `Err` and must not be treated as fatal by the caller.
    fn terminate(&self, pid: i32) -> Result<KillResult>;
}

/// Linux process source reading `/proc` and signalling through `kill(2)`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsSource {
    strategy: KillStrategy,
}

impl ProcfsSource {
    pub fn new(strategy: KillStrategy) -> Self {
        Self { strategy }
    }

    /// Sorted, de-duplicated names of every running process
    pub fn running_names() -> Result<Vec<String>> {
        let mut names: Vec<String> = procfs::process::all_processes()
            .context("Failed to enumerate processes")?
            .filter_map(|entry| entry.ok())
            .filter_map(|process| process.stat().ok())
            .map(|stat| stat.comm)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

impl ProcessSource for ProcfsSource {
    fn list_processes(&self, name: &str) -> Result<Vec<ProcessSnapshot>> {
        let boot_time = procfs::boot_time_secs().context("Failed to read system boot time")?;
        let ticks_per_second = procfs::ticks_per_second();

        let mut snapshots = Vec::new();
        for entry in procfs::process::all_processes().context("Failed to enumerate processes")? {
            // Processes vanish between readdir and open; those are simply gone
            let Ok(process) = entry else { continue };
            let Ok(stat) = process.stat() else { continue };

            if !matches_name(&stat.comm, || long_names(&process), name) {
                continue;
            }

            let start_time = start_time_from_ticks(boot_time, stat.starttime, ticks_per_second)
                .with_context(|| format!("Invalid start time for process {}", stat.pid))?;

            snapshots.push(ProcessSnapshot {
                name: name.to_string(),
                pid: stat.pid,
                start_time,
                has_exited: matches!(stat.state, 'Z' | 'X' | 'x'),
            });
        }

        snapshots.sort_by_key(|s| s.pid);
        Ok(snapshots)
    }

    fn terminate(&self, pid: i32) -> Result<KillResult> {
        kill_process(pid, self.strategy)
    }
}

/// Full-length names a process goes by: the executable's file name and the
/// file name of argv[0]. The exe link is unreadable for other users'
/// processes without privileges, argv[0] is readable by anyone.
fn long_names(process: &Process) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(exe) = process.exe() {
        if let Some(file_name) = exe.file_name() {
            names.push(file_name.to_string_lossy().into_owned());
        }
    }
    if let Some(argv0) = process.cmdline().ok().and_then(|args| args.into_iter().next()) {
        if let Some(file_name) = Path::new(&argv0).file_name() {
            names.push(file_name.to_string_lossy().into_owned());
        }
    }
    names
}

/// Does a process with kernel name `comm` match the configured `name`?
///
/// The kernel truncates names to 15 bytes, so longer names are checked
/// against the process's full-length names instead.
fn matches_name(comm: &str, long_names: impl FnOnce() -> Vec<String>, name: &str) -> bool {
    if comm == name {
        return true;
    }
    if name.len() > COMM_MAX_LEN && name.as_bytes().starts_with(comm.as_bytes()) {
        return long_names().iter().any(|long| long == name);
    }
    false
}

/// Convert a start time in clock ticks since boot to a wall-clock timestamp
fn start_time_from_ticks(
    boot_time_secs: u64,
    start_ticks: u64,
    ticks_per_second: u64,
) -> Result<DateTime<Local>> {
    let ticks_per_second = ticks_per_second.max(1);
    let millis = boot_time_secs
        .checked_mul(1000)
        .and_then(|boot| boot.checked_add(start_ticks.checked_mul(1000)? / ticks_per_second))
        .and_then(|ms| i64::try_from(ms).ok())
        .context("start time overflows")?;

    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local))
        .context("start time out of range")
}
