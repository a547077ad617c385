// Status events produced by the poller and where they go

use crate::sanitize_for_log;
use chrono::{DateTime, Local};
use std::fmt;

/// Colour hint carried by every status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Action,
}

impl Severity {
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning | Severity::Action => log::Level::Warn,
        }
    }
}

/// One line of output from an evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// Nothing with the configured name is running
    NoProcesses { name: String },
    /// A matching process had already exited when inspected
    Exited { name: String, pid: i32 },
    /// A live matching process was inspected
    Observed {
        name: String,
        pid: i32,
        start_time: DateTime<Local>,
    },
    /// The process was terminated
    Killed { name: String, pid: i32 },
    /// Termination was attempted and failed
    KillFailed {
        name: String,
        pid: i32,
        reason: String,
    },
    /// Dry run: the process would have been terminated
    WouldKill { name: String, pid: i32 },
}

impl StatusEvent {
    pub fn severity(&self) -> Severity {
        match self {
            StatusEvent::Observed { .. } | StatusEvent::WouldKill { .. } => Severity::Info,
            StatusEvent::NoProcesses { .. }
            | StatusEvent::Exited { .. }
            | StatusEvent::KillFailed { .. } => Severity::Warning,
            StatusEvent::Killed { .. } => Severity::Action,
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::NoProcesses { name } => {
                write!(f, "There are no processes named {}", sanitize_for_log(name))
            }
            StatusEvent::Exited { name, pid } => {
                write!(f, "The {}({}) has exited", sanitize_for_log(name), pid)
            }
            StatusEvent::Observed {
                name,
                pid,
                start_time,
            } => write!(
                f,
                "{} {} {}",
                sanitize_for_log(name),
                pid,
                start_time.format("%Y-%m-%d %H:%M:%S")
            ),
            StatusEvent::Killed { name, pid } => {
                write!(f, "The {}({}) was killed", sanitize_for_log(name), pid)
            }
            StatusEvent::KillFailed { name, pid, reason } => write!(
                f,
                "Failed to kill {}({}): {}",
                sanitize_for_log(name),
                pid,
                reason
            ),
            StatusEvent::WouldKill { name, pid } => write!(
                f,
                "DRY RUN: {}({}) would be killed",
                sanitize_for_log(name),
                pid
            ),
        }
    }
}

/// Consumer of status events
pub trait StatusSink: Send {
    fn emit(&mut self, event: StatusEvent);
}

/// Sink that writes each event as one log line at its severity's level
#[derive(Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn emit(&mut self, event: StatusEvent) {
        log::log!(event.severity().log_level(), "{}", event);
    }
}
