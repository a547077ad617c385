// Proc Reaper - process lifetime watchdog library

pub mod config;
pub mod monitor;
pub mod killer;
pub mod daemon;
pub mod notify;

// Re-export commonly used types
pub use config::{Config, MonitorConfig};
pub use monitor::{ProcessSnapshot, ProcessSource};

/// Maximum number of characters of an untrusted string that end up in a log line
const MAX_LOG_FIELD_LEN: usize = 64;

/// Make a process-controlled string safe to interpolate into a log line.
///
/// Process names come from `/proc` and are chosen by whoever started the
/// process, so control characters are replaced and the length is capped.
pub fn sanitize_for_log(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .take(MAX_LOG_FIELD_LEN)
        .collect()
}
