// Daemon module - polling loop and run controller

mod poller;
mod service;
#[cfg(test)]
pub(crate) mod testing;

pub use poller::{PassRunner, PassSummary, Poller};
pub use service::{run_until_stopped, watch_for_stop_key, ReaperService, STOP_KEY};

use crate::config::Config;
use anyhow::Result;

/// Messages that wake the run controller
#[derive(Debug)]
pub enum ControlEvent {
    /// Stop key or termination signal
    StopRequested,
    /// Process enumeration failed on a timer tick
    PollerFailed(anyhow::Error),
}

/// Run the Proc Reaper watchdog with the given configuration
pub fn run(config: Config) -> Result<()> {
    ReaperService::new(config).run()
}
