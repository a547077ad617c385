// Evaluation passes and the timer that repeats them

use super::ControlEvent;
use crate::config::MonitorConfig;
use crate::killer::KillResult;
use crate::monitor::{should_terminate, Clock, ProcessSnapshot, ProcessSource};
use crate::notify::{StatusEvent, StatusSink};
use crate::sanitize_for_log;
use anyhow::{Context, Result};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Counts from one evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub observed: usize,
    pub killed: usize,
    pub failed: usize,
    /// Dry run only: processes that would have been killed
    pub would_kill: usize,
}

/// What happened to one process that outlived its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KillOutcome {
    Killed,
    Failed,
    Skipped,
}

/// Everything one evaluation pass needs
pub struct PassRunner {
    config: Arc<MonitorConfig>,
    source: Box<dyn ProcessSource>,
    sink: Box<dyn StatusSink>,
    clock: Box<dyn Clock>,
    dry_run: bool,
}

impl PassRunner {
    pub fn new(
        config: Arc<MonitorConfig>,
        source: Box<dyn ProcessSource>,
        sink: Box<dyn StatusSink>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
            clock,
            dry_run: false,
        }
    }

    /// Report what would be killed instead of killing it
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check every process with the configured name once.
    ///
    /// Only a failure to enumerate processes is returned as an error; failed
    /// kills become `KillFailed` events and the pass carries on.
    pub fn run_pass(&mut self) -> Result<PassSummary> {
        let name = self.config.process_name();
        let processes = self
            .source
            .list_processes(name)
            .with_context(|| format!("Failed to list processes named {}", sanitize_for_log(name)))?;

        let mut summary = PassSummary::default();
        if processes.is_empty() {
            self.sink.emit(StatusEvent::NoProcesses {
                name: name.to_string(),
            });
            return Ok(summary);
        }

        for process in processes {
            // A dead instance usually means the whole group went down with it
            if process.has_exited {
                self.sink.emit(StatusEvent::Exited {
                    name: process.name,
                    pid: process.pid,
                });
                break;
            }

            summary.observed += 1;
            self.sink.emit(StatusEvent::Observed {
                name: process.name.clone(),
                pid: process.pid,
                start_time: process.start_time,
            });

            let now = self.clock.now();
            if should_terminate(now, process.start_time, self.config.max_lifetime_minutes()) {
                match self.terminate(process) {
                    KillOutcome::Killed => summary.killed += 1,
                    KillOutcome::Failed => summary.failed += 1,
                    KillOutcome::Skipped => summary.would_kill += 1,
                }
            }
        }

        log::debug!(
            "Pass finished: {} observed, {} killed, {} failed, {} spared by dry run",
            summary.observed,
            summary.killed,
            summary.failed,
            summary.would_kill
        );
        Ok(summary)
    }

    /// Kill one process and report the outcome
    fn terminate(&mut self, process: ProcessSnapshot) -> KillOutcome {
        let ProcessSnapshot { name, pid, .. } = process;

        if self.dry_run {
            self.sink.emit(StatusEvent::WouldKill { name, pid });
            return KillOutcome::Skipped;
        }

        let reason = match self.source.terminate(pid) {
            Ok(KillResult::Success) => {
                self.sink.emit(StatusEvent::Killed { name, pid });
                return KillOutcome::Killed;
            }
            Ok(result) => result.description().to_string(),
            Err(e) => format!("{e:#}"),
        };

        self.sink.emit(StatusEvent::KillFailed { name, pid, reason });
        KillOutcome::Failed
    }
}

/// Timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Armed,
    Stopped,
}

/// Runs a pass at startup and then once per interval on its own thread.
///
/// The next interval only starts counting once a pass has finished, so two
/// passes never run at the same time.
pub struct Poller {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Run the first pass on the calling thread, then arm the timer.
    ///
    /// A failing first pass is returned directly. Failures on later ticks
    /// stop the timer and are sent to `control` as `PollerFailed`.
    pub fn start(
        mut runner: PassRunner,
        interval: Duration,
        control: Sender<ControlEvent>,
    ) -> Result<Self> {
        runner.run_pass()?;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("reaper-poller".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(e) = runner.run_pass() {
                            log::error!("Poll failed: {e:#}");
                            let _ = control.send(ControlEvent::PollerFailed(e));
                            break;
                        }
                    }
                    // Stop requested or the poller handle was dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .context("Failed to spawn poller thread")?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub(crate) fn state(&self) -> PollerState {
        match &self.handle {
            Some(handle) if !handle.is_finished() => PollerState::Armed,
            _ => PollerState::Stopped,
        }
    }

    /// Disarm the timer. A pass already in flight is allowed to finish.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Poller thread panicked");
            }
            log::debug!("Poller {:?}", self.state());
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
