// Run controller: start the poller, wait for a stop request, stop the poller

use super::poller::{PassRunner, Poller};
use super::ControlEvent;
use crate::config::Config;
use crate::monitor::{ProcfsSource, SystemClock};
use crate::notify::LogSink;
use crate::sanitize_for_log;
use anyhow::{anyhow, Context, Result};
use std::io::{self, BufRead, BufReader};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Line that stops the watchdog when typed on standard input
pub const STOP_KEY: &str = "q";

/// Watchdog service wired to the real process table
pub struct ReaperService {
    config: Config,
}

impl ReaperService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until a stop request arrives or polling fails
    pub fn run(&self) -> Result<()> {
        self.print_startup_info();

        let (control_tx, control_rx) = mpsc::channel();
        self.setup_signal_handlers(control_tx.clone())?;
        watch_for_stop_key(BufReader::new(io::stdin()), control_tx.clone())?;

        let monitor = Arc::new(self.config.monitor.clone());
        let runner = PassRunner::new(
            Arc::clone(&monitor),
            Box::new(ProcfsSource::new(self.config.kill_strategy)),
            Box::new(LogSink),
            Box::new(SystemClock),
        )
        .dry_run(self.config.dry_run);

        run_until_stopped(runner, monitor.poll_interval(), control_tx, control_rx)?;

        log::info!("Proc Reaper shutting down gracefully");
        Ok(())
    }

    /// Setup signal handlers for graceful shutdown
    fn setup_signal_handlers(&self, control: Sender<ControlEvent>) -> Result<()> {
        // Handle SIGTERM and SIGINT
        ctrlc::set_handler(move || {
            log::info!("Received shutdown signal");
            let _ = control.send(ControlEvent::StopRequested);
        })
        .map_err(|e| anyhow!("Failed to set signal handler: {}", e))?;

        Ok(())
    }

    /// Print startup information
    fn print_startup_info(&self) {
        let monitor = &self.config.monitor;

        log::info!("=== Proc Reaper v{} starting ===", env!("CARGO_PKG_VERSION"));
        log::info!(
            "process name = {}, lifetime = {} min, check frequency = {} min",
            sanitize_for_log(monitor.process_name()),
            monitor.max_lifetime_minutes(),
            monitor.poll_interval_minutes()
        );
        log::info!("Kill strategy: {:?}", self.config.kill_strategy);

        if self.config.dry_run {
            log::warn!("DRY RUN MODE - will not actually kill processes");
        }

        log::info!("To exit the program, type {} and press Enter", STOP_KEY);
        log::info!("==========================================");
    }
}

/// Start polling and block until told to stop.
///
/// Returns `Ok` on a stop request and the poller's error if a tick failed.
/// The poller is disarmed in both cases before returning.
pub fn run_until_stopped(
    runner: PassRunner,
    interval: Duration,
    control_tx: Sender<ControlEvent>,
    control_rx: Receiver<ControlEvent>,
) -> Result<()> {
    let mut poller = Poller::start(runner, interval, control_tx)?;

    let outcome = match control_rx.recv() {
        Ok(ControlEvent::StopRequested) => Ok(()),
        Ok(ControlEvent::PollerFailed(e)) => Err(e),
        Err(_) => Err(anyhow!("All stop sources went away")),
    };

    poller.stop();
    outcome
}

/// Watch `input` for the stop key on its own thread.
///
/// End of input is not a stop request: a daemon without a terminal keeps
/// running and relies on signals instead.
pub fn watch_for_stop_key<R>(input: R, control: Sender<ControlEvent>) -> Result<()>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("reaper-stop-key".to_string())
        .spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else { break };
                if line.trim().eq_ignore_ascii_case(STOP_KEY) {
                    log::info!("Stop key pressed");
                    let _ = control.send(ControlEvent::StopRequested);
                    break;
                }
            }
            log::debug!("Stopped watching standard input");
        })
        .context("Failed to spawn stop key thread")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::daemon::testing::{snapshot, FakeSource, FixedClock, RecordingSink};
    use crate::notify::StatusEvent;
    use std::io::Cursor;

    fn runner(source: &FakeSource, sink: &RecordingSink) -> PassRunner {
        let config = Arc::new(MonitorConfig::new("calc", 5, 1.0).unwrap());
        PassRunner::new(
            config,
            Box::new(source.clone()),
            Box::new(sink.clone()),
            Box::new(FixedClock),
        )
    }

    #[test]
    fn test_stop_request_ends_the_run() {
        let source = FakeSource::with_snapshots(vec![snapshot("calc", 42, 6, false)]);
        let sink = RecordingSink::default();
        let (control_tx, control_rx) = mpsc::channel();

        let stopper = control_tx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            stopper.send(ControlEvent::StopRequested).unwrap();
        });

        run_until_stopped(
            runner(&source, &sink),
            Duration::from_millis(10),
            control_tx,
            control_rx,
        )
        .unwrap();

        let calls = source.list_calls();
        assert!(calls >= 1);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(source.list_calls(), calls);
        assert_eq!(
            sink.events()[1],
            StatusEvent::Killed { name: "calc".into(), pid: 42 }
        );
    }

    #[test]
    fn test_poller_failure_ends_the_run_with_error() {
        let source = FakeSource::default();
        source.fail_listing_from_call(3);
        let sink = RecordingSink::default();
        let (control_tx, control_rx) = mpsc::channel();

        let err = run_until_stopped(
            runner(&source, &sink),
            Duration::from_millis(10),
            control_tx,
            control_rx,
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("permission denied"));
        assert_eq!(source.list_calls(), 3);
    }

    #[test]
    fn test_startup_failure_is_returned() {
        let source = FakeSource::default();
        source.fail_listing_from_call(1);
        let sink = RecordingSink::default();
        let (control_tx, control_rx) = mpsc::channel();

        let result = run_until_stopped(
            runner(&source, &sink),
            Duration::from_millis(10),
            control_tx,
            control_rx,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stop_key_sends_stop_request() {
        let (control_tx, control_rx) = mpsc::channel();
        watch_for_stop_key(Cursor::new(b"hello\n Q \nq\n".to_vec()), control_tx).unwrap();

        let event = control_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, ControlEvent::StopRequested));
        // Only the first stop key is forwarded
        assert!(control_rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_end_of_input_is_not_a_stop_request() {
        let (control_tx, control_rx) = mpsc::channel();
        watch_for_stop_key(Cursor::new(b"x\ny\n".to_vec()), control_tx).unwrap();

        assert!(matches!(
            control_rx.recv_timeout(Duration::from_secs(5)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }
}
