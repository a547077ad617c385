// Configuration module

mod args;
mod env;
pub mod prompt;

pub use args::Args;
use crate::killer::KillStrategy;
use anyhow::{bail, Context, Result};
use std::io;
use std::time::Duration;

/// Lifetime used when the interactive prompt is left empty
pub const DEFAULT_LIFETIME_MINUTES: u32 = 5;

/// Check frequency used when the interactive prompt is left empty
pub const DEFAULT_POLL_INTERVAL_MINUTES: f64 = 1.0;

/// Convert a check frequency in minutes to a timer interval.
///
/// Rejects values that are not positive, do not fit a `Duration` or round
/// down to zero.
pub fn poll_interval_from_minutes(minutes: f64) -> Result<Duration> {
    if !minutes.is_finite() || minutes <= 0.0 {
        bail!(
            "check frequency must be a positive number of minutes, got {}",
            minutes
        );
    }
    let interval = Duration::try_from_secs_f64(minutes * 60.0)
        .with_context(|| format!("check frequency {minutes} is out of range"))?;
    if interval.is_zero() {
        bail!("check frequency {} rounds down to zero", minutes);
    }
    Ok(interval)
}

/// What to watch, how old it may get and how often to look.
///
/// Built once at startup and never changed afterwards; the poller only ever
/// gets a shared reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    process_name: String,
    max_lifetime_minutes: u32,
    poll_interval_minutes: f64,
    poll_interval: Duration,
}

impl MonitorConfig {
    /// Validate and build a monitoring configuration
    pub fn new(
        process_name: impl Into<String>,
        max_lifetime_minutes: u32,
        poll_interval_minutes: f64,
    ) -> Result<Self> {
        let process_name = process_name.into();
        if process_name.trim().is_empty() {
            bail!("process name must not be empty");
        }

        let poll_interval = poll_interval_from_minutes(poll_interval_minutes)?;

        Ok(Self {
            process_name,
            max_lifetime_minutes,
            poll_interval_minutes,
            poll_interval,
        })
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn max_lifetime_minutes(&self) -> u32 {
        self.max_lifetime_minutes
    }

    pub fn poll_interval_minutes(&self) -> f64 {
        self.poll_interval_minutes
    }

    /// Poll interval converted to timer resolution
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

/// Main configuration struct for Proc Reaper
#[derive(Debug, Clone)]
pub struct Config {
    pub monitor: MonitorConfig,

    // Behavior flags
    pub kill_strategy: KillStrategy, // SIGKILL, or SIGTERM then SIGKILL
    pub dry_run: bool,               // Don't actually kill processes
}

impl Config {
    /// Create configuration from command-line arguments.
    ///
    /// Without all three positionals the monitoring values are read from
    /// standard input.
    pub fn from_args(args: Args) -> Result<Self> {
        let monitor = match args.monitor_values() {
            Some((name, lifetime, frequency)) => MonitorConfig::new(name, lifetime, frequency)?,
            None => {
                let stdin = io::stdin();
                let mut stdout = io::stdout();
                prompt::prompt_monitor_config(&mut stdin.lock(), &mut stdout)?
            }
        };

        Self::with_monitor(&args, monitor)
    }

    /// Combine an already built `MonitorConfig` with the behaviour flags
    pub fn with_monitor(args: &Args, monitor: MonitorConfig) -> Result<Self> {
        let config = Self {
            monitor,
            kill_strategy: if args.graceful {
                KillStrategy::Graceful
            } else {
                KillStrategy::Forceful
            },
            dry_run: args.dry_run,
        };

        // Apply environment variable overrides
        env::apply_env_overrides(config)
    }
}
