// Command-line argument parsing

use clap::Parser;

/// Proc Reaper - process lifetime watchdog
///
/// Watches every running process with the given name and kills the ones that
/// have been alive for too long. Run without positional arguments to pick the
/// process and limits interactively.
#[derive(Parser, Debug, Default)]
#[command(name = "proc-reaper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kill named processes that outlive a maximum lifetime", long_about = None)]
pub struct Args {
    /// Name of the process to watch
    #[arg(value_name = "PROCESS_NAME")]
    pub process_name: Option<String>,

    /// Maximum lifetime in minutes
    #[arg(value_name = "LIFETIME")]
    pub lifetime: Option<u32>,

    /// How often to check, in minutes (fractions allowed)
    #[arg(value_name = "FREQUENCY")]
    pub frequency: Option<f64>,

    /// Send SIGTERM first and only escalate to SIGKILL if the process lingers
    #[arg(short = 'g', long = "graceful")]
    pub graceful: bool,

    /// Dry run mode - don't actually kill processes, just report what would be killed
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Use syslog instead of stdout/stderr for logging
    #[arg(long = "syslog")]
    pub syslog: bool,
}

impl Args {
    /// Parse arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The monitoring triple, present only when all three positionals were given
    pub fn monitor_values(&self) -> Option<(&str, u32, f64)> {
        match (&self.process_name, self.lifetime, self.frequency) {
            (Some(name), Some(lifetime), Some(frequency)) => Some((name, lifetime, frequency)),
            _ => None,
        }
    }

    /// True when the monitoring values have to be asked for
    pub fn is_interactive(&self) -> bool {
        self.monitor_values().is_none()
    }
}
