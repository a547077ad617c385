// Proc Reaper - Main entry point

use proc_reaper::config::{prompt, Args, Config};
use proc_reaper::daemon;
use proc_reaper::monitor::ProcfsSource;
use std::io;
use std::process;

/// Setup logging based on configuration
fn setup_logging(debug: bool, use_syslog: bool) {
    let log_level = if debug { "debug" } else { "info" };

    if use_syslog {
        #[cfg(feature = "syslog")]
        {
            use syslog::{BasicLogger, Facility, Formatter3164};
            let formatter = Formatter3164 {
                facility: Facility::LOG_DAEMON,
                hostname: None,
                process: "proc_reaper".into(),
                pid: std::process::id(),
            };

            match syslog::unix(formatter) {
                Ok(logger) => {
                    let level = if debug {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    if log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
                        .map(|()| log::set_max_level(level))
                        .is_ok()
                    {
                        return;
                    }
                }
                Err(e) => eprintln!("Failed to connect to syslog: {e}"),
            }
        }

        #[cfg(not(feature = "syslog"))]
        eprintln!("Warning: --syslog requires the 'syslog' feature to be enabled");
    }

    // Fallback to env_logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();
}

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Initialize logging based on debug flag and syslog option
    setup_logging(args.debug, args.syslog);

    // Show what is running before asking which one to watch
    if args.is_interactive() {
        match ProcfsSource::running_names() {
            Ok(names) => {
                if let Err(e) = prompt::print_process_names(&mut io::stdout(), &names) {
                    log::warn!("Failed to print process list: {e}");
                }
            }
            Err(e) => log::warn!("Failed to list running processes: {e:#}"),
        }
    }

    // Create configuration from arguments (or prompts)
    let config = match Config::from_args(args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            eprintln!("Use --help for usage information");
            process::exit(1);
        }
    };

    // Run until the stop key or a termination signal
    if let Err(e) = daemon::run(config) {
        eprintln!("Fatal error: {e:#}");
        process::exit(1);
    }
}
