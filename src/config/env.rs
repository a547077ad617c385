// Environment variable configuration support

use super::Config;
use crate::killer::KillStrategy;
use anyhow::Result;
use std::env;

/// Apply environment variable overrides to configuration
///
/// Only behaviour flags can be overridden here. The monitored process, its
/// lifetime and the poll interval are fixed once `MonitorConfig` is built.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Ok(val) = env::var("PROC_REAPER_DRY_RUN") {
        config.dry_run = parse_bool(&val)?;
    }
    if let Ok(val) = env::var("PROC_REAPER_GRACEFUL") {
        config.kill_strategy = if parse_bool(&val)? {
            KillStrategy::Graceful
        } else {
            KillStrategy::Forceful
        };
    }

    Ok(config)
}

/// Parse boolean value from string
/// Accepts: true/false, 1/0, yes/no, on/off (case-insensitive)
fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid boolean value: {}", s),
    }
}
