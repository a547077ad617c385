// Interactive configuration prompts

use super::{
    poll_interval_from_minutes, MonitorConfig, DEFAULT_LIFETIME_MINUTES,
    DEFAULT_POLL_INTERVAL_MINUTES,
};
use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Print the names of the running processes so the user can pick one
pub fn print_process_names<W: Write>(output: &mut W, names: &[String]) -> Result<()> {
    writeln!(output, "Running processes:")?;
    for name in names {
        writeln!(output, "  {}", crate::sanitize_for_log(name))?;
    }
    writeln!(output, "{}", "-".repeat(60))?;
    Ok(())
}

/// Ask for the process name, lifetime and check frequency.
///
/// Invalid numbers are reported and asked for again. Empty numeric answers
/// take the defaults. Running out of input is an error.
pub fn prompt_monitor_config<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<MonitorConfig> {
    let process_name = loop {
        let answer = ask(input, output, "Enter the process name from the list above:")?;
        if !answer.is_empty() {
            break answer;
        }
        writeln!(output, "The process name cannot be empty")?;
    };

    let lifetime: u32 = ask_number(
        input,
        output,
        "Enter lifetime in minutes",
        DEFAULT_LIFETIME_MINUTES,
        |_| true,
    )?;

    let frequency: f64 = ask_number(
        input,
        output,
        "Enter check frequency in minutes",
        DEFAULT_POLL_INTERVAL_MINUTES,
        |v: &f64| poll_interval_from_minutes(*v).is_ok(),
    )?;

    MonitorConfig::new(process_name, lifetime, frequency)
}

/// Print a question and read one trimmed line
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    writeln!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read from standard input")?;
    if read == 0 {
        bail!("Input closed before the configuration was complete");
    }
    Ok(line.trim().to_string())
}

fn ask_number<T, R, W>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> Result<T>
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
    R: BufRead,
    W: Write,
{
    let question = format!("{question} [{default}]:");
    loop {
        let answer = ask(input, output, &question)?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<T>() {
            Ok(value) if accept(&value) => return Ok(value),
            Ok(_) => writeln!(output, "Value out of range: {answer}")?,
            Err(e) => writeln!(output, "Enter text in the correct format ({e}): {answer}")?,
        }
    }
}
