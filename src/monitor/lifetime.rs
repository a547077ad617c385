// Process lifetime evaluation

use chrono::{DateTime, Duration, Local};

/// Source of "now" for lifetime checks
pub trait Clock: Send {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock of the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Minutes field of an elapsed span, hours and days stripped off.
///
/// 1h02m and 0h02m both give 2. Truncates toward zero, so a negative span
/// (start time in the future after a clock step) yields a value <= 0.
pub fn minutes_component(elapsed: Duration) -> i64 {
    elapsed.num_minutes() % 60
}

/// Decide whether a process started at `start_time` has lived too long.
///
/// Only the minutes field of the age is compared against the limit, not the
/// total number of elapsed minutes: a 62 minute old process checked against a
/// 5 minute limit reads as 2 minutes and survives.
pub fn should_terminate(
    now: DateTime<Local>,
    start_time: DateTime<Local>,
    max_lifetime_minutes: u32,
) -> bool {
    let elapsed = now.signed_duration_since(start_time);
    minutes_component(elapsed) >= i64::from(max_lifetime_minutes)
}
