// Process monitoring module

mod lifetime;
mod process;

pub use lifetime::{minutes_component, should_terminate, Clock, SystemClock};
pub use process::{ProcessSnapshot, ProcessSource, ProcfsSource};
