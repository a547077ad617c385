// Process killer module

pub mod signals;

pub use signals::{kill_process, KillResult, KillStrategy};
