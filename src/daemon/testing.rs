// Scripted collaborators for poller and controller tests

use crate::killer::KillResult;
use crate::monitor::{Clock, ProcessSnapshot, ProcessSource};
use crate::notify::{StatusEvent, StatusSink};
use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Local, TimeZone};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap()
}

pub fn snapshot(name: &str, pid: i32, age_minutes: i64, has_exited: bool) -> ProcessSnapshot {
    ProcessSnapshot {
        name: name.to_string(),
        pid,
        start_time: fixed_now() - Duration::minutes(age_minutes),
        has_exited,
    }
}

#[derive(Default)]
struct FakeState {
    snapshots: Vec<ProcessSnapshot>,
    kill_results: HashMap<i32, Result<KillResult, String>>,
    list_calls: usize,
    queried_names: Vec<String>,
    terminated: Vec<i32>,
    fail_listing_from_call: Option<usize>,
}

/// Process source returning a fixed set of snapshots and recording kills
#[derive(Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSource {
    pub fn with_snapshots(snapshots: Vec<ProcessSnapshot>) -> Self {
        let source = Self::default();
        source.state.lock().unwrap().snapshots = snapshots;
        source
    }

    pub fn set_kill_result(&self, pid: i32, result: KillResult) {
        self.state.lock().unwrap().kill_results.insert(pid, Ok(result));
    }

    pub fn set_kill_error(&self, pid: i32, message: &str) {
        self.state
            .lock()
            .unwrap()
            .kill_results
            .insert(pid, Err(message.to_string()));
    }

    /// Make listing fail on the `call`-th call (1-based) and every call after
    pub fn fail_listing_from_call(&self, call: usize) {
        self.state.lock().unwrap().fail_listing_from_call = Some(call);
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn queried_names(&self) -> Vec<String> {
        self.state.lock().unwrap().queried_names.clone()
    }

    pub fn terminated(&self) -> Vec<i32> {
        self.state.lock().unwrap().terminated.clone()
    }
}

impl ProcessSource for FakeSource {
    fn list_processes(&self, name: &str) -> Result<Vec<ProcessSnapshot>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        state.queried_names.push(name.to_string());
        if let Some(call) = state.fail_listing_from_call {
            if state.list_calls >= call {
                bail!("permission denied reading /proc");
            }
        }
        Ok(state
            .snapshots
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect())
    }

    fn terminate(&self, pid: i32) -> Result<KillResult> {
        let mut state = self.state.lock().unwrap();
        state.terminated.push(pid);
        match state.kill_results.get(&pid) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(message)) => bail!("{}", message),
            None => Ok(KillResult::Success),
        }
    }
}

/// Sink keeping every event in order
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<StatusEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingSink {
    fn emit(&mut self, event: StatusEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Clock stuck at `fixed_now()`
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        fixed_now()
    }
}
