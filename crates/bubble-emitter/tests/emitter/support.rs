//! Shared helpers: a call log and listeners that append to it.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bubble_emitter::{Flow, Listener};

pub type Log = Arc<Mutex<Vec<String>>>;

/// Helper: create a shared call-log that listeners append to.
pub fn make_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Listener that appends `name` and continues.
pub fn recorder(log: &Log, name: &str) -> Listener {
    recorder_with(log, name, Flow::Continue)
}

/// Listener that appends `name` and returns `flow`.
pub fn recorder_with(log: &Log, name: &str, flow: Flow) -> Listener {
    let log = Arc::clone(log);
    let name = name.to_string();
    Listener::new(move |_, _| {
        log.lock().unwrap().push(name.clone());
        flow
    })
}

/// Listener that appends `name:<event type>`.
pub fn typed_recorder(log: &Log, name: &str) -> Listener {
    let log = Arc::clone(log);
    let name = name.to_string();
    Listener::new(move |event, _| {
        log.lock().unwrap().push(format!("{name}:{}", event.event_type()));
    })
}
