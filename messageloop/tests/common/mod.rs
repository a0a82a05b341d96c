#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default wait time for cross-thread assertions
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Thread-safe log of everything a handler received.
#[derive(Clone, Default)]
pub struct Recorder {
    entries: Arc<Mutex<Vec<(i32, Option<String>)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler closure appending to this log.
    pub fn handler(&self) -> Box<dyn FnMut(i32, Option<String>) + Send> {
        let entries = Arc::clone(&self.entries);
        Box::new(move |msg_type, payload| entries.lock().unwrap().push((msg_type, payload)))
    }

    pub fn entries(&self) -> Vec<(i32, Option<String>)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Spins until `count` entries were recorded or the timeout passes.
    pub fn wait_for(&self, count: usize) -> bool {
        wait_until(DEFAULT_WAIT, || self.len() >= count)
    }
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

pub fn entry(msg_type: i32, payload: &str) -> (i32, Option<String>) {
    (msg_type, Some(payload.to_string()))
}
