//! Progress reporting for index builds

use std::io::{self, Write};
use std::sync::Mutex;

/// Single-line embedding progress on stderr
pub struct ProgressReporter {
    last: Mutex<Option<(usize, usize)>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    pub fn set_message(&self, msg: &str) {
        eprint!("\r{:<50}", msg);
        io::stderr().flush().ok();
    }

    /// Record `done` of `total` reviews embedded
    pub fn update(&self, done: usize, total: usize) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some((done, total));
        }
        let pct = if total > 0 { done * 100 / total } else { 100 };
        self.set_message(&format!("Embedding reviews: {}/{} ({}%)", done, total, pct));
    }

    /// Terminate the progress line if anything was printed
    pub fn finish(&self) {
        let last = self.last.lock().ok().and_then(|l| *l);
        if let Some((done, total)) = last {
            eprintln!("\rDone ({}/{})                    ", done, total);
        }
    }
}
