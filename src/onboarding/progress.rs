//! Progress reporting for onboarding runs.

use std::sync::Mutex;

/// Receives human-readable progress lines while a run executes.
pub trait ProgressSink: Send + Sync {
    fn report(&self, line: &str);
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _line: &str) {}
}

/// Buffers progress lines for callers that return them in bulk.
#[derive(Debug, Default)]
pub struct CollectingProgress {
    lines: Mutex<Vec<String>>,
}

impl CollectingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }
}

impl ProgressSink for CollectingProgress {
    fn report(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(e) => e.into_inner().push(line.to_string()),
        }
    }
}
