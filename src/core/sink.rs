//! Append-only log sink shared by all core services.

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Destination for user-visible event lines.
///
/// The core never persists or renders log text itself; the host implements
/// this trait (or uses [`LogBuffer`]) and decides how lines are displayed.
pub trait EventSink: Send + Sync {
    fn emit(&self, line: &str);
}

const DEFAULT_LOG_CAPACITY: usize = 200;

/// Capped in-memory log buffer.
///
/// Lines are timestamped on arrival and the oldest lines are dropped once
/// the cap is reached. The accumulated text is exposed as a plain string so
/// the host can copy or export it.
pub struct LogBuffer {
    lines: Mutex<VecDeque<String>>,
    capacity: usize,
    total_emitted: Mutex<u64>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            total_emitted: Mutex::new(0),
        }
    }

    /// Snapshot of the retained lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    /// Accumulated log text, one line per entry.
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    /// Number of lines ever emitted, including lines already evicted.
    pub fn total_emitted(&self) -> u64 {
        *self.total_emitted.lock()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl EventSink for LogBuffer {
    fn emit(&self, line: &str) {
        let stamped = format!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), line);
        let mut lines = self.lines.lock();
        if lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(stamped);
        *self.total_emitted.lock() += 1;
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}
