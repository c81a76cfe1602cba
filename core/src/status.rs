//! User-facing status reporting.
//!
//! Managers post short status lines and warnings through a
//! [`StatusChannel`]. [`StatusBuffer`] captures them in a bounded ring buffer
//! that a display surface (status bar, console) can read from any thread.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// Default number of entries kept by a [`StatusBuffer`].
pub const DEFAULT_STATUS_CAPACITY: usize = 256;

/// Fire-and-forget sink for status messages.
pub trait StatusChannel {
    fn post_status(&self, message: &str);

    fn post_warning(&self, message: &str);

    /// Called whenever the undo queue length changes.
    fn queue_size_changed(&self, _size: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Status,
    Warning,
}

/// A single captured status message.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub level: StatusLevel,
    pub message: String,
    pub timestamp: Instant,
}

#[derive(Debug)]
struct StatusLog {
    entries: VecDeque<StatusEntry>,
    max_capacity: usize,
    queue_size: usize,
}

impl StatusLog {
    fn push(&mut self, level: StatusLevel, message: &str) {
        if self.max_capacity == 0 {
            return;
        }
        if self.entries.len() >= self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(StatusEntry {
            level,
            message: message.to_owned(),
            timestamp: Instant::now(),
        });
    }

    fn last(&self, level: StatusLevel) -> Option<String> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.level == level)
            .map(|e| e.message.clone())
    }
}

/// Shared ring buffer of status entries. Cloning yields another handle to
/// the same buffer.
#[derive(Debug, Clone)]
pub struct StatusBuffer {
    inner: Arc<Mutex<StatusLog>>,
}

impl StatusBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STATUS_CAPACITY)
    }

    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StatusLog {
                entries: VecDeque::with_capacity(max_capacity.min(1024)),
                max_capacity,
                queue_size: 0,
            })),
        }
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<StatusEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn last_status(&self) -> Option<String> {
        self.inner.lock().last(StatusLevel::Status)
    }

    pub fn last_warning(&self) -> Option<String> {
        self.inner.lock().last(StatusLevel::Warning)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.level == StatusLevel::Warning)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Last queue size reported through [`StatusChannel::queue_size_changed`].
    pub fn queue_size(&self) -> usize {
        self.inner.lock().queue_size
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }
}

impl Default for StatusBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusChannel for StatusBuffer {
    fn post_status(&self, message: &str) {
        self.inner.lock().push(StatusLevel::Status, message);
    }

    fn post_warning(&self, message: &str) {
        self.inner.lock().push(StatusLevel::Warning, message);
    }

    fn queue_size_changed(&self, size: usize) {
        self.inner.lock().queue_size = size;
    }
}
