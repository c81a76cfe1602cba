//! Background work on libraries.
//!
//! After a change is accepted or rolled back, the owning library has to be
//! revalidated and its references resolved again. Managers only request
//! that work through [`ContainerTasks`]; running it is up to the host.

use std::fmt;

use parking_lot::Mutex;

use crate::model::NodeId;

/// Requests revalidation of a library.
pub trait ContainerTasks {
    fn start_validating_and_resolving(&self, library: NodeId);
}

/// Collects library refresh requests until the host drains them.
///
/// Requests for a library that is already pending are coalesced.
pub struct QueuedTasks {
    pending: Mutex<Vec<NodeId>>,
}

impl QueuedTasks {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Removes all pending requests, returning them in request order.
    pub fn drain(&self) -> Vec<NodeId> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub fn is_pending(&self, library: NodeId) -> bool {
        self.pending.lock().contains(&library)
    }
}

impl Default for QueuedTasks {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerTasks for QueuedTasks {
    fn start_validating_and_resolving(&self, library: NodeId) {
        let mut pending = self.pending.lock();
        if !pending.contains(&library) {
            log::debug!("Queued validate/resolve of library {library}");
            pending.push(library);
        }
    }
}

impl fmt::Debug for QueuedTasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.pending.lock().len();
        f.debug_struct("QueuedTasks").field("pending", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_coalesced() {
        let tasks = QueuedTasks::new();
        let a = NodeId::from_index(1);
        let b = NodeId::from_index(2);
        tasks.start_validating_and_resolving(a);
        tasks.start_validating_and_resolving(b);
        tasks.start_validating_and_resolving(a);

        assert!(tasks.is_pending(a));
        assert_eq!(tasks.drain(), vec![a, b]);
        assert!(tasks.is_empty());
    }

    #[test]
    fn debug_impl() {
        let tasks = QueuedTasks::new();
        tasks.start_validating_and_resolving(NodeId::from_index(0));
        let debug = format!("{tasks:?}");
        assert!(debug.contains("QueuedTasks"));
        assert!(debug.contains("pending"));
    }
}
