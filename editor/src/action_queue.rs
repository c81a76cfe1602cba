//! The undo queue shared by a manager and its derived managers.
//!
//! [`ActionQueue`] keeps accepted actions newest-first: [`push_front`]
//! inserts at the head and [`pop_front`] removes the most recent action.
//! It also carries the `ignoring` flag that suppresses binding feedback
//! while the manager itself is writing the model (undo and veto rollback).
//!
//! The queue uses interior mutability so that managers holding only a
//! shared handle can still modify it.
//!
//! [`push_front`]: ActionQueue::push_front
//! [`pop_front`]: ActionQueue::pop_front

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use crate::action::{ActionId, EditAction};

/// An accepted action together with its identity.
#[derive(Debug)]
pub struct QueuedAction {
    id: ActionId,
    action: Box<dyn EditAction>,
}

impl QueuedAction {
    /// Wraps `action` under a fresh id.
    pub fn new(action: Box<dyn EditAction>) -> Self {
        Self::with_id(ActionId::next(), action)
    }

    pub fn with_id(id: ActionId, action: Box<dyn EditAction>) -> Self {
        Self { id, action }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn action(&self) -> &dyn EditAction {
        self.action.as_ref()
    }

    pub fn action_mut(&mut self) -> &mut dyn EditAction {
        self.action.as_mut()
    }

    pub fn description(&self) -> String {
        self.action.description()
    }

    pub fn into_inner(self) -> Box<dyn EditAction> {
        self.action
    }
}

/// LIFO queue of accepted actions plus the reentrancy flag.
pub struct ActionQueue {
    entries: RefCell<VecDeque<QueuedAction>>,
    ignoring: Cell<bool>,
    max_depth: usize,
}

impl ActionQueue {
    /// Creates an unbounded queue.
    pub fn new() -> Self {
        Self::with_max_depth(0)
    }

    /// Creates a queue that keeps at most `max_depth` actions, dropping the
    /// oldest when full. `0` means unbounded.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entries: RefCell::new(VecDeque::with_capacity(max_depth.min(64))),
            ignoring: Cell::new(false),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Inserts `entry` as the most recent action and returns the new size.
    ///
    /// An entry whose id is already queued is handed back unchanged.
    pub fn push_front(&self, entry: QueuedAction) -> Result<usize, QueuedAction> {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|queued| queued.id == entry.id) {
            return Err(entry);
        }
        entries.push_front(entry);
        if self.max_depth > 0 {
            while entries.len() > self.max_depth {
                if let Some(dropped) = entries.pop_back() {
                    log::debug!("Undo queue full, dropping '{}'", dropped.description());
                }
            }
        }
        Ok(entries.len())
    }

    /// Removes the most recent action.
    pub fn pop_front(&self) -> Option<QueuedAction> {
        self.entries.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, id: ActionId) -> bool {
        self.entries.borrow().iter().any(|queued| queued.id == id)
    }

    /// Ids, newest first.
    pub fn ids(&self) -> Vec<ActionId> {
        self.entries.borrow().iter().map(QueuedAction::id).collect()
    }

    /// Descriptions, newest first.
    pub fn descriptions(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(QueuedAction::description)
            .collect()
    }

    pub fn is_ignoring(&self) -> bool {
        self.ignoring.get()
    }

    pub fn set_ignoring(&self, ignoring: bool) {
        self.ignoring.set(ignoring);
    }

    /// Raises the ignore flag until the returned guard is dropped. Nested
    /// guards restore the value they found.
    pub fn ignore(&self) -> IgnoreGuard<'_> {
        let previous = self.ignoring.replace(true);
        IgnoreGuard {
            flag: &self.ignoring,
            previous,
        }
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionQueue")
            .field("pending", &self.len())
            .field("ignoring", &self.is_ignoring())
            .finish()
    }
}

/// Restores the queue's ignore flag on drop.
#[must_use = "the flag is lowered again as soon as the guard is dropped"]
pub struct IgnoreGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl Drop for IgnoreGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
