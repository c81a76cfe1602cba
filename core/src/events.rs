//! Model change notifications.
//!
//! Actions describe what they changed as a [`ModelEvent`]; action managers
//! publish those through an [`EventSink`]. [`EventBus`] is the default sink:
//! it fans events out synchronously to subscribers and keeps a bounded log
//! of recent events for diagnostics.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::model::{FlagField, NodeId, TextField};

/// Default number of events kept by [`EventBus::recent`].
pub const DEFAULT_RECENT_EVENTS: usize = 64;

/// A change applied to (or reverted on) the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    TextChanged {
        subject: NodeId,
        field: TextField,
        old: String,
        new: String,
    },
    FlagChanged {
        subject: NodeId,
        field: FlagField,
        value: bool,
    },
    NodeAdded {
        owner: NodeId,
        node: NodeId,
    },
    /// `owner` is `None` for members that were not in a library.
    NodeRemoved {
        owner: Option<NodeId>,
        node: NodeId,
    },
    TypeAssigned {
        user: NodeId,
        old: Option<NodeId>,
        new: Option<NodeId>,
    },
    LibraryAssigned {
        member: NodeId,
        old: Option<NodeId>,
        new: Option<NodeId>,
    },
}

impl ModelEvent {
    /// The node the event is about.
    pub fn subject(&self) -> NodeId {
        match self {
            Self::TextChanged { subject, .. } | Self::FlagChanged { subject, .. } => *subject,
            Self::NodeAdded { node, .. } | Self::NodeRemoved { node, .. } => *node,
            Self::TypeAssigned { user, .. } => *user,
            Self::LibraryAssigned { member, .. } => *member,
        }
    }
}

impl fmt::Display for ModelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextChanged {
                subject,
                field,
                old,
                new,
            } => write!(f, "{subject} {}: '{old}' -> '{new}'", field.label()),
            Self::FlagChanged {
                subject,
                field,
                value,
            } => write!(f, "{subject} {}: {value}", field.label()),
            Self::NodeAdded { owner, node } => write!(f, "{node} added to {owner}"),
            Self::NodeRemoved {
                owner: Some(owner),
                node,
            } => write!(f, "{node} removed from {owner}"),
            Self::NodeRemoved { owner: None, node } => write!(f, "{node} removed"),
            Self::TypeAssigned { user, old, new } => {
                write!(f, "{user} type: {old:?} -> {new:?}")
            }
            Self::LibraryAssigned { member, old, new } => {
                write!(f, "{member} library: {old:?} -> {new:?}")
            }
        }
    }
}

/// Receiver of model events.
pub trait EventSink {
    fn publish(&self, event: &ModelEvent);
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventSubscription(u64);

type Listener = Rc<dyn Fn(&ModelEvent)>;

struct BusState {
    next_id: u64,
    listeners: Vec<(EventSubscription, Listener)>,
    recent: VecDeque<ModelEvent>,
    capacity: usize,
}

/// Synchronous single-threaded event fan-out.
///
/// Listeners run over a snapshot of the subscriber list, so a listener may
/// subscribe or unsubscribe while being notified.
pub struct EventBus {
    state: RefCell<BusState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RECENT_EVENTS)
    }

    /// Creates a bus that remembers at most `capacity` recent events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RefCell::new(BusState {
                next_id: 0,
                listeners: Vec::new(),
                recent: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
            }),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&ModelEvent) + 'static) -> EventSubscription {
        let mut state = self.state.borrow_mut();
        let id = EventSubscription(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` if the subscription was not registered.
    pub fn unsubscribe(&self, subscription: EventSubscription) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(id, _)| *id != subscription);
        state.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Recent events, oldest first.
    pub fn recent(&self) -> Vec<ModelEvent> {
        self.state.borrow().recent.iter().cloned().collect()
    }

    pub fn clear_recent(&self) {
        self.state.borrow_mut().recent.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: &ModelEvent) {
        let listeners: Vec<Listener> = {
            let mut state = self.state.borrow_mut();
            if state.capacity > 0 {
                if state.recent.len() >= state.capacity {
                    state.recent.pop_front();
                }
                state.recent.push_back(event.clone());
            }
            state.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };
        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventBus")
            .field("listeners", &state.listeners.len())
            .field("recent", &state.recent.len())
            .finish()
    }
}
