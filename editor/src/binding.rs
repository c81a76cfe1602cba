//! Reactive value cells for property editors.
//!
//! A [`Binding`] holds one boolean or string value. Editors write user input
//! into it with [`Binding::set`]; subscribers are told about every change
//! with the old and the new value. The action manager subscribes to the
//! cells it hands out and turns each change into an undoable action.
//!
//! Cells are single-threaded (`Rc`/`RefCell`). Notification runs with no
//! internal borrow held and over a snapshot of the subscribers, so a
//! subscriber may subscribe, unsubscribe or even write the cell again.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use otmde_core::events::ModelEvent;
use otmde_core::model::{Model, NodeId};
use otmde_core::validation::{Findings, ValidationOracle, VetoPolicy};

use crate::action::{ActionValue, EditAction, EditActionResult};
use crate::kinds::ActionKind;

/// Value types a [`Binding`] can hold.
pub trait BindableValue: Clone + PartialEq + fmt::Debug + 'static {
    fn into_action_value(self) -> ActionValue;
}

impl BindableValue for bool {
    fn into_action_value(self) -> ActionValue {
        ActionValue::Flag(self)
    }
}

impl BindableValue for String {
    fn into_action_value(self) -> ActionValue {
        ActionValue::Text(self)
    }
}

/// Handle returned by [`Binding::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Rc<dyn Fn(&T, &T)>;

struct BindingState<T> {
    value: T,
    read_only: bool,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

/// Shared reactive cell. Cloning yields another handle to the same cell.
pub struct Binding<T: BindableValue> {
    state: Rc<RefCell<BindingState<T>>>,
}

impl<T: BindableValue> Binding<T> {
    pub fn new(value: T) -> Self {
        Self::with_mode(value, false)
    }

    /// A cell that ignores every [`set`](Self::set).
    pub fn read_only(value: T) -> Self {
        Self::with_mode(value, true)
    }

    fn with_mode(value: T, read_only: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(BindingState {
                value,
                read_only,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.state.borrow().value.clone()
    }

    pub fn is_read_only(&self) -> bool {
        self.state.borrow().read_only
    }

    /// Stores `value` and notifies subscribers. Returns `false` without
    /// notifying when the cell is read-only or already holds `value`.
    pub fn set(&self, value: T) -> bool {
        let (old, listeners) = {
            let mut state = self.state.borrow_mut();
            if state.read_only || state.value == value {
                return false;
            }
            let old = std::mem::replace(&mut state.value, value.clone());
            let listeners: Vec<Listener<T>> =
                state.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            (old, listeners)
        };
        for listener in listeners {
            listener(&old, &value);
        }
        true
    }

    pub fn subscribe(&self, listener: impl Fn(&T, &T) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` if the subscription was not registered.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(id, _)| *id != subscription);
        state.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn downgrade(&self) -> WeakBinding<T> {
        WeakBinding {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Whether both handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T: BindableValue> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: BindableValue> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Binding")
            .field("value", &state.value)
            .field("read_only", &state.read_only)
            .field("subscribers", &state.listeners.len())
            .finish()
    }
}

/// Non-owning handle to a [`Binding`].
pub struct WeakBinding<T: BindableValue> {
    state: Weak<RefCell<BindingState<T>>>,
}

impl<T: BindableValue> WeakBinding<T> {
    pub fn upgrade(&self) -> Option<Binding<T>> {
        self.state.upgrade().map(|state| Binding { state })
    }
}

impl<T: BindableValue> Clone for WeakBinding<T> {
    fn clone(&self) -> Self {
        Self {
            state: Weak::clone(&self.state),
        }
    }
}

impl<T: BindableValue> fmt::Debug for WeakBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBinding")
            .field("alive", &(self.state.strong_count() > 0))
            .finish()
    }
}

/// An action created from a cell change. Behaves exactly like the wrapped
/// action, and writes the pre-change value back into the cell on rewind.
#[derive(Debug)]
pub struct BoundAction<T: BindableValue> {
    inner: Box<dyn EditAction>,
    binding: WeakBinding<T>,
    old: T,
}

impl<T: BindableValue> BoundAction<T> {
    pub fn new(inner: Box<dyn EditAction>, binding: WeakBinding<T>, old: T) -> Self {
        Self {
            inner,
            binding,
            old,
        }
    }
}

impl<T: BindableValue> EditAction for BoundAction<T> {
    fn kind(&self) -> ActionKind {
        self.inner.kind()
    }

    fn subject(&self) -> NodeId {
        self.inner.subject()
    }

    fn apply(
        &mut self,
        model: &mut Model,
        data: Option<ActionValue>,
    ) -> EditActionResult<Option<ActionValue>> {
        self.inner.apply(model, data)
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.inner.undo(model)
    }

    fn is_valid(&self, model: &Model) -> bool {
        self.inner.is_valid(model)
    }

    fn veto_findings(
        &self,
        model: &Model,
        oracle: &dyn ValidationOracle,
        policy: &VetoPolicy,
    ) -> Findings {
        self.inner.veto_findings(model, oracle, policy)
    }

    fn event(&self) -> Option<ModelEvent> {
        self.inner.event()
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn rewind_binding(&self) {
        if let Some(binding) = self.binding.upgrade() {
            binding.set(self.old.clone());
        }
    }
}
