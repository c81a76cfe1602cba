//! Reversible editor actions.
//!
//! This module defines the core abstractions of the action system:
//!
//! - [`EditAction`]: a reversible edit of one model subject (Command pattern)
//! - [`ActionValue`]: the input an action consumes and the result it reports
//! - [`EditActionError`] / [`EditActionResult`]: error handling for actions
//!
//! Actions are self-contained: each implementation stores whatever it needs
//! to undo itself (subject id, previous value, detached position).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use otmde_core::events::ModelEvent;
use otmde_core::model::{MemberKind, Model, ModelError, NodeId};
use otmde_core::validation::{Findings, ValidationOracle, VetoPolicy};

use crate::kinds::ActionKind;

/// Error type for action execution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditActionError {
    /// The subject does not exist.
    #[error("target not found: {0}")]
    TargetNotFound(NodeId),
    /// The action or its subject is in an invalid state for this call.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The action kind does not apply to this kind of node.
    #[error("{kind} does not apply to {subject}")]
    WrongSubject { kind: ActionKind, subject: NodeId },
    /// The input value has the wrong shape.
    #[error("expected {expected} input, got {got:?}")]
    WrongValue {
        expected: &'static str,
        got: ActionValue,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

/// Result type for action operations.
pub type EditActionResult<T = ()> = Result<T, EditActionError>;

/// Input to [`EditAction::apply`] and the value it reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionValue {
    Text(String),
    Flag(bool),
    Node(NodeId),
    /// Kind and name of a member to create.
    Creation(MemberKind, String),
}

impl ActionValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(node) => Some(*node),
            _ => None,
        }
    }

    pub(crate) fn into_text(self) -> EditActionResult<String> {
        match self {
            Self::Text(text) => Ok(text),
            got => Err(EditActionError::WrongValue {
                expected: "text",
                got,
            }),
        }
    }

    pub(crate) fn into_flag(self) -> EditActionResult<bool> {
        match self {
            Self::Flag(flag) => Ok(flag),
            got => Err(EditActionError::WrongValue {
                expected: "flag",
                got,
            }),
        }
    }

    pub(crate) fn into_node(self) -> EditActionResult<NodeId> {
        match self {
            Self::Node(node) => Ok(node),
            got => Err(EditActionError::WrongValue {
                expected: "node",
                got,
            }),
        }
    }
}

impl From<String> for ActionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ActionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<bool> for ActionValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<NodeId> for ActionValue {
    fn from(value: NodeId) -> Self {
        Self::Node(value)
    }
}

/// Process-unique identity of a queued action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);

impl ActionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action #{}", self.0)
    }
}

/// Where an action is in its created → applied → undone life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Created,
    Applied,
    Undone,
}

impl Lifecycle {
    /// Moves to `Applied`. Fails if the action already ran.
    pub fn start_apply(&mut self) -> EditActionResult {
        match self {
            Self::Created => {
                *self = Self::Applied;
                Ok(())
            }
            _ => Err(EditActionError::InvalidState(
                "action was already applied".into(),
            )),
        }
    }

    /// Moves to `Undone`. Fails unless the action is applied.
    pub fn start_undo(&mut self) -> EditActionResult {
        match self {
            Self::Applied => {
                *self = Self::Undone;
                Ok(())
            }
            Self::Created => Err(EditActionError::InvalidState(
                "action was never applied".into(),
            )),
            Self::Undone => Err(EditActionError::InvalidState(
                "action was already undone".into(),
            )),
        }
    }
}

/// A reversible edit of one model subject (Command pattern).
///
/// Actions are applied once, then either accepted onto an undo queue or
/// rolled back immediately when the validation oracle vetoes the result.
/// An accepted action is undone at most once and is not kept for redo.
///
/// # Object Safety
///
/// This trait is dyn-compatible so that different action types can share
/// one undo queue as `Box<dyn EditAction>`.
pub trait EditAction: fmt::Debug + 'static {
    fn kind(&self) -> ActionKind;

    /// The node the action was created for.
    fn subject(&self) -> NodeId;

    /// Applies the change.
    ///
    /// Returns `Ok(None)` when nothing was performed (no input, or the input
    /// equals the current value). Calling `apply` twice is an error.
    fn apply(
        &mut self,
        model: &mut Model,
        data: Option<ActionValue>,
    ) -> EditActionResult<Option<ActionValue>>;

    /// Restores the state from before [`apply`](Self::apply). Only touches
    /// the nodes this action changed, so it stays correct after unrelated
    /// actions were applied in between.
    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>>;

    /// Local self-check, independent of the validation oracle.
    fn is_valid(&self, model: &Model) -> bool {
        model.is_live(self.subject())
    }

    /// Findings that veto the applied change. Empty means accepted.
    fn veto_findings(
        &self,
        model: &Model,
        oracle: &dyn ValidationOracle,
        policy: &VetoPolicy,
    ) -> Findings {
        policy.vetoes(&oracle.findings(model, self.subject()))
    }

    /// Notification describing the last apply or undo, if any.
    fn event(&self) -> Option<ModelEvent> {
        None
    }

    /// A short, human-readable description for status messages and the
    /// undo menu.
    fn description(&self) -> String;

    /// Writes the pre-apply value back to a bound cell. No-op unless the
    /// action was created through a binding.
    fn rewind_binding(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use otmde_core::model::{TextField, Version};

    #[derive(Debug)]
    struct Rename {
        subject: NodeId,
        old: String,
        state: Lifecycle,
    }

    impl EditAction for Rename {
        fn kind(&self) -> ActionKind {
            ActionKind::NameChange
        }

        fn subject(&self) -> NodeId {
            self.subject
        }

        fn apply(
            &mut self,
            model: &mut Model,
            data: Option<ActionValue>,
        ) -> EditActionResult<Option<ActionValue>> {
            self.state.start_apply()?;
            let Some(data) = data else {
                return Ok(None);
            };
            let name = data.into_text()?;
            self.old = model.set_text(self.subject, TextField::Name, name.clone())?;
            Ok(Some(ActionValue::Text(name)))
        }

        fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
            self.state.start_undo()?;
            model.set_text(self.subject, TextField::Name, self.old.clone())?;
            Ok(Some(ActionValue::Text(self.old.clone())))
        }

        fn description(&self) -> String {
            "Rename".into()
        }
    }

    fn model() -> (Model, NodeId) {
        let mut model = Model::new();
        let lib = model.add_library("Lib", "urn:lib", Version::new(1, 0, 0), true);
        (model, lib)
    }

    #[test]
    fn apply_then_undo_restores() {
        let (mut model, lib) = model();
        let mut action = Rename {
            subject: lib,
            old: String::new(),
            state: Lifecycle::default(),
        };
        action.apply(&mut model, Some("Other".into())).unwrap();
        assert_eq!(model.name(lib), "Other");
        action.undo(&mut model).unwrap();
        assert_eq!(model.name(lib), "Lib");
    }

    #[test]
    fn apply_runs_once() {
        let (mut model, lib) = model();
        let mut action = Rename {
            subject: lib,
            old: String::new(),
            state: Lifecycle::default(),
        };
        action.apply(&mut model, Some("A".into())).unwrap();
        assert!(matches!(
            action.apply(&mut model, Some("B".into())),
            Err(EditActionError::InvalidState(_))
        ));
        assert_eq!(model.name(lib), "A");
    }

    #[test]
    fn undo_requires_apply() {
        let (mut model, lib) = model();
        let mut action = Rename {
            subject: lib,
            old: String::new(),
            state: Lifecycle::default(),
        };
        assert!(action.undo(&mut model).is_err());
    }

    #[test]
    fn wrong_value_is_reported() {
        let (mut model, lib) = model();
        let mut action = Rename {
            subject: lib,
            old: String::new(),
            state: Lifecycle::default(),
        };
        let err = action.apply(&mut model, Some(true.into())).unwrap_err();
        assert_eq!(
            err,
            EditActionError::WrongValue {
                expected: "text",
                got: ActionValue::Flag(true),
            }
        );
    }

    #[test]
    fn action_ids_are_unique() {
        let a = ActionId::next();
        let b = ActionId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn action_error_display() {
        assert_eq!(
            EditActionError::InvalidState("locked".into()).to_string(),
            "invalid state: locked"
        );
        assert_eq!(
            EditActionError::Custom("something went wrong".into()).to_string(),
            "something went wrong"
        );
    }

    #[test]
    fn action_is_dyn_compatible() {
        let (mut model, lib) = model();
        let mut boxed: Box<dyn EditAction> = Box::new(Rename {
            subject: lib,
            old: String::new(),
            state: Lifecycle::default(),
        });
        boxed.apply(&mut model, Some("Boxed".into())).unwrap();
        assert!(boxed.is_valid(&model));
        assert_eq!(model.name(lib), "Boxed");
    }
}
