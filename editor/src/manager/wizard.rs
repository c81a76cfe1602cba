use std::rc::Rc;

use super::{ActionManager, EditorContext, EnablementPolicy};
use crate::action_queue::ActionQueue;
use crate::kinds::ActionKind;
use crate::registry::{ActionRegistry, EnableQuery};

/// Everything is allowed while a wizard builds a member, except that a
/// member without a library can only be assigned one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WizardPolicy;

impl EnablementPolicy for WizardPolicy {
    fn name(&self) -> &'static str {
        "wizard"
    }

    fn is_enabled(
        &self,
        kind: ActionKind,
        query: &EnableQuery<'_>,
        _registry: &ActionRegistry,
    ) -> bool {
        if query.model.owning_library(query.subject).is_none() {
            return kind == ActionKind::AssignLibrary;
        }
        true
    }
}

impl ActionManager {
    /// A manager with a private, unbounded queue. Wizard edits never show up
    /// in the main editor's undo history.
    pub fn wizard(context: EditorContext) -> Self {
        Self::new(context, Rc::new(ActionQueue::new()), Rc::new(WizardPolicy))
    }
}
