use std::rc::Rc;

use super::{ActionManager, EditorContext, EnablementPolicy};
use crate::action_queue::ActionQueue;
use crate::kinds::ActionKind;
use crate::registry::{ActionRegistry, EnableQuery};

/// Defers entirely to each kind's registered predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPolicy;

impl EnablementPolicy for FullPolicy {
    fn name(&self) -> &'static str {
        "full"
    }

    fn is_enabled(
        &self,
        kind: ActionKind,
        query: &EnableQuery<'_>,
        registry: &ActionRegistry,
    ) -> bool {
        registry.is_enabled(kind, query)
    }
}

impl ActionManager {
    /// The main editing manager, with its own undo queue sized by the
    /// context's `max_undo` setting.
    pub fn full(context: EditorContext) -> Self {
        let queue = Rc::new(ActionQueue::with_max_depth(context.settings().max_undo));
        Self::new(context, queue, Rc::new(FullPolicy))
    }
}
