use std::rc::Rc;

use super::{ActionManager, EditorContext, EnablementPolicy};
use crate::action_queue::ActionQueue;
use crate::kinds::ActionKind;
use crate::registry::{ActionRegistry, EnableQuery};

/// Offers nothing but copying a member, which leaves the source untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyPolicy;

impl EnablementPolicy for ReadOnlyPolicy {
    fn name(&self) -> &'static str {
        "read-only"
    }

    fn is_enabled(
        &self,
        kind: ActionKind,
        query: &EnableQuery<'_>,
        registry: &ActionRegistry,
    ) -> bool {
        kind == ActionKind::CopyMember && registry.is_enabled(kind, query)
    }
}

impl ActionManager {
    pub fn read_only(context: EditorContext) -> Self {
        let queue = Rc::new(ActionQueue::with_max_depth(context.settings().max_undo));
        Self::new(context, queue, Rc::new(ReadOnlyPolicy))
    }
}
