use std::rc::Rc;

use otmde_core::model::{Model, NodeId};

use super::{ActionManager, EnablementPolicy};
use crate::kinds::ActionKind;
use crate::registry::{ActionRegistry, EnableQuery};

/// Whether `kind` may touch `subject` while a minor version is edited.
///
/// A minor version may only add to what earlier versions of its chain
/// define. Renaming, deleting or retyping is therefore limited to things
/// introduced in the latest version; a reference may also be moved to a
/// strictly later version of the type it already points at.
pub fn is_legal_in_minor_version(kind: ActionKind, model: &Model, subject: NodeId) -> bool {
    match kind {
        ActionKind::AddAlias
        | ActionKind::AddProperty
        | ActionKind::DescriptionChange
        | ActionKind::DeprecationChange
        | ActionKind::ExampleChange
        | ActionKind::CopyMember
        | ActionKind::NewMember => true,
        ActionKind::AddResourceChild => model.is_owning_chain_editable(subject),
        ActionKind::NameChange | ActionKind::Delete => model.is_new_to_chain(subject),
        ActionKind::TypeChange | ActionKind::SetSubject => {
            model.is_new_to_chain(subject)
                || (model.can_assign_later_version(subject)
                    && model.is_owning_chain_editable(subject))
        }
        _ => {
            model.kind(subject).is_some_and(|node_kind| {
                node_kind.is_property() || node_kind.is_resource_child()
            }) && !model.is_inherited(subject)
        }
    }
}

/// Applies the minor-version legality matrix before the wrapped policy.
#[derive(Debug, Clone)]
pub struct MinorVersionPolicy {
    inner: Rc<dyn EnablementPolicy>,
}

impl MinorVersionPolicy {
    pub fn new(inner: Rc<dyn EnablementPolicy>) -> Self {
        Self { inner }
    }
}

impl EnablementPolicy for MinorVersionPolicy {
    fn name(&self) -> &'static str {
        "minor-version"
    }

    fn is_enabled(
        &self,
        kind: ActionKind,
        query: &EnableQuery<'_>,
        registry: &ActionRegistry,
    ) -> bool {
        if !is_legal_in_minor_version(kind, query.model, query.subject) {
            log::trace!("'{kind}' is illegal in a minor version for {}", query.subject);
            return false;
        }
        self.inner.is_enabled(kind, query, registry)
    }
}

impl ActionManager {
    /// A manager for editing a minor version. It records into `parent`'s
    /// undo queue and works on the same model and collaborators.
    ///
    /// `parent` is normally a [`full`](ActionManager::full) manager, but any
    /// policy may be wrapped: the matrix only ever narrows what the parent
    /// allows, so a read-only parent yields a read-only minor version.
    pub fn minor_version(parent: &ActionManager) -> Self {
        if parent.policy_name() != "full" {
            log::debug!(
                "Minor version wraps a {} manager rather than a full one",
                parent.policy_name()
            );
        }
        let policy = MinorVersionPolicy::new(Rc::clone(parent.policy()));
        Self::new(
            parent.context().clone(),
            Rc::clone(parent.queue()),
            Rc::new(policy),
        )
    }
}
