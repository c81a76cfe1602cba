//! Maps action kinds to their factories and enablement predicates.

use std::collections::HashMap;
use std::fmt;

use otmde_core::model::{Model, NodeId};
use otmde_core::validation::{ValidationOracle, VetoPolicy};

use crate::action::{EditAction, EditActionError, EditActionResult};
use crate::actions::{assign, flag, structure, text};
use crate::kinds::ActionKind;

/// Builds an action of one kind for a subject.
pub type ActionFactory = fn(&Model, NodeId) -> EditActionResult<Box<dyn EditAction>>;

/// Decides whether an action kind may run on a subject.
pub type EnablementPredicate = fn(&EnableQuery<'_>) -> bool;

/// Everything an enablement predicate may look at.
#[derive(Clone, Copy)]
pub struct EnableQuery<'a> {
    pub model: &'a Model,
    pub subject: NodeId,
    pub oracle: &'a dyn ValidationOracle,
    pub vetoes: &'a VetoPolicy,
}

impl fmt::Debug for EnableQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnableQuery")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// Errors raised while resolving or running an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("no action registered for '{0}'")]
    UnknownKind(ActionKind),
    #[error("cannot create '{kind}' for {subject}: {source}")]
    Construction {
        kind: ActionKind,
        subject: NodeId,
        source: EditActionError,
    },
    #[error("'{kind}' failed: {source}")]
    Execution {
        kind: ActionKind,
        source: EditActionError,
    },
}

#[derive(Clone, Copy)]
struct RegistryEntry {
    factory: ActionFactory,
    predicate: EnablementPredicate,
}

/// Explicit kind → (factory, predicate) table.
#[derive(Clone)]
pub struct ActionRegistry {
    entries: HashMap<ActionKind, RegistryEntry>,
}

impl ActionRegistry {
    /// A registry with no kinds.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry with every built-in kind.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry
            .register(ActionKind::NameChange, text::name_change, text::can_change_name)
            .register(
                ActionKind::DescriptionChange,
                text::description_change,
                text::can_change_documentation,
            )
            .register(
                ActionKind::DeprecationChange,
                text::deprecation_change,
                text::can_change_documentation,
            )
            .register(
                ActionKind::ExampleChange,
                text::example_change,
                text::can_change_documentation,
            )
            .register(
                ActionKind::BasePathChange,
                text::base_path_change,
                text::can_change_base_path,
            )
            .register(
                ActionKind::MandatoryChange,
                flag::mandatory_change,
                flag::can_change_mandatory,
            )
            .register(ActionKind::SetAbstract, flag::set_abstract, flag::can_set_abstract)
            .register(
                ActionKind::SetFirstClass,
                flag::set_first_class,
                flag::can_set_first_class,
            )
            .register(ActionKind::AddAlias, structure::add_alias, structure::can_add_alias)
            .register(
                ActionKind::AddProperty,
                structure::add_property,
                structure::can_add_property,
            )
            .register(
                ActionKind::AddResourceChild,
                structure::add_resource_child,
                structure::can_add_resource_child,
            )
            .register(ActionKind::Delete, structure::delete, structure::can_delete)
            .register(ActionKind::CopyMember, structure::copy_member, structure::can_copy)
            .register(ActionKind::NewMember, structure::new_member, structure::can_create_member)
            .register(ActionKind::TypeChange, assign::type_change, assign::can_change_type)
            .register(ActionKind::SetSubject, assign::set_subject, assign::can_set_subject)
            .register(
                ActionKind::AssignLibrary,
                assign::assign_library,
                assign::can_assign_library,
            );
        registry
    }

    /// Registers or replaces the entry for `kind`.
    pub fn register(
        &mut self,
        kind: ActionKind,
        factory: ActionFactory,
        predicate: EnablementPredicate,
    ) -> &mut Self {
        self.entries
            .insert(kind, RegistryEntry { factory, predicate });
        self
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creates a fresh action of `kind` for `subject`.
    pub fn resolve(
        &self,
        kind: ActionKind,
        model: &Model,
        subject: NodeId,
    ) -> Result<Box<dyn EditAction>, ActionError> {
        let entry = self
            .entries
            .get(&kind)
            .ok_or(ActionError::UnknownKind(kind))?;
        (entry.factory)(model, subject).map_err(|source| ActionError::Construction {
            kind,
            subject,
            source,
        })
    }

    /// The registered predicate for `kind`; unknown kinds are disabled.
    pub fn is_enabled(&self, kind: ActionKind, query: &EnableQuery<'_>) -> bool {
        self.entries
            .get(&kind)
            .is_some_and(|entry| (entry.predicate)(query))
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.entries.keys().collect();
        kinds.sort();
        f.debug_struct("ActionRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
