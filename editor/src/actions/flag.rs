//! Boolean attribute changes.

use otmde_core::events::ModelEvent;
use otmde_core::model::{FlagField, Model, NodeId};

use super::require_kind;
use crate::action::{ActionValue, EditAction, EditActionError, EditActionResult, Lifecycle};
use crate::kinds::ActionKind;
use crate::registry::EnableQuery;

/// Sets one boolean attribute of a node.
#[derive(Debug)]
pub struct FlagChange {
    kind: ActionKind,
    subject: NodeId,
    field: FlagField,
    old: bool,
    new: bool,
    state: Lifecycle,
}

impl FlagChange {
    pub fn new(kind: ActionKind, subject: NodeId, field: FlagField) -> Self {
        Self {
            kind,
            subject,
            field,
            old: false,
            new: false,
            state: Lifecycle::Created,
        }
    }

    fn boxed(
        model: &Model,
        kind: ActionKind,
        subject: NodeId,
        field: FlagField,
    ) -> EditActionResult<Box<dyn EditAction>> {
        let node_kind = require_kind(model, subject)?;
        let fits = match field {
            FlagField::Mandatory => node_kind.is_property(),
            FlagField::Abstract | FlagField::FirstClass => node_kind.is_resource(),
        };
        if !fits {
            return Err(EditActionError::WrongSubject { kind, subject });
        }
        Ok(Box::new(Self::new(kind, subject, field)))
    }
}

impl EditAction for FlagChange {
    fn kind(&self) -> ActionKind {
        self.kind
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
        let value = data.into_flag()?;
        self.old = model.set_flag(self.subject, self.field, value)?;
        self.new = value;
        if self.old == value {
            return Ok(None);
        }
        Ok(Some(ActionValue::Flag(value)))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        model.set_flag(self.subject, self.field, self.old)?;
        Ok(Some(ActionValue::Flag(self.old)))
    }

    fn event(&self) -> Option<ModelEvent> {
        if self.old == self.new {
            return None;
        }
        let value = match self.state {
            Lifecycle::Created => return None,
            Lifecycle::Applied => self.new,
            Lifecycle::Undone => self.old,
        };
        Some(ModelEvent::FlagChanged {
            subject: self.subject,
            field: self.field,
            value,
        })
    }

    fn description(&self) -> String {
        format!("Set {} to {}", self.field.label(), self.new)
    }
}

pub fn mandatory_change(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    FlagChange::boxed(model, ActionKind::MandatoryChange, subject, FlagField::Mandatory)
}

pub fn set_abstract(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    FlagChange::boxed(model, ActionKind::SetAbstract, subject, FlagField::Abstract)
}

pub fn set_first_class(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    FlagChange::boxed(model, ActionKind::SetFirstClass, subject, FlagField::FirstClass)
}

pub fn can_change_mandatory(query: &EnableQuery<'_>) -> bool {
    let model = query.model;
    model.is_editable(query.subject)
        && !model.is_inherited(query.subject)
        && model.kind(query.subject).is_some_and(|kind| kind.is_property())
}

/// Editable resources whose abstract flag could be forced on without a veto.
/// The trial runs on a scratch copy of the model.
pub fn can_set_abstract(query: &EnableQuery<'_>) -> bool {
    if !is_editable_resource(query) {
        return false;
    }
    let mut trial = query.model.clone();
    if trial
        .set_flag(query.subject, FlagField::Abstract, true)
        .is_err()
    {
        return false;
    }
    query
        .vetoes
        .vetoes(&query.oracle.findings(&trial, query.subject))
        .is_empty()
}

pub fn can_set_first_class(query: &EnableQuery<'_>) -> bool {
    is_editable_resource(query)
}

fn is_editable_resource(query: &EnableQuery<'_>) -> bool {
    query.model.is_editable(query.subject)
        && query
            .model
            .kind(query.subject)
            .is_some_and(|kind| kind.is_resource())
}

#[cfg(test)]
mod tests {
    use super::*;
    use otmde_core::model::{MemberKind, PropertyKind, TextField, Version};
    use otmde_core::validation::{BasicRules, VetoPolicy};

    fn query_enabled(
        model: &Model,
        subject: NodeId,
        predicate: fn(&EnableQuery<'_>) -> bool,
    ) -> bool {
        let rules = BasicRules::new();
        let vetoes = VetoPolicy::default();
        predicate(&EnableQuery {
            model,
            subject,
            oracle: &rules,
            vetoes: &vetoes,
        })
    }

    fn resource_model() -> (Model, NodeId, NodeId) {
        let mut model = Model::new();
        let lib = model.add_library("Lib", "urn:lib", Version::new(1, 0, 0), true);
        let api = model.add_member(lib, MemberKind::Resource, "Api").unwrap();
        model.set_text(api, TextField::Description, "api").unwrap();
        (model, lib, api)
    }

    #[test]
    fn toggle_and_undo() {
        let (mut model, _, api) = resource_model();
        let mut action = set_first_class(&model, api).unwrap();
        assert_eq!(
            action.apply(&mut model, Some(true.into())).unwrap(),
            Some(ActionValue::Flag(true))
        );
        assert!(model.node(api).unwrap().flag(FlagField::FirstClass));
        assert_eq!(
            action.event(),
            Some(ModelEvent::FlagChanged {
                subject: api,
                field: FlagField::FirstClass,
                value: true,
            })
        );

        action.undo(&mut model).unwrap();
        assert!(!model.node(api).unwrap().flag(FlagField::FirstClass));
        assert_eq!(action.description(), "Set first class to true");
    }

    #[test]
    fn unchanged_flag_is_no_change() {
        let (mut model, _, api) = resource_model();
        let mut action = set_abstract(&model, api).unwrap();
        assert_eq!(action.apply(&mut model, Some(false.into())).unwrap(), None);
        assert_eq!(action.event(), None);
    }

    #[test]
    fn mandatory_needs_property() {
        let (mut model, lib, api) = resource_model();
        assert!(mandatory_change(&model, api).is_err());
        let bo = model
            .add_member(lib, MemberKind::BusinessObject, "Order")
            .unwrap();
        let id = model.add_property(bo, PropertyKind::Id, "orderId").unwrap();
        assert!(mandatory_change(&model, id).is_ok());
        assert!(query_enabled(&model, id, can_change_mandatory));
        model.set_inherited(id, true).unwrap();
        assert!(!query_enabled(&model, id, can_change_mandatory));
    }

    #[test]
    fn abstract_trial_respects_vetoes() {
        let (mut model, _, api) = resource_model();
        assert!(query_enabled(&model, api, can_set_abstract));

        // Abstract plus first class is vetoed, so the trial fails.
        model.set_flag(api, FlagField::FirstClass, true).unwrap();
        assert!(!query_enabled(&model, api, can_set_abstract));
        // The trial never touches the real model.
        assert!(!model.node(api).unwrap().flag(FlagField::Abstract));
        assert!(query_enabled(&model, api, can_set_first_class));
    }
}
