//! String attribute changes: name, documentation and resource base path.

use otmde_core::events::ModelEvent;
use otmde_core::model::{Model, NodeId, TextField};

use super::require_kind;
use crate::action::{ActionValue, EditAction, EditActionError, EditActionResult, Lifecycle};
use crate::kinds::ActionKind;
use crate::registry::EnableQuery;

/// Replaces one text attribute of a node.
#[derive(Debug)]
pub struct TextChange {
    kind: ActionKind,
    subject: NodeId,
    field: TextField,
    old: String,
    new: String,
    state: Lifecycle,
}

impl TextChange {
    pub fn new(kind: ActionKind, subject: NodeId, field: TextField) -> Self {
        Self {
            kind,
            subject,
            field,
            old: String::new(),
            new: String::new(),
            state: Lifecycle::Created,
        }
    }

    fn boxed(
        model: &Model,
        kind: ActionKind,
        subject: NodeId,
        field: TextField,
    ) -> EditActionResult<Box<dyn EditAction>> {
        let node_kind = require_kind(model, subject)?;
        if field == TextField::BasePath && !node_kind.is_resource() {
            return Err(EditActionError::WrongSubject { kind, subject });
        }
        Ok(Box::new(Self::new(kind, subject, field)))
    }

    pub fn field(&self) -> TextField {
        self.field
    }
}

impl EditAction for TextChange {
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
        let value = data.into_text()?;
        let current = model
            .node(self.subject)
            .ok_or(EditActionError::TargetNotFound(self.subject))?
            .text(self.field);
        if current == value {
            return Ok(None);
        }
        self.old = model.set_text(self.subject, self.field, value.clone())?;
        self.new = value;
        Ok(Some(ActionValue::Text(self.new.clone())))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        model.set_text(self.subject, self.field, self.old.clone())?;
        Ok(Some(ActionValue::Text(self.old.clone())))
    }

    fn event(&self) -> Option<ModelEvent> {
        if self.old == self.new {
            return None;
        }
        let (old, new) = match self.state {
            Lifecycle::Created => return None,
            Lifecycle::Applied => (&self.old, &self.new),
            Lifecycle::Undone => (&self.new, &self.old),
        };
        Some(ModelEvent::TextChanged {
            subject: self.subject,
            field: self.field,
            old: old.clone(),
            new: new.clone(),
        })
    }

    fn description(&self) -> String {
        format!(
            "Change {} from '{}' to '{}'",
            self.field.label(),
            self.old,
            self.new
        )
    }
}

pub fn name_change(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    TextChange::boxed(model, ActionKind::NameChange, subject, TextField::Name)
}

pub fn description_change(
    model: &Model,
    subject: NodeId,
) -> EditActionResult<Box<dyn EditAction>> {
    TextChange::boxed(
        model,
        ActionKind::DescriptionChange,
        subject,
        TextField::Description,
    )
}

pub fn deprecation_change(
    model: &Model,
    subject: NodeId,
) -> EditActionResult<Box<dyn EditAction>> {
    TextChange::boxed(
        model,
        ActionKind::DeprecationChange,
        subject,
        TextField::Deprecation,
    )
}

pub fn example_change(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    TextChange::boxed(model, ActionKind::ExampleChange, subject, TextField::Example)
}

pub fn base_path_change(
    model: &Model,
    subject: NodeId,
) -> EditActionResult<Box<dyn EditAction>> {
    TextChange::boxed(
        model,
        ActionKind::BasePathChange,
        subject,
        TextField::BasePath,
    )
}

/// Owned, editable nodes other than libraries may be renamed.
pub fn can_change_name(query: &EnableQuery<'_>) -> bool {
    let model = query.model;
    model.is_editable(query.subject)
        && !model.is_inherited(query.subject)
        && model
            .kind(query.subject)
            .is_some_and(|kind| !kind.is_library())
}

/// Description, deprecation and example may change even on inherited nodes.
pub fn can_change_documentation(query: &EnableQuery<'_>) -> bool {
    let model = query.model;
    model.is_editable(query.subject)
        && model
            .kind(query.subject)
            .is_some_and(|kind| !kind.is_library())
}

pub fn can_change_base_path(query: &EnableQuery<'_>) -> bool {
    let model = query.model;
    model.is_editable(query.subject)
        && !model.is_inherited(query.subject)
        && model.kind(query.subject).is_some_and(|kind| kind.is_resource())
}

#[cfg(test)]
mod tests {
    use super::*;
    use otmde_core::model::{MemberKind, PropertyKind, Version};
    use otmde_core::validation::{BasicRules, VetoPolicy};

    struct Fixture {
        model: Model,
        lib: NodeId,
        order: NodeId,
        amount: NodeId,
    }

    fn fixture() -> Fixture {
        let mut model = Model::new();
        let lib = model.add_library("Lib", "urn:lib", Version::new(1, 0, 0), true);
        let order = model
            .add_member(lib, MemberKind::BusinessObject, "Order")
            .unwrap();
        let amount = model
            .add_property(order, PropertyKind::Attribute, "amount")
            .unwrap();
        Fixture {
            model,
            lib,
            order,
            amount,
        }
    }

    fn enabled(model: &Model, subject: NodeId, predicate: fn(&EnableQuery<'_>) -> bool) -> bool {
        let rules = BasicRules::new();
        let vetoes = VetoPolicy::default();
        predicate(&EnableQuery {
            model,
            subject,
            oracle: &rules,
            vetoes: &vetoes,
        })
    }

    #[test]
    fn rename_and_undo() {
        let mut f = fixture();
        let mut action = name_change(&f.model, f.order).unwrap();
        let result = action.apply(&mut f.model, Some("Purchase".into())).unwrap();
        assert_eq!(result, Some(ActionValue::Text("Purchase".into())));
        assert_eq!(f.model.name(f.order), "Purchase");
        assert_eq!(action.description(), "Change name from 'Order' to 'Purchase'");

        action.undo(&mut f.model).unwrap();
        assert_eq!(f.model.name(f.order), "Order");
        assert_eq!(
            action.event(),
            Some(ModelEvent::TextChanged {
                subject: f.order,
                field: TextField::Name,
                old: "Purchase".into(),
                new: "Order".into(),
            })
        );
    }

    #[test]
    fn same_value_or_no_input_is_no_change() {
        let mut f = fixture();
        let mut same = name_change(&f.model, f.order).unwrap();
        assert_eq!(same.apply(&mut f.model, Some("Order".into())).unwrap(), None);

        let mut empty = description_change(&f.model, f.order).unwrap();
        assert_eq!(empty.apply(&mut f.model, None).unwrap(), None);
        assert_eq!(empty.event(), None);
    }

    #[test]
    fn base_path_needs_resource() {
        let mut f = fixture();
        assert!(matches!(
            base_path_change(&f.model, f.order),
            Err(EditActionError::WrongSubject { .. })
        ));
        let api = f
            .model
            .add_member(f.lib, MemberKind::Resource, "OrderApi")
            .unwrap();
        assert!(base_path_change(&f.model, api).is_ok());
        assert!(enabled(&f.model, api, can_change_base_path));
        assert!(!enabled(&f.model, f.order, can_change_base_path));
    }

    #[test]
    fn name_predicate_rules() {
        let mut f = fixture();
        assert!(enabled(&f.model, f.amount, can_change_name));
        assert!(!enabled(&f.model, f.lib, can_change_name));

        f.model.set_inherited(f.amount, true).unwrap();
        assert!(!enabled(&f.model, f.amount, can_change_name));
        assert!(enabled(&f.model, f.amount, can_change_documentation));

        f.model.set_library_editable(f.lib, false).unwrap();
        assert!(!enabled(&f.model, f.amount, can_change_documentation));
    }
}
