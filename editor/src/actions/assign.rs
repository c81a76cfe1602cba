//! Reference changes: property types, resource subjects and the library a
//! member belongs to.

use otmde_core::events::ModelEvent;
use otmde_core::model::{Model, NodeId, NodeKind, PropertyKind};

use super::require_kind;
use crate::action::{ActionValue, EditAction, EditActionError, EditActionResult, Lifecycle};
use crate::kinds::ActionKind;
use crate::registry::EnableQuery;

/// Assigns the type of a property (`TypeChange`) or the exposed business
/// object of a resource (`SetSubject`).
///
/// Legality of the target is left to the validation oracle, so an illegal
/// assignment is applied and then vetoed.
#[derive(Debug)]
pub struct AssignType {
    kind: ActionKind,
    subject: NodeId,
    subject_name: String,
    old: Option<NodeId>,
    new: Option<NodeId>,
    target_name: String,
    state: Lifecycle,
}

impl AssignType {
    pub fn new(model: &Model, kind: ActionKind, subject: NodeId) -> Self {
        Self {
            kind,
            subject,
            subject_name: model.name(subject).to_owned(),
            old: None,
            new: None,
            target_name: String::new(),
            state: Lifecycle::Created,
        }
    }
}

impl EditAction for AssignType {
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
        let target = data.into_node()?;
        let current = model
            .node(self.subject)
            .ok_or(EditActionError::TargetNotFound(self.subject))?
            .assigned_type();
        if current == Some(target) {
            return Ok(None);
        }
        self.old = model.set_assigned_type(self.subject, Some(target))?;
        self.new = Some(target);
        self.target_name = model.name(target).to_owned();
        Ok(Some(ActionValue::Node(target)))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        model.set_assigned_type(self.subject, self.old)?;
        Ok(self.old.map(ActionValue::Node))
    }

    fn event(&self) -> Option<ModelEvent> {
        if self.new.is_none() {
            return None;
        }
        let (old, new) = match self.state {
            Lifecycle::Created => return None,
            Lifecycle::Applied => (self.old, self.new),
            Lifecycle::Undone => (self.new, self.old),
        };
        Some(ModelEvent::TypeAssigned {
            user: self.subject,
            old,
            new,
        })
    }

    fn description(&self) -> String {
        match self.kind {
            ActionKind::SetSubject => format!(
                "Set subject of '{}' to '{}'",
                self.subject_name, self.target_name
            ),
            _ => format!(
                "Set type of '{}' to '{}'",
                self.subject_name, self.target_name
            ),
        }
    }
}

pub fn type_change(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    match require_kind(model, subject)? {
        NodeKind::Property(kind) if kind != PropertyKind::Indicator => Ok(Box::new(
            AssignType::new(model, ActionKind::TypeChange, subject),
        )),
        _ => Err(EditActionError::WrongSubject {
            kind: ActionKind::TypeChange,
            subject,
        }),
    }
}

pub fn set_subject(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    if !require_kind(model, subject)?.is_resource() {
        return Err(EditActionError::WrongSubject {
            kind: ActionKind::SetSubject,
            subject,
        });
    }
    Ok(Box::new(AssignType::new(
        model,
        ActionKind::SetSubject,
        subject,
    )))
}

/// Indicators carry no type.
pub fn can_change_type(query: &EnableQuery<'_>) -> bool {
    query.model.is_editable(query.subject)
        && matches!(
            query.model.kind(query.subject),
            Some(NodeKind::Property(kind)) if kind != PropertyKind::Indicator
        )
}

pub fn can_set_subject(query: &EnableQuery<'_>) -> bool {
    query.model.is_editable(query.subject)
        && query
            .model
            .kind(query.subject)
            .is_some_and(|kind| kind.is_resource())
}

// ---------------------------------------------------------------------------

/// Moves a member into the library given as `Node` input.
#[derive(Debug)]
pub struct AssignLibrary {
    member: NodeId,
    member_name: String,
    old: Option<NodeId>,
    /// Position the member held in its previous library.
    old_slot: Option<(NodeId, usize)>,
    new: Option<NodeId>,
    library_name: String,
    state: Lifecycle,
}

impl AssignLibrary {
    pub fn new(model: &Model, member: NodeId) -> Self {
        Self {
            member,
            member_name: model.name(member).to_owned(),
            old: None,
            old_slot: None,
            new: None,
            library_name: String::new(),
            state: Lifecycle::Created,
        }
    }
}

impl EditAction for AssignLibrary {
    fn kind(&self) -> ActionKind {
        ActionKind::AssignLibrary
    }

    fn subject(&self) -> NodeId {
        self.member
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
        let library = data.into_node()?;
        if model.owner(self.member) == Some(library) {
            return Ok(None);
        }
        if !model.is_editable(library) {
            return Err(EditActionError::InvalidState(format!(
                "library '{}' is not editable",
                model.name(library)
            )));
        }
        self.old_slot = model.assign_library(self.member, Some(library))?;
        self.old = self.old_slot.map(|(library, _)| library);
        self.new = Some(library);
        self.library_name = model.name(library).to_owned();
        Ok(Some(ActionValue::Node(library)))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        model.place_member(self.member, self.old_slot)?;
        Ok(self.old.map(ActionValue::Node))
    }

    fn event(&self) -> Option<ModelEvent> {
        if self.new.is_none() {
            return None;
        }
        let (old, new) = match self.state {
            Lifecycle::Created => return None,
            Lifecycle::Applied => (self.old, self.new),
            Lifecycle::Undone => (self.new, self.old),
        };
        Some(ModelEvent::LibraryAssigned {
            member: self.member,
            old,
            new,
        })
    }

    fn description(&self) -> String {
        format!(
            "Assign '{}' to library '{}'",
            self.member_name, self.library_name
        )
    }
}

pub fn assign_library(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    if !require_kind(model, subject)?.is_member() {
        return Err(EditActionError::WrongSubject {
            kind: ActionKind::AssignLibrary,
            subject,
        });
    }
    Ok(Box::new(AssignLibrary::new(model, subject)))
}

/// Members without a library, or in an editable one, may be (re)assigned.
pub fn can_assign_library(query: &EnableQuery<'_>) -> bool {
    let model = query.model;
    model.is_live(query.subject)
        && model.kind(query.subject).is_some_and(|kind| kind.is_member())
        && model
            .owning_library(query.subject)
            .is_none_or(|library| model.is_editable(library))
}

#[cfg(test)]
mod tests {
    use super::*;
    use otmde_core::model::{MemberKind, TextField, Version};
    use otmde_core::validation::{BasicRules, VetoPolicy, codes};

    struct Fixture {
        model: Model,
        lib: NodeId,
        order: NodeId,
        code: NodeId,
        amount: NodeId,
        api: NodeId,
    }

    fn fixture() -> Fixture {
        let mut model = Model::new();
        let lib = model.add_library("Lib", "urn:lib", Version::new(1, 0, 0), true);
        let order = model
            .add_member(lib, MemberKind::BusinessObject, "Order")
            .unwrap();
        model.set_text(order, TextField::Description, "an order").unwrap();
        let code = model.add_member(lib, MemberKind::SimpleType, "Code").unwrap();
        let amount = model
            .add_property(order, PropertyKind::Attribute, "amount")
            .unwrap();
        let api = model.add_member(lib, MemberKind::Resource, "OrderApi").unwrap();
        Fixture {
            model,
            lib,
            order,
            code,
            amount,
            api,
        }
    }

    fn predicate(model: &Model, subject: NodeId, f: fn(&EnableQuery<'_>) -> bool) -> bool {
        let rules = BasicRules::new();
        let vetoes = VetoPolicy::default();
        f(&EnableQuery {
            model,
            subject,
            oracle: &rules,
            vetoes: &vetoes,
        })
    }

    #[test]
    fn type_change_and_undo() {
        let mut f = fixture();
        let mut action = type_change(&f.model, f.amount).unwrap();
        action
            .apply(&mut f.model, Some(ActionValue::Node(f.code)))
            .unwrap();
        assert_eq!(f.model.node(f.amount).unwrap().assigned_type(), Some(f.code));
        assert_eq!(action.description(), "Set type of 'amount' to 'Code'");

        assert_eq!(action.undo(&mut f.model).unwrap(), None);
        assert_eq!(f.model.node(f.amount).unwrap().assigned_type(), None);
        assert_eq!(
            action.event(),
            Some(ModelEvent::TypeAssigned {
                user: f.amount,
                old: Some(f.code),
                new: None,
            })
        );
    }

    #[test]
    fn no_input_is_no_change() {
        let mut f = fixture();
        let mut action = set_subject(&f.model, f.api).unwrap();
        assert_eq!(action.apply(&mut f.model, None).unwrap(), None);
        assert_eq!(action.event(), None);
    }

    #[test]
    fn illegal_subject_is_vetoed() {
        let mut f = fixture();
        let mut action = set_subject(&f.model, f.api).unwrap();
        action
            .apply(&mut f.model, Some(ActionValue::Node(f.code)))
            .unwrap();
        let findings =
            action.veto_findings(&f.model, &BasicRules::new(), &VetoPolicy::default());
        assert!(findings.has_code(codes::ILLEGAL_TYPE_ASSIGNMENT));
    }

    #[test]
    fn type_change_rejects_indicator() {
        let mut f = fixture();
        let paid = f
            .model
            .add_property(f.order, PropertyKind::Indicator, "paid")
            .unwrap();
        assert!(type_change(&f.model, paid).is_err());
        assert!(!predicate(&f.model, paid, can_change_type));
        assert!(predicate(&f.model, f.amount, can_change_type));
        assert!(predicate(&f.model, f.api, can_set_subject));
        assert!(!predicate(&f.model, f.order, can_set_subject));
    }

    #[test]
    fn assign_library_moves_and_restores() {
        let mut f = fixture();
        let draft = f.model.new_member(MemberKind::CoreObject, "Draft");
        assert!(predicate(&f.model, draft, can_assign_library));

        let mut action = assign_library(&f.model, draft).unwrap();
        action
            .apply(&mut f.model, Some(ActionValue::Node(f.lib)))
            .unwrap();
        assert_eq!(f.model.owning_library(draft), Some(f.lib));
        assert_eq!(action.description(), "Assign 'Draft' to library 'Lib'");

        action.undo(&mut f.model).unwrap();
        assert_eq!(f.model.owning_library(draft), None);
    }

    #[test]
    fn assign_library_undo_keeps_sibling_order() {
        let mut f = fixture();
        let other = f
            .model
            .add_library("Other", "urn:other", Version::new(1, 0, 0), true);
        let before = f.model.children(f.lib).to_vec();

        let mut action = assign_library(&f.model, f.order).unwrap();
        action
            .apply(&mut f.model, Some(ActionValue::Node(other)))
            .unwrap();
        assert_eq!(f.model.children(other), &[f.order]);

        action.undo(&mut f.model).unwrap();
        assert_eq!(f.model.children(f.lib), before.as_slice());
        assert!(f.model.children(other).is_empty());
    }

    #[test]
    fn assign_library_needs_editable_target() {
        let mut f = fixture();
        let locked = f
            .model
            .add_library("Locked", "urn:locked", Version::new(1, 0, 0), false);
        let mut action = assign_library(&f.model, f.order).unwrap();
        assert!(
            action
                .apply(&mut f.model, Some(ActionValue::Node(locked)))
                .is_err()
        );

        let member = f
            .model
            .add_member(locked, MemberKind::CoreObject, "Frozen")
            .unwrap();
        assert!(!predicate(&f.model, member, can_assign_library));
    }
}
