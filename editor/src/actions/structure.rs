//! Actions that add, copy or remove nodes.

use otmde_core::events::ModelEvent;
use otmde_core::model::{
    MemberKind, Model, NodeId, NodeKind, PropertyKind, ResourceChildKind,
};
use otmde_core::validation::{Findings, ValidationOracle, VetoPolicy, codes};

use super::{require_kind, unique_child_name};
use crate::action::{ActionValue, EditAction, EditActionError, EditActionResult, Lifecycle};
use crate::kinds::ActionKind;
use crate::registry::EnableQuery;

// ---------------------------------------------------------------------------
// AddChild
// ---------------------------------------------------------------------------

/// Adds an alias, a property or a resource child under the subject.
///
/// The name comes from text input, or a unique default when none is given.
#[derive(Debug)]
pub struct AddChild {
    kind: ActionKind,
    owner: NodeId,
    owner_name: String,
    child_kind: NodeKind,
    name: String,
    created: Option<NodeId>,
    state: Lifecycle,
}

impl AddChild {
    pub fn new(model: &Model, kind: ActionKind, owner: NodeId, child_kind: NodeKind) -> Self {
        Self {
            kind,
            owner,
            owner_name: model.name(owner).to_owned(),
            child_kind,
            name: String::new(),
            created: None,
            state: Lifecycle::Created,
        }
    }

    /// The node created by the last apply.
    pub fn created(&self) -> Option<NodeId> {
        self.created
    }

    fn default_name(&self) -> &'static str {
        match self.child_kind {
            NodeKind::Alias => "newAlias",
            NodeKind::Property(_) => "newProperty",
            _ => "newAction",
        }
    }

    fn boxed(
        model: &Model,
        kind: ActionKind,
        owner: NodeId,
        child_kind: NodeKind,
    ) -> EditActionResult<Box<dyn EditAction>> {
        let owner_kind = require_kind(model, owner)?;
        if !Model::may_own(owner_kind, child_kind) {
            return Err(EditActionError::WrongSubject {
                kind,
                subject: owner,
            });
        }
        Ok(Box::new(Self::new(model, kind, owner, child_kind)))
    }
}

impl EditAction for AddChild {
    fn kind(&self) -> ActionKind {
        self.kind
    }

    fn subject(&self) -> NodeId {
        self.owner
    }

    fn apply(
        &mut self,
        model: &mut Model,
        data: Option<ActionValue>,
    ) -> EditActionResult<Option<ActionValue>> {
        self.state.start_apply()?;
        self.name = match data {
            Some(value) => value.into_text()?,
            None => unique_child_name(model, Some(self.owner), self.default_name()),
        };
        let node = model.add_child(self.owner, self.child_kind, self.name.clone())?;
        self.created = Some(node);
        Ok(Some(ActionValue::Node(node)))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        let node = self
            .created
            .ok_or_else(|| EditActionError::InvalidState("nothing was created".into()))?;
        model.detach(node)?;
        Ok(Some(ActionValue::Node(node)))
    }

    /// Checks the created node. A new property has no type yet, so a missing
    /// type does not block it.
    fn veto_findings(
        &self,
        model: &Model,
        oracle: &dyn ValidationOracle,
        policy: &VetoPolicy,
    ) -> Findings {
        let target = self.created.unwrap_or(self.owner);
        let mut findings = oracle.findings(model, target);
        if self.kind == ActionKind::AddProperty {
            findings = findings.without_codes(&[codes::MISSING_TYPE]);
        }
        policy.vetoes(&findings)
    }

    fn event(&self) -> Option<ModelEvent> {
        let node = self.created?;
        match self.state {
            Lifecycle::Created => None,
            Lifecycle::Applied => Some(ModelEvent::NodeAdded {
                owner: self.owner,
                node,
            }),
            Lifecycle::Undone => Some(ModelEvent::NodeRemoved {
                owner: Some(self.owner),
                node,
            }),
        }
    }

    fn description(&self) -> String {
        format!(
            "Add {} '{}' to '{}'",
            self.child_kind.label(),
            self.name,
            self.owner_name
        )
    }
}

pub fn add_alias(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    AddChild::boxed(model, ActionKind::AddAlias, subject, NodeKind::Alias)
}

pub fn add_property(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    AddChild::boxed(
        model,
        ActionKind::AddProperty,
        subject,
        NodeKind::Property(PropertyKind::Element),
    )
}

pub fn add_resource_child(
    model: &Model,
    subject: NodeId,
) -> EditActionResult<Box<dyn EditAction>> {
    AddChild::boxed(
        model,
        ActionKind::AddResourceChild,
        subject,
        NodeKind::ResourceChild(ResourceChildKind::Action),
    )
}

pub fn can_add_alias(query: &EnableQuery<'_>) -> bool {
    is_editable_property_owner(query)
}

pub fn can_add_property(query: &EnableQuery<'_>) -> bool {
    is_editable_property_owner(query)
}

pub fn can_add_resource_child(query: &EnableQuery<'_>) -> bool {
    query.model.is_editable(query.subject)
        && query
            .model
            .kind(query.subject)
            .is_some_and(|kind| kind.is_resource())
}

fn is_editable_property_owner(query: &EnableQuery<'_>) -> bool {
    query.model.is_editable(query.subject)
        && query
            .model
            .kind(query.subject)
            .is_some_and(|kind| kind.has_properties())
}

// ---------------------------------------------------------------------------
// NewMember
// ---------------------------------------------------------------------------

/// Creates a member in the subject library.
///
/// Input is `Creation(kind, name)`, a bare name (business object), or
/// nothing for a business object with a unique default name.
#[derive(Debug)]
pub struct NewMember {
    library: NodeId,
    member_kind: MemberKind,
    name: String,
    created: Option<NodeId>,
    state: Lifecycle,
}

impl NewMember {
    pub fn new(library: NodeId) -> Self {
        Self {
            library,
            member_kind: MemberKind::BusinessObject,
            name: String::new(),
            created: None,
            state: Lifecycle::Created,
        }
    }

    pub fn created(&self) -> Option<NodeId> {
        self.created
    }
}

fn default_member_name(kind: MemberKind) -> &'static str {
    match kind {
        MemberKind::BusinessObject => "NewBusinessObject",
        MemberKind::CoreObject => "NewCoreObject",
        MemberKind::ChoiceObject => "NewChoiceObject",
        MemberKind::SimpleType => "NewSimpleType",
        MemberKind::Resource => "NewResource",
    }
}

impl EditAction for NewMember {
    fn kind(&self) -> ActionKind {
        ActionKind::NewMember
    }

    fn subject(&self) -> NodeId {
        self.library
    }

    fn apply(
        &mut self,
        model: &mut Model,
        data: Option<ActionValue>,
    ) -> EditActionResult<Option<ActionValue>> {
        self.state.start_apply()?;
        let (kind, name) = match data {
            Some(ActionValue::Creation(kind, name)) => (kind, name),
            Some(ActionValue::Text(name)) => (MemberKind::BusinessObject, name),
            Some(got) => {
                return Err(EditActionError::WrongValue {
                    expected: "creation",
                    got,
                });
            }
            None => {
                let kind = MemberKind::BusinessObject;
                let name =
                    unique_child_name(model, Some(self.library), default_member_name(kind));
                (kind, name)
            }
        };
        let member = model.add_member(self.library, kind, name.clone())?;
        self.member_kind = kind;
        self.name = name;
        self.created = Some(member);
        Ok(Some(ActionValue::Node(member)))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        let member = self
            .created
            .ok_or_else(|| EditActionError::InvalidState("nothing was created".into()))?;
        model.detach(member)?;
        Ok(Some(ActionValue::Node(member)))
    }

    fn veto_findings(
        &self,
        model: &Model,
        oracle: &dyn ValidationOracle,
        policy: &VetoPolicy,
    ) -> Findings {
        match self.created {
            Some(member) => policy.vetoes(&oracle.findings(model, member)),
            None => Findings::new(),
        }
    }

    fn event(&self) -> Option<ModelEvent> {
        let node = self.created?;
        match self.state {
            Lifecycle::Created => None,
            Lifecycle::Applied => Some(ModelEvent::NodeAdded {
                owner: self.library,
                node,
            }),
            Lifecycle::Undone => Some(ModelEvent::NodeRemoved {
                owner: Some(self.library),
                node,
            }),
        }
    }

    fn description(&self) -> String {
        format!("New {} '{}'", self.member_kind.label(), self.name)
    }
}

pub fn new_member(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    if !require_kind(model, subject)?.is_library() {
        return Err(EditActionError::WrongSubject {
            kind: ActionKind::NewMember,
            subject,
        });
    }
    Ok(Box::new(NewMember::new(subject)))
}

pub fn can_create_member(query: &EnableQuery<'_>) -> bool {
    query.model.is_editable(query.subject)
        && query
            .model
            .kind(query.subject)
            .is_some_and(|kind| kind.is_library())
}

// ---------------------------------------------------------------------------
// CopyMember
// ---------------------------------------------------------------------------

/// Deep-copies the subject member into an editable library.
///
/// The target library comes from `Node` input, or defaults to the source's
/// own library. The source itself is never modified.
#[derive(Debug)]
pub struct CopyMember {
    source: NodeId,
    source_name: String,
    target: Option<NodeId>,
    created: Option<NodeId>,
    state: Lifecycle,
}

impl CopyMember {
    pub fn new(model: &Model, source: NodeId) -> Self {
        Self {
            source,
            source_name: model.name(source).to_owned(),
            target: None,
            created: None,
            state: Lifecycle::Created,
        }
    }

    pub fn created(&self) -> Option<NodeId> {
        self.created
    }
}

impl EditAction for CopyMember {
    fn kind(&self) -> ActionKind {
        ActionKind::CopyMember
    }

    fn subject(&self) -> NodeId {
        self.source
    }

    fn apply(
        &mut self,
        model: &mut Model,
        data: Option<ActionValue>,
    ) -> EditActionResult<Option<ActionValue>> {
        self.state.start_apply()?;
        let target = match data {
            Some(value) => value.into_node()?,
            None => model.owning_library(self.source).ok_or_else(|| {
                EditActionError::InvalidState("source has no library to copy into".into())
            })?,
        };
        if !model.is_editable(target) {
            return Err(EditActionError::InvalidState(format!(
                "library '{}' is not editable",
                model.name(target)
            )));
        }
        let name = unique_child_name(model, Some(target), &format!("{}Copy", self.source_name));
        let copy = model.copy_member(self.source, target, name)?;
        self.target = Some(target);
        self.created = Some(copy);
        Ok(Some(ActionValue::Node(copy)))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        let copy = self
            .created
            .ok_or_else(|| EditActionError::InvalidState("nothing was copied".into()))?;
        model.detach(copy)?;
        Ok(Some(ActionValue::Node(copy)))
    }

    fn veto_findings(
        &self,
        model: &Model,
        oracle: &dyn ValidationOracle,
        policy: &VetoPolicy,
    ) -> Findings {
        match self.created {
            Some(copy) => policy.vetoes(&oracle.findings(model, copy)),
            None => Findings::new(),
        }
    }

    fn event(&self) -> Option<ModelEvent> {
        let (owner, node) = (self.target?, self.created?);
        match self.state {
            Lifecycle::Created => None,
            Lifecycle::Applied => Some(ModelEvent::NodeAdded { owner, node }),
            Lifecycle::Undone => Some(ModelEvent::NodeRemoved {
                owner: Some(owner),
                node,
            }),
        }
    }

    fn description(&self) -> String {
        format!("Copy '{}'", self.source_name)
    }
}

pub fn copy_member(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    if !require_kind(model, subject)?.is_member() {
        return Err(EditActionError::WrongSubject {
            kind: ActionKind::CopyMember,
            subject,
        });
    }
    Ok(Box::new(CopyMember::new(model, subject)))
}

/// Copying never modifies the source, so only liveness matters.
pub fn can_copy(query: &EnableQuery<'_>) -> bool {
    query.model.is_live(query.subject)
        && query
            .model
            .kind(query.subject)
            .is_some_and(|kind| kind.is_member())
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Removes the subject from its owner.
///
/// Properties typed by a deleted node lose their type; undo restores both
/// the node at its former position and those assignments.
#[derive(Debug)]
pub struct Delete {
    subject: NodeId,
    subject_kind: NodeKind,
    name: String,
    slot: Option<(NodeId, usize)>,
    owning_member: Option<NodeId>,
    users: Vec<NodeId>,
    state: Lifecycle,
}

impl Delete {
    pub fn new(model: &Model, subject: NodeId, subject_kind: NodeKind) -> Self {
        let owning_member = model
            .owner(subject)
            .and_then(|owner| model.owning_member(owner));
        Self {
            subject,
            subject_kind,
            name: model.name(subject).to_owned(),
            slot: None,
            owning_member,
            users: Vec::new(),
            state: Lifecycle::Created,
        }
    }
}

impl EditAction for Delete {
    fn kind(&self) -> ActionKind {
        ActionKind::Delete
    }

    fn subject(&self) -> NodeId {
        self.subject
    }

    fn apply(
        &mut self,
        model: &mut Model,
        _data: Option<ActionValue>,
    ) -> EditActionResult<Option<ActionValue>> {
        self.state.start_apply()?;
        self.users = model.type_users(self.subject);
        for &user in &self.users {
            model.set_assigned_type(user, None)?;
        }
        self.slot = model.detach(self.subject)?;
        Ok(Some(ActionValue::Node(self.subject)))
    }

    fn undo(&mut self, model: &mut Model) -> EditActionResult<Option<ActionValue>> {
        self.state.start_undo()?;
        match self.slot {
            Some((owner, index)) => model.attach(self.subject, owner, index)?,
            None => model.revive(self.subject)?,
        }
        for &user in &self.users {
            model.set_assigned_type(user, Some(self.subject))?;
        }
        Ok(Some(ActionValue::Node(self.subject)))
    }

    /// The subject is gone, so the former owning member is checked instead.
    fn veto_findings(
        &self,
        model: &Model,
        oracle: &dyn ValidationOracle,
        policy: &VetoPolicy,
    ) -> Findings {
        match self.owning_member {
            Some(member) => policy.vetoes(&oracle.findings(model, member)),
            None => Findings::new(),
        }
    }

    fn is_valid(&self, model: &Model) -> bool {
        model.node(self.subject).is_some()
    }

    fn event(&self) -> Option<ModelEvent> {
        let owner = self.slot.map(|(owner, _)| owner);
        match self.state {
            Lifecycle::Created => None,
            Lifecycle::Applied => Some(ModelEvent::NodeRemoved {
                owner,
                node: self.subject,
            }),
            Lifecycle::Undone => owner.map(|owner| ModelEvent::NodeAdded {
                owner,
                node: self.subject,
            }),
        }
    }

    fn description(&self) -> String {
        format!("Delete {} '{}'", self.subject_kind.label(), self.name)
    }
}

pub fn delete(model: &Model, subject: NodeId) -> EditActionResult<Box<dyn EditAction>> {
    let kind = require_kind(model, subject)?;
    if kind.is_library() {
        return Err(EditActionError::WrongSubject {
            kind: ActionKind::Delete,
            subject,
        });
    }
    Ok(Box::new(Delete::new(model, subject, kind)))
}

pub fn can_delete(query: &EnableQuery<'_>) -> bool {
    let model = query.model;
    model.is_editable(query.subject)
        && !model.is_inherited(query.subject)
        && model
            .kind(query.subject)
            .is_some_and(|kind| !kind.is_library())
}
