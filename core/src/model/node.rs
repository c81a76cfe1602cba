//! Nodes of the model graph and the kinds they come in.

use std::fmt;

/// Arena index of a node in a [`Model`](super::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the node in the model arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinds of library members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    BusinessObject,
    CoreObject,
    ChoiceObject,
    SimpleType,
    Resource,
}

impl MemberKind {
    /// Whether members of this kind own properties and aliases.
    pub fn has_properties(self) -> bool {
        matches!(
            self,
            Self::BusinessObject | Self::CoreObject | Self::ChoiceObject
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BusinessObject => "business object",
            Self::CoreObject => "core object",
            Self::ChoiceObject => "choice object",
            Self::SimpleType => "simple type",
            Self::Resource => "resource",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Attribute,
    Element,
    Indicator,
    Id,
}

impl PropertyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Element => "element",
            Self::Indicator => "indicator",
            Self::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceChildKind {
    Action,
    ActionFacet,
    ParamGroup,
    ParentRef,
}

impl ResourceChildKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::ActionFacet => "action facet",
            Self::ParamGroup => "parameter group",
            Self::ParentRef => "parent reference",
        }
    }
}

/// What a node is. Determines which owners it may have and which
/// attributes are meaningful for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Library,
    Member(MemberKind),
    Property(PropertyKind),
    Alias,
    ResourceChild(ResourceChildKind),
}

impl NodeKind {
    pub fn is_library(self) -> bool {
        matches!(self, Self::Library)
    }

    pub fn is_member(self) -> bool {
        matches!(self, Self::Member(_))
    }

    pub fn is_property(self) -> bool {
        matches!(self, Self::Property(_))
    }

    pub fn is_alias(self) -> bool {
        matches!(self, Self::Alias)
    }

    pub fn is_resource_child(self) -> bool {
        matches!(self, Self::ResourceChild(_))
    }

    pub fn is_resource(self) -> bool {
        matches!(self, Self::Member(MemberKind::Resource))
    }

    /// Whether the node holds properties and aliases.
    pub fn has_properties(self) -> bool {
        matches!(self, Self::Member(kind) if kind.has_properties())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Member(kind) => kind.label(),
            Self::Property(kind) => kind.label(),
            Self::Alias => "alias",
            Self::ResourceChild(kind) => kind.label(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// String-valued node attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Name,
    Description,
    Deprecation,
    Example,
    /// Only meaningful on resources.
    BasePath,
}

impl TextField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Deprecation => "deprecation",
            Self::Example => "example",
            Self::BasePath => "base path",
        }
    }
}

/// Boolean node attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagField {
    /// Only meaningful on properties.
    Mandatory,
    /// Only meaningful on resources.
    Abstract,
    /// Only meaningful on resources.
    FirstClass,
}

impl FlagField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Abstract => "abstract",
            Self::FirstClass => "first class",
        }
    }
}

/// Cached validation state of a library member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Unknown,
    Valid,
    Invalid,
}

/// A single node of the model graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) owner: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) deprecation: String,
    pub(crate) example: String,
    pub(crate) base_path: String,
    pub(crate) mandatory: bool,
    pub(crate) is_abstract: bool,
    pub(crate) first_class: bool,
    /// Type of a property, or subject of a resource.
    pub(crate) assigned_type: Option<NodeId>,
    /// Contributed by an earlier version rather than owned at this level.
    pub(crate) inherited: bool,
    pub(crate) validity: Validity,
    /// Detached from its owner (deleted, or a creation that was undone).
    pub(crate) removed: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            owner: None,
            children: Vec::new(),
            name: name.into(),
            description: String::new(),
            deprecation: String::new(),
            example: String::new(),
            base_path: String::new(),
            mandatory: false,
            is_abstract: false,
            first_class: false,
            assigned_type: None,
            inherited: false,
            validity: Validity::Unknown,
            removed: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Name => &self.name,
            TextField::Description => &self.description,
            TextField::Deprecation => &self.deprecation,
            TextField::Example => &self.example,
            TextField::BasePath => &self.base_path,
        }
    }

    pub fn flag(&self, field: FlagField) -> bool {
        match field {
            FlagField::Mandatory => self.mandatory,
            FlagField::Abstract => self.is_abstract,
            FlagField::FirstClass => self.first_class,
        }
    }

    pub fn assigned_type(&self) -> Option<NodeId> {
        self.assigned_type
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Name => &mut self.name,
            TextField::Description => &mut self.description,
            TextField::Deprecation => &mut self.deprecation,
            TextField::Example => &mut self.example,
            TextField::BasePath => &mut self.base_path,
        }
    }

    pub(crate) fn flag_mut(&mut self, field: FlagField) -> &mut bool {
        match field {
            FlagField::Mandatory => &mut self.mandatory,
            FlagField::Abstract => &mut self.is_abstract,
            FlagField::FirstClass => &mut self.first_class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::from_index(7).to_string(), "#7");
        assert_eq!(NodeId::from_index(7).index(), 7);
    }

    #[test]
    fn kind_predicates() {
        let resource = NodeKind::Member(MemberKind::Resource);
        assert!(resource.is_member());
        assert!(resource.is_resource());
        assert!(!resource.has_properties());
        assert!(NodeKind::Member(MemberKind::CoreObject).has_properties());
        assert!(NodeKind::Property(PropertyKind::Id).is_property());
        assert!(NodeKind::ResourceChild(ResourceChildKind::Action).is_resource_child());
        assert_eq!(NodeKind::Alias.to_string(), "alias");
    }

    #[test]
    fn text_and_flag_accessors() {
        let mut node = Node::new(
            NodeId::from_index(0),
            NodeKind::Property(PropertyKind::Element),
            "Amount",
        );
        *node.text_mut(TextField::Description) = "How much".into();
        *node.flag_mut(FlagField::Mandatory) = true;

        assert_eq!(node.text(TextField::Name), "Amount");
        assert_eq!(node.text(TextField::Description), "How much");
        assert!(node.flag(FlagField::Mandatory));
        assert!(!node.flag(FlagField::Abstract));
        assert_eq!(node.validity(), Validity::Unknown);
    }
}
