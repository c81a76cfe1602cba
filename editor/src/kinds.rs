//! The closed set of editing operations.

use std::fmt;

/// Identifies an editing operation. Each kind maps to a factory and an
/// enablement predicate in the [`ActionRegistry`](crate::registry::ActionRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    NameChange,
    DescriptionChange,
    DeprecationChange,
    ExampleChange,
    BasePathChange,
    MandatoryChange,
    SetAbstract,
    SetFirstClass,
    AddAlias,
    AddProperty,
    AddResourceChild,
    Delete,
    TypeChange,
    SetSubject,
    CopyMember,
    NewMember,
    AssignLibrary,
}

impl ActionKind {
    pub const ALL: [ActionKind; 17] = [
        Self::NameChange,
        Self::DescriptionChange,
        Self::DeprecationChange,
        Self::ExampleChange,
        Self::BasePathChange,
        Self::MandatoryChange,
        Self::SetAbstract,
        Self::SetFirstClass,
        Self::AddAlias,
        Self::AddProperty,
        Self::AddResourceChild,
        Self::Delete,
        Self::TypeChange,
        Self::SetSubject,
        Self::CopyMember,
        Self::NewMember,
        Self::AssignLibrary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NameChange => "Change name",
            Self::DescriptionChange => "Change description",
            Self::DeprecationChange => "Change deprecation",
            Self::ExampleChange => "Change example",
            Self::BasePathChange => "Change base path",
            Self::MandatoryChange => "Change mandatory",
            Self::SetAbstract => "Set abstract",
            Self::SetFirstClass => "Set first class",
            Self::AddAlias => "Add alias",
            Self::AddProperty => "Add property",
            Self::AddResourceChild => "Add resource child",
            Self::Delete => "Delete",
            Self::TypeChange => "Change type",
            Self::SetSubject => "Set subject",
            Self::CopyMember => "Copy member",
            Self::NewMember => "New member",
            Self::AssignLibrary => "Assign library",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
