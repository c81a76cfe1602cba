//! Concrete actions, one factory and one enablement predicate per
//! [`ActionKind`](crate::kinds::ActionKind).
//!
//! Factories only check that the action fits the subject structurally.
//! Whether the user may run it is decided by the predicates, which the
//! manager variants combine with their own rules.

pub mod assign;
pub mod flag;
pub mod structure;
pub mod text;

pub use assign::{AssignLibrary, AssignType};
pub use flag::FlagChange;
pub use structure::{AddChild, CopyMember, Delete, NewMember};
pub use text::TextChange;

use otmde_core::model::{Model, NodeId, NodeKind};

use crate::action::{EditActionError, EditActionResult};

pub(crate) fn require_kind(model: &Model, subject: NodeId) -> EditActionResult<NodeKind> {
    if !model.is_live(subject) {
        return Err(EditActionError::TargetNotFound(subject));
    }
    model
        .kind(subject)
        .ok_or(EditActionError::TargetNotFound(subject))
}

/// `base`, then `base1`, `base2`, ... until no child of `owner` uses the name.
pub(crate) fn unique_child_name(model: &Model, owner: Option<NodeId>, base: &str) -> String {
    let taken = |candidate: &str| {
        owner.is_some_and(|owner| {
            model
                .children(owner)
                .iter()
                .any(|&child| model.name(child) == candidate)
        })
    };
    if !taken(base) {
        return base.to_owned();
    }
    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use otmde_core::model::{MemberKind, PropertyKind, Version};

    #[test]
    fn unique_names_count_up() {
        let mut model = Model::new();
        let lib = model.add_library("Lib", "urn:lib", Version::new(1, 0, 0), true);
        let bo = model
            .add_member(lib, MemberKind::BusinessObject, "Order")
            .unwrap();
        assert_eq!(unique_child_name(&model, Some(bo), "newProperty"), "newProperty");

        model
            .add_property(bo, PropertyKind::Element, "newProperty")
            .unwrap();
        model
            .add_property(bo, PropertyKind::Element, "newProperty1")
            .unwrap();
        assert_eq!(unique_child_name(&model, Some(bo), "newProperty"), "newProperty2");
        assert_eq!(unique_child_name(&model, None, "x"), "x");
    }

    #[test]
    fn removed_subject_is_not_found() {
        let mut model = Model::new();
        let lib = model.add_library("Lib", "urn:lib", Version::new(1, 0, 0), true);
        let bo = model.add_member(lib, MemberKind::CoreObject, "Item").unwrap();
        assert!(require_kind(&model, bo).is_ok());
        model.detach(bo).unwrap();
        assert_eq!(
            require_kind(&model, bo),
            Err(EditActionError::TargetNotFound(bo))
        );
    }
}
