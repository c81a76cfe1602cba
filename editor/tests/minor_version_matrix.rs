mod common;

use common::Fixture;

use otmde_editor::manager::is_legal_in_minor_version;
use otmde_editor::{ActionKind, ActionManager};

fn managers(f: &Fixture) -> (ActionManager, ActionManager) {
    let parent = f.full();
    let minor = ActionManager::minor_version(&parent);
    (parent, minor)
}

// ---------------------------------------------------------------------------
// Legality matrix
// ---------------------------------------------------------------------------

#[test]
fn rename_allowed_for_property_new_in_latest_version() {
    let f = Fixture::new();
    let (_, minor) = managers(&f);
    assert!(minor.is_enabled(ActionKind::NameChange, f.nickname));
}

#[test]
fn rename_refused_for_inherited_property() {
    let f = Fixture::new();
    let (_, minor) = managers(&f);
    assert!(!minor.is_enabled(ActionKind::NameChange, f.inherited_name));
    assert!(!is_legal_in_minor_version(
        ActionKind::NameChange,
        &f.model.borrow(),
        f.inherited_name
    ));
}

#[test]
fn subject_may_move_to_later_version() {
    let f = Fixture::new();
    let (parent, minor) = managers(&f);

    // ProfileApi is not new to the chain, but Profile 1.1.0 supersedes
    // the Profile 1.0.0 it exposes.
    assert!(minor.is_enabled(ActionKind::SetSubject, f.profile_api));
    // LatestApi already exposes the latest Profile.
    assert!(!minor.is_enabled(ActionKind::SetSubject, f.latest_api));
    assert!(parent.is_enabled(ActionKind::SetSubject, f.latest_api));
}

#[test]
fn delete_refused_for_inherited_resource_child() {
    let f = Fixture::new();
    let (_, minor) = managers(&f);
    assert!(!minor.is_enabled(ActionKind::Delete, f.inherited_get));
    assert!(minor.is_enabled(ActionKind::Delete, f.local_list));
}

#[test]
fn additive_kinds_are_always_legal() {
    let f = Fixture::new();
    let model = f.model.borrow();
    for kind in [
        ActionKind::AddAlias,
        ActionKind::AddProperty,
        ActionKind::DescriptionChange,
        ActionKind::DeprecationChange,
        ActionKind::ExampleChange,
        ActionKind::CopyMember,
        ActionKind::NewMember,
    ] {
        assert!(is_legal_in_minor_version(kind, &model, f.inherited_name), "{kind}");
        assert!(is_legal_in_minor_version(kind, &model, f.frozen_member), "{kind}");
    }
}

#[test]
fn resource_children_need_an_editable_chain() {
    let f = Fixture::new();
    let model = f.model.borrow();
    assert!(is_legal_in_minor_version(
        ActionKind::AddResourceChild,
        &model,
        f.profile_api
    ));
    assert!(!is_legal_in_minor_version(
        ActionKind::AddResourceChild,
        &model,
        f.frozen_member
    ));
}

#[test]
fn unlisted_kinds_need_local_property_or_child() {
    let f = Fixture::new();
    let model = f.model.borrow();
    assert!(is_legal_in_minor_version(
        ActionKind::MandatoryChange,
        &model,
        f.nickname
    ));
    assert!(!is_legal_in_minor_version(
        ActionKind::MandatoryChange,
        &model,
        f.inherited_name
    ));
    assert!(is_legal_in_minor_version(
        ActionKind::BasePathChange,
        &model,
        f.local_list
    ));
    // Resources are members, not children.
    assert!(!is_legal_in_minor_version(
        ActionKind::SetFirstClass,
        &model,
        f.orders
    ));
}

#[test]
fn legal_kinds_still_defer_to_parent() {
    let f = Fixture::new();
    let (parent, minor) = managers(&f);

    // Legal by the matrix, but the Frozen library is read-only.
    assert!(is_legal_in_minor_version(
        ActionKind::DescriptionChange,
        &f.model.borrow(),
        f.frozen_member
    ));
    assert!(!parent.is_enabled(ActionKind::DescriptionChange, f.frozen_member));
    assert!(!minor.is_enabled(ActionKind::DescriptionChange, f.frozen_member));
}

#[test]
fn read_only_parent_stays_read_only() {
    let f = Fixture::new();
    let parent = ActionManager::read_only(f.context());
    let minor = ActionManager::minor_version(&parent);

    assert!(f.full().is_enabled(ActionKind::DescriptionChange, f.nickname));
    assert!(!minor.is_enabled(ActionKind::DescriptionChange, f.nickname));
    assert!(minor.is_enabled(ActionKind::CopyMember, f.frozen_member));
    assert!(minor.shares_queue_with(&parent));
}

// ---------------------------------------------------------------------------
// Shared history
// ---------------------------------------------------------------------------

#[test]
fn minor_version_shares_parent_queue() {
    let f = Fixture::new();
    let (parent, minor) = managers(&f);
    assert!(minor.shares_queue_with(&parent));
    assert_eq!(minor.policy_name(), "minor-version");

    let before = parent.queue_size();
    let outcome = minor.run(
        ActionKind::DescriptionChange,
        f.nickname,
        Some("Informal name".into()),
    );
    assert!(outcome.is_accepted());
    assert_eq!(parent.queue_size(), before + 1);
    assert_eq!(minor.queue_size(), parent.queue_size());

    // Either manager can undo the shared entry.
    assert!(parent.undo().is_some());
    assert_eq!(minor.queue_size(), 0);
}

#[test]
fn refused_kind_is_not_run() {
    let f = Fixture::new();
    let (parent, minor) = managers(&f);

    let outcome = minor.run(ActionKind::Delete, f.inherited_get, None);
    assert_eq!(outcome, otmde_editor::RunOutcome::Disabled);
    assert!(f.model.borrow().is_live(f.inherited_get));
    assert_eq!(parent.queue_size(), 0);
}
