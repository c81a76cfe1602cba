//! Shared fixture for the manager integration tests.
//!
//! A two-version chain of the `Common` library: 1.0.0 is published and
//! read-only, 1.1.0 is the editable minor version being worked on.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use otmde_core::events::EventBus;
use otmde_core::model::{MemberKind, Model, NodeId, PropertyKind, ResourceChildKind, TextField, Version};
use otmde_core::status::StatusBuffer;
use otmde_core::tasks::QueuedTasks;
use otmde_editor::{ActionManager, EditorContext};

pub struct Fixture {
    pub model: Rc<RefCell<Model>>,
    pub status: StatusBuffer,
    pub events: Rc<EventBus>,
    pub tasks: Rc<QueuedTasks>,

    pub v0: NodeId,
    pub v1: NodeId,
    /// `Profile` as published in 1.0.0.
    pub profile_v0: NodeId,
    /// `Profile` carried into 1.1.0.
    pub profile_v1: NodeId,
    /// `Profile.Name`, inherited from 1.0.0.
    pub inherited_name: NodeId,
    /// `Profile.Nickname`, added in 1.1.0.
    pub nickname: NodeId,
    /// 1.0.0 resource exposing `Profile` 1.0.0, which has a later version.
    pub profile_api: NodeId,
    /// 1.0.0 resource exposing `Profile` 1.1.0, which has none.
    pub latest_api: NodeId,
    /// 1.1.0 resource.
    pub orders: NodeId,
    /// `Orders.Get`, inherited from 1.0.0.
    pub inherited_get: NodeId,
    /// `Orders.List`, added in 1.1.0.
    pub local_list: NodeId,
    /// Read-only library outside any chain.
    pub frozen: NodeId,
    pub frozen_member: NodeId,
}

impl Fixture {
    pub fn new() -> Self {
        otmde_editor::logging::init_for_tests();

        let mut model = Model::new();
        let v0 = model.add_library("Common", "urn:common", Version::new(1, 0, 0), false);
        let v1 = model.add_library("Common", "urn:common", Version::new(1, 1, 0), true);
        let chain = model.add_chain("Common");
        model.add_to_chain(chain, v0).unwrap();
        model.add_to_chain(chain, v1).unwrap();

        let profile_v0 = model
            .add_member(v0, MemberKind::BusinessObject, "Profile")
            .unwrap();
        model
            .add_property(profile_v0, PropertyKind::Element, "Name")
            .unwrap();

        let profile_v1 = model
            .add_member(v1, MemberKind::BusinessObject, "Profile")
            .unwrap();
        model
            .set_text(profile_v1, TextField::Description, "A traveller profile")
            .unwrap();
        let inherited_name = model
            .add_property(profile_v1, PropertyKind::Element, "Name")
            .unwrap();
        model.set_inherited(inherited_name, true).unwrap();
        let nickname = model
            .add_property(profile_v1, PropertyKind::Element, "Nickname")
            .unwrap();

        let profile_api = model.add_member(v0, MemberKind::Resource, "ProfileApi").unwrap();
        model.set_assigned_type(profile_api, Some(profile_v0)).unwrap();
        let latest_api = model.add_member(v0, MemberKind::Resource, "LatestApi").unwrap();
        model.set_assigned_type(latest_api, Some(profile_v1)).unwrap();

        let orders = model.add_member(v1, MemberKind::Resource, "Orders").unwrap();
        model
            .set_text(orders, TextField::Description, "Order operations")
            .unwrap();
        let inherited_get = model
            .add_resource_child(orders, ResourceChildKind::Action, "Get")
            .unwrap();
        model.set_inherited(inherited_get, true).unwrap();
        let local_list = model
            .add_resource_child(orders, ResourceChildKind::Action, "List")
            .unwrap();

        let frozen = model.add_library("Frozen", "urn:frozen", Version::new(2, 0, 0), false);
        let frozen_member = model
            .add_member(frozen, MemberKind::CoreObject, "Archive")
            .unwrap();

        Self {
            model: Rc::new(RefCell::new(model)),
            status: StatusBuffer::new(),
            events: Rc::new(EventBus::new()),
            tasks: Rc::new(QueuedTasks::new()),
            v0,
            v1,
            profile_v0,
            profile_v1,
            inherited_name,
            nickname,
            profile_api,
            latest_api,
            orders,
            inherited_get,
            local_list,
            frozen,
            frozen_member,
        }
    }

    pub fn context(&self) -> EditorContext {
        EditorContext::new(Rc::clone(&self.model))
            .with_status(self.status.clone())
            .with_events(Rc::clone(&self.events))
            .with_tasks(Rc::clone(&self.tasks))
    }

    pub fn full(&self) -> ActionManager {
        ActionManager::full(self.context())
    }

    pub fn name(&self, id: NodeId) -> String {
        self.model.borrow().name(id).to_owned()
    }
}
