use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use otmde_core::events::{EventSink, ModelEvent};
use otmde_core::model::{Model, NodeId};
use otmde_core::status::StatusChannel;
use otmde_core::tasks::ContainerTasks;
use otmde_core::validation::{BasicRules, ValidationOracle, VetoPolicy};

use crate::config::{ActionSettings, EditorConfig};
use crate::registry::ActionRegistry;

/// The model and collaborators shared by every manager of one editing
/// surface.
///
/// Status, event and container-task collaborators are optional; calls to a
/// missing one are no-ops. Cloning shares everything.
#[derive(Clone)]
pub struct EditorContext {
    model: Rc<RefCell<Model>>,
    oracle: Rc<dyn ValidationOracle>,
    registry: Rc<ActionRegistry>,
    vetoes: Rc<VetoPolicy>,
    settings: ActionSettings,
    status: Option<Rc<dyn StatusChannel>>,
    events: Option<Rc<dyn EventSink>>,
    tasks: Option<Rc<dyn ContainerTasks>>,
}

impl EditorContext {
    /// Context with [`BasicRules`], the standard registry and the default
    /// veto policy.
    pub fn new(model: Rc<RefCell<Model>>) -> Self {
        Self {
            model,
            oracle: Rc::new(BasicRules::new()),
            registry: Rc::new(ActionRegistry::standard()),
            vetoes: Rc::new(VetoPolicy::default()),
            settings: ActionSettings::default(),
            status: None,
            events: None,
            tasks: None,
        }
    }

    pub fn from_config(model: Rc<RefCell<Model>>, config: &EditorConfig) -> Self {
        Self::new(model).with_config(config)
    }

    /// Applies the action settings and veto codes of `config`.
    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.settings = config.actions.clone();
        self.vetoes = Rc::new(config.validation.veto_policy());
        self
    }

    pub fn with_oracle(mut self, oracle: impl ValidationOracle + 'static) -> Self {
        self.oracle = Rc::new(oracle);
        self
    }

    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = Rc::new(registry);
        self
    }

    pub fn with_veto_policy(mut self, vetoes: VetoPolicy) -> Self {
        self.vetoes = Rc::new(vetoes);
        self
    }

    pub fn with_settings(mut self, settings: ActionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_status(mut self, status: impl StatusChannel + 'static) -> Self {
        let status: Rc<dyn StatusChannel> = Rc::new(status);
        self.status = Some(status);
        self
    }

    pub fn with_events<S: EventSink + 'static>(mut self, events: Rc<S>) -> Self {
        self.events = Some(events as Rc<dyn EventSink>);
        self
    }

    pub fn with_tasks<T: ContainerTasks + 'static>(mut self, tasks: Rc<T>) -> Self {
        self.tasks = Some(tasks as Rc<dyn ContainerTasks>);
        self
    }

    pub fn model(&self) -> &Rc<RefCell<Model>> {
        &self.model
    }

    pub fn oracle(&self) -> &dyn ValidationOracle {
        self.oracle.as_ref()
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn vetoes(&self) -> &VetoPolicy {
        &self.vetoes
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    pub(crate) fn post_status(&self, message: &str) {
        if let Some(status) = &self.status {
            status.post_status(message);
        }
    }

    pub(crate) fn post_warning(&self, message: &str) {
        if let Some(status) = &self.status {
            status.post_warning(message);
        }
    }

    pub(crate) fn queue_size_changed(&self, size: usize) {
        if let Some(status) = &self.status {
            status.queue_size_changed(size);
        }
    }

    pub(crate) fn publish(&self, event: &ModelEvent) {
        log::debug!("Publishing {event}");
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    pub(crate) fn refresh_container(&self, library: NodeId) {
        if let Some(tasks) = &self.tasks {
            tasks.start_validating_and_resolving(library);
        }
    }
}

impl fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorContext")
            .field("nodes", &self.model.try_borrow().map(|m| m.len()).ok())
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .field("status", &self.status.is_some())
            .field("events", &self.events.is_some())
            .field("tasks", &self.tasks.is_some())
            .finish_non_exhaustive()
    }
}
