//! # OTM-DE Editor Actions
//!
//! Undoable editing for the object editor. Every change to the model is an
//! [`EditAction`] resolved from the [`ActionRegistry`] and run by an
//! [`ActionManager`], which checks the result with the validation oracle and
//! either keeps the action for undo or rolls it back.
//!
//! Property editors bind to [`Binding`] cells handed out by
//! [`ActionManager::add`]; writing a cell runs a fresh action.

pub mod action;
pub mod action_queue;
pub mod actions;
pub mod binding;
pub mod config;
pub mod kinds;
pub mod logging;
pub mod manager;
pub mod registry;

pub use action::{ActionId, ActionValue, EditAction, EditActionError, EditActionResult};
pub use action_queue::{ActionQueue, QueuedAction};
pub use binding::{BindableValue, Binding, BoundAction};
pub use config::{EditorConfig, load_or_default};
pub use kinds::ActionKind;
pub use manager::{ActionManager, EditorContext, EnablementPolicy, PushOutcome, RunOutcome};
pub use registry::{ActionError, ActionRegistry, EnableQuery};

/// Editor library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Loads the config at `path`, installs the logger and builds the main
/// manager for `model`.
pub fn init(
    model: std::rc::Rc<std::cell::RefCell<otmde_core::model::Model>>,
    path: &std::path::Path,
) -> ActionManager {
    let config = load_or_default(path);
    if let Err(e) = logging::init(&config.log) {
        log::debug!("Logger already installed: {e}");
    }
    log::info!("OTM-DE editor actions v{VERSION} initialized");
    ActionManager::full(EditorContext::from_config(model, &config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
