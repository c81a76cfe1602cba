//! Action managers.
//!
//! Every manager runs the same protocol ([`ActionManager`]): resolve an
//! action through the registry, apply it, ask the validation oracle, then
//! either accept it onto the undo queue or roll it back. Variants differ only
//! in their [`EnablementPolicy`] and in whether they own or share a queue:
//!
//! | Variant        | Enablement                                  | Queue          |
//! |----------------|---------------------------------------------|----------------|
//! | Full           | per-kind registry predicate                 | own            |
//! | Read-only      | copy member only                            | own            |
//! | Wizard         | everything; only library assignment while unowned | own, private |
//! | Minor version  | legality matrix, then the parent's policy   | parent's       |

mod base;
mod context;
mod full;
mod minor_version;
mod read_only;
mod wizard;

use std::fmt;

pub use base::{ActionManager, PushOutcome, RunOutcome};
pub use context::EditorContext;
pub use full::FullPolicy;
pub use minor_version::{MinorVersionPolicy, is_legal_in_minor_version};
pub use read_only::ReadOnlyPolicy;
pub use wizard::WizardPolicy;

use crate::kinds::ActionKind;
use crate::registry::{ActionRegistry, EnableQuery};

/// Decides which action kinds a manager offers for a subject.
pub trait EnablementPolicy: fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn is_enabled(
        &self,
        kind: ActionKind,
        query: &EnableQuery<'_>,
        registry: &ActionRegistry,
    ) -> bool;
}
