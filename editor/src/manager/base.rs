use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use otmde_core::model::{NodeId, Validity};
use otmde_core::validation::{Findings, Severity};

use super::{EditorContext, EnablementPolicy};
use crate::action::{ActionValue, EditAction};
use crate::action_queue::{ActionQueue, QueuedAction};
use crate::binding::{BindableValue, Binding, BoundAction, SubscriptionId, WeakBinding};
use crate::kinds::ActionKind;
use crate::registry::{ActionError, EnableQuery};

/// Result of [`ActionManager::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The action is now the most recent entry of the undo queue.
    Accepted { queue_size: usize },
    /// The oracle vetoed the change; the action was rolled back.
    Vetoed(Findings),
    /// An entry with the same id is already queued; the change was rolled
    /// back.
    Duplicate,
}

/// Result of [`ActionManager::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Pushed(PushOutcome),
    /// The action ran but changed nothing, so it was not queued.
    NoChange,
    /// The manager does not offer this kind for the subject.
    Disabled,
    Failed(ActionError),
}

impl RunOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Pushed(PushOutcome::Accepted { .. }))
    }

    pub fn is_vetoed(&self) -> bool {
        matches!(self, Self::Pushed(PushOutcome::Vetoed(_)))
    }
}

struct ManagerInner {
    context: EditorContext,
    queue: Rc<ActionQueue>,
    policy: Rc<dyn EnablementPolicy>,
}

/// Runs actions against the model and keeps the accepted ones for undo.
///
/// Every change goes through the same commit protocol: the action is applied
/// first, then the validation oracle is asked about the result. Vetoed
/// changes are undone on the spot and reported as a warning; everything else
/// lands at the front of the undo queue.
///
/// Handles are cheap to clone and share one manager.
#[derive(Clone)]
pub struct ActionManager {
    inner: Rc<ManagerInner>,
}

/// Pending action of a cell created by [`ActionManager::add`]. The action
/// is `None` while the subject cannot be resolved; the next change retries.
struct ArmedAction {
    action: RefCell<Option<Box<dyn EditAction>>>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl ActionManager {
    pub fn new(
        context: EditorContext,
        queue: Rc<ActionQueue>,
        policy: Rc<dyn EnablementPolicy>,
    ) -> Self {
        log::debug!("Creating {} action manager", policy.name());
        Self {
            inner: Rc::new(ManagerInner {
                context,
                queue,
                policy,
            }),
        }
    }

    pub fn context(&self) -> &EditorContext {
        &self.inner.context
    }

    pub fn queue(&self) -> &Rc<ActionQueue> {
        &self.inner.queue
    }

    pub(crate) fn policy(&self) -> &Rc<dyn EnablementPolicy> {
        &self.inner.policy
    }

    pub fn policy_name(&self) -> &'static str {
        self.inner.policy.name()
    }

    /// Whether both managers record into one undo history.
    pub fn shares_queue_with(&self, other: &ActionManager) -> bool {
        Rc::ptr_eq(&self.inner.queue, &other.inner.queue)
    }

    pub fn queue_size(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.inner.queue.is_empty()
    }

    /// Descriptions of the undoable actions, newest first.
    pub fn undo_descriptions(&self) -> Vec<String> {
        self.inner.queue.descriptions()
    }

    pub fn is_enabled(&self, kind: ActionKind, subject: NodeId) -> bool {
        let context = &self.inner.context;
        let Ok(model) = context.model().try_borrow() else {
            log::debug!("Model is busy, '{kind}' reported disabled");
            return false;
        };
        let query = EnableQuery {
            model: &model,
            subject,
            oracle: context.oracle(),
            vetoes: context.vetoes(),
        };
        self.inner
            .policy
            .is_enabled(kind, &query, context.registry())
    }

    // -----------------------------------------------------------------------
    // Commit protocol
    // -----------------------------------------------------------------------

    /// Resolves and applies an action that is not bound to a cell. Only a
    /// change that produced a result is pushed.
    pub fn run(&self, kind: ActionKind, subject: NodeId, data: Option<ActionValue>) -> RunOutcome {
        let context = &self.inner.context;
        if !self.is_enabled(kind, subject) {
            log::debug!("'{kind}' is not enabled for {subject}");
            context.post_warning(&format!("'{}' is not available here", kind.label()));
            return RunOutcome::Disabled;
        }

        let resolved = {
            let model = context.model().borrow();
            context.registry().resolve(kind, &model, subject)
        };
        let mut action = match resolved {
            Ok(action) => action,
            Err(e) => return self.fail(e),
        };

        let applied = action.apply(&mut context.model().borrow_mut(), data);
        match applied {
            Ok(Some(_)) => RunOutcome::Pushed(self.push(QueuedAction::new(action))),
            Ok(None) => {
                log::debug!("'{}' made no change", action.description());
                RunOutcome::NoChange
            }
            Err(source) => self.fail(ActionError::Execution { kind, source }),
        }
    }

    /// Commits an applied action: vetoed changes are rolled back, anything
    /// else becomes the most recent undo entry.
    pub fn push(&self, entry: QueuedAction) -> PushOutcome {
        let context = &self.inner.context;
        let findings = {
            let model = context.model().borrow();
            entry
                .action()
                .veto_findings(&model, context.oracle(), context.vetoes())
        };
        if !findings.is_empty() {
            self.reject(entry, &findings);
            return PushOutcome::Vetoed(findings);
        }

        let id = entry.id();
        let subject = entry.action().subject();
        let description = entry.description();
        let event = entry.action().event();
        match self.inner.queue.push_front(entry) {
            Err(mut entry) => {
                log::warn!("{id} is already queued, rolling back '{description}'");
                self.roll_back(&mut entry);
                PushOutcome::Duplicate
            }
            Ok(queue_size) => {
                if let Some(event) = event {
                    context.publish(&event);
                }
                log::info!("Performed action: {description}");
                context.post_status(&format!("Performed action: {description}"));
                context.queue_size_changed(queue_size);
                self.refresh_container(subject);
                PushOutcome::Accepted { queue_size }
            }
        }
    }

    /// Undoes the most recent action and returns its description. An empty
    /// queue is a no-op.
    pub fn undo(&self) -> Option<String> {
        let context = &self.inner.context;
        let Some(mut entry) = self.inner.queue.pop_front() else {
            log::debug!("Nothing to undo");
            return None;
        };
        let description = entry.description();
        let subject = entry.action().subject();

        let undone = {
            let _ignore = self.inner.queue.ignore();
            let undone = entry
                .action_mut()
                .undo(&mut context.model().borrow_mut());
            if undone.is_ok() {
                entry.action().rewind_binding();
                self.refresh_validity(subject);
            }
            undone
        };
        context.queue_size_changed(self.inner.queue.len());

        match undone {
            Ok(_) => {
                if let Some(event) = entry.action().event() {
                    context.publish(&event);
                }
                log::info!("Undid action: {description}");
                context.post_status(&format!("Undid action: {description}"));
                self.refresh_container(subject);
                Some(description)
            }
            Err(e) => {
                log::error!("Undo of '{description}' failed: {e}");
                context.post_warning(&format!("Could not undo '{description}': {e}"));
                None
            }
        }
    }

    /// Undoes an applied action that never made it into the queue.
    fn roll_back(&self, entry: &mut QueuedAction) {
        let _ignore = self.inner.queue.ignore();
        let undone = entry
            .action_mut()
            .undo(&mut self.inner.context.model().borrow_mut());
        if let Err(e) = undone {
            log::error!("Rollback of '{}' failed: {e}", entry.description());
        }
        entry.action().rewind_binding();
    }

    fn reject(&self, mut entry: QueuedAction, findings: &Findings) {
        let context = &self.inner.context;
        let subject = entry.action().subject();
        self.roll_back(&mut entry);

        let subject_name = context.model().borrow().name(subject).to_owned();
        let warning = format!(
            "Action '{}' on '{}' was vetoed:\n{}",
            entry.description(),
            subject_name,
            findings.messages()
        );
        log::warn!("{warning}");
        if context.settings().warn_on_veto {
            context.post_warning(&warning);
        }
        self.refresh_container(subject);
    }

    fn fail(&self, error: ActionError) -> RunOutcome {
        log::warn!("{error}");
        self.inner
            .context
            .post_warning(&format!("Action failed: {error}"));
        RunOutcome::Failed(error)
    }

    /// Recomputes the validity flag of the member owning `subject`.
    fn refresh_validity(&self, subject: NodeId) {
        let context = &self.inner.context;
        let mut model = context.model().borrow_mut();
        let Some(member) = model.owning_member(subject) else {
            return;
        };
        if !model.is_live(member) {
            return;
        }
        let findings = context.oracle().findings(&model, member);
        let validity = if findings.iter().any(|f| f.severity == Severity::Error) {
            Validity::Invalid
        } else {
            Validity::Valid
        };
        if let Err(e) = model.set_validity(member, validity) {
            log::debug!("Could not refresh validity of {member}: {e}");
        }
    }

    fn refresh_container(&self, subject: NodeId) {
        let library = self.inner.context.model().borrow().owning_library(subject);
        if let Some(library) = library {
            self.inner.context.refresh_container(library);
        }
    }

    // -----------------------------------------------------------------------
    // Cell bindings
    // -----------------------------------------------------------------------

    /// Returns a cell holding `initial`. When `kind` is enabled for
    /// `subject`, every change written into the cell runs a fresh action of
    /// that kind; otherwise the cell is read-only.
    pub fn add<T: BindableValue>(&self, kind: ActionKind, initial: T, subject: NodeId) -> Binding<T> {
        if !self.is_enabled(kind, subject) {
            log::debug!("'{kind}' is not enabled for {subject}, binding is read-only");
            return Binding::read_only(initial);
        }
        let binding = Binding::new(initial);
        self.arm(kind, subject, &binding);
        binding
    }

    /// Attaches a fresh action of `kind` to `binding`.
    fn arm<T: BindableValue>(&self, kind: ActionKind, subject: NodeId, binding: &Binding<T>) {
        let context = &self.inner.context;
        let resolved = {
            let model = context.model().borrow();
            context.registry().resolve(kind, &model, subject)
        };
        let action = match resolved {
            Ok(action) => Some(action),
            Err(e) => {
                log::debug!("Deferring '{kind}' for {subject} to the next change: {e}");
                None
            }
        };

        let armed = Rc::new(ArmedAction {
            action: RefCell::new(action),
            subscription: Cell::new(None),
        });
        let manager = Rc::downgrade(&self.inner);
        let weak = binding.downgrade();
        let pending = Rc::clone(&armed);
        let id = binding.subscribe(move |old: &T, new: &T| {
            let Some(inner) = manager.upgrade() else {
                return;
            };
            ActionManager { inner }.binding_changed(kind, subject, &weak, &pending, old, new);
        });
        armed.subscription.set(Some(id));
    }

    fn binding_changed<T: BindableValue>(
        &self,
        kind: ActionKind,
        subject: NodeId,
        weak: &WeakBinding<T>,
        armed: &ArmedAction,
        old: &T,
        new: &T,
    ) {
        if self.inner.queue.is_ignoring() {
            return;
        }
        let Some(binding) = weak.upgrade() else {
            return;
        };
        let Some(id) = armed.subscription.take() else {
            return;
        };
        binding.unsubscribe(id);

        let context = &self.inner.context;
        let pending = armed.action.borrow_mut().take();
        let resolved = match pending {
            Some(action) => Ok(action),
            None => {
                let model = context.model().borrow();
                context.registry().resolve(kind, &model, subject)
            }
        };
        let mut action = match resolved {
            Ok(action) => action,
            Err(e) => {
                self.fail(e);
                {
                    let _ignore = self.inner.queue.ignore();
                    binding.set(old.clone());
                }
                self.arm(kind, subject, &binding);
                return;
            }
        };

        let applied = {
            let _ignore = self.inner.queue.ignore();
            action.apply(
                &mut context.model().borrow_mut(),
                Some(new.clone().into_action_value()),
            )
        };
        match applied {
            Ok(Some(_)) => {
                let bound = BoundAction::new(action, weak.clone(), old.clone());
                self.push(QueuedAction::new(Box::new(bound)));
            }
            Ok(None) => log::debug!("'{}' made no change", action.description()),
            Err(source) => {
                self.fail(ActionError::Execution { kind, source });
                let _ignore = self.inner.queue.ignore();
                binding.set(old.clone());
            }
        }
        self.arm(kind, subject, &binding);
    }
}

impl fmt::Debug for ActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionManager")
            .field("policy", &self.inner.policy.name())
            .field("queue", &self.inner.queue)
            .finish()
    }
}
