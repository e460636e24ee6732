//! Process-wide bridge between host suspend/resume signals and the active view.
//!
//! The bridge owns a single subscriber slot. Whichever view is active installs itself there;
//! installing replaces the previous occupant, which is how ownership follows the selection.
//! Save/resume signals from the host are delegated to the occupant only.

use std::{cell::RefCell, rc::Rc};

use futures::future::LocalBoxFuture;
use platform_host::{AppStateEnvelope, AppStateStore, SUSPEND_STATE_NAMESPACE};
use tracing::{debug, trace};
use view_contract::{ExecutionState, LaunchArgs, ViewHandle};

/// Occupant of the bridge's subscriber slot.
#[derive(Clone)]
pub struct Subscriber {
    owner: ViewHandle,
    on_background_entering: Rc<dyn Fn()>,
    on_resuming: Rc<dyn Fn()>,
}

impl Subscriber {
    /// Creates a subscriber owned by the view `owner`.
    pub fn new(
        owner: ViewHandle,
        on_background_entering: impl Fn() + 'static,
        on_resuming: impl Fn() + 'static,
    ) -> Self {
        Self {
            owner,
            on_background_entering: Rc::new(on_background_entering),
            on_resuming: Rc::new(on_resuming),
        }
    }

    /// View that installed this subscriber.
    pub fn owner(&self) -> ViewHandle {
        self.owner
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Result of [`SuspendResumeBridge::restore_state`].
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// The launch was not restore-eligible.
    Skipped,
    /// Restore-eligible, but no state had been persisted.
    NothingSaved,
    /// The persisted envelope; it is removed from storage once handed out.
    Restored(AppStateEnvelope),
}

/// Launch-time handler that only runs for launch arguments it accepts.
pub trait ActivationHandler {
    /// Value produced by a successful run.
    type Output;

    /// Whether this handler applies to `args`.
    fn can_handle(&self, args: &LaunchArgs) -> bool;

    /// Runs the handler. Callers check [`Self::can_handle`] first.
    fn handle<'a>(
        &'a self,
        args: &'a LaunchArgs,
    ) -> LocalBoxFuture<'a, Result<Self::Output, String>>;

    /// Runs [`Self::handle`] when [`Self::can_handle`] accepts `args`.
    fn handle_if_applicable<'a>(
        &'a self,
        args: &'a LaunchArgs,
    ) -> LocalBoxFuture<'a, Result<Option<Self::Output>, String>> {
        Box::pin(async move {
            if !self.can_handle(args) {
                return Ok(None);
            }
            self.handle(args).await.map(Some)
        })
    }
}

/// Cloneable handle to the process-wide suspend/resume bridge.
#[derive(Clone)]
pub struct SuspendResumeBridge {
    slot: Rc<RefCell<Option<Subscriber>>>,
    app_state: Rc<dyn AppStateStore>,
}

impl SuspendResumeBridge {
    /// Creates a bridge with an empty slot. `app_state` is only read by [`Self::restore_state`].
    pub fn new(app_state: Rc<dyn AppStateStore>) -> Self {
        Self {
            slot: Rc::default(),
            app_state,
        }
    }

    /// Puts `subscriber` in the slot and returns the previous occupant.
    pub fn install(&self, subscriber: Subscriber) -> Option<Subscriber> {
        let owner = subscriber.owner;
        let previous = self.slot.borrow_mut().replace(subscriber);
        trace!(
            view = %owner,
            previous = ?previous.as_ref().map(Subscriber::owner),
            "subscriber slot installed"
        );
        previous
    }

    /// Empties the slot if `owner` occupies it. Returns whether it did.
    pub fn vacate(&self, owner: ViewHandle) -> bool {
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().map(Subscriber::owner) == Some(owner) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// View currently occupying the slot.
    pub fn occupant(&self) -> Option<ViewHandle> {
        self.slot.borrow().as_ref().map(Subscriber::owner)
    }

    /// Asks the occupant to capture its state before the app enters the background.
    ///
    /// Returns `false` without calling anything when the slot is empty, meaning the caller
    /// proceeds without state capture.
    pub fn save_state(&self) -> bool {
        let Some((owner, callback)) = self
            .slot
            .borrow()
            .as_ref()
            .map(|s| (s.owner, Rc::clone(&s.on_background_entering)))
        else {
            trace!("save_state with empty subscriber slot");
            return false;
        };
        debug!(view = %owner, "entering background");
        callback();
        true
    }

    /// Forwards a non-terminating resume to the occupant.
    pub fn resume_app(&self) {
        let Some((owner, callback)) = self
            .slot
            .borrow()
            .as_ref()
            .map(|s| (s.owner, Rc::clone(&s.on_resuming)))
        else {
            trace!("resume_app with empty subscriber slot");
            return;
        };
        debug!(view = %owner, "resuming app");
        callback();
    }

    /// Whether the previous execution ended in forced termination, so persisted state applies.
    pub fn can_restore_state(&self, args: &LaunchArgs) -> bool {
        args.previous_execution_state == ExecutionState::Terminated
    }

    /// Hands back the persisted suspend state for a restore-eligible launch.
    ///
    /// # Errors
    ///
    /// Returns the host store error when loading or clearing the persisted state fails.
    pub async fn restore_state(&self, args: &LaunchArgs) -> Result<RestoreOutcome, String> {
        if !self.can_restore_state(args) {
            return Ok(RestoreOutcome::Skipped);
        }
        let Some(envelope) = self
            .app_state
            .load_app_state_envelope(SUSPEND_STATE_NAMESPACE)
            .await?
        else {
            return Ok(RestoreOutcome::NothingSaved);
        };
        self.app_state
            .delete_app_state(SUSPEND_STATE_NAMESPACE)
            .await?;
        Ok(RestoreOutcome::Restored(envelope))
    }
}

impl ActivationHandler for SuspendResumeBridge {
    type Output = RestoreOutcome;

    fn can_handle(&self, args: &LaunchArgs) -> bool {
        self.can_restore_state(args)
    }

    fn handle<'a>(
        &'a self,
        args: &'a LaunchArgs,
    ) -> LocalBoxFuture<'a, Result<RestoreOutcome, String>> {
        Box::pin(self.restore_state(args))
    }
}

impl std::fmt::Debug for SuspendResumeBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspendResumeBridge")
            .field("occupant", &self.occupant())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;
    use platform_host::{MemoryAppStateStore, NoopAppStateStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn counting_subscriber(owner: u64, saves: &Rc<Cell<u32>>, resumes: &Rc<Cell<u32>>) -> Subscriber {
        let saves = Rc::clone(saves);
        let resumes = Rc::clone(resumes);
        Subscriber::new(
            ViewHandle(owner),
            move || saves.set(saves.get() + 1),
            move || resumes.set(resumes.get() + 1),
        )
    }

    #[test]
    fn save_state_without_subscriber_returns_false() {
        let bridge = SuspendResumeBridge::new(Rc::new(NoopAppStateStore));
        assert!(!bridge.save_state());
        bridge.resume_app();
        assert_eq!(bridge.occupant(), None);
    }

    #[test]
    fn only_latest_subscriber_is_invoked() {
        let bridge = SuspendResumeBridge::new(Rc::new(NoopAppStateStore));
        let (first_saves, first_resumes) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
        let (second_saves, second_resumes) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));

        assert!(bridge
            .install(counting_subscriber(1, &first_saves, &first_resumes))
            .is_none());
        assert!(bridge.save_state());
        assert_eq!(first_saves.get(), 1);

        let previous = bridge
            .install(counting_subscriber(2, &second_saves, &second_resumes))
            .expect("previous occupant");
        assert_eq!(previous.owner(), ViewHandle(1));

        assert!(bridge.save_state());
        bridge.resume_app();
        assert_eq!((first_saves.get(), first_resumes.get()), (1, 0));
        assert_eq!((second_saves.get(), second_resumes.get()), (1, 1));
    }

    #[test]
    fn vacate_only_clears_matching_owner() {
        let bridge = SuspendResumeBridge::new(Rc::new(NoopAppStateStore));
        let counter = Rc::new(Cell::new(0));
        bridge.install(counting_subscriber(4, &counter, &counter));

        assert!(!bridge.vacate(ViewHandle(5)));
        assert_eq!(bridge.occupant(), Some(ViewHandle(4)));
        assert!(bridge.vacate(ViewHandle(4)));
        assert!(!bridge.save_state());
    }

    #[test]
    fn subscriber_may_reinstall_during_callback() {
        let bridge = SuspendResumeBridge::new(Rc::new(NoopAppStateStore));
        let inner = bridge.clone();
        bridge.install(Subscriber::new(
            ViewHandle(1),
            move || {
                inner.install(Subscriber::new(ViewHandle(2), || {}, || {}));
            },
            || {},
        ));

        assert!(bridge.save_state());
        assert_eq!(bridge.occupant(), Some(ViewHandle(2)));
    }

    #[test]
    fn restore_only_after_termination() {
        let bridge = SuspendResumeBridge::new(Rc::new(NoopAppStateStore));
        for state in [
            ExecutionState::NotRunning,
            ExecutionState::Running,
            ExecutionState::Suspended,
            ExecutionState::ClosedByUser,
        ] {
            assert!(!bridge.can_restore_state(&LaunchArgs::new(state)), "{state:?}");
        }
        assert!(bridge.can_restore_state(&LaunchArgs::new(ExecutionState::Terminated)));
    }

    #[test]
    fn restore_state_hands_out_persisted_envelope_once() {
        let store = MemoryAppStateStore::default();
        let envelope = AppStateEnvelope::new(SUSPEND_STATE_NAMESPACE, 1, json!({"selected": 2}));
        block_on(store.save_app_state_envelope(&envelope)).expect("seed");
        let bridge = SuspendResumeBridge::new(Rc::new(store.clone()));
        let terminated = LaunchArgs::new(ExecutionState::Terminated);

        assert_eq!(
            block_on(bridge.restore_state(&LaunchArgs::new(ExecutionState::ClosedByUser))),
            Ok(RestoreOutcome::Skipped)
        );
        assert_eq!(
            block_on(bridge.handle_if_applicable(&terminated)),
            Ok(Some(RestoreOutcome::Restored(envelope)))
        );
        assert!(!store.contains(SUSPEND_STATE_NAMESPACE));
        assert_eq!(
            block_on(bridge.restore_state(&terminated)),
            Ok(RestoreOutcome::NothingSaved)
        );
    }

    #[test]
    fn activation_handler_skips_ineligible_launch() {
        let bridge = SuspendResumeBridge::new(Rc::new(NoopAppStateStore));
        let args = LaunchArgs::new(ExecutionState::NotRunning);
        assert_eq!(block_on(bridge.handle_if_applicable(&args)), Ok(None));
    }
}
