//! Per-view lifecycle coordination.
//!
//! A coordinator sits between the shell and one concrete view. It listens on the frame bus for
//! its own creation, binds to the handle it is given, then follows every selection change and
//! turns it into at most one `on_suspend` or `on_resume` call. State guards keep the callbacks
//! strictly alternating; nothing is retried.
//!
//! Lifecycle: `Unbound -> Bound(unmounted) -> Bound(mounted, active) <-> Bound(mounted,
//! suspended)`, with `Disposed` reachable from every state.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use platform_host::{ShareTargetHandle, ShareTargetService};
use tracing::{debug, error, trace};
use view_contract::{ViewHandle, ViewLifecycle};

use crate::{
    bridge::{Subscriber, SuspendResumeBridge},
    config::RemountPolicy,
    context::AppContext,
    error::{AlreadyBoundError, LifecycleError},
    frame_bus::{FrameBus, FrameSubscription},
};

#[derive(Debug, Default)]
struct CoordinatorState {
    handle: Option<ViewHandle>,
    mounted: bool,
    suspended: bool,
    disposed: bool,
    share_target: Option<ShareTargetHandle>,
    subscription: Option<FrameSubscription>,
}

impl CoordinatorState {
    /// Suspend/resume only mean something once the surface is up and the view owns a handle.
    fn active_handle(&self) -> Option<ViewHandle> {
        if self.disposed || !self.mounted {
            return None;
        }
        self.handle
    }
}

struct CoordinatorInner {
    view: Rc<dyn ViewLifecycle>,
    bus: FrameBus,
    bridge: SuspendResumeBridge,
    share_targets: Rc<dyn ShareTargetService>,
    remount_policy: RemountPolicy,
    state: RefCell<CoordinatorState>,
}

/// Drives one view's load/suspend/resume callbacks.
///
/// Dropping the coordinator disposes it.
pub struct ViewLifecycleCoordinator {
    inner: Rc<CoordinatorInner>,
}

impl ViewLifecycleCoordinator {
    /// Creates a coordinator for `view` and subscribes it to the frame-created stream.
    pub fn new(context: &AppContext, view: Rc<dyn ViewLifecycle>) -> Self {
        let inner = Rc::new(CoordinatorInner {
            view,
            bus: context.bus.clone(),
            bridge: context.bridge.clone(),
            share_targets: Rc::clone(&context.host.share_targets),
            remount_policy: context.config.remount_policy,
            state: RefCell::default(),
        });

        let weak = Rc::downgrade(&inner);
        let subscription = inner.bus.subscribe_created(move |handle| match weak.upgrade() {
            Some(inner) => inner.bind(handle),
            None => Ok(()),
        });
        inner.state.borrow_mut().subscription = Some(subscription);

        Self { inner }
    }

    /// Binds this coordinator to `handle` and runs `on_load`.
    ///
    /// Normally called through the frame-created stream.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyBoundError`] when the coordinator already owns a handle; nothing about
    /// the existing binding changes.
    pub fn bind(&self, handle: ViewHandle) -> Result<(), AlreadyBoundError> {
        self.inner.bind(handle)
    }

    /// Marks the visual surface as attached, captures its share target, runs `on_xaml_load`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyMounted`] on a repeated mount under
    /// [`RemountPolicy::Reject`].
    pub fn mount(&self) -> Result<(), LifecycleError> {
        self.inner.mount()
    }

    /// Applies a change of the globally selected view.
    pub fn on_selection_changed(&self, selected: ViewHandle) {
        self.inner.on_selection_changed(selected);
    }

    /// Suspends the view unless it is already suspended or not yet live.
    ///
    /// Returns whether `on_suspend` ran.
    pub fn suspend(&self) -> bool {
        self.inner.suspend()
    }

    /// Resumes the view if it is suspended. Returns whether `on_resume` ran.
    pub fn resume(&self) -> bool {
        self.inner.resume()
    }

    /// Releases host resources, leaves the bus and the bridge slot, and runs the view's
    /// `dispose`. Later calls do nothing.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Handle this coordinator is bound to.
    pub fn handle(&self) -> Option<ViewHandle> {
        self.inner.state.borrow().handle
    }

    /// Whether the visual surface has been mounted.
    pub fn is_mounted(&self) -> bool {
        self.inner.state.borrow().mounted
    }

    /// Whether `on_suspend` fired without a matching `on_resume`.
    pub fn is_suspended(&self) -> bool {
        self.inner.state.borrow().suspended
    }

    /// Whether [`Self::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.state.borrow().disposed
    }
}

impl Drop for ViewLifecycleCoordinator {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl std::fmt::Debug for ViewLifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewLifecycleCoordinator")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CoordinatorInner {
    fn bind(self: &Rc<Self>, handle: ViewHandle) -> Result<(), AlreadyBoundError> {
        {
            let mut state = self.state.borrow_mut();
            if let Some(bound) = state.handle {
                error!(view = %bound, attempted = %handle, "coordinator bound twice");
                return Err(AlreadyBoundError {
                    bound,
                    attempted: handle,
                });
            }
            if state.disposed {
                trace!(view = %handle, "bind after dispose ignored");
                return Ok(());
            }
            state.handle = Some(handle);
        }

        debug!(view = %handle, "view bound");
        self.view.on_load();

        let created = self.state.borrow_mut().subscription.take();
        if let Some(subscription) = created {
            self.bus.unsubscribe(subscription);
        }
        // on_load may have disposed the view.
        if self.state.borrow().disposed {
            return Ok(());
        }

        let weak = Rc::downgrade(self);
        let changed = self.bus.subscribe_changed(move |selected| {
            if let Some(inner) = weak.upgrade() {
                inner.on_selection_changed(selected);
            }
        });
        self.state.borrow_mut().subscription = Some(changed);
        Ok(())
    }

    fn mount(&self) -> Result<(), LifecycleError> {
        {
            let state = self.state.borrow();
            if state.disposed {
                trace!(view = ?state.handle, "mount after dispose ignored");
                return Ok(());
            }
            if state.mounted {
                return match self.remount_policy {
                    RemountPolicy::Ignore => {
                        trace!(view = ?state.handle, "repeated mount ignored");
                        Ok(())
                    }
                    RemountPolicy::Reject => {
                        error!(view = ?state.handle, "view surface mounted twice");
                        Err(LifecycleError::AlreadyMounted { view: state.handle })
                    }
                };
            }
        }

        let share_target = self.share_targets.acquire();
        {
            let mut state = self.state.borrow_mut();
            state.mounted = true;
            state.share_target = Some(share_target);
        }
        debug!(view = ?self.state.borrow().handle, "view surface mounted");
        self.view.on_xaml_load();
        Ok(())
    }

    fn on_selection_changed(self: &Rc<Self>, selected: ViewHandle) {
        let Some(own) = self.state.borrow().handle else {
            return;
        };
        if self.state.borrow().disposed {
            return;
        }

        if selected == own {
            self.claim_bridge_slot(own);
            self.resume();
        } else {
            self.suspend();
        }
    }

    fn suspend(&self) -> bool {
        let handle = {
            let mut state = self.state.borrow_mut();
            let Some(handle) = state.active_handle() else {
                return false;
            };
            if state.suspended {
                return false;
            }
            state.suspended = true;
            handle
        };
        debug!(view = %handle, "suspending view");
        self.view.on_suspend();
        true
    }

    fn resume(&self) -> bool {
        let handle = {
            let mut state = self.state.borrow_mut();
            let Some(handle) = state.active_handle() else {
                return false;
            };
            if !state.suspended {
                return false;
            }
            state.suspended = false;
            handle
        };
        debug!(view = %handle, "resuming view");
        self.view.on_resume();
        true
    }

    fn claim_bridge_slot(self: &Rc<Self>, own: ViewHandle) {
        if self.bridge.occupant() == Some(own) {
            return;
        }
        let on_background: Weak<Self> = Rc::downgrade(self);
        let on_resuming = on_background.clone();
        self.bridge.install(Subscriber::new(
            own,
            move || {
                if let Some(inner) = on_background.upgrade() {
                    inner.suspend();
                }
            },
            move || {
                if let Some(inner) = on_resuming.upgrade() {
                    inner.resume();
                }
            },
        ));
    }

    fn dispose(&self) {
        let (handle, share_target, subscription) = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            (
                state.handle,
                state.share_target.take(),
                state.subscription.take(),
            )
        };

        if let Some(share_target) = share_target {
            self.share_targets.release(share_target);
        }
        if let Some(subscription) = subscription {
            self.bus.unsubscribe(subscription);
        }
        if let Some(handle) = handle {
            self.bridge.vacate(handle);
        }
        debug!(view = ?handle, "view disposed");
        self.view.dispose();
    }
}
