//! Shell application: activation, tab management, and host suspend/resume entry points.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use platform_host::{build_app_state_envelope, migrate_envelope_payload, SUSPEND_STATE_NAMESPACE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use view_contract::{ActivationRequest, ViewHandle, ViewLifecycle};

use crate::{
    boot,
    bridge::{ActivationHandler, RestoreOutcome},
    config::ShellPreferences,
    context::AppContext,
    coordinator::ViewLifecycleCoordinator,
    error::{LifecycleError, ShellError},
};

/// Schema version of [`SuspendSnapshot`] payloads.
pub const SUSPEND_SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Creates the concrete view hosted in a new tab.
pub trait ViewFactory {
    /// Builds a view, optionally for a file the host asked to open.
    fn create_view(&self, path: Option<&str>) -> Rc<dyn ViewLifecycle>;
}

impl<F> ViewFactory for F
where
    F: Fn(Option<&str>) -> Rc<dyn ViewLifecycle>,
{
    fn create_view(&self, path: Option<&str>) -> Rc<dyn ViewLifecycle> {
        self(path)
    }
}

/// Tab layout persisted when the shell enters the background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendSnapshot {
    /// View that captured its state at suspend time.
    pub active: Option<ViewHandle>,
    /// Open views in tab order.
    pub open_views: Vec<ViewHandle>,
}

/// The desktop shell: one view per tab, one active view at a time.
pub struct ShellApp {
    context: AppContext,
    factory: Box<dyn ViewFactory>,
    coordinators: RefCell<BTreeMap<ViewHandle, ViewLifecycleCoordinator>>,
    preferences: RefCell<Option<ShellPreferences>>,
    booting: Cell<bool>,
}

impl ShellApp {
    /// Creates a shell that is not yet ready; the first [`Self::activate`] boots it.
    pub fn new(context: AppContext, factory: impl ViewFactory + 'static) -> Self {
        Self {
            context,
            factory: Box::new(factory),
            coordinators: RefCell::default(),
            preferences: RefCell::default(),
            booting: Cell::new(false),
        }
    }

    /// Shared runtime services.
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Whether boot initialization has completed.
    pub fn is_ready(&self) -> bool {
        self.preferences.borrow().is_some()
    }

    /// Preferences loaded during boot.
    pub fn preferences(&self) -> Option<ShellPreferences> {
        self.preferences.borrow().clone()
    }

    /// Handles a host activation.
    ///
    /// The first call runs boot initialization to completion before anything else. A
    /// restore-eligible launch hands back the persisted [`SuspendSnapshot`], if any. File
    /// activations open a tab for supported files; a shell left with no tabs opens an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Boot`] when boot fails (the shell stays not ready) and
    /// [`ShellError::Lifecycle`] when opening a tab violates a lifecycle contract.
    pub async fn activate(
        &self,
        request: &ActivationRequest,
    ) -> Result<Option<SuspendSnapshot>, ShellError> {
        if !self.is_ready() && !self.booting.replace(true) {
            let booted = boot::initialize(&self.context.host, &self.context.config).await;
            self.booting.set(false);
            *self.preferences.borrow_mut() = Some(booted?);
            info!("shell ready");
        }

        let restored = match self
            .context
            .bridge
            .handle_if_applicable(request.args())
            .await
        {
            Ok(Some(RestoreOutcome::Restored(envelope))) => {
                match migrate_envelope_payload::<SuspendSnapshot>(&envelope) {
                    Ok(snapshot) => Some(snapshot),
                    Err(err) => {
                        warn!("suspend snapshot decode failed: {err}");
                        None
                    }
                }
            }
            Ok(_) => None,
            Err(err) => {
                warn!("suspend state restore failed: {err}");
                None
            }
        };

        if let ActivationRequest::FileActivated { path, .. } = request {
            let supported = self
                .preferences()
                .is_some_and(|prefs| prefs.supports_file(path));
            if supported {
                self.open_view(Some(path))?;
            } else {
                warn!(path = %path, "file type not supported; not opening");
            }
        }
        if self.context.selection.views().is_empty() {
            self.open_view(None)?;
        }

        Ok(restored)
    }

    /// Opens a new tab hosting a view from the factory and selects it.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Lifecycle`] when a frame-created listener reports a double bind.
    pub fn open_view(&self, path: Option<&str>) -> Result<ViewHandle, ShellError> {
        let view = self.factory.create_view(path);
        let coordinator = self.context.create_coordinator(view);
        let handle = self.context.selection.open_view()?;
        self.coordinators.borrow_mut().insert(handle, coordinator);
        Ok(handle)
    }

    /// Called by the host when the tab's visual surface is attached.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownView`] for a handle that is not open, or the
    /// coordinator's mount error.
    pub fn mount_view(&self, handle: ViewHandle) -> Result<(), LifecycleError> {
        self.with_coordinator(handle, ViewLifecycleCoordinator::mount)?
    }

    /// Selects a tab.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownView`] for a handle that is not open.
    pub fn select_view(&self, handle: ViewHandle) -> Result<(), LifecycleError> {
        if self.context.selection.select(handle) {
            Ok(())
        } else {
            Err(LifecycleError::UnknownView(handle))
        }
    }

    /// Closes a tab and disposes its view.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownView`] for a handle that is not open.
    pub fn close_view(&self, handle: ViewHandle) -> Result<(), LifecycleError> {
        let coordinator = self
            .coordinators
            .borrow_mut()
            .remove(&handle)
            .ok_or(LifecycleError::UnknownView(handle))?;
        coordinator.dispose();
        self.context.selection.close_view(handle);
        Ok(())
    }

    /// Host is about to suspend the app.
    ///
    /// Returns whether the active view captured state. When it did and the config asks for it,
    /// a [`SuspendSnapshot`] is persisted for a later restore.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Storage`] when persisting the snapshot fails.
    pub async fn suspending(&self) -> Result<bool, ShellError> {
        if !self.context.bridge.save_state() {
            debug!("no active view to capture state from");
            return Ok(false);
        }
        if !self.context.config.persist_suspend_state {
            return Ok(true);
        }

        let snapshot = SuspendSnapshot {
            active: self.context.bridge.occupant(),
            open_views: self.context.selection.views(),
        };
        let envelope = build_app_state_envelope(
            SUSPEND_STATE_NAMESPACE,
            SUSPEND_SNAPSHOT_SCHEMA_VERSION,
            &snapshot,
        )
        .map_err(ShellError::Storage)?;
        self.context
            .host
            .app_state
            .save_app_state_envelope(&envelope)
            .await
            .map_err(ShellError::Storage)?;
        Ok(true)
    }

    /// Host resumed the app without terminating it.
    pub fn resuming(&self) {
        self.context.bridge.resume_app();
    }

    /// Coordinator state probe used by hosts and diagnostics.
    pub fn is_view_suspended(&self, handle: ViewHandle) -> Option<bool> {
        self.coordinators
            .borrow()
            .get(&handle)
            .map(ViewLifecycleCoordinator::is_suspended)
    }

    fn with_coordinator<T>(
        &self,
        handle: ViewHandle,
        f: impl FnOnce(&ViewLifecycleCoordinator) -> T,
    ) -> Result<T, LifecycleError> {
        let coordinators = self.coordinators.borrow();
        let coordinator = coordinators
            .get(&handle)
            .ok_or(LifecycleError::UnknownView(handle))?;
        Ok(f(coordinator))
    }
}

impl std::fmt::Debug for ShellApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellApp")
            .field("ready", &self.is_ready())
            .field("views", &self.coordinators.borrow().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
