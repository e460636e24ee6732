//! Shared contract types between the shell runtime and the views it hosts.
//!
//! A view is one editable surface living in one window tab. The runtime never looks inside a
//! view; it only drives the [`ViewLifecycle`] callbacks and identifies instances by
//! [`ViewHandle`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};

/// Opaque identifier for one mounted view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewHandle(pub u64);

impl std::fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Callbacks every hosted view implements.
///
/// The runtime guarantees `on_load` runs once, after the view is bound to its handle, and that
/// `on_suspend`/`on_resume` strictly alternate starting with `on_suspend`. Implementations use
/// interior mutability; callbacks may re-enter the runtime (for example to select another tab).
pub trait ViewLifecycle {
    /// The visual surface was attached by the host framework.
    fn on_xaml_load(&self);

    /// The view was bound as owner of its [`ViewHandle`].
    fn on_load(&self);

    /// The view lost the active designation.
    fn on_suspend(&self);

    /// The view regained the active designation after a suspend.
    fn on_resume(&self);

    /// The view is being torn down.
    fn dispose(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Lifecycle callbacks delivered to a view, as observed from outside.
pub enum ViewLifecycleEvent {
    /// [`ViewLifecycle::on_xaml_load`] ran.
    XamlLoaded,
    /// [`ViewLifecycle::on_load`] ran.
    Loaded,
    /// [`ViewLifecycle::on_suspend`] ran.
    Suspended,
    /// [`ViewLifecycle::on_resume`] ran.
    Resumed,
    /// [`ViewLifecycle::dispose`] ran.
    Disposed,
}

impl ViewLifecycleEvent {
    /// Returns a stable string token for logs and persisted journals.
    pub const fn token(self) -> &'static str {
        match self {
            Self::XamlLoaded => "xaml-loaded",
            Self::Loaded => "loaded",
            Self::Suspended => "suspended",
            Self::Resumed => "resumed",
            Self::Disposed => "disposed",
        }
    }
}

/// How the previous run of the application ended, as reported by the host at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionState {
    /// First launch, or the app was not running.
    #[default]
    NotRunning,
    /// The app is still running (re-activation).
    Running,
    /// The app was suspended and is being reactivated.
    Suspended,
    /// The host terminated the app while it was suspended.
    Terminated,
    /// The user closed the app.
    ClosedByUser,
}

/// Arguments the host hands over when launching or activating the app.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchArgs {
    /// State of the previous execution.
    pub previous_execution_state: ExecutionState,
    /// Raw launch argument string (jump-list entries pass their payload here).
    #[serde(default)]
    pub arguments: String,
}

impl LaunchArgs {
    /// Creates launch args with no argument payload.
    pub fn new(previous_execution_state: ExecutionState) -> Self {
        Self {
            previous_execution_state,
            arguments: String::new(),
        }
    }
}

/// One activation request raised by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActivationRequest {
    /// Normal launch from the start menu or a jump list.
    Launched {
        /// Host launch arguments.
        args: LaunchArgs,
    },
    /// Generic activation (protocol, share target, ...).
    Activated {
        /// Host launch arguments.
        args: LaunchArgs,
    },
    /// The app was opened with a file.
    FileActivated {
        /// Host launch arguments.
        args: LaunchArgs,
        /// Path of the file the host asked to open.
        path: String,
    },
}

impl ActivationRequest {
    /// Returns the host launch arguments carried by every request kind.
    pub fn args(&self) -> &LaunchArgs {
        match self {
            Self::Launched { args }
            | Self::Activated { args }
            | Self::FileActivated { args, .. } => args,
        }
    }
}

/// View that records every lifecycle callback it receives.
///
/// Clones share the same journal, so a caller can keep one clone while handing another to the
/// runtime.
#[derive(Debug, Clone, Default)]
pub struct LifecycleJournal {
    events: Rc<RefCell<Vec<ViewLifecycleEvent>>>,
}

impl LifecycleJournal {
    /// Returns all recorded events in delivery order.
    pub fn events(&self) -> Vec<ViewLifecycleEvent> {
        self.events.borrow().clone()
    }

    /// Returns how many times `event` was recorded.
    pub fn count(&self, event: ViewLifecycleEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    fn push(&self, event: ViewLifecycleEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ViewLifecycle for LifecycleJournal {
    fn on_xaml_load(&self) {
        self.push(ViewLifecycleEvent::XamlLoaded);
    }

    fn on_load(&self) {
        self.push(ViewLifecycleEvent::Loaded);
    }

    fn on_suspend(&self) {
        self.push(ViewLifecycleEvent::Suspended);
    }

    fn on_resume(&self) {
        self.push(ViewLifecycleEvent::Resumed);
    }

    fn dispose(&self) {
        self.push(ViewLifecycleEvent::Disposed);
    }
}
