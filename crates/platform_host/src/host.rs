//! Host service bundle injected into the shell runtime.

use std::rc::Rc;

use crate::{
    AppStateStore, LaunchAssistStore, MemoryAppStateStore, MemoryLaunchAssistStore,
    MemoryPrefsStore, MemoryShareTargetService, NoopAppStateStore, NoopLaunchAssistStore,
    NoopPrefsStore, NoopShareTargetService, PrefsStore, ShareTargetService,
};

/// Stable identifier for the host composition selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Native desktop adapters backed by the filesystem.
    Desktop,
    /// In-memory adapters (tests, scripted sessions).
    Memory,
    /// Every service is a no-op.
    Noop,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Memory => "memory",
            Self::Noop => "noop",
        }
    }
}

/// Host service bundle assembled by the entry layer.
///
/// Service selection happens before the bundle crosses into `shell_runtime`, which keeps the
/// runtime independent of adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Durable app-state store (suspend snapshots).
    pub app_state: Rc<dyn AppStateStore>,
    /// Typed preference store.
    pub prefs: Rc<dyn PrefsStore>,
    /// Launch-assist metadata store.
    pub launch_assist: Rc<dyn LaunchAssistStore>,
    /// Share-target source for mounted view surfaces.
    pub share_targets: Rc<dyn ShareTargetService>,
    /// Strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Bundle where every service is a no-op.
    pub fn noop() -> Self {
        Self {
            app_state: Rc::new(NoopAppStateStore),
            prefs: Rc::new(NoopPrefsStore),
            launch_assist: Rc::new(NoopLaunchAssistStore),
            share_targets: Rc::new(NoopShareTargetService),
            host_strategy: HostStrategy::Noop,
        }
    }

    /// Bundle of fresh in-memory services.
    pub fn in_memory() -> Self {
        Self {
            app_state: Rc::new(MemoryAppStateStore::default()),
            prefs: Rc::new(MemoryPrefsStore::default()),
            launch_assist: Rc::new(MemoryLaunchAssistStore::default()),
            share_targets: Rc::new(MemoryShareTargetService::default()),
            host_strategy: HostStrategy::Memory,
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("host_strategy", &self.host_strategy)
            .finish_non_exhaustive()
    }
}
