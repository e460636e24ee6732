//! Process-wide application context.
//!
//! Owns the frame bus, the suspend/resume bridge, and the selection tracker, and hands clones
//! of them to every coordinator it creates. Nothing in the runtime reaches for ambient global
//! state.

use std::rc::Rc;

use platform_host::HostServices;
use view_contract::ViewLifecycle;

use crate::{
    bridge::SuspendResumeBridge, config::ShellConfig, coordinator::ViewLifecycleCoordinator,
    frame_bus::FrameBus, selection::SelectionTracker,
};

#[derive(Clone, Debug)]
/// Shared runtime services for one shell process.
pub struct AppContext {
    /// Host service bundle.
    pub host: HostServices,
    /// Static configuration.
    pub config: Rc<ShellConfig>,
    /// Frame created/changed notification bus.
    pub bus: FrameBus,
    /// Suspend/resume bridge with its single subscriber slot.
    pub bridge: SuspendResumeBridge,
    /// Tab/selection model publishing on [`Self::bus`].
    pub selection: SelectionTracker,
}

impl AppContext {
    /// Wires a fresh bus, bridge, and tracker over `host`.
    pub fn new(host: HostServices, config: ShellConfig) -> Self {
        let bus = FrameBus::default();
        let bridge = SuspendResumeBridge::new(Rc::clone(&host.app_state));
        let selection = SelectionTracker::new(bus.clone());
        Self {
            host,
            config: Rc::new(config),
            bus,
            bridge,
            selection,
        }
    }

    /// Creates a coordinator for `view`, waiting on the next frame-created notification.
    pub fn create_coordinator(&self, view: Rc<dyn ViewLifecycle>) -> ViewLifecycleCoordinator {
        ViewLifecycleCoordinator::new(self, view)
    }
}
