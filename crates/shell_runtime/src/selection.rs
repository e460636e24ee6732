//! Tab model: which views are open and which one is selected.
//!
//! Every change is published on the frame bus; the tracker is the only producer of both
//! streams.

use std::{cell::RefCell, rc::Rc};

use tracing::debug;
use view_contract::ViewHandle;

use crate::{error::AlreadyBoundError, frame_bus::FrameBus};

#[derive(Debug, Default)]
struct SelectionState {
    next_handle: u64,
    views: Vec<ViewHandle>,
    selected: Option<ViewHandle>,
}

/// Cloneable handle to the shell's tab/selection model.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    bus: FrameBus,
    state: Rc<RefCell<SelectionState>>,
}

impl SelectionTracker {
    /// Creates an empty tracker publishing on `bus`.
    pub fn new(bus: FrameBus) -> Self {
        Self {
            bus,
            state: Rc::default(),
        }
    }

    /// Allocates a handle for a new tab, announces it, and selects it.
    ///
    /// # Errors
    ///
    /// Propagates a double-bind raised by a frame-created listener; the tab is not kept.
    pub fn open_view(&self) -> Result<ViewHandle, AlreadyBoundError> {
        let handle = {
            let mut state = self.state.borrow_mut();
            state.next_handle += 1;
            let handle = ViewHandle(state.next_handle);
            state.views.push(handle);
            handle
        };
        debug!(view = %handle, "view frame created");
        if let Err(err) = self.bus.publish_created(handle) {
            self.state.borrow_mut().views.retain(|view| *view != handle);
            return Err(err);
        }
        self.select(handle);
        Ok(handle)
    }

    /// Makes `handle` the selected view.
    ///
    /// Returns `false` for a handle that is not open. Re-selecting the current view publishes
    /// nothing.
    pub fn select(&self, handle: ViewHandle) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if !state.views.contains(&handle) {
                return false;
            }
            if state.selected == Some(handle) {
                return true;
            }
            state.selected = Some(handle);
        }
        debug!(view = %handle, "selection changed");
        self.bus.publish_changed(handle);
        true
    }

    /// Closes a tab. When it was selected, its left neighbour (or else the new first tab) is
    /// selected; closing the last tab clears the selection.
    ///
    /// Returns `false` for a handle that is not open.
    pub fn close_view(&self, handle: ViewHandle) -> bool {
        let next = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.views.iter().position(|v| *v == handle) else {
                return false;
            };
            state.views.remove(index);
            if state.selected != Some(handle) {
                return true;
            }
            state.selected = None;
            let neighbour = index.saturating_sub(1).min(state.views.len().saturating_sub(1));
            state.views.get(neighbour).copied()
        };
        debug!(view = %handle, "view frame closed");
        if let Some(next) = next {
            self.select(next);
        }
        true
    }

    /// Currently selected view.
    pub fn selected(&self) -> Option<ViewHandle> {
        self.state.borrow().selected
    }

    /// Open views in tab order.
    pub fn views(&self) -> Vec<ViewHandle> {
        self.state.borrow().views.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recording_bus() -> (FrameBus, Rc<RefCell<Vec<String>>>) {
        let bus = FrameBus::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let created = Rc::clone(&log);
        bus.subscribe_created(move |h| {
            created.borrow_mut().push(format!("created {h}"));
            Ok(())
        });
        let changed = Rc::clone(&log);
        bus.subscribe_changed(move |h| changed.borrow_mut().push(format!("changed {h}")));
        (bus, log)
    }

    #[test]
    fn open_view_announces_then_selects() {
        let (bus, log) = recording_bus();
        let tracker = SelectionTracker::new(bus);

        let first = tracker.open_view().expect("open");
        let second = tracker.open_view().expect("open");

        assert_eq!((first, second), (ViewHandle(1), ViewHandle(2)));
        assert_eq!(tracker.selected(), Some(second));
        assert_eq!(
            *log.borrow(),
            vec![
                "created view-1",
                "changed view-1",
                "created view-2",
                "changed view-2",
            ]
        );
    }

    #[test]
    fn reselecting_current_view_is_silent() {
        let (bus, log) = recording_bus();
        let tracker = SelectionTracker::new(bus);
        let handle = tracker.open_view().expect("open");
        log.borrow_mut().clear();

        assert!(tracker.select(handle));
        assert!(!tracker.select(ViewHandle(42)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn closing_selected_view_selects_left_neighbour() {
        let (bus, log) = recording_bus();
        let tracker = SelectionTracker::new(bus);
        let a = tracker.open_view().expect("open");
        let b = tracker.open_view().expect("open");
        let c = tracker.open_view().expect("open");
        tracker.select(b);
        log.borrow_mut().clear();

        assert!(tracker.close_view(b));
        assert_eq!(tracker.selected(), Some(a));
        assert_eq!(tracker.views(), vec![a, c]);

        assert!(tracker.close_view(a));
        assert_eq!(tracker.selected(), Some(c));
        assert!(tracker.close_view(c));
        assert_eq!(tracker.selected(), None);
        assert!(!tracker.close_view(c));
        assert_eq!(*log.borrow(), vec!["changed view-1", "changed view-3"]);
    }

    #[test]
    fn closing_background_view_keeps_selection() {
        let (bus, _) = recording_bus();
        let tracker = SelectionTracker::new(bus);
        let a = tracker.open_view().expect("open");
        let b = tracker.open_view().expect("open");

        assert!(tracker.close_view(a));
        assert_eq!(tracker.selected(), Some(b));
    }

    #[test]
    fn failed_announcement_does_not_leave_a_tab_behind() {
        let bus = FrameBus::default();
        let rejecting = bus.subscribe_created(|handle| {
            Err(AlreadyBoundError {
                bound: ViewHandle(40),
                attempted: handle,
            })
        });
        let tracker = SelectionTracker::new(bus.clone());

        let err = tracker.open_view().expect_err("listener rejects");
        assert_eq!(err.attempted, ViewHandle(1));
        assert_eq!(tracker.views(), Vec::<ViewHandle>::new());
        assert_eq!(tracker.selected(), None);

        bus.unsubscribe(rejecting);
        assert_eq!(tracker.open_view(), Ok(ViewHandle(2)));
        assert_eq!(tracker.views(), vec![ViewHandle(2)]);
    }
}
