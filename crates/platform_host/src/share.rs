//! Share-target contracts.
//!
//! A mounted view captures the host's share target for its surface so data-transfer requests can
//! be routed to it, and gives it back when the view is disposed.

use std::{cell::Cell, rc::Rc};

/// Opaque token for one captured share target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareTargetHandle(pub u64);

/// Host service handing out share-target handles for the current view surface.
pub trait ShareTargetService {
    /// Returns the share-target handle for the surface being mounted.
    fn acquire(&self) -> ShareTargetHandle;

    /// Returns a previously acquired handle to the host.
    fn release(&self, handle: ShareTargetHandle);
}

#[derive(Debug, Clone, Copy, Default)]
/// Share-target service for hosts without a data-transfer surface.
pub struct NoopShareTargetService;

impl ShareTargetService for NoopShareTargetService {
    fn acquire(&self) -> ShareTargetHandle {
        ShareTargetHandle(0)
    }

    fn release(&self, _handle: ShareTargetHandle) {}
}

#[derive(Debug, Clone, Default)]
/// In-memory share-target service that counts outstanding handles.
pub struct MemoryShareTargetService {
    next: Rc<Cell<u64>>,
    outstanding: Rc<Cell<usize>>,
}

impl MemoryShareTargetService {
    /// Number of handles acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }
}

impl ShareTargetService for MemoryShareTargetService {
    fn acquire(&self) -> ShareTargetHandle {
        let id = self.next.get() + 1;
        self.next.set(id);
        self.outstanding.set(self.outstanding.get() + 1);
        ShareTargetHandle(id)
    }

    fn release(&self, _handle: ShareTargetHandle) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_share_targets_track_outstanding_handles() {
        let service = MemoryShareTargetService::default();
        let first = service.acquire();
        let second = service.acquire();
        assert_ne!(first, second);
        assert_eq!(service.outstanding(), 2);

        service.release(first);
        assert_eq!(service.outstanding(), 1);
        service.release(second);
        service.release(second);
        assert_eq!(service.outstanding(), 0);
    }
}
