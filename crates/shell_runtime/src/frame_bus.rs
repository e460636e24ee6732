//! Frame notification bus owned by the application context.
//!
//! Two streams: `created` fires once per new view frame and is consumed by coordinators that
//! have not bound yet; `changed` fires on every selection change and is consumed by bound
//! coordinators. Delivery is synchronous, in subscription order. Listeners may subscribe or
//! unsubscribe (themselves or others) while a publish is in flight; a listener removed during
//! delivery is not called afterwards.
//!
//! A `changed` publish started from inside a listener supersedes the one that delivered to it:
//! the nested publish reaches every listener with the newer handle, and the outer one stops.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use view_contract::ViewHandle;

use crate::error::AlreadyBoundError;

type CreatedListener = Rc<dyn Fn(ViewHandle) -> Result<(), AlreadyBoundError>>;
type ChangedListener = Rc<dyn Fn(ViewHandle)>;

/// Which bus stream a subscription belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStream {
    /// New view frame created.
    Created,
    /// Globally selected view changed.
    Changed,
}

/// Token returned by a subscribe call; pass it back to [`FrameBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSubscription {
    stream: FrameStream,
    id: u64,
}

impl FrameSubscription {
    /// Stream this subscription listens on.
    pub fn stream(&self) -> FrameStream {
        self.stream
    }
}

#[derive(Default)]
struct FrameBusState {
    next_id: u64,
    changed_generation: u64,
    created: BTreeMap<u64, CreatedListener>,
    changed: BTreeMap<u64, ChangedListener>,
}

impl FrameBusState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Cloneable handle to the shared bus.
#[derive(Clone, Default)]
pub struct FrameBus {
    inner: Rc<RefCell<FrameBusState>>,
}

impl FrameBus {
    /// Subscribes to the frame-created stream.
    ///
    /// A listener error aborts the publish that delivered it.
    pub fn subscribe_created(
        &self,
        listener: impl Fn(ViewHandle) -> Result<(), AlreadyBoundError> + 'static,
    ) -> FrameSubscription {
        let mut state = self.inner.borrow_mut();
        let id = state.allocate_id();
        state.created.insert(id, Rc::new(listener));
        FrameSubscription {
            stream: FrameStream::Created,
            id,
        }
    }

    /// Subscribes to the frame-changed stream.
    pub fn subscribe_changed(&self, listener: impl Fn(ViewHandle) + 'static) -> FrameSubscription {
        let mut state = self.inner.borrow_mut();
        let id = state.allocate_id();
        state.changed.insert(id, Rc::new(listener));
        FrameSubscription {
            stream: FrameStream::Changed,
            id,
        }
    }

    /// Removes a subscription. Returns `false` when it was already gone.
    pub fn unsubscribe(&self, subscription: FrameSubscription) -> bool {
        let mut state = self.inner.borrow_mut();
        match subscription.stream {
            FrameStream::Created => state.created.remove(&subscription.id).is_some(),
            FrameStream::Changed => state.changed.remove(&subscription.id).is_some(),
        }
    }

    /// Number of live subscriptions on `stream`.
    pub fn subscriber_count(&self, stream: FrameStream) -> usize {
        let state = self.inner.borrow();
        match stream {
            FrameStream::Created => state.created.len(),
            FrameStream::Changed => state.changed.len(),
        }
    }

    /// Announces a new view frame.
    ///
    /// # Errors
    ///
    /// Returns the first listener error; listeners after it are not called.
    pub fn publish_created(&self, handle: ViewHandle) -> Result<(), AlreadyBoundError> {
        let snapshot: Vec<u64> = self.inner.borrow().created.keys().copied().collect();
        for id in snapshot {
            let Some(listener) = self.inner.borrow().created.get(&id).cloned() else {
                continue;
            };
            listener(handle)?;
        }
        Ok(())
    }

    /// Announces that `handle` is now the selected view.
    ///
    /// Stops early when a listener publishes a newer selection.
    pub fn publish_changed(&self, handle: ViewHandle) {
        let (generation, snapshot) = {
            let mut state = self.inner.borrow_mut();
            state.changed_generation += 1;
            let ids: Vec<u64> = state.changed.keys().copied().collect();
            (state.changed_generation, ids)
        };
        for id in snapshot {
            if self.inner.borrow().changed_generation != generation {
                return;
            }
            let listener = self.inner.borrow().changed.get(&id).cloned();
            if let Some(listener) = listener {
                listener(handle);
            }
        }
    }
}

impl std::fmt::Debug for FrameBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("FrameBus")
            .field("created", &state.created.len())
            .field("changed", &state.changed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn changed_listeners_receive_handles_in_subscription_order() {
        let bus = FrameBus::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.subscribe_changed(move |handle| seen.borrow_mut().push((tag, handle)));
        }
        bus.publish_changed(ViewHandle(3));

        assert_eq!(
            *seen.borrow(),
            vec![("a", ViewHandle(3)), ("b", ViewHandle(3))]
        );
    }

    #[test]
    fn unsubscribe_is_stream_scoped_and_reports_removal() {
        let bus = FrameBus::default();
        let created = bus.subscribe_created(|_| Ok(()));
        let changed = bus.subscribe_changed(|_| {});
        assert_eq!(created.stream(), FrameStream::Created);

        assert!(bus.unsubscribe(created));
        assert!(!bus.unsubscribe(created));
        assert_eq!(bus.subscriber_count(FrameStream::Created), 0);
        assert_eq!(bus.subscriber_count(FrameStream::Changed), 1);
        assert!(bus.unsubscribe(changed));
    }

    #[test]
    fn listener_may_swap_streams_during_created_delivery() {
        let bus = FrameBus::default();
        let changed_hits = Rc::new(Cell::new(0));
        let own = Rc::new(Cell::new(None));

        let subscription = {
            let bus = bus.clone();
            let own = Rc::clone(&own);
            let changed_hits = Rc::clone(&changed_hits);
            bus.clone().subscribe_created(move |_| {
                if let Some(sub) = own.take() {
                    bus.unsubscribe(sub);
                }
                let changed_hits = Rc::clone(&changed_hits);
                bus.subscribe_changed(move |_| changed_hits.set(changed_hits.get() + 1));
                Ok(())
            })
        };
        own.set(Some(subscription));

        bus.publish_created(ViewHandle(1)).expect("publish");
        bus.publish_created(ViewHandle(2)).expect("publish");
        bus.publish_changed(ViewHandle(1));

        assert_eq!(bus.subscriber_count(FrameStream::Created), 0);
        assert_eq!(changed_hits.get(), 1);
    }

    #[test]
    fn listener_removed_mid_publish_is_skipped() {
        let bus = FrameBus::default();
        let second_calls = Rc::new(Cell::new(0));
        let second_sub = Rc::new(Cell::new(None));

        {
            let bus = bus.clone();
            let second_sub = Rc::clone(&second_sub);
            bus.clone().subscribe_changed(move |_| {
                if let Some(sub) = second_sub.take() {
                    bus.unsubscribe(sub);
                }
            });
        }
        let calls = Rc::clone(&second_calls);
        second_sub.set(Some(
            bus.subscribe_changed(move |_| calls.set(calls.get() + 1)),
        ));

        bus.publish_changed(ViewHandle(9));
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn created_error_stops_delivery() {
        let bus = FrameBus::default();
        let later = Rc::new(Cell::new(false));
        bus.subscribe_created(|handle| {
            Err(AlreadyBoundError {
                bound: ViewHandle(1),
                attempted: handle,
            })
        });
        let flag = Rc::clone(&later);
        bus.subscribe_created(move |_| {
            flag.set(true);
            Ok(())
        });

        let err = bus.publish_created(ViewHandle(5)).expect_err("listener error");
        assert_eq!(err.attempted, ViewHandle(5));
        assert!(!later.get());
    }

    #[test]
    fn nested_changed_publish_supersedes_the_outer_one() {
        let bus = FrameBus::default();
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));

        {
            let bus = bus.clone();
            let first = Rc::clone(&first);
            bus.clone().subscribe_changed(move |handle| {
                first.borrow_mut().push(handle);
                if handle == ViewHandle(1) {
                    bus.publish_changed(ViewHandle(2));
                }
            });
        }
        let seen = Rc::clone(&second);
        bus.subscribe_changed(move |handle| seen.borrow_mut().push(handle));

        bus.publish_changed(ViewHandle(1));

        assert_eq!(*first.borrow(), vec![ViewHandle(1), ViewHandle(2)]);
        assert_eq!(*second.borrow(), vec![ViewHandle(2)]);

        bus.publish_changed(ViewHandle(3));
        assert_eq!(*second.borrow(), vec![ViewHandle(2), ViewHandle(3)]);
    }
}
