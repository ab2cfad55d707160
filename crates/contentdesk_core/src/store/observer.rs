//! Single-threaded multicast observer list.
//!
//! # Responsibility
//! - Keep an ordered list of callbacks for one publisher.
//! - Deliver published values in call order, including values published
//!   re-entrantly from inside a callback.
//!
//! # Invariants
//! - A value is delivered to every observer before the next queued value.
//! - An observer removed during delivery receives no further values.
//! - Delivery never panics on re-entrant publish.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Ordered observer list with a re-entrancy safe publish queue.
pub(crate) struct ObserverList<T: 'static> {
    inner: Rc<ObserverListInner<T>>,
}

struct ObserverListInner<T> {
    next_id: Cell<u64>,
    observers: RefCell<Vec<(u64, Callback<T>)>>,
    pending: RefCell<VecDeque<T>>,
    publishing: Cell<bool>,
}

impl<T: 'static> ObserverList<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(ObserverListInner {
                next_id: Cell::new(0),
                observers: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                publishing: Cell::new(false),
            }),
        }
    }

    /// Registers one observer. Dropping the returned subscription removes it.
    pub(crate) fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        self.inner.observers.borrow_mut().push((id, callback));

        let weak: Weak<ObserverListInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .observers
                    .borrow_mut()
                    .retain(|(observer_id, _)| *observer_id != id);
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Queues `value` and drains the queue unless a drain is already running
    /// further up the stack.
    pub(crate) fn publish(&self, value: T) {
        self.inner.pending.borrow_mut().push_back(value);
        if self.inner.publishing.replace(true) {
            return;
        }

        let _reset = PublishingReset(&self.inner.publishing);
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some(value) = next else {
                break;
            };

            let observers: Vec<(u64, Callback<T>)> = self.inner.observers.borrow().clone();
            for (id, callback) in observers {
                if !self.inner.contains(id) {
                    continue;
                }
                if let Ok(mut callback) = callback.try_borrow_mut() {
                    (&mut *callback)(&value);
                }
            }
        }
    }
}

impl<T> ObserverListInner<T> {
    fn contains(&self, id: u64) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|(observer_id, _)| *observer_id == id)
    }
}

struct PublishingReset<'a>(&'a Cell<bool>);

impl Drop for PublishingReset<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Handle for one registered observer.
///
/// Dropping the handle unsubscribes. Unsubscribing never touches the state
/// the observer was attached to.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
    retained: Option<Rc<dyn Any>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
            retained: None,
        }
    }

    /// Keeps `source` alive for as long as this subscription exists.
    pub(crate) fn retaining(mut self, source: Rc<dyn Any>) -> Self {
        self.retained = Some(source);
        self
    }

    /// Removes the observer now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keeps the observer registered for the lifetime of its source.
    ///
    /// A detached subscription no longer keeps a projection alive: once the
    /// last projection handle is dropped, the observer goes with it.
    pub fn detach(mut self) {
        self.unsubscribe.take();
        self.retained.take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ObserverList;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_reaches_observers_in_registration_order() {
        let list = ObserverList::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            list.subscribe(move |value| seen.borrow_mut().push(("first", *value)))
        };
        let second = {
            let seen = seen.clone();
            list.subscribe(move |value| seen.borrow_mut().push(("second", *value)))
        };

        list.publish(7);
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
        drop((first, second));
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let list = ObserverList::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let subscription = {
            let seen = seen.clone();
            list.subscribe(move |value| seen.borrow_mut().push(*value))
        };

        list.publish(1);
        subscription.unsubscribe();
        list.publish(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn detached_subscription_keeps_receiving() {
        let list = ObserverList::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            list.subscribe(move |value| seen.borrow_mut().push(*value))
                .detach();
        }

        list.publish(3);
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn reentrant_publish_is_delivered_after_current_value() {
        let list = Rc::new(ObserverList::<u32>::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _republisher = {
            let weak = Rc::downgrade(&list);
            list.subscribe(move |value| {
                if *value == 1 {
                    if let Some(list) = weak.upgrade() {
                        list.publish(2);
                    }
                }
            })
        };
        let _recorder = {
            let seen = seen.clone();
            list.subscribe(move |value| seen.borrow_mut().push(*value))
        };

        list.publish(1);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
