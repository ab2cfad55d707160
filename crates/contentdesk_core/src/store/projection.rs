//! Equality-gated derived views.
//!
//! # Responsibility
//! - Map an upstream value (snapshot or another projection) through a pure
//!   selector and keep the latest result.
//! - Notify subscribers only when the mapped value changes.
//!
//! # Invariants
//! - Two consecutive emissions are never equal (`PartialEq`).
//! - A new subscriber receives the current value before `subscribe` returns.
//! - A projection lives while any handle, subscription or derived
//!   projection refers to it; upstream only holds a weak link.

use super::observer::{ObserverList, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

/// Read-only derived view with replay-latest semantics.
pub struct Projection<T: 'static> {
    inner: Rc<ProjectionInner<T>>,
}

struct ProjectionInner<T: 'static> {
    value: RefCell<T>,
    observers: ObserverList<T>,
    upstream: RefCell<Option<Subscription>>,
}

impl<T: 'static> Clone for Projection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Projection<T> {
    /// Builds a projection seeded from `current` and kept up to date by the
    /// observer `attach` registers upstream.
    pub(crate) fn derive<U, F>(
        current: &U,
        selector: F,
        attach: impl FnOnce(Box<dyn FnMut(&U)>) -> Subscription,
    ) -> Self
    where
        U: ?Sized + 'static,
        F: Fn(&U) -> T + 'static,
    {
        let inner = Rc::new(ProjectionInner {
            value: RefCell::new(selector(current)),
            observers: ObserverList::new(),
            upstream: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let upstream = attach(Box::new(move |upstream: &U| {
            if let Some(inner) = weak.upgrade() {
                inner.accept(selector(upstream));
            }
        }));
        *inner.upstream.borrow_mut() = Some(upstream);

        Self { inner }
    }

    /// Returns a copy of the latest value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Reads the latest value without cloning it.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.inner.value.borrow())
    }

    /// Calls `callback` with the current value, then with every distinct
    /// value that follows.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let mut callback = callback;
        let current = self.get();
        callback(&current);
        self.inner
            .observers
            .subscribe(callback)
            .retaining(self.inner.clone())
    }

    /// Chains a further projection over this one.
    pub fn project<V, F>(&self, selector: F) -> Projection<V>
    where
        V: Clone + PartialEq + 'static,
        F: Fn(&T) -> V + 'static,
    {
        let current = self.get();
        Projection::derive(&current, selector, |forward| {
            self.inner
                .observers
                .subscribe(forward)
                .retaining(self.inner.clone())
        })
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.inner.observers.len()
    }
}

impl<T: Clone + PartialEq + 'static> ProjectionInner<T> {
    fn accept(&self, next: T) {
        {
            let mut value = self.value.borrow_mut();
            if *value == next {
                return;
            }
            *value = next.clone();
        }
        self.observers.publish(next);
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Projection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projection")
            .field("value", &self.inner.value.borrow())
            .finish()
    }
}
