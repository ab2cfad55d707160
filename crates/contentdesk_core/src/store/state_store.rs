//! Observable state store.
//!
//! # Responsibility
//! - Own exactly one immutable snapshot of typed state.
//! - Apply patches as copy-on-write updates and publish each new snapshot.
//! - Hand out equality-gated projections of the snapshot.
//!
//! # Invariants
//! - A snapshot is never mutated after publication; every accepted update
//!   swaps in a fresh `Rc<S>`.
//! - `next` and `reset_state*` never fail.
//! - Snapshots are published synchronously, in call order, even when an
//!   update is issued from inside a subscriber.
//! - A store cannot be read before it is initialized: `initialize` is the
//!   only constructor.

use super::load_guard::LoadGuard;
use super::observer::{ObserverList, Subscription};
use super::projection::Projection;
use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Partial update applied to a draft copy of the current snapshot.
///
/// Fields the patch does not touch keep their current value.
pub trait Patch<S> {
    fn apply(self, state: &mut S);
}

impl<S, F> Patch<S> for F
where
    F: FnOnce(&mut S),
{
    fn apply(self, state: &mut S) {
        self(state)
    }
}

/// Store for one snapshot of state `S`.
///
/// Cloning the store clones the handle; all clones share one snapshot.
pub struct StateStore<S: 'static> {
    inner: Rc<StoreInner<S>>,
}

struct StoreInner<S: 'static> {
    name: &'static str,
    initial: Rc<S>,
    current: RefCell<Rc<S>>,
    version: Cell<u64>,
    observers: ObserverList<Rc<S>>,
}

impl<S: 'static> Clone for StateStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Clone + 'static> StateStore<S> {
    /// Creates a store holding `initial` as both the current and the reset
    /// baseline snapshot. `name` tags diagnostic log lines.
    pub fn initialize(name: &'static str, initial: S) -> Self {
        let initial = Rc::new(initial);
        debug!("event=store_init module=store status=ok store={name}");
        Self {
            inner: Rc::new(StoreInner {
                name,
                current: RefCell::new(initial.clone()),
                initial,
                version: Cell::new(0),
                observers: ObserverList::new(),
            }),
        }
    }

    /// Diagnostic name given at initialization.
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Returns the current snapshot without subscribing.
    pub fn snapshot(&self) -> Rc<S> {
        self.inner.current.borrow().clone()
    }

    /// Number of snapshots published since initialization.
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Applies `patch` to a copy of the current snapshot and publishes it.
    ///
    /// `label` is only used for tracing.
    pub fn next(&self, patch: impl Patch<S>, label: &str) {
        let mut draft = S::clone(&self.inner.current.borrow());
        patch.apply(&mut draft);
        self.replace(Rc::new(draft), label);
    }

    /// Closure form of [`StateStore::next`].
    pub fn update(&self, apply: impl FnOnce(&mut S), label: &str) {
        self.next(apply, label);
    }

    /// Restores the initial snapshot and publishes it.
    pub fn reset_state(&self, label: &str) {
        self.replace(self.inner.initial.clone(), label);
    }

    /// Restores the initial snapshot merged with `patch` and publishes it.
    pub fn reset_state_with(&self, patch: impl Patch<S>, label: &str) {
        let mut draft = S::clone(&self.inner.initial);
        patch.apply(&mut draft);
        self.replace(Rc::new(draft), label);
    }

    /// Subscribes to raw snapshot changes.
    ///
    /// Unlike projections, the raw channel does not replay the current
    /// snapshot and fires on every publish, including no-op updates.
    pub fn subscribe(&self, callback: impl FnMut(&S) + 'static) -> Subscription {
        let mut callback = callback;
        self.inner
            .observers
            .subscribe(move |snapshot: &Rc<S>| callback(snapshot.as_ref()))
    }

    /// Derives a projection of the snapshot through `selector`.
    pub fn project<T, F>(&self, selector: F) -> Projection<T>
    where
        T: Clone + PartialEq + 'static,
        F: Fn(&S) -> T + 'static,
    {
        let current = self.snapshot();
        Projection::derive(current.as_ref(), selector, |mut forward| {
            self.inner
                .observers
                .subscribe(move |snapshot: &Rc<S>| forward(snapshot.as_ref()))
        })
    }

    /// Derives a projection from an existing projection instead of the raw
    /// snapshot.
    pub fn project_from<U, T, F>(&self, source: &Projection<U>, selector: F) -> Projection<T>
    where
        U: Clone + PartialEq + 'static,
        T: Clone + PartialEq + 'static,
        F: Fn(&U) -> T + 'static,
    {
        source.project(selector)
    }

    /// Publishes `start` now and returns a guard that publishes `finish` when
    /// dropped, whatever path ends the operation.
    pub fn begin(
        &self,
        start: fn(&mut S),
        finish: fn(&mut S),
        label: &'static str,
    ) -> LoadGuard<'_, S> {
        self.update(start, label);
        LoadGuard::new(self, finish, label)
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }

    fn replace(&self, snapshot: Rc<S>, label: &str) {
        *self.inner.current.borrow_mut() = snapshot.clone();
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);
        debug!(
            "event=state_update module=store status=ok store={} label={} version={}",
            self.inner.name, label, version
        );
        self.inner.observers.publish(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::{Patch, StateStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Counter {
        count: u32,
        label: String,
    }

    struct CountPatch(u32);

    impl Patch<Counter> for CountPatch {
        fn apply(self, state: &mut Counter) {
            state.count = self.0;
        }
    }

    #[test]
    fn next_retains_untouched_fields() {
        let store = StateStore::initialize(
            "counter",
            Counter {
                count: 0,
                label: "a".to_string(),
            },
        );
        store.next(CountPatch(4), "set");
        let snapshot = store.snapshot();
        assert_eq!(snapshot.count, 4);
        assert_eq!(snapshot.label, "a");
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn previous_snapshot_reference_never_changes() {
        let store = StateStore::initialize("counter", Counter::default());
        let before = store.snapshot();
        store.update(|state| state.count = 9, "bump");
        assert_eq!(before.count, 0);
        assert_eq!(store.snapshot().count, 9);
    }

    #[test]
    fn raw_subscription_fires_for_every_publish_without_replay() {
        let store = StateStore::initialize("counter", Counter::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let seen = seen.clone();
            store.subscribe(move |state| seen.borrow_mut().push(state.count))
        };

        store.update(|_| {}, "noop");
        store.update(|state| state.count = 1, "one");
        assert_eq!(*seen.borrow(), vec![0, 1]);
    }

    #[test]
    fn update_from_subscriber_is_published_after_current_snapshot() {
        let store = StateStore::initialize("counter", Counter::default());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _chain = {
            let handle = store.clone();
            store.subscribe(move |state| {
                if state.count == 1 {
                    handle.update(|state| state.count = 2, "chained");
                }
            })
        };
        let _recorder = {
            let seen = seen.clone();
            store.subscribe(move |state| seen.borrow_mut().push(state.count))
        };

        store.update(|state| state.count = 1, "first");
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(store.snapshot().count, 2);
    }
}
