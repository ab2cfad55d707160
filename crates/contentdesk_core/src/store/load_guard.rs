//! Scoped in-flight flag for asynchronous store operations.
//!
//! # Invariants
//! - The finish patch is published exactly once, on every exit path:
//!   normal completion, early `?` return, panic unwinding, or the owning
//!   future being dropped before it resolves.

use super::state_store::{Patch, StateStore};

/// Clears an in-flight flag when dropped.
///
/// Created by [`StateStore::begin`].
#[must_use = "dropping the guard clears the in-flight flag immediately"]
pub struct LoadGuard<'a, S: Clone + 'static> {
    store: &'a StateStore<S>,
    finish: Option<fn(&mut S)>,
    label: &'static str,
}

impl<'a, S: Clone + 'static> LoadGuard<'a, S> {
    pub(crate) fn new(store: &'a StateStore<S>, finish: fn(&mut S), label: &'static str) -> Self {
        Self {
            store,
            finish: Some(finish),
            label,
        }
    }

    /// Publishes `patch` and the finish patch as one snapshot.
    pub fn complete(mut self, patch: impl Patch<S>, label: &str) {
        let finish = self.finish.take();
        self.store.update(
            move |state| {
                patch.apply(state);
                if let Some(finish) = finish {
                    finish(state);
                }
            },
            label,
        );
    }
}

impl<S: Clone + 'static> Drop for LoadGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(finish) = self.finish.take() {
            self.store.update(finish, self.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::store::StateStore;

    #[derive(Debug, Clone, Default)]
    struct Flags {
        busy: bool,
        value: u32,
    }

    fn start(state: &mut Flags) {
        state.busy = true;
    }

    fn finish(state: &mut Flags) {
        state.busy = false;
    }

    #[test]
    fn guard_drop_clears_flag_on_early_return() {
        let store = StateStore::initialize("flags", Flags::default());

        fn fails(store: &StateStore<Flags>) -> Result<(), &'static str> {
            let _guard = store.begin(start, finish, "flags:finally");
            assert!(store.snapshot().busy);
            Err("boom")
        }

        assert!(fails(&store).is_err());
        assert!(!store.snapshot().busy);
    }

    #[test]
    fn complete_merges_payload_and_finish_into_one_snapshot() {
        let store = StateStore::initialize("flags", Flags::default());
        let guard = store.begin(start, finish, "flags:finally");
        let version = store.version();

        guard.complete(|state: &mut Flags| state.value = 5, "flags:ok");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.value, 5);
        assert!(!snapshot.busy);
        assert_eq!(store.version(), version + 1);
    }
}
