use contentdesk_core::{Patch, StateStore};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Listing {
    items: Vec<String>,
    filter: String,
    is_loading: bool,
    is_loaded: bool,
}

fn initial() -> Listing {
    Listing {
        items: Vec::new(),
        filter: String::new(),
        is_loading: false,
        is_loaded: false,
    }
}

#[derive(Default)]
struct ListingPatch {
    items: Option<Vec<String>>,
    filter: Option<String>,
    is_loading: Option<bool>,
}

impl Patch<Listing> for ListingPatch {
    fn apply(self, state: &mut Listing) {
        if let Some(items) = self.items {
            state.items = items;
        }
        if let Some(filter) = self.filter {
            state.filter = filter;
        }
        if let Some(is_loading) = self.is_loading {
            state.is_loading = is_loading;
        }
    }
}

#[test]
fn sequence_of_updates_is_last_write_wins_per_field() {
    let store = StateStore::initialize("listing", initial());

    store.next(
        ListingPatch {
            filter: Some("draft".to_string()),
            is_loading: Some(true),
            ..ListingPatch::default()
        },
        "filter",
    );
    store.next(
        ListingPatch {
            items: Some(vec!["a".to_string()]),
            ..ListingPatch::default()
        },
        "items",
    );
    store.next(
        ListingPatch {
            filter: Some("published".to_string()),
            is_loading: Some(false),
            ..ListingPatch::default()
        },
        "refilter",
    );

    let expected = Listing {
        items: vec!["a".to_string()],
        filter: "published".to_string(),
        is_loading: false,
        is_loaded: false,
    };
    assert_eq!(*store.snapshot(), expected);
    assert_eq!(store.version(), 3);
}

#[test]
fn reset_state_restores_initial_regardless_of_history() {
    let store = StateStore::initialize("listing", initial());
    store.update(|state| state.items.push("x".to_string()), "push");
    store.update(|state| state.is_loaded = true, "loaded");

    store.reset_state("reset");
    assert_eq!(*store.snapshot(), initial());

    store.update(|state| state.filter = "kept?".to_string(), "filter");
    store.reset_state_with(
        ListingPatch {
            filter: Some("override".to_string()),
            ..ListingPatch::default()
        },
        "reset with override",
    );
    let expected = Listing {
        filter: "override".to_string(),
        ..initial()
    };
    assert_eq!(*store.snapshot(), expected);
}

#[test]
fn projection_never_repeats_an_equal_value() {
    let store = StateStore::initialize("listing", initial());
    let loading = store.project(|state| state.is_loading);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let _subscription = {
        let seen = seen.clone();
        loading.subscribe(move |value| seen.borrow_mut().push(*value))
    };

    store.update(|_| {}, "noop");
    store.update(|state| state.is_loading = false, "still false");
    store.update(|state| state.is_loading = true, "start");
    store.update(|state| state.is_loading = true, "again");
    store.update(|state| state.is_loading = false, "stop");

    let seen = seen.borrow();
    assert_eq!(*seen, vec![false, true, false]);
    assert!(seen.windows(2).all(|pair| pair[0] != pair[1]));
}

#[test]
fn late_subscriber_gets_current_value_without_waiting() {
    let store = StateStore::initialize("listing", initial());
    let items = store.project(|state| state.items.len());
    store.update(|state| state.items = vec!["a".into(), "b".into()], "items");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let _subscription = {
        let seen = seen.clone();
        items.subscribe(move |value| seen.borrow_mut().push(*value))
    };
    assert_eq!(*seen.borrow(), vec![2]);
}

#[test]
fn snapshots_held_by_consumers_are_never_mutated() {
    let store = StateStore::initialize("listing", initial());
    let held = Rc::new(RefCell::new(Vec::new()));
    let _subscription = {
        let held = held.clone();
        let handle = store.clone();
        store.subscribe(move |_| held.borrow_mut().push(handle.snapshot()))
    };

    store.update(|state| state.filter = "one".to_string(), "one");
    store.update(|state| state.filter = "two".to_string(), "two");

    let held = held.borrow();
    assert_eq!(held[0].filter, "one");
    assert_eq!(held[1].filter, "two");
}

#[test]
fn chained_projection_only_recomputes_on_source_change() {
    let store = StateStore::initialize("listing", initial());
    let items = store.project(|state| state.items.clone());
    let calls = Rc::new(RefCell::new(0));
    let count = {
        let calls = calls.clone();
        store.project_from(&items, move |items| {
            *calls.borrow_mut() += 1;
            items.len()
        })
    };
    assert_eq!(*calls.borrow(), 1);

    store.update(|state| state.filter = "unrelated".to_string(), "filter");
    assert_eq!(*calls.borrow(), 1);

    store.update(|state| state.items.push("a".to_string()), "push");
    assert_eq!(*calls.borrow(), 2);
    assert_eq!(count.get(), 1);
}
