//! Observable state store primitives.
//!
//! # Responsibility
//! - Hold one immutable snapshot per store and publish replacements.
//! - Offer equality-gated, replay-latest projections over snapshots.
//! - Guarantee in-flight flags are cleared on every exit path.
//!
//! # Invariants
//! - Everything here is single-threaded (`Rc`/`RefCell`); stores are
//!   neither `Send` nor `Sync`.

mod load_guard;
mod observer;
mod projection;
mod state_store;

pub use load_guard::LoadGuard;
pub use observer::Subscription;
pub use projection::Projection;
pub use state_store::{Patch, StateStore};
