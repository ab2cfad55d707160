//! Domain records exchanged with backend-access collaborators.
//!
//! # Responsibility
//! - Define the typed shapes held inside feature store snapshots.
//! - Keep wire naming (`serde`) next to the Rust field names.
//!
//! # Invariants
//! - Records are plain data: cloning one never shares mutable state.

pub mod job;
pub mod rule;
pub mod saved_query;
pub mod table_field;
pub mod template;
