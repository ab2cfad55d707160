//! Feature stores built on [`crate::store::StateStore`].
//!
//! # Responsibility
//! - Pair one state store with one backend-access collaborator per feature.
//! - Expose UI-facing operations and projections.
//!
//! # Invariants
//! - Every async operation clears its in-flight flag on all exit paths.
//! - Backend failures never overwrite previously loaded data.
//! - Overlapping loads are not deduplicated; the last response to arrive
//!   wins.

pub mod jobs;
pub mod rule_simulator;
pub mod saved_queries;
pub mod table_fields;
pub mod templates;
