//! Local persistence behind backend-access contracts.
//!
//! # Responsibility
//! - Implement backend collaborators on top of SQLite for state that lives
//!   on the client.
//! - Keep SQL details out of feature stores.
//!
//! # Invariants
//! - Read paths reject corrupted rows instead of masking them.

pub mod saved_query_repo;
