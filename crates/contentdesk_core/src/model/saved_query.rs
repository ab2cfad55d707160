//! Saved search queries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type SavedQueryId = Uuid;

/// Search text and field filters persisted with a saved query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuerySpec {
    pub text: String,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

/// Named query owned by the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedQuery {
    pub id: SavedQueryId,
    pub name: String,
    pub spec: QuerySpec,
    /// Unix epoch milliseconds.
    pub updated_at_ms: i64,
}
