//! Table column configuration.

use serde::{Deserialize, Serialize};

/// One configurable column of an entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableField {
    /// Stable machine key, `^[a-z][a-z0-9_]*$`.
    pub key: String,
    pub label: String,
    pub visible: bool,
    /// Zero-based display position.
    pub position: u32,
}

impl TableField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, position: u32) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            visible: true,
            position,
        }
    }
}
