//! Content templates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TemplateId = Uuid;

/// Template with a body that may contain `{{ placeholder }}` markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub body: String,
    /// Unix epoch milliseconds.
    pub updated_at_ms: i64,
}

impl Template {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            body: body.into(),
            updated_at_ms: 0,
        }
    }
}
