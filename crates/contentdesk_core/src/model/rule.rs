//! Rule simulation request/response records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rule text plus the sample input it is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub rule: String,
    pub input: BTreeMap<String, String>,
}

/// Outcome of one simulated rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    pub matched: bool,
    /// Actions the rule would trigger, in execution order.
    pub actions: Vec<String>,
    /// Evaluation trace lines for display.
    pub trace: Vec<String>,
}
