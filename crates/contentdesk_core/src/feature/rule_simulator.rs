//! Rule simulator store.
//!
//! # Responsibility
//! - Hold the rule text and sample input being edited.
//! - Run simulations and keep the latest result.
//!
//! # Invariants
//! - A failed simulation keeps the previous result.
//! - Blank rules are rejected before the backend is called.

use crate::backend::{BackendError, RuleSimulatorBackend};
use crate::model::rule::{SimulationRequest, SimulationResult};
use crate::store::{Projection, StateStore};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug)]
pub enum SimulatorError {
    /// Rule text is blank after trim.
    EmptyRule,
    Backend(BackendError),
}

impl Display for SimulatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRule => write!(f, "rule must not be blank"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SimulatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyRule => None,
            Self::Backend(err) => Some(err),
        }
    }
}

impl From<BackendError> for SimulatorError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSimulatorState {
    pub rule: String,
    pub input: BTreeMap<String, String>,
    pub result: Option<SimulationResult>,
    pub is_loading: bool,
}

pub struct RuleSimulatorStore {
    state: StateStore<RuleSimulatorState>,
    backend: Rc<dyn RuleSimulatorBackend>,
}

impl RuleSimulatorStore {
    pub fn new(backend: Rc<dyn RuleSimulatorBackend>) -> Self {
        Self {
            state: StateStore::initialize("rule_simulator", RuleSimulatorState::default()),
            backend,
        }
    }

    pub fn state(&self) -> &StateStore<RuleSimulatorState> {
        &self.state
    }

    pub fn set_rule(&self, rule: impl Into<String>) {
        let rule = rule.into();
        self.state
            .update(move |state| state.rule = rule, "rule_simulator:set_rule");
    }

    pub fn set_input_field(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        self.state.update(
            move |state| {
                state.input.insert(key, value);
            },
            "rule_simulator:set_input_field",
        );
    }

    pub fn remove_input_field(&self, key: &str) {
        let key = key.to_string();
        self.state.update(
            move |state| {
                state.input.remove(&key);
            },
            "rule_simulator:remove_input_field",
        );
    }

    /// Evaluates the current rule against the current input.
    pub async fn simulate(&self) -> Result<SimulationResult, SimulatorError> {
        let snapshot = self.state.snapshot();
        if snapshot.rule.trim().is_empty() {
            return Err(SimulatorError::EmptyRule);
        }
        let request = SimulationRequest {
            rule: snapshot.rule.clone(),
            input: snapshot.input.clone(),
        };
        info!(
            "event=rule_simulate module=feature.rule_simulator status=start input_fields={}",
            request.input.len()
        );

        let guard = self.state.begin(
            |state| state.is_loading = true,
            |state| state.is_loading = false,
            "rule_simulator:simulate:finally",
        );
        let result = self.backend.simulate(request).await.map_err(|err| {
            warn!(
                "event=rule_simulate module=feature.rule_simulator status=error error_kind={}",
                err.kind().as_str()
            );
            err
        })?;

        let stored = result.clone();
        guard.complete(
            move |state: &mut RuleSimulatorState| state.result = Some(stored),
            "rule_simulator:simulate:ok",
        );
        info!(
            "event=rule_simulate module=feature.rule_simulator status=ok matched={} actions={}",
            result.matched,
            result.actions.len()
        );
        Ok(result)
    }

    /// Clears input and result but keeps the rule being edited.
    pub fn clear(&self) {
        let rule = self.state.snapshot().rule.clone();
        self.state.reset_state_with(
            move |state: &mut RuleSimulatorState| state.rule = rule,
            "rule_simulator:clear",
        );
    }

    pub fn result(&self) -> Projection<Option<SimulationResult>> {
        self.state.project(|state| state.result.clone())
    }

    pub fn matched(&self) -> Projection<Option<bool>> {
        let result = self.result();
        self.state
            .project_from(&result, |result| result.as_ref().map(|result| result.matched))
    }

    pub fn is_loading(&self) -> Projection<bool> {
        self.state.project(|state| state.is_loading)
    }
}
