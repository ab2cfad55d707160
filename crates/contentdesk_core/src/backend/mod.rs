//! Backend-access collaborator contracts.
//!
//! # Responsibility
//! - Describe the request/response operations each feature store depends on.
//! - Keep transport, retry and serialization out of the store layer.
//!
//! # Invariants
//! - Every operation returns a `LocalBoxFuture`, so implementations stay
//!   object-safe and may hold `!Send` state.
//! - Failures are opaque `BackendError`s; collaborators own retry policy.

mod error;
mod notifier;

pub use error::{BackendError, BackendErrorKind, BackendResult};
pub use notifier::{Notifier, RecordingNotifier};

use crate::model::job::{Job, JobFilter};
use crate::model::rule::{SimulationRequest, SimulationResult};
use crate::model::saved_query::{QuerySpec, SavedQuery, SavedQueryId};
use crate::model::table_field::TableField;
use crate::model::template::{Template, TemplateId};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

/// Permission flags returned alongside a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// One page of items plus list metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching rows across all pages.
    pub total: u64,
    #[serde(default)]
    pub permissions: Permissions,
}

impl<T> Page<T> {
    /// Single page holding every item, with default permissions.
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total,
            permissions: Permissions::default(),
        }
    }
}

pub trait JobsBackend {
    fn list_jobs(&self, filter: JobFilter) -> LocalBoxFuture<'_, BackendResult<Page<Job>>>;
}

pub trait TemplatesBackend {
    fn list_templates(&self) -> LocalBoxFuture<'_, BackendResult<Page<Template>>>;
    fn get_template(&self, id: TemplateId) -> LocalBoxFuture<'_, BackendResult<Template>>;
}

pub trait RuleSimulatorBackend {
    fn simulate(
        &self,
        request: SimulationRequest,
    ) -> LocalBoxFuture<'_, BackendResult<SimulationResult>>;
}

pub trait TableFieldsBackend {
    fn list_fields(&self, entity: String) -> LocalBoxFuture<'_, BackendResult<Vec<TableField>>>;
    /// Persists the full field list and returns the stored configuration.
    fn save_fields(
        &self,
        entity: String,
        fields: Vec<TableField>,
    ) -> LocalBoxFuture<'_, BackendResult<Vec<TableField>>>;
}

pub trait SavedQueriesBackend {
    fn list_saved_queries(&self) -> LocalBoxFuture<'_, BackendResult<Vec<SavedQuery>>>;
    fn create_saved_query(
        &self,
        name: String,
        spec: QuerySpec,
    ) -> LocalBoxFuture<'_, BackendResult<SavedQuery>>;
    fn delete_saved_query(&self, id: SavedQueryId) -> LocalBoxFuture<'_, BackendResult<()>>;
}
