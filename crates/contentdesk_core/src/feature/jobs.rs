//! Jobs list store.
//!
//! # Responsibility
//! - Hold the current page of jobs with its filter and total count.
//! - Run load/reload cycles against a `JobsBackend`.
//!
//! # Invariants
//! - `is_loading` is cleared on every exit path of `load`.
//! - A failed load keeps `items`, `total` and `is_loaded` unchanged.
//! - Only reloads notify the user.

use crate::backend::{BackendError, JobsBackend, Notifier};
use crate::model::job::{Job, JobFilter, JobStatus};
use crate::store::{Patch, Projection, StateStore};
use log::{info, warn};
use std::rc::Rc;

/// Snapshot shape of [`JobsStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsState {
    pub items: Vec<Job>,
    pub total: u64,
    pub filter: JobFilter,
    pub is_loading: bool,
    pub is_loaded: bool,
}

impl JobsState {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            filter: JobFilter::with_page_size(page_size),
            is_loading: false,
            is_loaded: false,
        }
    }

    /// Whether rows exist beyond the current page.
    pub fn has_more(&self) -> bool {
        self.filter.offset() + (self.items.len() as u64) < self.total
    }
}

/// Field-by-field update for [`JobsState`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct JobsPatch {
    pub items: Option<Vec<Job>>,
    pub total: Option<u64>,
    pub filter: Option<JobFilter>,
    pub is_loading: Option<bool>,
    pub is_loaded: Option<bool>,
}

impl Patch<JobsState> for JobsPatch {
    fn apply(self, state: &mut JobsState) {
        if let Some(items) = self.items {
            state.items = items;
        }
        if let Some(total) = self.total {
            state.total = total;
        }
        if let Some(filter) = self.filter {
            state.filter = filter;
        }
        if let Some(is_loading) = self.is_loading {
            state.is_loading = is_loading;
        }
        if let Some(is_loaded) = self.is_loaded {
            state.is_loaded = is_loaded;
        }
    }
}

/// Feature store for the jobs list.
pub struct JobsStore {
    state: StateStore<JobsState>,
    backend: Rc<dyn JobsBackend>,
    notifier: Rc<dyn Notifier>,
    reload_message: String,
}

impl JobsStore {
    pub fn new(
        backend: Rc<dyn JobsBackend>,
        notifier: Rc<dyn Notifier>,
        page_size: u32,
        reload_message: impl Into<String>,
    ) -> Self {
        Self {
            state: StateStore::initialize("jobs", JobsState::new(page_size)),
            backend,
            notifier,
            reload_message: reload_message.into(),
        }
    }

    pub fn state(&self) -> &StateStore<JobsState> {
        &self.state
    }

    /// Fetches the page described by the current filter.
    ///
    /// `is_reload` marks a user-triggered re-fetch; only those notify.
    pub async fn load(&self, is_reload: bool) -> Result<(), BackendError> {
        let filter = self.state.snapshot().filter.clone();
        info!(
            "event=jobs_load module=feature.jobs status=start reload={} page={} page_size={}",
            is_reload, filter.page, filter.page_size
        );

        let guard = self.state.begin(
            |state| state.is_loading = true,
            |state| state.is_loading = false,
            "jobs:load:finally",
        );
        let page = self.backend.list_jobs(filter).await.map_err(|err| {
            warn!(
                "event=jobs_load module=feature.jobs status=error error_kind={}",
                err.kind().as_str()
            );
            err
        })?;

        let count = page.items.len();
        guard.complete(
            JobsPatch {
                items: Some(page.items),
                total: Some(page.total),
                is_loaded: Some(true),
                ..JobsPatch::default()
            },
            "jobs:load:ok",
        );
        info!(
            "event=jobs_load module=feature.jobs status=ok items={} total={}",
            count, page.total
        );

        if is_reload {
            self.notifier.info(&self.reload_message);
        }
        Ok(())
    }

    /// Replaces the whole filter and rewinds to the first page.
    ///
    /// Does not fetch; call `load` afterwards.
    pub fn set_filter(&self, filter: JobFilter) {
        self.state.next(
            JobsPatch {
                filter: Some(JobFilter { page: 0, ..filter }),
                ..JobsPatch::default()
            },
            "jobs:set_filter",
        );
    }

    /// Changes only the page index of the current filter.
    pub fn set_page(&self, page: u32) {
        self.state
            .update(|state| state.filter.page = page, "jobs:set_page");
    }

    /// Drops all loaded data and restores the initial filter.
    pub fn reset(&self) {
        self.state.reset_state("jobs:reset");
    }

    pub fn items(&self) -> Projection<Vec<Job>> {
        self.state.project(|state| state.items.clone())
    }

    pub fn total(&self) -> Projection<u64> {
        self.state.project(|state| state.total)
    }

    pub fn is_loading(&self) -> Projection<bool> {
        self.state.project(|state| state.is_loading)
    }

    pub fn is_loaded(&self) -> Projection<bool> {
        self.state.project(|state| state.is_loaded)
    }

    pub fn has_more(&self) -> Projection<bool> {
        self.state.project(JobsState::has_more)
    }

    /// Number of queued or running jobs on the current page.
    pub fn active_count(&self) -> Projection<usize> {
        let items = self.items();
        self.state.project_from(&items, |items| {
            items
                .iter()
                .filter(|job| JobStatus::is_active(job.status))
                .count()
        })
    }
}
