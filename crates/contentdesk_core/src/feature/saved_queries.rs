//! Saved queries store.
//!
//! # Responsibility
//! - List, create and delete the user's saved queries.
//! - Normalize query names before they reach the backend.
//!
//! # Invariants
//! - Names are trimmed with inner whitespace collapsed; blank names are
//!   rejected locally.
//! - `items` stays ordered newest first.

use crate::backend::{BackendError, Notifier, SavedQueriesBackend};
use crate::model::saved_query::{QuerySpec, SavedQuery, SavedQueryId};
use crate::store::{Projection, StateStore};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug)]
pub enum SavedQueryError {
    InvalidName(String),
    Backend(BackendError),
}

impl Display for SavedQueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid saved query name: `{name}`"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SavedQueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(_) => None,
            Self::Backend(err) => Some(err),
        }
    }
}

impl From<BackendError> for SavedQueryError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SavedQueriesState {
    pub items: Vec<SavedQuery>,
    pub is_loading: bool,
    pub is_loaded: bool,
    pub is_saving: bool,
}

pub struct SavedQueriesStore {
    state: StateStore<SavedQueriesState>,
    backend: Rc<dyn SavedQueriesBackend>,
    notifier: Rc<dyn Notifier>,
    reload_message: String,
    saved_message: String,
    deleted_message: String,
}

impl SavedQueriesStore {
    pub fn new(
        backend: Rc<dyn SavedQueriesBackend>,
        notifier: Rc<dyn Notifier>,
        reload_message: impl Into<String>,
        saved_message: impl Into<String>,
        deleted_message: impl Into<String>,
    ) -> Self {
        Self {
            state: StateStore::initialize("saved_queries", SavedQueriesState::default()),
            backend,
            notifier,
            reload_message: reload_message.into(),
            saved_message: saved_message.into(),
            deleted_message: deleted_message.into(),
        }
    }

    pub fn state(&self) -> &StateStore<SavedQueriesState> {
        &self.state
    }

    pub async fn load(&self, is_reload: bool) -> Result<(), BackendError> {
        info!(
            "event=saved_queries_load module=feature.saved_queries status=start reload={is_reload}"
        );
        let guard = self.state.begin(
            |state| state.is_loading = true,
            |state| state.is_loading = false,
            "saved_queries:load:finally",
        );
        let items = self.backend.list_saved_queries().await.map_err(|err| {
            warn!(
                "event=saved_queries_load module=feature.saved_queries status=error error_kind={}",
                err.kind().as_str()
            );
            err
        })?;

        let count = items.len();
        guard.complete(
            move |state: &mut SavedQueriesState| {
                state.items = items;
                state.is_loaded = true;
            },
            "saved_queries:load:ok",
        );
        info!("event=saved_queries_load module=feature.saved_queries status=ok items={count}");

        if is_reload {
            self.notifier.info(&self.reload_message);
        }
        Ok(())
    }

    /// Creates a saved query and puts it at the top of the list.
    pub async fn save(
        &self,
        name: &str,
        spec: QuerySpec,
    ) -> Result<SavedQuery, SavedQueryError> {
        let name = normalize_query_name(name)
            .ok_or_else(|| SavedQueryError::InvalidName(name.to_string()))?;

        let guard = self.state.begin(
            |state| state.is_saving = true,
            |state| state.is_saving = false,
            "saved_queries:save:finally",
        );
        let created = self
            .backend
            .create_saved_query(name, spec)
            .await
            .map_err(|err| {
                warn!(
                    "event=saved_query_save module=feature.saved_queries status=error error_kind={}",
                    err.kind().as_str()
                );
                err
            })?;

        let inserted = created.clone();
        guard.complete(
            move |state: &mut SavedQueriesState| {
                state.items.retain(|item| item.id != inserted.id);
                state.items.insert(0, inserted);
            },
            "saved_queries:save:ok",
        );
        info!(
            "event=saved_query_save module=feature.saved_queries status=ok query={}",
            created.id
        );
        self.notifier.info(&self.saved_message);
        Ok(created)
    }

    /// Deletes one saved query and drops it from the list.
    pub async fn delete(&self, id: SavedQueryId) -> Result<(), BackendError> {
        let guard = self.state.begin(
            |state| state.is_saving = true,
            |state| state.is_saving = false,
            "saved_queries:delete:finally",
        );
        self.backend.delete_saved_query(id).await.map_err(|err| {
            warn!(
                "event=saved_query_delete module=feature.saved_queries status=error query={} error_kind={}",
                id,
                err.kind().as_str()
            );
            err
        })?;

        guard.complete(
            move |state: &mut SavedQueriesState| state.items.retain(|item| item.id != id),
            "saved_queries:delete:ok",
        );
        info!("event=saved_query_delete module=feature.saved_queries status=ok query={id}");
        self.notifier.info(&self.deleted_message);
        Ok(())
    }

    pub fn items(&self) -> Projection<Vec<SavedQuery>> {
        self.state.project(|state| state.items.clone())
    }

    pub fn names(&self) -> Projection<Vec<String>> {
        let items = self.items();
        self.state.project_from(&items, |items| {
            items.iter().map(|item| item.name.clone()).collect()
        })
    }

    pub fn is_loading(&self) -> Projection<bool> {
        self.state.project(|state| state.is_loading)
    }
}

/// Trims and collapses whitespace; `None` when nothing is left.
pub fn normalize_query_name(name: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(name.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_query_name;

    #[test]
    fn names_are_trimmed_and_collapsed() {
        assert_eq!(
            normalize_query_name("  open \t bugs\nthis week "),
            Some("open bugs this week".to_string())
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(normalize_query_name(" \n\t "), None);
    }
}
