//! Table field configuration store.
//!
//! # Responsibility
//! - Load and edit the column configuration of one entity table.
//! - Validate and persist edited configurations.
//!
//! # Invariants
//! - `fields` is ordered by `position`, and positions are `0..n`.
//! - Switching entity restarts from a clean baseline.
//! - `fields` always belong to `entity`; a response for an entity that is no
//!   longer current is dropped.
//! - `is_loading` and `is_saving` are cleared on every exit path.

use crate::backend::{BackendError, Notifier, TableFieldsBackend};
use crate::model::table_field::TableField;
use crate::store::{Projection, StateStore};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

static FIELD_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid field key regex"));

#[derive(Debug)]
pub enum TableFieldsError {
    /// No entity has been loaded yet.
    NoEntity,
    InvalidKey(String),
    DuplicateKey(String),
    Backend(BackendError),
}

impl Display for TableFieldsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEntity => write!(f, "no entity table loaded"),
            Self::InvalidKey(key) => write!(f, "invalid field key: `{key}`"),
            Self::DuplicateKey(key) => write!(f, "duplicate field key: `{key}`"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TableFieldsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for TableFieldsError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableFieldsState {
    pub entity: Option<String>,
    pub fields: Vec<TableField>,
    pub is_loading: bool,
    pub is_loaded: bool,
    pub is_saving: bool,
    /// Local edits not yet saved.
    pub is_dirty: bool,
}

pub struct TableFieldsStore {
    state: StateStore<TableFieldsState>,
    backend: Rc<dyn TableFieldsBackend>,
    notifier: Rc<dyn Notifier>,
    reload_message: String,
    saved_message: String,
}

impl TableFieldsStore {
    pub fn new(
        backend: Rc<dyn TableFieldsBackend>,
        notifier: Rc<dyn Notifier>,
        reload_message: impl Into<String>,
        saved_message: impl Into<String>,
    ) -> Self {
        Self {
            state: StateStore::initialize("table_fields", TableFieldsState::default()),
            backend,
            notifier,
            reload_message: reload_message.into(),
            saved_message: saved_message.into(),
        }
    }

    pub fn state(&self) -> &StateStore<TableFieldsState> {
        &self.state
    }

    /// Loads the configuration of `entity`.
    ///
    /// A different entity than the current one resets the store first, so
    /// fields of the previous table are never shown for the new one. When
    /// another entity was loaded while this request was in flight, the
    /// response is discarded and only `is_loading` is cleared.
    pub async fn load(&self, entity: &str, is_reload: bool) -> Result<(), BackendError> {
        let entity = entity.trim().to_string();
        if self.state.snapshot().entity.as_deref() != Some(entity.as_str()) {
            let baseline = entity.clone();
            self.state.reset_state_with(
                move |state: &mut TableFieldsState| state.entity = Some(baseline),
                "table_fields:switch_entity",
            );
        }

        info!(
            "event=table_fields_load module=feature.table_fields status=start entity={} reload={}",
            entity, is_reload
        );
        let guard = self.state.begin(
            |state| state.is_loading = true,
            |state| state.is_loading = false,
            "table_fields:load:finally",
        );
        let mut fields = self
            .backend
            .list_fields(entity.clone())
            .await
            .map_err(|err| {
                warn!(
                    "event=table_fields_load module=feature.table_fields status=error entity={} error_kind={}",
                    entity,
                    err.kind().as_str()
                );
                err
            })?;
        fields.sort_by_key(|field| field.position);
        renumber(&mut fields);

        if self.state.snapshot().entity.as_deref() != Some(entity.as_str()) {
            drop(guard);
            info!(
                "event=table_fields_load module=feature.table_fields status=stale entity={}",
                entity
            );
            return Ok(());
        }

        let count = fields.len();
        guard.complete(
            move |state: &mut TableFieldsState| {
                state.fields = fields;
                state.is_loaded = true;
                state.is_dirty = false;
            },
            "table_fields:load:ok",
        );
        info!(
            "event=table_fields_load module=feature.table_fields status=ok entity={} fields={}",
            entity, count
        );

        if is_reload {
            self.notifier.info(&self.reload_message);
        }
        Ok(())
    }

    /// Flips visibility of `key`. Returns `false` for unknown keys.
    pub fn toggle_visibility(&self, key: &str) -> bool {
        let known = self
            .state
            .snapshot()
            .fields
            .iter()
            .any(|field| field.key == key);
        if known {
            let key = key.to_string();
            self.state.update(
                move |state| {
                    if let Some(field) = state.fields.iter_mut().find(|field| field.key == key) {
                        field.visible = !field.visible;
                    }
                    state.is_dirty = true;
                },
                "table_fields:toggle_visibility",
            );
        }
        known
    }

    /// Moves the field at `from` to index `to`. Out-of-range indexes are
    /// ignored and return `false`.
    pub fn move_field(&self, from: usize, to: usize) -> bool {
        let len = self.state.snapshot().fields.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            self.state.update(
                move |state| {
                    let field = state.fields.remove(from);
                    state.fields.insert(to, field);
                    renumber(&mut state.fields);
                    state.is_dirty = true;
                },
                "table_fields:move_field",
            );
        }
        true
    }

    /// Validates and persists the current configuration.
    pub async fn save(&self) -> Result<(), TableFieldsError> {
        let snapshot = self.state.snapshot();
        let entity = snapshot.entity.clone().ok_or(TableFieldsError::NoEntity)?;
        validate_fields(&snapshot.fields)?;

        info!(
            "event=table_fields_save module=feature.table_fields status=start entity={} fields={}",
            entity,
            snapshot.fields.len()
        );
        let guard = self.state.begin(
            |state| state.is_saving = true,
            |state| state.is_saving = false,
            "table_fields:save:finally",
        );
        let mut stored = self
            .backend
            .save_fields(entity.clone(), snapshot.fields.clone())
            .await
            .map_err(|err| {
                warn!(
                    "event=table_fields_save module=feature.table_fields status=error entity={} error_kind={}",
                    entity,
                    err.kind().as_str()
                );
                err
            })?;
        stored.sort_by_key(|field| field.position);
        renumber(&mut stored);

        guard.complete(
            move |state: &mut TableFieldsState| {
                state.fields = stored;
                state.is_dirty = false;
            },
            "table_fields:save:ok",
        );
        info!("event=table_fields_save module=feature.table_fields status=ok entity={entity}");
        self.notifier.info(&self.saved_message);
        Ok(())
    }

    pub fn fields(&self) -> Projection<Vec<TableField>> {
        self.state.project(|state| state.fields.clone())
    }

    pub fn visible_fields(&self) -> Projection<Vec<TableField>> {
        let fields = self.fields();
        self.state.project_from(&fields, |fields| {
            fields.iter().filter(|field| field.visible).cloned().collect()
        })
    }

    pub fn is_dirty(&self) -> Projection<bool> {
        self.state.project(|state| state.is_dirty)
    }

    pub fn is_saving(&self) -> Projection<bool> {
        self.state.project(|state| state.is_saving)
    }

    pub fn is_loading(&self) -> Projection<bool> {
        self.state.project(|state| state.is_loading)
    }
}

fn renumber(fields: &mut [TableField]) {
    for (index, field) in fields.iter_mut().enumerate() {
        field.position = index as u32;
    }
}

fn validate_fields(fields: &[TableField]) -> Result<(), TableFieldsError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !FIELD_KEY_RE.is_match(&field.key) {
            return Err(TableFieldsError::InvalidKey(field.key.clone()));
        }
        if !seen.insert(field.key.as_str()) {
            return Err(TableFieldsError::DuplicateKey(field.key.clone()));
        }
    }
    Ok(())
}
