//! Templates store.
//!
//! # Responsibility
//! - Hold the template list, the current selection and list permissions.
//! - Derive the selected template and its placeholder names.
//!
//! # Invariants
//! - `selected` always refers to an id present in `items`, or is `None`.
//! - In-flight flags are cleared on every exit path.

use crate::backend::{BackendError, Notifier, Permissions, TemplatesBackend};
use crate::model::template::{Template, TemplateId};
use crate::store::{Projection, StateStore};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::rc::Rc;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}").expect("valid placeholder regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplatesState {
    pub items: Vec<Template>,
    pub selected: Option<TemplateId>,
    pub permissions: Permissions,
    pub is_loading: bool,
    pub is_loaded: bool,
}

impl TemplatesState {
    pub fn selected_template(&self) -> Option<Template> {
        let id = self.selected?;
        self.items.iter().find(|item| item.id == id).cloned()
    }
}

pub struct TemplatesStore {
    state: StateStore<TemplatesState>,
    backend: Rc<dyn TemplatesBackend>,
    notifier: Rc<dyn Notifier>,
    reload_message: String,
}

impl TemplatesStore {
    pub fn new(
        backend: Rc<dyn TemplatesBackend>,
        notifier: Rc<dyn Notifier>,
        reload_message: impl Into<String>,
    ) -> Self {
        Self {
            state: StateStore::initialize("templates", TemplatesState::default()),
            backend,
            notifier,
            reload_message: reload_message.into(),
        }
    }

    pub fn state(&self) -> &StateStore<TemplatesState> {
        &self.state
    }

    /// Fetches all templates. A selection that disappeared is cleared.
    pub async fn load(&self, is_reload: bool) -> Result<(), BackendError> {
        info!("event=templates_load module=feature.templates status=start reload={is_reload}");
        let guard = self.state.begin(
            |state| state.is_loading = true,
            |state| state.is_loading = false,
            "templates:load:finally",
        );

        let page = self.backend.list_templates().await.map_err(|err| {
            warn!(
                "event=templates_load module=feature.templates status=error error_kind={}",
                err.kind().as_str()
            );
            err
        })?;

        let count = page.items.len();
        guard.complete(
            move |state: &mut TemplatesState| {
                let keep_selection = state
                    .selected
                    .is_some_and(|id| page.items.iter().any(|item| item.id == id));
                if !keep_selection {
                    state.selected = None;
                }
                state.items = page.items;
                state.permissions = page.permissions;
                state.is_loaded = true;
            },
            "templates:load:ok",
        );
        info!("event=templates_load module=feature.templates status=ok items={count}");

        if is_reload {
            self.notifier.info(&self.reload_message);
        }
        Ok(())
    }

    /// Selects a loaded template. Returns `false` and leaves the selection
    /// unchanged when `id` is not in the list.
    pub fn select(&self, id: TemplateId) -> bool {
        let known = self.state.snapshot().items.iter().any(|item| item.id == id);
        if known {
            self.state
                .update(|state| state.selected = Some(id), "templates:select");
        }
        known
    }

    pub fn clear_selection(&self) {
        self.state
            .update(|state| state.selected = None, "templates:clear_selection");
    }

    /// Re-fetches the selected template and swaps it into the list.
    ///
    /// Does nothing when nothing is selected.
    pub async fn refresh_selected(&self) -> Result<(), BackendError> {
        let Some(id) = self.state.snapshot().selected else {
            return Ok(());
        };

        let guard = self.state.begin(
            |state| state.is_loading = true,
            |state| state.is_loading = false,
            "templates:refresh:finally",
        );
        let fresh = self.backend.get_template(id).await.map_err(|err| {
            warn!(
                "event=templates_refresh module=feature.templates status=error template={} error_kind={}",
                id,
                err.kind().as_str()
            );
            err
        })?;

        guard.complete(
            move |state: &mut TemplatesState| {
                if let Some(slot) = state.items.iter_mut().find(|item| item.id == fresh.id) {
                    *slot = fresh;
                }
            },
            "templates:refresh:ok",
        );
        Ok(())
    }

    pub fn items(&self) -> Projection<Vec<Template>> {
        self.state.project(|state| state.items.clone())
    }

    pub fn selected_template(&self) -> Projection<Option<Template>> {
        self.state.project(TemplatesState::selected_template)
    }

    /// Placeholder names of the selected template body.
    pub fn placeholders(&self) -> Projection<Vec<String>> {
        let selected = self.selected_template();
        self.state.project_from(&selected, |template| {
            template
                .as_ref()
                .map(|template| extract_placeholders(&template.body))
                .unwrap_or_default()
        })
    }

    pub fn can_edit(&self) -> Projection<bool> {
        self.state.project(|state| state.permissions.can_edit)
    }

    pub fn is_loading(&self) -> Projection<bool> {
        self.state.project(|state| state.is_loading)
    }
}

/// Returns unique `{{ name }}` placeholders in first-occurrence order.
pub fn extract_placeholders(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
