//! Explicit owner of all feature stores for one session.
//!
//! # Responsibility
//! - Build every feature store from injected collaborators and config.
//! - Give the rendering layer one object to pass around instead of ambient
//!   singletons.
//!
//! # Invariants
//! - A context is only built from a validated config.
//! - Stores live exactly as long as the context.
//! - After `dispose`, projections obtained from the context stop updating.

use crate::backend::{
    JobsBackend, Notifier, RuleSimulatorBackend, SavedQueriesBackend, TableFieldsBackend,
    TemplatesBackend,
};
use crate::config::{ConfigError, ContextConfig};
use crate::feature::jobs::JobsStore;
use crate::feature::rule_simulator::RuleSimulatorStore;
use crate::feature::saved_queries::SavedQueriesStore;
use crate::feature::table_fields::TableFieldsStore;
use crate::feature::templates::TemplatesStore;
use log::info;
use std::rc::Rc;

/// Backend-access collaborators, one per feature store.
#[derive(Clone)]
pub struct Backends {
    pub jobs: Rc<dyn JobsBackend>,
    pub templates: Rc<dyn TemplatesBackend>,
    pub rule_simulator: Rc<dyn RuleSimulatorBackend>,
    pub table_fields: Rc<dyn TableFieldsBackend>,
    pub saved_queries: Rc<dyn SavedQueriesBackend>,
}

/// Session-scoped set of feature stores.
pub struct StoreContext {
    config: ContextConfig,
    jobs: JobsStore,
    templates: TemplatesStore,
    rule_simulator: RuleSimulatorStore,
    table_fields: TableFieldsStore,
    saved_queries: SavedQueriesStore,
}

impl StoreContext {
    /// Creates all feature stores in their initial state.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` when `config` fails validation; no store is
    ///   built in that case.
    pub fn new(
        backends: Backends,
        notifier: Rc<dyn Notifier>,
        config: ContextConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let messages = &config.messages;
        let context = Self {
            jobs: JobsStore::new(
                backends.jobs,
                notifier.clone(),
                config.default_page_size,
                messages.jobs_reloaded.clone(),
            ),
            templates: TemplatesStore::new(
                backends.templates,
                notifier.clone(),
                messages.templates_reloaded.clone(),
            ),
            rule_simulator: RuleSimulatorStore::new(backends.rule_simulator),
            table_fields: TableFieldsStore::new(
                backends.table_fields,
                notifier.clone(),
                messages.table_fields_reloaded.clone(),
                messages.table_fields_saved.clone(),
            ),
            saved_queries: SavedQueriesStore::new(
                backends.saved_queries,
                notifier,
                messages.saved_queries_reloaded.clone(),
                messages.saved_query_saved.clone(),
                messages.saved_query_deleted.clone(),
            ),
            config,
        };
        info!(
            "event=context_create module=context status=ok page_size={}",
            context.config.default_page_size
        );
        Ok(context)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn jobs(&self) -> &JobsStore {
        &self.jobs
    }

    pub fn templates(&self) -> &TemplatesStore {
        &self.templates
    }

    pub fn rule_simulator(&self) -> &RuleSimulatorStore {
        &self.rule_simulator
    }

    pub fn table_fields(&self) -> &TableFieldsStore {
        &self.table_fields
    }

    pub fn saved_queries(&self) -> &SavedQueriesStore {
        &self.saved_queries
    }

    /// Tears the session down and drops every store.
    pub fn dispose(self) {
        info!("event=context_dispose module=context status=ok");
    }
}
