//! Client-side state layer for the content desk.
//! Feature stores hold UI state as immutable snapshots and publish
//! equality-gated projections to the rendering layer.

pub mod backend;
pub mod config;
pub mod context;
pub mod db;
pub mod feature;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use backend::{
    BackendError, BackendErrorKind, BackendResult, Notifier, Page, Permissions,
    RecordingNotifier,
};
pub use config::{ConfigError, ContextConfig, NotificationMessages};
pub use context::{Backends, StoreContext};
pub use feature::jobs::{JobsPatch, JobsState, JobsStore};
pub use feature::rule_simulator::{RuleSimulatorState, RuleSimulatorStore, SimulatorError};
pub use feature::saved_queries::{SavedQueriesState, SavedQueriesStore, SavedQueryError};
pub use feature::table_fields::{TableFieldsError, TableFieldsState, TableFieldsStore};
pub use feature::templates::{TemplatesState, TemplatesStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use repo::saved_query_repo::{RepoError, RepoResult, SqliteSavedQueryRepository};
pub use store::{LoadGuard, Patch, Projection, StateStore, Subscription};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
