//! Store context configuration.
//!
//! # Responsibility
//! - Carry tunables shared by all feature stores (page size, notification
//!   texts, log level).
//! - Parse and validate JSON configuration documents.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - `default_page_size` is never zero after validation.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_PAGE_SIZE: u32 = 25;

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Input is not valid JSON for the config shape.
    Parse(serde_json::Error),
    /// Input parsed but a value is out of range.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::Invalid(message) => write!(f, "invalid config value: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Texts sent to the notifier after successful user-triggered operations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationMessages {
    pub jobs_reloaded: String,
    pub templates_reloaded: String,
    pub table_fields_reloaded: String,
    pub table_fields_saved: String,
    pub saved_queries_reloaded: String,
    pub saved_query_saved: String,
    pub saved_query_deleted: String,
}

impl Default for NotificationMessages {
    fn default() -> Self {
        Self {
            jobs_reloaded: "Jobs reloaded".to_string(),
            templates_reloaded: "Templates reloaded".to_string(),
            table_fields_reloaded: "Table fields reloaded".to_string(),
            table_fields_saved: "Table fields saved".to_string(),
            saved_queries_reloaded: "Saved queries reloaded".to_string(),
            saved_query_saved: "Query saved".to_string(),
            saved_query_deleted: "Query deleted".to_string(),
        }
    }
}

/// Settings for one [`crate::StoreContext`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Page size used by paginated stores until a filter overrides it.
    pub default_page_size: u32,
    pub messages: NotificationMessages,
    pub log_level: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            messages: NotificationMessages::default(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl ContextConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "default_page_size must be greater than zero".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level must not be blank".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ContextConfig};

    #[test]
    fn empty_document_yields_defaults() {
        let config = ContextConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ContextConfig::default());
        assert_eq!(config.default_page_size, 25);
    }

    #[test]
    fn partial_messages_keep_other_defaults() {
        let config = ContextConfig::from_json_str(
            r#"{"default_page_size": 10, "messages": {"jobs_reloaded": "Done"}}"#,
        )
        .unwrap();
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.messages.jobs_reloaded, "Done");
        assert_eq!(config.messages.saved_query_saved, "Query saved");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = ContextConfig::from_json_str(r#"{"default_page_size": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ContextConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
