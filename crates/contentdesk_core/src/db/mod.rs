//! SQLite bootstrap for locally persisted state.
//!
//! # Responsibility
//! - Open and configure connections.
//! - Apply schema migrations before any data access.
//!
//! # Invariants
//! - Schema version is tracked in `PRAGMA user_version`.
//! - A database written by a newer binary is never opened.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or querying the saved-query database.
#[derive(Debug)]
pub enum DbError {
    /// The database file could not be opened or configured.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// A schema migration failed; nothing from the batch was committed.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build of this crate.
    SchemaTooNew { found: u32, supported: u32 },
    /// A query against an open database failed.
    Query(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => {
                write!(f, "cannot open saved-query database ({mode}): {source}")
            }
            Self::Migration { version, source } => write!(
                f,
                "saved-query database migration {version} failed: {source}"
            ),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "saved-query database has schema {found}, this build reads up to {supported}"
            ),
            Self::Query(source) => write!(f, "saved-query database query failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Query(source) => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn schema_too_new_names_both_versions() {
        let message = DbError::SchemaTooNew {
            found: 9,
            supported: 2,
        }
        .to_string();
        assert_eq!(
            message,
            "saved-query database has schema 9, this build reads up to 2"
        );
    }

    #[test]
    fn migration_error_keeps_sqlite_source() {
        let err = DbError::Migration {
            version: 2,
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("saved-query database migration 2 failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
