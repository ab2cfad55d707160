//! SQLite-backed saved queries.
//!
//! # Responsibility
//! - Persist saved queries with their JSON-encoded specs.
//! - Serve them to `SavedQueriesStore` through `SavedQueriesBackend`.
//!
//! # Invariants
//! - Listing is ordered by `updated_at DESC, uuid ASC`.
//! - Names reaching this layer are already normalized and non-blank.

use crate::backend::{BackendError, BackendResult, SavedQueriesBackend};
use crate::db::DbError;
use crate::model::saved_query::{QuerySpec, SavedQuery, SavedQueryId};
use futures::future::{self, FutureExt, LocalBoxFuture};
use log::warn;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const SAVED_QUERY_SELECT_SQL: &str = "SELECT uuid, name, spec_json, updated_at FROM saved_queries";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(SavedQueryId),
    InvalidData(String),
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "saved query not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted saved query: {message}"),
            Self::Encode(err) => write!(f, "cannot encode query spec: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}

impl From<RepoError> for BackendError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => BackendError::not_found(format!("saved query {id}")),
            RepoError::Encode(err) => BackendError::rejected(err.to_string()),
            other => BackendError::transport(other.to_string()),
        }
    }
}

/// Saved queries stored in a local SQLite database.
pub struct SqliteSavedQueryRepository {
    conn: Connection,
}

impl SqliteSavedQueryRepository {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn list_queries(&self) -> RepoResult<Vec<SavedQuery>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SAVED_QUERY_SELECT_SQL} ORDER BY updated_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_saved_query_row(row)?);
        }
        Ok(items)
    }

    pub fn get_query(&self, id: SavedQueryId) -> RepoResult<Option<SavedQuery>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SAVED_QUERY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_saved_query_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_query(&self, name: &str, spec: &QuerySpec) -> RepoResult<SavedQuery> {
        let id = Uuid::new_v4();
        let spec_json = serde_json::to_string(spec).map_err(RepoError::Encode)?;
        self.conn.execute(
            "INSERT INTO saved_queries (uuid, name, spec_json) VALUES (?1, ?2, ?3);",
            params![id.to_string(), name, spec_json],
        )?;

        self.get_query(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("saved query {id} missing after insert"))
        })
    }

    pub fn delete_query(&self, id: SavedQueryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM saved_queries WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl SavedQueriesBackend for SqliteSavedQueryRepository {
    fn list_saved_queries(&self) -> LocalBoxFuture<'_, BackendResult<Vec<SavedQuery>>> {
        future::ready(self.list_queries().map_err(into_backend_error)).boxed_local()
    }

    fn create_saved_query(
        &self,
        name: String,
        spec: QuerySpec,
    ) -> LocalBoxFuture<'_, BackendResult<SavedQuery>> {
        future::ready(self.create_query(&name, &spec).map_err(into_backend_error)).boxed_local()
    }

    fn delete_saved_query(&self, id: SavedQueryId) -> LocalBoxFuture<'_, BackendResult<()>> {
        future::ready(self.delete_query(id).map_err(into_backend_error)).boxed_local()
    }
}

fn into_backend_error(err: RepoError) -> BackendError {
    warn!("event=saved_query_repo module=repo status=error error={err}");
    err.into()
}

fn parse_saved_query_row(row: &Row<'_>) -> RepoResult<SavedQuery> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid `{uuid_text}` in saved_queries.uuid"))
    })?;

    let spec_json: String = row.get("spec_json")?;
    let spec: QuerySpec = serde_json::from_str(&spec_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid spec_json for saved query {id}: {err}"))
    })?;

    Ok(SavedQuery {
        id,
        name: row.get("name")?,
        spec,
        updated_at_ms: row.get("updated_at")?,
    })
}
