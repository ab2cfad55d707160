//! Background job records and list filters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable job identifier assigned by the backend.
pub type JobId = Uuid;

/// Lifecycle state reported for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Returns whether the job can still change state.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }
}

/// One job row as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub status: JobStatus,
    /// Completion percentage, `0..=100`.
    pub progress: u8,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
}

impl Job {
    /// Creates a queued job with a fresh id. Mostly useful for fixtures.
    pub fn new(name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status,
            progress: 0,
            created_at_ms: 0,
        }
    }
}

/// Filter and pagination sent with every job list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub search: String,
    /// Zero-based page index.
    pub page: u32,
    pub page_size: u32,
}

impl JobFilter {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            status: None,
            search: String::new(),
            page: 0,
            page_size,
        }
    }

    /// Number of rows before the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }
}
