//! Opaque backend failure.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BackendResult<T> = Result<T, BackendError>;

/// Coarse failure category, used only for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Request never produced a usable response.
    Transport,
    /// Backend answered but refused the request.
    Rejected,
    /// Requested record does not exist.
    NotFound,
}

impl BackendErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Rejected => "rejected",
            Self::NotFound => "not_found",
        }
    }
}

/// Failure reported by a backend-access collaborator.
///
/// Stores never branch on the content; it only tells them the operation did
/// not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    kind: BackendErrorKind,
    message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Rejected, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::NotFound, message)
    }

    pub fn kind(&self) -> BackendErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "backend {} error: {}", self.kind.as_str(), self.message)
    }
}

impl Error for BackendError {}
