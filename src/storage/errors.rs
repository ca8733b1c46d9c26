//! Storage-specific error types.
//!
//! These describe failures of the host store itself, separate from SCIM
//! protocol errors. The controller maps them onto HTTP statuses.

use crate::schema::ResourceKind;
use std::fmt;

/// Errors raised by a [`StorageProvider`](super::StorageProvider).
#[derive(Debug)]
pub enum StorageError {
    /// No record with this id.
    NotFound { kind: ResourceKind, id: String },

    /// The record changed since the version the caller expected.
    VersionMismatch { id: String },

    /// The backend cannot be reached right now.
    Unavailable { message: String },

    /// Any other backend failure.
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound { kind, id } => write!(f, "Record not found: {}/{}", kind, id),
            StorageError::VersionMismatch { id } => {
                write!(f, "Record {} was modified concurrently", id)
            }
            StorageError::Unavailable { message } => write!(f, "Storage unavailable: {}", message),
            StorageError::Backend { message, .. } => write!(f, "Storage backend error: {}", message),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Backend {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl StorageError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn version_mismatch(id: impl Into<String>) -> Self {
        Self::VersionMismatch { id: id.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a backend's own error type.
    pub fn backend_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::VersionMismatch { .. })
    }

    /// Might succeed on retry.
    pub fn is_temporary(&self) -> bool {
        matches!(self, StorageError::Unavailable { .. })
    }
}
