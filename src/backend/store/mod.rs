//! Server-Side Document Store
//!
//! The document store is the sole arbiter of consistency for concurrent
//! writers: plain get/put/delete per entity, no per-entity locking and no
//! compare-and-swap on the version counter. Concurrent updates to the same
//! node from two sessions simply overwrite in receipt order (last write
//! wins).

pub mod query;
pub mod state;

pub use query::{MindMapQuery, SortField, SortOrder};
pub use state::DocumentStore;

use thiserror::Error;

/// Errors surfaced by document store operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Entity not found, or caller is not owner/collaborator
    #[error("{message}")]
    NotFound { message: String },

    /// Caller lacks owner/editor rights on the target entity
    #[error("{message}")]
    Forbidden { message: String },

    /// Malformed or out-of-range input
    #[error("Validation error in field '{field}': {message}")]
    Validation { field: String, message: String },
}

impl StoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<crate::shared::SharedError> for StoreError {
    fn from(err: crate::shared::SharedError) -> Self {
        match err {
            crate::shared::SharedError::ValidationError { field, message } => {
                Self::Validation { field, message }
            }
            crate::shared::SharedError::SerializationError { message } => Self::Validation {
                field: "body".to_string(),
                message,
            },
        }
    }
}
