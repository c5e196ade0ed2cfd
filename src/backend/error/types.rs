//! Backend Error Types
//!
//! This module defines error types specific to the backend server. These
//! errors are used in HTTP handlers and can be converted to HTTP responses
//! carrying the uniform failure envelope.
//!
//! # Error Types
//!
//! - `Validation` - malformed or out-of-range request input (400)
//! - `Auth` - missing/expired/invalid credential (401)
//! - `Forbidden` - caller lacks owner/editor rights on the target map (403)
//! - `NotFound` - entity does not resolve, or caller is not a member (404)
//! - `State` - application state management failure (500)
//! - `Database` - sqlx failure while touching the user store (500)

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// Each variant maps to one HTTP status code; the message is always safe to
/// show to the end user.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Malformed or out-of-range request input
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Missing, expired or invalid credential
    #[error("Authentication error: {message}")]
    Auth {
        /// Human-readable error message
        message: String,
    },

    /// Caller lacks owner/editor rights on the target entity
    #[error("{message}")]
    Forbidden {
        /// Human-readable error message
        message: String,
    },

    /// Entity not found, or caller is not owner/collaborator
    #[error("{message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Application state management error
    #[error("State error: {message}")]
    State {
        /// Human-readable error message
        message: String,
    },

    /// Database error from the user store
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// Shared error (from the shared module)
    #[error(transparent)]
    Shared(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new authorization error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Auth { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::State { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shared(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message
    pub fn message(&self) -> String {
        match self {
            Self::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { message } => Self::NotFound { message },
            StoreError::Forbidden { message } => Self::Forbidden { message },
            StoreError::Validation { field, message } => Self::Validation { field, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            BackendError::validation("title", "empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BackendError::auth("bad token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::forbidden("not yours").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BackendError::not_found("gone").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackendError::state("lock poisoned").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_message_is_opaque() {
        let err = BackendError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_from_store_error() {
        let err: BackendError = StoreError::not_found("Mind map not found").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Mind map not found");
    }

    #[test]
    fn test_from_shared_error() {
        let shared = SharedError::validation("position", "must be finite");
        let err: BackendError = shared.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
