//! Uniform API Response Envelope
//!
//! Every document-store endpoint returns the same JSON envelope so that the
//! client can distinguish success from failure without inspecting status
//! codes alone:
//!
//! ```json
//! { "success": true, "message": "Mind map created successfully", "data": { ... } }
//! { "success": false, "message": "Mind map not found" }
//! ```
//!
//! Mutating endpoints always carry the created/updated entity in `data`.

use serde::{Deserialize, Serialize};

/// Uniform success/failure envelope wrapping every API payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Human-readable message, always present on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Create a success envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Create a success envelope with a message and `data`
    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Create a failure envelope carrying only a message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Unwrap the payload of a success envelope, or the failure message
    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            self.data
                .ok_or_else(|| "Response marked success but carried no data".to_string())
        } else {
            Err(self
                .message
                .unwrap_or_else(|| "Request failed".to_string()))
        }
    }
}

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-based)
    pub current: u32,
    /// Total number of pages
    pub pages: u32,
    /// Total number of matching entities
    pub total: u64,
}
