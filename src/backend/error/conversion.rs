//! Error Conversion
//!
//! Conversion implementations for backend errors, allowing them to be
//! returned directly from Axum handlers. The error becomes the uniform
//! failure envelope with the appropriate status code:
//!
//! ```json
//! { "success": false, "message": "Mind map not found" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::backend::error::types::BackendError;
use crate::shared::Envelope;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {:?}", self);
        } else {
            tracing::debug!("Request failed with {}: {}", status, message);
        }

        let body: Envelope<()> = Envelope::fail(message);
        (status, Json(body)).into_response()
    }
}
