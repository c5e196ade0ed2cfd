//! Public API Route Handlers
//!
//! Routes that do not require an authenticated principal:
//!
//! - `POST /api/auth/signup` - User registration
//! - `POST /api/auth/login` - User login
//! - `POST /api/auth/refresh` - Credential refresh
//! - `GET /api/health` - Liveness probe

use axum::{response::Json, Router};

use crate::backend::auth::{login, refresh, signup};
use crate::backend::server::state::AppState;
use crate::shared::Envelope;

/// Liveness probe payload
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

/// Health check endpoint
pub async fn health() -> Json<Envelope<Health>> {
    Json(Envelope::ok(Health {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Configure the public API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/signup", axum::routing::post(signup))
        .route("/api/auth/login", axum::routing::post(login))
        .route("/api/auth/refresh", axum::routing::post(refresh))
        .route("/api/health", axum::routing::get(health))
}
