//! Login Handler
//!
//! POST /api/auth/login - verifies a username (or email) and password and
//! issues a credential pair: a 7-day access token and a 30-day refresh
//! token.
//!
//! # Security
//!
//! - Passwords are verified with bcrypt
//! - Unknown user and wrong password return the same error (no enumeration)
//! - Passwords are never logged or returned

use axum::{extract::State, response::Json};
use bcrypt::verify;
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::backend::auth::sessions::issue_tokens;
use crate::backend::auth::users::{get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::shared::Envelope;

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - unknown user or wrong password
/// * `500 Internal Server Error` - database or token generation failure
pub async fn login(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<AuthResponse>>, BackendError> {
    let pool = pool.ok_or_else(|| {
        tracing::error!("Database not configured, cannot log in users");
        BackendError::auth("Authentication service unavailable")
    })?;
    tracing::info!("Login request for: {}", request.username);

    // Accept either a username or an email in the same field.
    let user = if request.username.contains('@') {
        get_user_by_email(&pool, &request.username).await?
    } else {
        get_user_by_username(&pool, &request.username).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User not found: {}", request.username);
        BackendError::auth("Invalid username or password")
    })?;

    let valid = verify(&request.password, &user.password_hash)
        .map_err(|e| BackendError::state(format!("Password verification failed: {}", e)))?;
    if !valid {
        tracing::warn!("Invalid password for user: {}", request.username);
        return Err(BackendError::auth("Invalid username or password"));
    }

    let tokens = issue_tokens(user.id, &user.email)
        .map_err(|e| BackendError::state(format!("Token generation failed: {}", e)))?;

    tracing::info!("User logged in: {} ({})", user.username, user.email);

    Ok(Json(Envelope::ok(AuthResponse {
        token: tokens.token,
        refresh_token: tokens.refresh_token,
        user: UserResponse::from(user),
    })))
}
