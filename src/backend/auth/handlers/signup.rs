//! Signup Handler
//!
//! POST /api/auth/signup - creates a user account and issues a credential
//! pair. Passwords are hashed with bcrypt before they touch the database.

use axum::{extract::State, response::Json};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest, UserResponse};
use crate::backend::auth::sessions::issue_tokens;
use crate::backend::auth::users::{create_user, get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::shared::Envelope;

/// Signup handler
///
/// # Errors
///
/// * `400 Bad Request` - invalid username/email/password
/// * `500 Internal Server Error` - database or hashing failure
/// * `503`-equivalent auth failure when no database is configured
pub async fn signup(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<Envelope<AuthResponse>>, BackendError> {
    let pool = pool.ok_or_else(|| {
        tracing::error!("Database not configured, cannot sign up users");
        BackendError::auth("Authentication service unavailable")
    })?;

    let username = request.username.trim().to_string();
    if username.len() < 3 || username.len() > 30 {
        return Err(BackendError::validation(
            "username",
            "Username must be between 3 and 30 characters",
        ));
    }
    if !request.email.contains('@') {
        return Err(BackendError::validation("email", "Invalid email address"));
    }
    if request.password.len() < 8 {
        return Err(BackendError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }

    if get_user_by_username(&pool, &username).await?.is_some() {
        return Err(BackendError::validation("username", "Username already taken"));
    }
    if get_user_by_email(&pool, &request.email).await?.is_some() {
        return Err(BackendError::validation("email", "Email already registered"));
    }

    let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
        .map_err(|e| BackendError::state(format!("Password hashing failed: {}", e)))?;

    let user = create_user(&pool, username, request.email, password_hash).await?;
    let tokens = issue_tokens(user.id, &user.email)
        .map_err(|e| BackendError::state(format!("Token generation failed: {}", e)))?;

    tracing::info!("User signed up: {} ({})", user.username, user.email);

    Ok(Json(Envelope::ok(AuthResponse {
        token: tokens.token,
        refresh_token: tokens.refresh_token,
        user: UserResponse::from(user),
    })))
}
