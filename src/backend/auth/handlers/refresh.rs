//! Refresh Handler
//!
//! POST /api/auth/refresh - exchanges a valid refresh token for a fresh
//! credential pair. The client falls back to this exactly once per failed
//! request; when the refresh itself fails it clears stored credentials and
//! returns to login.

use axum::{extract::State, response::Json};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::handlers::types::{AuthResponse, RefreshRequest, UserResponse};
use crate::backend::auth::sessions::{issue_tokens, verify_token, TokenUse};
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::shared::Envelope;

/// Refresh handler
///
/// # Errors
///
/// * `401 Unauthorized` - invalid or expired refresh token, or the user no
///   longer exists
pub async fn refresh(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<Envelope<AuthResponse>>, BackendError> {
    let pool = pool.ok_or_else(|| {
        tracing::error!("Database not configured, cannot refresh credentials");
        BackendError::auth("Authentication service unavailable")
    })?;

    let claims = verify_token(&request.refresh_token, TokenUse::Refresh)
        .map_err(|e| BackendError::auth(e))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| BackendError::auth("Invalid user ID in refresh token"))?;

    let user = get_user_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| BackendError::auth("User no longer exists"))?;

    let tokens = issue_tokens(user.id, &user.email)
        .map_err(|e| BackendError::state(format!("Token generation failed: {}", e)))?;

    tracing::debug!("Credentials refreshed for {}", user.username);

    Ok(Json(Envelope::ok(AuthResponse {
        token: tokens.token,
        refresh_token: tokens.refresh_token,
        user: UserResponse::from(user),
    })))
}
