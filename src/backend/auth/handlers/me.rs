//! Current User Handler
//!
//! GET /api/auth/me - returns the authenticated principal's public profile.

use axum::{extract::State, response::Json};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::shared::Envelope;

/// Get the current authenticated user
pub async fn get_me(
    State(pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<UserResponse>>, BackendError> {
    let pool = pool.ok_or_else(|| BackendError::auth("Authentication service unavailable"))?;

    let record = get_user_by_id(&pool, user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    Ok(Json(Envelope::ok(UserResponse::from(record))))
}
