//! Server Configuration
//!
//! Loading and validation of server configuration, focusing on the
//! optional Postgres connection backing the user store.
//!
//! # Error Handling
//!
//! Configuration errors are logged but do not prevent server startup.
//! When the database cannot be reached the pool is `None` and the server
//! runs without persistent user accounts.

use sqlx::PgPool;

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

/// Load and initialize the database connection pool.
///
/// Reads `DATABASE_URL` from the environment, connects, and creates the
/// users table when missing.
///
/// Returns `None` if `DATABASE_URL` is not set or the connection fails -
/// the server then starts without database-backed auth.
pub async fn load_database() -> DatabaseConfig {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Auth persistence disabled.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Auth persistence disabled.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    if let Err(e) = crate::backend::auth::users::ensure_schema(&pool).await {
        tracing::error!("Failed to ensure users schema: {:?}", e);
        // The table may already exist with a compatible shape.
    }

    Some(pool)
}
