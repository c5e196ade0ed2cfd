//! Session Management and JWT Tokens
//!
//! Credential issuance and verification: access tokens valid for 7 days,
//! refresh tokens for 30 days. Both are HS256 JWTs distinguished by a
//! `token_use` claim so a refresh token can never authenticate a request
//! directly.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Access token validity: 7 days
const ACCESS_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;
/// Refresh token validity: 30 days
const REFRESH_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Distinguishes access tokens from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// What this token may be used for
    pub token_use: TokenUse,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// A freshly issued credential pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Get JWT secret from environment
fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|err| {
        tracing::warn!("Missing JWT_SECRET ({}), using development default", err);
        "dev-secret-change-in-production".to_string()
    })
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn create_token(
    user_id: Uuid,
    email: &str,
    token_use: TokenUse,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = now_secs();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_use,
        exp: now + ttl_secs,
        iat: now,
    };

    let secret = get_jwt_secret();
    let key = EncodingKey::from_secret(secret.as_ref());
    encode(&Header::default(), &claims, &key)
}

/// Issue an access + refresh token pair for a user.
pub fn issue_tokens(user_id: Uuid, email: &str) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        token: create_token(user_id, email, TokenUse::Access, ACCESS_TOKEN_TTL_SECS)?,
        refresh_token: create_token(user_id, email, TokenUse::Refresh, REFRESH_TOKEN_TTL_SECS)?,
    })
}

/// Verify and decode a token of the expected use.
pub fn verify_token(token: &str, expected: TokenUse) -> Result<Claims, String> {
    let secret = get_jwt_secret();
    let key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| format!("Token verification failed: {}", e))?;

    if token_data.claims.token_use != expected {
        return Err("Token used in the wrong context".to_string());
    }
    Ok(token_data.claims)
}

/// Extract the user id from a verified access token.
pub fn user_id_from_token(token: &str) -> Result<Uuid, String> {
    let claims = verify_token(token, TokenUse::Access)?;
    Uuid::parse_str(&claims.sub).map_err(|e| format!("Invalid user ID in token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_tokens() {
        let user_id = Uuid::new_v4();
        let pair = issue_tokens(user_id, "test@example.com").unwrap();
        assert!(!pair.token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_ne!(pair.token, pair.refresh_token);
    }

    #[test]
    fn test_verify_access_token() {
        let user_id = Uuid::new_v4();
        let pair = issue_tokens(user_id, "test@example.com").unwrap();

        let claims = verify_token(&pair.token, TokenUse::Access).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let pair = issue_tokens(Uuid::new_v4(), "test@example.com").unwrap();
        assert!(verify_token(&pair.refresh_token, TokenUse::Access).is_err());
        assert!(verify_token(&pair.refresh_token, TokenUse::Refresh).is_ok());
    }

    #[test]
    fn test_verify_invalid_token() {
        assert!(verify_token("invalid.token.here", TokenUse::Access).is_err());
    }

    #[test]
    fn test_user_id_from_token() {
        let user_id = Uuid::new_v4();
        let pair = issue_tokens(user_id, "test@example.com").unwrap();
        assert_eq!(user_id_from_token(&pair.token).unwrap(), user_id);
    }
}
