//! Client Configuration and Credential Storage
//!
//! Holds the server URL plus the current credential pair. Credentials are
//! persisted to a JSON file under the platform config directory so a
//! restarted client stays logged in, and are attached as a bearer
//! credential on every document-store request. They are cleared when a
//! refresh attempt fails, which is the signal to return to login.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Persisted credential pair
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoredCredentials {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Client configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
    credentials: StoredCredentials,
    storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let server_url =
            std::env::var("CLIENT_API_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let app = AppConfig::builder()
            .server_url(server_url)
            .build()
            .unwrap_or_default();
        let mut config = Self {
            app,
            credentials: StoredCredentials::default(),
            storage_path: default_storage_path(),
        };
        config.load_credentials();
        config
    }
}

/// Platform config file holding the credential pair
fn default_storage_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mindcanvas").join("credentials.json"))
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        let mut config = Self {
            app,
            credentials: StoredCredentials::default(),
            storage_path: default_storage_path(),
        };
        config.load_credentials();
        Ok(config)
    }

    /// Override the credential storage location (used by tests)
    pub fn with_storage_path(mut self, path: PathBuf) -> Self {
        self.storage_path = Some(path);
        self.credentials = StoredCredentials::default();
        self.load_credentials();
        self
    }

    /// Set both credentials and persist them
    pub fn set_credentials(&mut self, token: String, refresh_token: String) {
        self.credentials.token = Some(token);
        self.credentials.refresh_token = Some(refresh_token);
        self.save_credentials();
    }

    /// Get the current access token
    pub fn token(&self) -> Option<&str> {
        self.credentials.token.as_deref()
    }

    /// Get the current refresh token
    pub fn refresh_token(&self) -> Option<&str> {
        self.credentials.refresh_token.as_deref()
    }

    /// Clear both credentials and remove the stored file (logout, or a
    /// failed refresh)
    pub fn clear_credentials(&mut self) {
        self.credentials = StoredCredentials::default();
        if let Some(path) = &self.storage_path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!("Failed to remove stored credentials: {}", e);
                }
            }
        }
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    fn load_credentials(&mut self) {
        let Some(path) = &self.storage_path else {
            return;
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(credentials) => self.credentials = credentials,
                Err(e) => tracing::warn!("Ignoring malformed credential file: {}", e),
            },
            Err(_) => {
                // No stored credentials yet.
            }
        }
    }

    fn save_credentials(&self) {
        let Some(path) = &self.storage_path else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create credential directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(&self.credentials) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(path, raw) {
                    tracing::warn!("Failed to persist credentials: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize credentials: {}", e),
        }
    }
}
