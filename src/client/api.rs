//! Document Store Client
//!
//! Typed HTTP access to the document store. Every operation returns a
//! success/failure outcome carrying either the entity or a user-facing
//! message - errors never panic across this boundary.
//!
//! # Credential Handling
//!
//! The current access token rides along as a bearer credential on every
//! request; the session id rides in `X-Session-Id` so the server can
//! exclude this session from its own broadcasts. A `401` triggers exactly
//! one refresh attempt followed by a retry; if the refresh also fails the
//! stored credentials are cleared and the failure is flagged `logged_out`
//! - the caller's signal to return to login.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::client::config::Config;
use crate::shared::envelope::Pagination;
use crate::shared::model::{
    AddCollaborator, CreateMindMap, CreateNode, MindMap, MindMapUpdate, Node, NodeUpdate,
};
use crate::shared::Envelope;

/// Client-side failure taxonomy.
///
/// Mirrors how failures are surfaced to the user: validation inline,
/// authorization and not-found as messages, transient failures compensated
/// by rolling back the optimistic change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Malformed input; the request was rejected (or never sent)
    #[error("Validation error in field '{field}': {message}")]
    Validation { field: String, message: String },

    /// Missing/expired/invalid credential
    #[error("Authentication error: {message}")]
    Auth {
        message: String,
        /// True when the refresh attempt also failed and stored
        /// credentials were cleared - redirect to login
        logged_out: bool,
    },

    /// Caller lacks owner/editor rights
    #[error("{message}")]
    Authorization { message: String },

    /// Entity not found, or caller is not a member
    #[error("{message}")]
    NotFound { message: String },

    /// Network or server failure; the optimistic change is rolled back
    #[error("Request failed: {message}")]
    Transient { message: String },
}

impl ClientError {
    fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
        }
    }
}

/// Public user info returned by auth endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Credential pair plus user info from login/signup/refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

/// Payload shapes mirrored from the server envelope
#[derive(Debug, Clone, Deserialize)]
struct MindMapData {
    mindmap: MindMap,
}

#[derive(Debug, Clone, Deserialize)]
struct MindMapWithNodes {
    mindmap: MindMap,
    nodes: Vec<Node>,
}

/// One page of the caller's mind maps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindMapPage {
    pub mindmaps: Vec<MindMap>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
struct NodeData {
    node: Node,
}

/// Parameters for the list endpoint
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub tags: Option<Vec<String>>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(page) = self.page {
            parts.push(format!("page={}", page));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        if let Some(search) = &self.search {
            parts.push(format!("search={}", search));
        }
        if let Some(tags) = &self.tags {
            parts.push(format!("tags={}", tags.join(",")));
        }
        if let Some(sort_by) = &self.sort_by {
            parts.push(format!("sort_by={}", sort_by));
        }
        if let Some(sort_order) = &self.sort_order {
            parts.push(format!("sort_order={}", sort_order));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

/// Typed document store client.
pub struct StoreClient {
    config: Config,
    session_id: String,
    http: reqwest::blocking::Client,
}

impl StoreClient {
    pub fn new(config: Config, session_id: String) -> Self {
        Self {
            config,
            session_id,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    // ---- auth ----

    /// Log in with username (or email) and password.
    pub fn login(&mut self, username: &str, password: &str) -> Result<AuthSession, ClientError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let session: AuthSession = self.post_public("/api/auth/login", &body)?;
        self.config
            .set_credentials(session.token.clone(), session.refresh_token.clone());
        Ok(session)
    }

    /// Create an account and log in.
    pub fn signup(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError> {
        let body =
            serde_json::json!({ "username": username, "email": email, "password": password });
        let session: AuthSession = self.post_public("/api/auth/signup", &body)?;
        self.config
            .set_credentials(session.token.clone(), session.refresh_token.clone());
        Ok(session)
    }

    /// Current authenticated user.
    pub fn me(&mut self) -> Result<UserInfo, ClientError> {
        self.request_json(reqwest::Method::GET, "/api/auth/me", None)
    }

    // ---- mind maps ----

    pub fn list_mind_maps(&mut self, query: &ListQuery) -> Result<MindMapPage, ClientError> {
        let path = format!("/api/mindmaps{}", query.to_query_string());
        self.request_json(reqwest::Method::GET, &path, None)
    }

    /// Fetch one mind map together with its full node set.
    pub fn get_mind_map(&mut self, id: Uuid) -> Result<(MindMap, Vec<Node>), ClientError> {
        let data: MindMapWithNodes =
            self.request_json(reqwest::Method::GET, &format!("/api/mindmaps/{}", id), None)?;
        Ok((data.mindmap, data.nodes))
    }

    pub fn create_mind_map(&mut self, input: &CreateMindMap) -> Result<MindMap, ClientError> {
        let body = serde_json::to_value(input).map_err(|e| ClientError::transient(e.to_string()))?;
        let data: MindMapData =
            self.request_json(reqwest::Method::POST, "/api/mindmaps", Some(body))?;
        Ok(data.mindmap)
    }

    pub fn update_mind_map(
        &mut self,
        id: Uuid,
        update: &MindMapUpdate,
    ) -> Result<MindMap, ClientError> {
        let body =
            serde_json::to_value(update).map_err(|e| ClientError::transient(e.to_string()))?;
        let data: MindMapData = self.request_json(
            reqwest::Method::PUT,
            &format!("/api/mindmaps/{}", id),
            Some(body),
        )?;
        Ok(data.mindmap)
    }

    pub fn delete_mind_map(&mut self, id: Uuid) -> Result<(), ClientError> {
        let _: Option<serde_json::Value> = self.request_envelope(
            reqwest::Method::DELETE,
            &format!("/api/mindmaps/{}", id),
            None,
        )?;
        Ok(())
    }

    pub fn add_collaborator(
        &mut self,
        id: Uuid,
        input: &AddCollaborator,
    ) -> Result<MindMap, ClientError> {
        let body = serde_json::to_value(input).map_err(|e| ClientError::transient(e.to_string()))?;
        let data: MindMapData = self.request_json(
            reqwest::Method::POST,
            &format!("/api/mindmaps/{}/collaborators", id),
            Some(body),
        )?;
        Ok(data.mindmap)
    }

    // ---- nodes ----

    pub fn create_node(&mut self, input: &CreateNode) -> Result<Node, ClientError> {
        // Validate locally so malformed input never leaves the client.
        Node::validate_title(&input.title).map_err(client_validation)?;
        Node::validate_position(&input.position).map_err(client_validation)?;

        let body = serde_json::to_value(input).map_err(|e| ClientError::transient(e.to_string()))?;
        let data: NodeData = self.request_json(reqwest::Method::POST, "/api/nodes", Some(body))?;
        Ok(data.node)
    }

    pub fn get_node(&mut self, id: Uuid) -> Result<Node, ClientError> {
        let data: NodeData =
            self.request_json(reqwest::Method::GET, &format!("/api/nodes/{}", id), None)?;
        Ok(data.node)
    }

    pub fn update_node(&mut self, id: Uuid, update: &NodeUpdate) -> Result<Node, ClientError> {
        if let Some(title) = &update.title {
            Node::validate_title(title).map_err(client_validation)?;
        }
        if let Some(position) = &update.position {
            Node::validate_position(position).map_err(client_validation)?;
        }

        let body =
            serde_json::to_value(update).map_err(|e| ClientError::transient(e.to_string()))?;
        let data: NodeData = self.request_json(
            reqwest::Method::PUT,
            &format!("/api/nodes/{}", id),
            Some(body),
        )?;
        Ok(data.node)
    }

    pub fn delete_node(&mut self, id: Uuid) -> Result<(), ClientError> {
        let _: Option<serde_json::Value> =
            self.request_envelope(reqwest::Method::DELETE, &format!("/api/nodes/{}", id), None)?;
        Ok(())
    }

    // ---- plumbing ----

    /// Unauthenticated POST used by the auth issuance endpoints.
    fn post_public<T: serde::de::DeserializeOwned>(
        &mut self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ClientError> {
        let url = self.config.api_url(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| ClientError::transient(format!("Network error: {}", e)))?;
        Self::decode(response)
    }

    fn request_json<T: serde::de::DeserializeOwned>(
        &mut self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ClientError> {
        match self.request_envelope(method, path, body)? {
            Some(data) => Ok(data),
            None => Err(ClientError::transient(
                "Response marked success but carried no data",
            )),
        }
    }

    /// Issue an authenticated request, refreshing the credential once on 401.
    fn request_envelope<T: serde::de::DeserializeOwned>(
        &mut self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Option<T>, ClientError> {
        let response = self.send(method.clone(), path, body.as_ref())?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.refresh_credentials()?;
            let retried = self.send(method, path, body.as_ref())?;
            return Self::decode_envelope(retried);
        }

        Self::decode_envelope(response)
    }

    fn send(
        &mut self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let url = self.config.api_url(path);
        let mut request = self
            .http
            .request(method, &url)
            .header("x-session-id", self.session_id.clone());
        if let Some(token) = self.config.token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .map_err(|e| ClientError::transient(format!("Network error: {}", e)))
    }

    /// Exchange the refresh token for a new pair, clearing credentials on
    /// failure so the caller can redirect to login.
    fn refresh_credentials(&mut self) -> Result<(), ClientError> {
        let Some(refresh_token) = self.config.refresh_token().map(String::from) else {
            self.config.clear_credentials();
            return Err(ClientError::Auth {
                message: "Session expired".to_string(),
                logged_out: true,
            });
        };

        let body = serde_json::json!({ "refresh_token": refresh_token });
        let url = self.config.api_url("/api/auth/refresh");
        let result = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ClientError::transient(format!("Network error: {}", e)))
            .and_then(Self::decode::<AuthSession>);

        match result {
            Ok(session) => {
                tracing::debug!("Credentials refreshed");
                self.config
                    .set_credentials(session.token, session.refresh_token);
                Ok(())
            }
            Err(_) => {
                tracing::warn!("Credential refresh failed, clearing stored credentials");
                self.config.clear_credentials();
                Err(ClientError::Auth {
                    message: "Session expired, please log in again".to_string(),
                    logged_out: true,
                })
            }
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, ClientError> {
        match Self::decode_envelope(response)? {
            Some(data) => Ok(data),
            None => Err(ClientError::transient(
                "Response marked success but carried no data",
            )),
        }
    }

    fn decode_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<Option<T>, ClientError> {
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ClientError::transient(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            let envelope: Envelope<T> = serde_json::from_str(&text)
                .map_err(|e| ClientError::transient(format!("Failed to parse response: {}", e)))?;
            if !envelope.success {
                return Err(ClientError::transient(
                    envelope.message.unwrap_or_else(|| "Request failed".into()),
                ));
            }
            return Ok(envelope.data);
        }

        // Failure envelope: extract the message, then map by status.
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.to_string());

        Err(match status.as_u16() {
            400 => ClientError::Validation {
                field: "request".to_string(),
                message,
            },
            401 => ClientError::Auth {
                message,
                logged_out: false,
            },
            403 => ClientError::Authorization { message },
            404 => ClientError::NotFound { message },
            _ => ClientError::Transient { message },
        })
    }
}

fn client_validation(err: crate::shared::SharedError) -> ClientError {
    match err {
        crate::shared::SharedError::ValidationError { field, message } => {
            ClientError::Validation { field, message }
        }
        crate::shared::SharedError::SerializationError { message } => {
            ClientError::Transient { message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model::Point;

    fn test_client(server_url: &str, dir: &tempfile::TempDir) -> StoreClient {
        let config = Config::with_builder(
            crate::shared::config::AppConfig::builder().server_url(server_url.to_string()),
        )
        .unwrap()
        .with_storage_path(dir.path().join("credentials.json"));
        StoreClient::new(config, "session-test".to_string())
    }

    #[test]
    fn test_create_node_validates_locally() {
        let dir = tempfile::tempdir().unwrap();
        // No server needed: validation fails before any request is sent.
        let mut client = test_client("http://127.0.0.1:9", &dir);

        let err = client
            .create_node(&CreateNode {
                mind_map: Uuid::new_v4(),
                title: "   ".to_string(),
                content: String::new(),
                position: Point::new(0.0, 0.0),
                parent: None,
                size: None,
                style: None,
                kind: Default::default(),
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
    }

    #[test]
    fn test_login_stores_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        let body = serde_json::json!({
            "success": true,
            "data": {
                "token": "access-token",
                "refresh_token": "refresh-token",
                "user": { "id": "u1", "username": "alice", "email": "a@example.com" }
            }
        });
        let _mock = server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create();

        let mut client = test_client(&server.url(), &dir);
        let session = client.login("alice", "password123").unwrap();
        assert_eq!(session.user.username, "alice");
        assert_eq!(client.config().token(), Some("access-token"));
    }

    #[test]
    fn test_not_found_maps_to_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        let id = Uuid::new_v4();
        let _mock = server
            .mock("GET", format!("/api/mindmaps/{}", id).as_str())
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":false,"message":"Mind map not found"}"#)
            .create();

        let mut client = test_client(&server.url(), &dir);
        let err = client.get_mind_map(id).unwrap_err();
        assert_eq!(
            err,
            ClientError::NotFound {
                message: "Mind map not found".to_string()
            }
        );
    }

    #[test]
    fn test_failed_refresh_clears_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = mockito::Server::new();
        let id = Uuid::new_v4();
        let _unauthorized = server
            .mock("GET", format!("/api/mindmaps/{}", id).as_str())
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Authentication error"}"#)
            .create();
        let _refresh = server
            .mock("POST", "/api/auth/refresh")
            .with_status(401)
            .with_body(r#"{"success":false,"message":"Authentication error"}"#)
            .create();

        let mut client = test_client(&server.url(), &dir);
        client
            .config
            .set_credentials("stale".to_string(), "stale-refresh".to_string());

        let err = client.get_mind_map(id).unwrap_err();
        assert!(matches!(err, ClientError::Auth { logged_out: true, .. }));
        assert!(client.config().token().is_none());
    }

    #[test]
    fn test_list_query_string() {
        let query = ListQuery {
            page: Some(2),
            limit: Some(5),
            search: Some("plan".to_string()),
            tags: Some(vec!["work".to_string(), "urgent".to_string()]),
            sort_by: Some("title".to_string()),
            sort_order: Some("asc".to_string()),
        };
        assert_eq!(
            query.to_query_string(),
            "?page=2&limit=5&search=plan&tags=work,urgent&sort_by=title&sort_order=asc"
        );
        assert_eq!(ListQuery::default().to_query_string(), "");
    }
}
