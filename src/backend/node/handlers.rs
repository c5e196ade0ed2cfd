//! Node HTTP Handlers
//!
//! CRUD over nodes. Mutations touch the owning mind map's
//! version/last_modified and announce the change on the map's realtime
//! channel. The originating session identifies itself with the
//! `X-Session-Id` header so its own announcement can be excluded from
//! delivery.
//!
//! # Routes
//!
//! - `POST /api/nodes` - create a node
//! - `GET /api/nodes/{id}` - fetch one node
//! - `GET /api/nodes/mindmap/{id}` - all nodes of a mind map
//! - `PUT /api/nodes/{id}` - partial update
//! - `DELETE /api/nodes/{id}` - delete (cascades direct children)

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::model::{CreateNode, Node, NodeUpdate};
use crate::shared::{Envelope, MapEvent};

/// Payload carrying one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub node: Node,
}

/// Payload carrying a mind map's node set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeList {
    pub nodes: Vec<Node>,
}

/// Originating session id, used for sender exclusion on the channel
fn origin_session(headers: &HeaderMap) -> String {
    headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Create a node
pub async fn create_node(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    Json(input): Json<CreateNode>,
) -> Result<(StatusCode, Json<Envelope<NodeData>>), BackendError> {
    let node = app_state.store.create_node(user.user_id, input).await?;

    app_state
        .map_broadcast
        .broadcast(MapEvent::node_created(node.clone(), origin_session(&headers)));

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(NodeData { node })),
    ))
}

/// Fetch a single node
pub async fn get_node(
    State(app_state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<NodeData>>, BackendError> {
    let node = app_state.store.get_node(id).await?;
    Ok(Json(Envelope::ok(NodeData { node })))
}

/// All nodes of a mind map, ordered by creation time
pub async fn get_nodes_by_mind_map(
    State(app_state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(mind_map_id): Path<Uuid>,
) -> Result<Json<Envelope<NodeList>>, BackendError> {
    let nodes = app_state.store.nodes_for_map(mind_map_id).await;
    tracing::debug!("Loaded {} nodes for mind map {}", nodes.len(), mind_map_id);
    Ok(Json(Envelope::ok(NodeList { nodes })))
}

/// Partially update a node
pub async fn update_node(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(update): Json<NodeUpdate>,
) -> Result<Json<Envelope<NodeData>>, BackendError> {
    let node = app_state.store.update_node(id, user.user_id, update).await?;

    app_state
        .map_broadcast
        .broadcast(MapEvent::node_updated(node.clone(), origin_session(&headers)));

    Ok(Json(Envelope::ok(NodeData { node })))
}

/// Delete a node and its direct children
pub async fn delete_node(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, BackendError> {
    let node = app_state.store.get_node(id).await?;
    let map_id = node.mind_map;

    let removed = app_state.store.delete_node(id, user.user_id).await?;

    let origin = origin_session(&headers);
    for removed_id in removed {
        app_state
            .map_broadcast
            .broadcast(MapEvent::node_deleted(map_id, removed_id, origin.clone()));
    }

    Ok(Json(Envelope::ok_with_message(
        "Node deleted successfully",
        (),
    )))
}
