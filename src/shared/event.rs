//! Realtime Event System
//!
//! This module defines the events broadcast over a mind map's realtime
//! channel. Each open mind map session joins a channel scoped to that map's
//! id; node mutations are announced as events carrying the affected node
//! (or its id, for deletions) plus the originating session id so the sender
//! can be excluded from delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::model::Node;

/// Kind of mind map mutation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapEventKind {
    /// A node was created
    #[serde(rename = "node-created")]
    NodeCreated,
    /// A node was updated (position, size, style, connections, ...)
    #[serde(rename = "node-updated")]
    NodeUpdated,
    /// A node was deleted
    #[serde(rename = "node-deleted")]
    NodeDeleted,
}

impl MapEventKind {
    /// Wire name used as the SSE event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeCreated => "node-created",
            Self::NodeUpdated => "node-updated",
            Self::NodeDeleted => "node-deleted",
        }
    }
}

/// A mutation event broadcast to every other session joined to the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEvent {
    pub kind: MapEventKind,
    /// Channel scope: the mind map the mutation belongs to
    pub mind_map_id: Uuid,
    /// The affected node id (always present, also for deletions)
    pub node_id: Uuid,
    /// The affected node; `None` for deletions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<Node>,
    /// Session id of the originating client; used for sender exclusion
    #[serde(default)]
    pub origin: String,
    pub timestamp: DateTime<Utc>,
}

impl MapEvent {
    pub fn node_created(node: Node, origin: impl Into<String>) -> Self {
        Self {
            kind: MapEventKind::NodeCreated,
            mind_map_id: node.mind_map,
            node_id: node.id,
            node: Some(node),
            origin: origin.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn node_updated(node: Node, origin: impl Into<String>) -> Self {
        Self {
            kind: MapEventKind::NodeUpdated,
            mind_map_id: node.mind_map,
            node_id: node.id,
            node: Some(node),
            origin: origin.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn node_deleted(mind_map_id: Uuid, node_id: Uuid, origin: impl Into<String>) -> Self {
        Self {
            kind: MapEventKind::NodeDeleted,
            mind_map_id,
            node_id,
            node: None,
            origin: origin.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Generate a unique session id for an open mind map session.
///
/// The id travels with every mutation the session issues so that its own
/// announcements can be filtered out of the broadcast stream.
pub fn generate_session_id() -> String {
    format!("session-{}", Uuid::new_v4())
}
