//! Document Store State
//!
//! In-memory state container holding every mind map and node, shared across
//! handlers behind `Arc<RwLock<>>`. Mutations touch the owning mind map's
//! version and last_modified together, so the version counter strictly
//! increases on each successful mutation.
//!
//! Deleting a node also deletes every node whose `parent` equals it - a
//! single-level cascade, not a full subtree walk - and never cleans up
//! connection entries on other nodes that point at the deleted ids; the
//! client filters such dangling references at render time.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::store::{MindMapQuery, StoreError};
use crate::shared::envelope::Pagination;
use crate::shared::model::{
    AddCollaborator, Collaborator, CreateMindMap, CreateNode, MindMap, MindMapUpdate, Node,
    NodeKind, NodeMetadata, NodeStyle, NodeUpdate, Point, Size,
};

/// Title given to the root node created with every new mind map
pub const ROOT_NODE_TITLE: &str = "Central Topic";

/// Shared in-memory document store.
///
/// Cloning the store clones the handle, not the data.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    mind_maps: Arc<RwLock<HashMap<Uuid, MindMap>>>,
    nodes: Arc<RwLock<HashMap<Uuid, Node>>>,
}

impl DocumentStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mind map and its "Central Topic" root node atomically.
    pub async fn create_mind_map(
        &self,
        owner: Uuid,
        input: CreateMindMap,
    ) -> Result<(MindMap, Node), StoreError> {
        MindMap::validate_fields(
            Some(&input.title),
            Some(&input.description),
            Some(&input.tags),
        )?;

        let now = Utc::now();
        let map = MindMap {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            owner,
            collaborators: Vec::new(),
            is_public: input.is_public,
            settings: input.settings.unwrap_or_default(),
            tags: input.tags,
            created_at: now,
            last_modified: now,
            version: 1,
        };

        let root = Node {
            id: Uuid::new_v4(),
            mind_map: map.id,
            title: ROOT_NODE_TITLE.to_string(),
            content: "Click to edit".to_string(),
            position: Point::new(0.0, 0.0),
            size: Size::default(),
            style: NodeStyle::default(),
            kind: NodeKind::Text,
            metadata: NodeMetadata::default(),
            parent: None,
            children: Vec::new(),
            connections: Vec::new(),
            collapsed: false,
            z_index: 1,
            created_by: owner,
            last_modified_by: owner,
            created_at: now,
            updated_at: now,
        };

        // Both write guards held so no reader can observe the map without
        // its root node.
        let mut maps = self.mind_maps.write().await;
        let mut nodes = self.nodes.write().await;
        maps.insert(map.id, map.clone());
        nodes.insert(root.id, root.clone());

        tracing::info!("Mind map {} created by {}", map.id, owner);
        Ok((map, root))
    }

    /// Fetch a mind map and its nodes, ordered by creation time.
    ///
    /// Returns NotFound when the map does not exist or the caller is
    /// neither owner nor a listed collaborator.
    pub async fn get_mind_map(
        &self,
        id: Uuid,
        user: Uuid,
    ) -> Result<(MindMap, Vec<Node>), StoreError> {
        let maps = self.mind_maps.read().await;
        let map = maps
            .get(&id)
            .filter(|m| m.can_view(user))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Mind map not found"))?;
        drop(maps);

        let nodes = self.nodes_for_map(id).await;
        Ok((map, nodes))
    }

    /// Membership check used once at realtime channel join time.
    pub async fn authorize_view(&self, id: Uuid, user: Uuid) -> Result<(), StoreError> {
        let maps = self.mind_maps.read().await;
        maps.get(&id)
            .filter(|m| m.can_view(user))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Mind map not found"))
    }

    /// List the caller's mind maps (owner or collaborator) with filtering,
    /// sorting and pagination.
    pub async fn list_mind_maps(
        &self,
        user: Uuid,
        query: MindMapQuery,
    ) -> (Vec<MindMap>, Pagination) {
        let maps = self.mind_maps.read().await;
        let visible: Vec<MindMap> = maps
            .values()
            .filter(|m| m.can_view(user))
            .filter(|m| query.matches(m))
            .cloned()
            .collect();
        drop(maps);

        query.paginate(visible)
    }

    /// Apply a partial update; owner or editor collaborator only.
    ///
    /// Matching the store's external contract, a caller without edit rights
    /// gets NotFound rather than Forbidden (membership is not revealed).
    pub async fn update_mind_map(
        &self,
        id: Uuid,
        user: Uuid,
        update: MindMapUpdate,
    ) -> Result<MindMap, StoreError> {
        MindMap::validate_fields(
            update.title.as_deref(),
            update.description.as_deref(),
            update.tags.as_deref(),
        )?;

        let mut maps = self.mind_maps.write().await;
        let map = maps
            .get_mut(&id)
            .filter(|m| m.can_edit(user))
            .ok_or_else(|| {
                StoreError::not_found("Mind map not found or insufficient permissions")
            })?;

        if let Some(title) = update.title {
            map.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            map.description = description.trim().to_string();
        }
        if let Some(tags) = update.tags {
            map.tags = tags;
        }
        if let Some(is_public) = update.is_public {
            map.is_public = is_public;
        }
        if let Some(settings) = update.settings {
            map.settings = settings.merged_into(&map.settings);
        }
        map.touch(Utc::now());

        Ok(map.clone())
    }

    /// Delete a mind map and every node belonging to it; owner only.
    pub async fn delete_mind_map(&self, id: Uuid, user: Uuid) -> Result<(), StoreError> {
        let mut maps = self.mind_maps.write().await;
        let map = maps.get(&id).ok_or_else(|| {
            StoreError::not_found("Mind map not found or insufficient permissions")
        })?;
        if !map.is_owner(user) {
            return Err(StoreError::not_found(
                "Mind map not found or insufficient permissions",
            ));
        }
        maps.remove(&id);
        drop(maps);

        let mut nodes = self.nodes.write().await;
        nodes.retain(|_, n| n.mind_map != id);

        tracing::info!("Mind map {} deleted by {}", id, user);
        Ok(())
    }

    /// Add a collaborator; owner only, duplicates rejected.
    pub async fn add_collaborator(
        &self,
        id: Uuid,
        user: Uuid,
        input: AddCollaborator,
    ) -> Result<MindMap, StoreError> {
        let mut maps = self.mind_maps.write().await;
        let map = maps
            .get_mut(&id)
            .filter(|m| m.is_owner(user))
            .ok_or_else(|| {
                StoreError::not_found("Mind map not found or insufficient permissions")
            })?;

        if map.collaborators.iter().any(|c| c.user == input.user_id) {
            return Err(StoreError::validation(
                "user_id",
                "User is already a collaborator",
            ));
        }

        map.collaborators.push(Collaborator {
            user: input.user_id,
            role: input.role,
            added_at: Utc::now(),
        });
        map.touch(Utc::now());

        Ok(map.clone())
    }

    /// Create a node in a mind map the caller can edit; touches the parent
    /// map's version/last_modified.
    pub async fn create_node(&self, user: Uuid, input: CreateNode) -> Result<Node, StoreError> {
        Node::validate_title(&input.title)?;
        Node::validate_position(&input.position)?;

        let now = Utc::now();
        let mut maps = self.mind_maps.write().await;
        let map = maps
            .get_mut(&input.mind_map)
            .filter(|m| m.can_edit(user))
            .ok_or_else(|| StoreError::not_found("Mind map not found"))?;

        let node = Node {
            id: Uuid::new_v4(),
            mind_map: map.id,
            title: input.title.trim().to_string(),
            content: input.content,
            position: input.position,
            size: input.size.map(Size::clamped).unwrap_or_default(),
            style: input.style.map(NodeStyle::clamped).unwrap_or_default(),
            kind: input.kind,
            metadata: NodeMetadata::default(),
            parent: input.parent,
            children: Vec::new(),
            connections: Vec::new(),
            collapsed: false,
            z_index: 1,
            created_by: user,
            last_modified_by: user,
            created_at: now,
            updated_at: now,
        };
        map.touch(now);
        drop(maps);

        let mut nodes = self.nodes.write().await;
        // Keep the denormalized child list on the parent in step.
        if let Some(parent_id) = node.parent {
            if let Some(parent) = nodes.get_mut(&parent_id) {
                parent.children.push(node.id);
            }
        }
        nodes.insert(node.id, node.clone());

        Ok(node)
    }

    /// Fetch a single node by id.
    pub async fn get_node(&self, id: Uuid) -> Result<Node, StoreError> {
        let nodes = self.nodes.read().await;
        nodes
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Node not found"))
    }

    /// All nodes of a mind map, ordered by creation time.
    pub async fn nodes_for_map(&self, map_id: Uuid) -> Vec<Node> {
        let nodes = self.nodes.read().await;
        let mut list: Vec<Node> = nodes
            .values()
            .filter(|n| n.mind_map == map_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        list
    }

    /// Apply a partial node update; owner or editor collaborator only.
    pub async fn update_node(
        &self,
        id: Uuid,
        user: Uuid,
        update: NodeUpdate,
    ) -> Result<Node, StoreError> {
        if let Some(title) = &update.title {
            Node::validate_title(title)?;
        }
        if let Some(position) = &update.position {
            Node::validate_position(position)?;
        }

        let now = Utc::now();
        let mut maps = self.mind_maps.write().await;
        let mut nodes = self.nodes.write().await;

        let node = nodes
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Node not found"))?;
        let map = maps
            .get_mut(&node.mind_map)
            .ok_or_else(|| StoreError::not_found("Mind map not found"))?;
        if !map.can_edit(user) {
            return Err(StoreError::forbidden("Not authorized to update this node"));
        }

        update.apply_to(node, user, now);
        map.touch(now);

        Ok(node.clone())
    }

    /// Delete a node and every node whose `parent` equals it.
    ///
    /// The cascade is one level deep (the original behavior): grandchildren
    /// keep their stale parent pointer and become orphans. Returns the ids
    /// actually removed, deleted node first.
    pub async fn delete_node(&self, id: Uuid, user: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let now = Utc::now();
        let mut maps = self.mind_maps.write().await;
        let mut nodes = self.nodes.write().await;

        let node = nodes
            .get(&id)
            .ok_or_else(|| StoreError::not_found("Node not found"))?;
        let map_id = node.mind_map;
        let map = maps
            .get_mut(&map_id)
            .ok_or_else(|| StoreError::not_found("Mind map not found"))?;
        if !map.can_edit(user) {
            return Err(StoreError::forbidden("Not authorized to delete this node"));
        }

        let mut removed = vec![id];
        removed.extend(
            nodes
                .values()
                .filter(|n| n.parent == Some(id))
                .map(|n| n.id),
        );
        for removed_id in &removed {
            nodes.remove(removed_id);
        }
        map.touch(now);

        tracing::debug!("Node {} deleted ({} nodes removed)", id, removed.len());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model::{CollaboratorRole, Connection};

    fn create_input(title: &str) -> CreateMindMap {
        CreateMindMap {
            title: title.to_string(),
            ..CreateMindMap::default()
        }
    }

    fn node_input(map_id: Uuid, title: &str, x: f64, y: f64) -> CreateNode {
        CreateNode {
            mind_map: map_id,
            title: title.to_string(),
            content: String::new(),
            position: Point::new(x, y),
            parent: None,
            size: None,
            style: None,
            kind: NodeKind::Text,
        }
    }

    #[tokio::test]
    async fn test_create_mind_map_creates_root_node() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        assert_eq!(map.version, 1);
        assert_eq!(root.title, ROOT_NODE_TITLE);
        assert_eq!(root.position, Point::new(0.0, 0.0));
        assert_eq!(root.mind_map, map.id);

        let (_, nodes) = store.get_mind_map(map.id, owner).await.unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_creates_are_distinct() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (a, _) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        let (b, _) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.version, 1);
        assert_eq!(b.version, 1);
    }

    #[tokio::test]
    async fn test_get_mind_map_hidden_from_strangers() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let (map, _) = store.create_mind_map(owner, create_input("Secret")).await.unwrap();
        let err = store.get_mind_map(map.id, stranger).await.unwrap_err();
        assert_eq!(err, StoreError::not_found("Mind map not found"));
    }

    #[tokio::test]
    async fn test_delete_mind_map_cascades_all_nodes() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        let child = store
            .create_node(owner, node_input(map.id, "Child", 100.0, 50.0))
            .await
            .unwrap();

        store.delete_mind_map(map.id, owner).await.unwrap();

        assert!(store.get_mind_map(map.id, owner).await.is_err());
        assert!(store.get_node(root.id).await.is_err());
        assert!(store.get_node(child.id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_mind_map_owner_only() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let editor = Uuid::new_v4();

        let (map, _) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        store
            .add_collaborator(
                map.id,
                owner,
                AddCollaborator {
                    user_id: editor,
                    role: CollaboratorRole::Editor,
                },
            )
            .await
            .unwrap();

        // Editors can mutate but never delete the map itself.
        assert!(store.delete_mind_map(map.id, editor).await.is_err());
        assert!(store.delete_mind_map(map.id, owner).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_collaborator_rejects_duplicates() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let friend = Uuid::new_v4();

        let (map, _) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        let add = AddCollaborator {
            user_id: friend,
            role: CollaboratorRole::Viewer,
        };
        store.add_collaborator(map.id, owner, add.clone()).await.unwrap();
        let err = store.add_collaborator(map.id, owner, add).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_node_mutation_touches_map_version() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        let v1 = map.version;

        store
            .update_node(root.id, owner, NodeUpdate::position(Point::new(120.0, 80.0)))
            .await
            .unwrap();

        let (map, _) = store.get_mind_map(map.id, owner).await.unwrap();
        assert!(map.version > v1);
    }

    #[tokio::test]
    async fn test_update_node_forbidden_for_viewer() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let viewer = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        store
            .add_collaborator(
                map.id,
                owner,
                AddCollaborator {
                    user_id: viewer,
                    role: CollaboratorRole::Viewer,
                },
            )
            .await
            .unwrap();

        let err = store
            .update_node(root.id, viewer, NodeUpdate::position(Point::new(1.0, 1.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_editor_can_move_node() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let editor = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        store
            .add_collaborator(
                map.id,
                owner,
                AddCollaborator {
                    user_id: editor,
                    role: CollaboratorRole::Editor,
                },
            )
            .await
            .unwrap();

        let moved = store
            .update_node(root.id, editor, NodeUpdate::position(Point::new(120.0, 80.0)))
            .await
            .unwrap();
        assert_eq!(moved.position, Point::new(120.0, 80.0));
        assert_eq!(moved.last_modified_by, editor);
    }

    #[tokio::test]
    async fn test_delete_node_cascades_one_level_only() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        let mut child_input = node_input(map.id, "Child", 100.0, 0.0);
        child_input.parent = Some(root.id);
        let child = store.create_node(owner, child_input).await.unwrap();

        let mut grandchild_input = node_input(map.id, "Grandchild", 200.0, 0.0);
        grandchild_input.parent = Some(child.id);
        let grandchild = store.create_node(owner, grandchild_input).await.unwrap();

        let removed = store.delete_node(root.id, owner).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert!(removed.contains(&root.id));
        assert!(removed.contains(&child.id));

        // The grandchild survives with a dangling parent pointer.
        let orphan = store.get_node(grandchild.id).await.unwrap();
        assert_eq!(orphan.parent, Some(child.id));
    }

    #[tokio::test]
    async fn test_delete_node_leaves_dangling_connections() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        let other = store
            .create_node(owner, node_input(map.id, "Other", 300.0, 0.0))
            .await
            .unwrap();

        store
            .update_node(
                other.id,
                owner,
                NodeUpdate::connections(vec![Connection::custom(root.id)]),
            )
            .await
            .unwrap();

        store.delete_node(root.id, owner).await.unwrap();

        // The connection entry on the surviving node still points at the
        // deleted target; rendering filters it out.
        let survivor = store.get_node(other.id).await.unwrap();
        assert_eq!(survivor.connections.len(), 1);
        assert_eq!(survivor.connections[0].target, root.id);
    }

    #[tokio::test]
    async fn test_nodes_ordered_by_creation() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (map, root) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();
        let second = store
            .create_node(owner, node_input(map.id, "Second", 10.0, 0.0))
            .await
            .unwrap();
        let third = store
            .create_node(owner, node_input(map.id, "Third", 20.0, 0.0))
            .await
            .unwrap();

        let nodes = store.nodes_for_map(map.id).await;
        let ids: Vec<Uuid> = nodes.iter().map(|n| n.id).collect();
        let root_pos = ids.iter().position(|i| *i == root.id).unwrap();
        let second_pos = ids.iter().position(|i| *i == second.id).unwrap();
        let third_pos = ids.iter().position(|i| *i == third.id).unwrap();
        assert!(root_pos < second_pos && second_pos < third_pos);
    }

    #[tokio::test]
    async fn test_create_node_validates_input() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let (map, _) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();

        let err = store
            .create_node(owner, node_input(map.id, "   ", 0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let err = store
            .create_node(owner, node_input(map.id, "Ok", f64::NAN, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let err = store
            .create_node(owner, node_input(Uuid::new_v4(), "Ok", 0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_mind_map_merges_settings() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let (map, _) = store.create_mind_map(owner, create_input("Plan")).await.unwrap();

        let update = MindMapUpdate {
            settings: Some(crate::shared::model::SettingsUpdate {
                zoom: Some(2.0),
                ..Default::default()
            }),
            ..MindMapUpdate::default()
        };
        let updated = store.update_mind_map(map.id, owner, update).await.unwrap();
        assert_eq!(updated.settings.zoom, 2.0);
        assert_eq!(updated.settings.layout, map.settings.layout);
        assert_eq!(updated.version, map.version + 1);
    }
}
