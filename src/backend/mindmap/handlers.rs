//! Mind Map HTTP Handlers
//!
//! CRUD over mind maps plus collaborator management. Every endpoint
//! returns the uniform envelope; mutating endpoints return the
//! created/updated entity.
//!
//! # Routes
//!
//! - `GET /api/mindmaps` - list the caller's maps (paginated, filterable)
//! - `GET /api/mindmaps/{id}` - one map with its nodes
//! - `POST /api/mindmaps` - create (also creates the root node)
//! - `PUT /api/mindmaps/{id}` - partial update
//! - `DELETE /api/mindmaps/{id}` - owner-only cascade delete
//! - `POST /api/mindmaps/{id}/collaborators` - add a collaborator

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::store::{DocumentStore, MindMapQuery, SortField, SortOrder};
use crate::shared::envelope::Pagination;
use crate::shared::model::{AddCollaborator, CreateMindMap, MindMap, MindMapUpdate, Node};
use crate::shared::Envelope;

/// Payload of the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindMapList {
    pub mindmaps: Vec<MindMap>,
    pub pagination: Pagination,
}

/// Payload carrying one mind map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindMapData {
    pub mindmap: MindMap,
}

/// Payload carrying a mind map together with its nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindMapWithNodes {
    pub mindmap: MindMap,
    pub nodes: Vec<Node>,
}

/// Query parameters accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    /// Comma-separated tag list
    pub tags: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl From<ListParams> for MindMapQuery {
    fn from(params: ListParams) -> Self {
        let tags = params.tags.map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        });
        Self {
            page: params.page.unwrap_or(1),
            limit: params.limit.unwrap_or(10),
            search: params.search.filter(|s| !s.trim().is_empty()),
            tags: tags.filter(|t| !t.is_empty()),
            sort_by: params
                .sort_by
                .as_deref()
                .map(SortField::parse)
                .unwrap_or_default(),
            sort_order: params
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
        }
    }
}

/// List the caller's mind maps
pub async fn list_mind_maps(
    State(store): State<DocumentStore>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<MindMapList>>, BackendError> {
    let (mindmaps, pagination) = store.list_mind_maps(user.user_id, params.into()).await;
    Ok(Json(Envelope::ok(MindMapList {
        mindmaps,
        pagination,
    })))
}

/// Fetch one mind map with its nodes
pub async fn get_mind_map(
    State(store): State<DocumentStore>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<MindMapWithNodes>>, BackendError> {
    let (mindmap, nodes) = store.get_mind_map(id, user.user_id).await?;
    Ok(Json(Envelope::ok(MindMapWithNodes { mindmap, nodes })))
}

/// Create a mind map (and its "Central Topic" root node)
pub async fn create_mind_map(
    State(store): State<DocumentStore>,
    AuthUser(user): AuthUser,
    Json(input): Json<CreateMindMap>,
) -> Result<(StatusCode, Json<Envelope<MindMapData>>), BackendError> {
    let (mindmap, _root) = store.create_mind_map(user.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok_with_message(
            "Mind map created successfully",
            MindMapData { mindmap },
        )),
    ))
}

/// Partially update a mind map
pub async fn update_mind_map(
    State(store): State<DocumentStore>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<MindMapUpdate>,
) -> Result<Json<Envelope<MindMapData>>, BackendError> {
    let mindmap = store.update_mind_map(id, user.user_id, update).await?;
    Ok(Json(Envelope::ok_with_message(
        "Mind map updated successfully",
        MindMapData { mindmap },
    )))
}

/// Delete a mind map and all of its nodes (owner only)
pub async fn delete_mind_map(
    State(store): State<DocumentStore>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, BackendError> {
    store.delete_mind_map(id, user.user_id).await?;
    Ok(Json(Envelope::ok_with_message(
        "Mind map deleted successfully",
        (),
    )))
}

/// Add a collaborator by user id and role (owner only)
pub async fn add_collaborator(
    State(store): State<DocumentStore>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<AddCollaborator>,
) -> Result<Json<Envelope<MindMapData>>, BackendError> {
    let mindmap = store.add_collaborator(id, user.user_id, input).await?;
    Ok(Json(Envelope::ok_with_message(
        "Collaborator added successfully",
        MindMapData { mindmap },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::middleware::auth::AuthenticatedUser;
    use crate::shared::model::CollaboratorRole;

    fn auth(user_id: Uuid) -> AuthUser {
        AuthUser(AuthenticatedUser {
            user_id,
            email: "user@example.com".to_string(),
        })
    }

    fn create_input(title: &str) -> CreateMindMap {
        CreateMindMap {
            title: title.to_string(),
            ..CreateMindMap::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (status, Json(created)) = create_mind_map(
            State(store.clone()),
            auth(owner),
            Json(create_input("Plan")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let created = created.into_result().unwrap();

        let Json(fetched) = get_mind_map(
            State(store),
            auth(owner),
            Path(created.mindmap.id),
        )
        .await
        .unwrap();
        let fetched = fetched.into_result().unwrap();
        assert_eq!(fetched.mindmap.id, created.mindmap.id);
        assert_eq!(fetched.nodes.len(), 1);
        assert_eq!(fetched.nodes[0].title, "Central Topic");
    }

    #[tokio::test]
    async fn test_get_unknown_map_is_not_found() {
        let store = DocumentStore::new();
        let err = get_mind_map(State(store), auth(Uuid::new_v4()), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let store = DocumentStore::new();
        let err = create_mind_map(State(store), auth(Uuid::new_v4()), Json(create_input("  ")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_params_tag_parsing() {
        let params = ListParams {
            tags: Some("work, urgent,,".to_string()),
            ..ListParams::default()
        };
        let query: MindMapQuery = params.into();
        assert_eq!(
            query.tags,
            Some(vec!["work".to_string(), "urgent".to_string()])
        );
    }

    #[tokio::test]
    async fn test_list_scoped_to_caller() {
        let store = DocumentStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        create_mind_map(State(store.clone()), auth(alice), Json(create_input("A")))
            .await
            .unwrap();
        create_mind_map(State(store.clone()), auth(bob), Json(create_input("B")))
            .await
            .unwrap();

        let Json(listed) = list_mind_maps(
            State(store),
            auth(alice),
            Query(ListParams::default()),
        )
        .await
        .unwrap();
        let listed = listed.into_result().unwrap();
        assert_eq!(listed.mindmaps.len(), 1);
        assert_eq!(listed.mindmaps[0].title, "A");
        assert_eq!(listed.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_collaborator_flow() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();
        let editor = Uuid::new_v4();

        let (_, Json(created)) = create_mind_map(
            State(store.clone()),
            auth(owner),
            Json(create_input("Shared")),
        )
        .await
        .unwrap();
        let map_id = created.into_result().unwrap().mindmap.id;

        add_collaborator(
            State(store.clone()),
            auth(owner),
            Path(map_id),
            Json(AddCollaborator {
                user_id: editor,
                role: CollaboratorRole::Editor,
            }),
        )
        .await
        .unwrap();

        // The editor now sees the map in their own list.
        let Json(listed) = list_mind_maps(
            State(store),
            auth(editor),
            Query(ListParams::default()),
        )
        .await
        .unwrap();
        assert_eq!(listed.into_result().unwrap().mindmaps.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_fetch_is_not_found() {
        let store = DocumentStore::new();
        let owner = Uuid::new_v4();

        let (_, Json(created)) = create_mind_map(
            State(store.clone()),
            auth(owner),
            Json(create_input("Doomed")),
        )
        .await
        .unwrap();
        let map_id = created.into_result().unwrap().mindmap.id;

        delete_mind_map(State(store.clone()), auth(owner), Path(map_id))
            .await
            .unwrap();

        let err = get_mind_map(State(store), auth(owner), Path(map_id))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
