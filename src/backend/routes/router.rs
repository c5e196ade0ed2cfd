//! Router Configuration
//!
//! Combines all route groups into the application router. Document-store
//! and realtime routes sit behind the authentication middleware; auth
//! issuance routes and the health probe are public.
//!
//! # Routes
//!
//! ## Protected (bearer credential required)
//!
//! - `GET /api/auth/me`
//! - `GET|POST /api/mindmaps`, `GET|PUT|DELETE /api/mindmaps/{id}`
//! - `POST /api/mindmaps/{id}/collaborators`
//! - `GET /api/mindmaps/{id}/events` - SSE realtime channel
//! - `POST /api/nodes`, `GET|PUT|DELETE /api/nodes/{id}`
//! - `GET /api/nodes/mindmap/{id}`
//!
//! ## Public
//!
//! - `POST /api/auth/signup`, `POST /api/auth/login`, `POST /api/auth/refresh`
//! - `GET /api/health`

use axum::{response::Json, Router};
use tower_http::services::ServeDir;

use crate::backend::auth::get_me;
use crate::backend::middleware::auth::auth_middleware;
use crate::backend::mindmap::{
    add_collaborator, create_mind_map, delete_mind_map, get_mind_map, list_mind_maps,
    update_mind_map,
};
use crate::backend::node::{create_node, delete_node, get_node, get_nodes_by_mind_map, update_node};
use crate::backend::realtime::subscription::handle_map_subscription;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use crate::shared::Envelope;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = Router::new()
        .route("/api/auth/me", axum::routing::get(get_me))
        .route(
            "/api/mindmaps",
            axum::routing::get(list_mind_maps).post(create_mind_map),
        )
        .route(
            "/api/mindmaps/{id}",
            axum::routing::get(get_mind_map)
                .put(update_mind_map)
                .delete(delete_mind_map),
        )
        .route(
            "/api/mindmaps/{id}/collaborators",
            axum::routing::post(add_collaborator),
        )
        .route(
            "/api/mindmaps/{id}/events",
            axum::routing::get(handle_map_subscription),
        )
        .route("/api/nodes", axum::routing::post(create_node))
        .route(
            "/api/nodes/{id}",
            axum::routing::get(get_node)
                .put(update_node)
                .delete(delete_node),
        )
        .route(
            "/api/nodes/mindmap/{id}",
            axum::routing::get(get_nodes_by_mind_map),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let router = configure_api_routes(Router::new().merge(protected));

    // Static assets and an envelope-shaped 404 for unknown routes.
    let router = router.nest_service("/static", ServeDir::new("public"));
    let router = router.fallback(|| async {
        let body: Envelope<()> = Envelope::fail("Route not found");
        (axum::http::StatusCode::NOT_FOUND, Json(body))
    });

    router.with_state(app_state)
}
