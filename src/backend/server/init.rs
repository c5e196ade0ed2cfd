//! Server Initialization
//!
//! Sets up the Axum application: document store, per-map broadcast
//! channels, the optional database, and the router.
//!
//! The server is resilient by design: a missing database only disables
//! persistent user accounts, and channel cleanup runs periodically in the
//! background so abandoned map channels do not accumulate.

use axum::Router;

use crate::backend::realtime::MapBroadcastState;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::backend::store::DocumentStore;

/// Create and configure the Axum application.
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing mindcanvas backend server");

    // The document store is the single source of truth for mind maps and
    // nodes; per-map broadcast channels carry mutations to other sessions.
    let store = DocumentStore::new();
    let map_broadcast = MapBroadcastState::new();

    let db_pool = load_database().await;

    let app_state = AppState {
        store,
        map_broadcast,
        db_pool,
    };

    let app = create_router(app_state.clone());

    // Periodic cleanup of map channels nobody subscribes to anymore.
    let cleanup_state = app_state.map_broadcast.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            cleanup_state.cleanup_inactive_channels();
            tracing::debug!("Cleaned up inactive map broadcast channels");
        }
    });

    tracing::info!("Router configured with periodic channel cleanup");

    app
}
