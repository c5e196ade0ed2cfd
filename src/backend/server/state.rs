//! Application State Management
//!
//! The `AppState` struct is the central state container for the Axum
//! application: the in-memory document store, the per-map realtime
//! broadcast channels, and the optional Postgres pool backing the user
//! store. `FromRef` implementations let handlers extract just the part
//! they need.
//!
//! # Thread Safety
//!
//! All fields are concurrent-safe handles: the document store is
//! `Arc<RwLock<>>` internally, broadcast senders are clonable, and the
//! pool is `Option<PgPool>`.

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::realtime::MapBroadcastState;
use crate::backend::store::DocumentStore;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// The server-authoritative document store (mind maps + nodes)
    pub store: DocumentStore,

    /// Per-mind-map realtime broadcast channels
    pub map_broadcast: MapBroadcastState,

    /// Database connection pool backing the user store
    ///
    /// `None` when `DATABASE_URL` is not configured; auth endpoints then
    /// fail fast with an authentication-unavailable outcome instead of
    /// preventing startup.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// State with no database, as used by unit tests
    pub fn for_tests() -> Self {
        Self {
            store: DocumentStore::new(),
            map_broadcast: MapBroadcastState::new(),
            db_pool: None,
        }
    }
}

impl FromRef<AppState> for DocumentStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for MapBroadcastState {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.map_broadcast.clone()
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
