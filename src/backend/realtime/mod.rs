//! Realtime Broadcast
//!
//! Per-mind-map broadcast channels plus the SSE subscription endpoint.
//! Mutation handlers publish events here; subscribed sessions apply them
//! directly to their local caches (last message wins, no merge logic).

pub mod broadcast;
pub mod subscription;

pub use broadcast::MapBroadcastState;
