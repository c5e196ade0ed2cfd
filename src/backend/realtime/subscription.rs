//! Realtime Subscription Handler
//!
//! Server-Sent Events (SSE) subscription for a mind map's channel:
//! `GET /api/mindmaps/{id}/events?session={session_id}`.
//!
//! Authorization is established once at connection time: the auth
//! middleware verifies the bearer credential and this handler checks map
//! membership before subscribing. Per-message authorization is not
//! re-checked - trust is channel-membership-based.
//!
//! # Sender Exclusion
//!
//! Events carry the originating session id; events whose origin equals the
//! subscriber's `session` query parameter are dropped server-side so a
//! session never receives its own announcements.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use std::collections::HashMap;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;

/// Handle a mind map realtime subscription.
///
/// Streams `node-created` / `node-updated` / `node-deleted` events scoped
/// to the requested map, excluding the subscriber's own session.
pub async fn handle_map_subscription(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(map_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    // Join-time membership check; the channel itself is trusted afterwards.
    app_state.store.authorize_view(map_id, user.user_id).await?;

    let session = params.get("session").cloned().unwrap_or_default();
    let rx = app_state.map_broadcast.subscribe(map_id);

    tracing::info!(
        "[Realtime] Session {:?} joined mind map {} channel",
        session,
        map_id
    );

    let stream = stream::unfold((rx, session), move |(mut rx, session)| async move {
        // Loop until an event survives the origin filter.
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if !session.is_empty() && event.origin == session {
                        // The sender already applied this change locally.
                        continue;
                    }

                    let data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
                            continue;
                        }
                    };

                    let sse_event = Event::default().event(event.kind.as_str()).data(data);
                    return Some((Ok(sse_event), (rx, session)));
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    tracing::debug!("[Realtime] Channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
