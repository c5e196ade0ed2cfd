//! Realtime Broadcast Bridge
//!
//! Applies mutations announced by other sessions into the local session
//! store, and isolates the transport behind the `RealtimeFeed` trait so a
//! future consistency protocol could be substituted without touching the
//! gesture engine.
//!
//! There is deliberately no merge logic: the last message wins, even when
//! it overwrites a concurrent local edit to the same node. The
//! originating session never acts on its own announcement - the server
//! already excludes the sender, and `apply_remote_event` drops same-origin
//! events again as a second guard.

use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use uuid::Uuid;

use crate::client::api::ClientError;
use crate::client::config::Config;
use crate::client::store::{SessionStore, StoreAction};
use crate::shared::{MapEvent, MapEventKind};

/// Transport-agnostic source of remote mutation events.
///
/// One feed serves one joined channel at a time; joining a different map
/// replaces the previous subscription.
pub trait RealtimeFeed {
    /// Join the channel scoped to a mind map.
    fn join(&mut self, mind_map_id: Uuid) -> Result<(), ClientError>;

    /// Leave the current channel.
    fn leave(&mut self);

    /// Drain events received since the last poll.
    fn poll_events(&mut self) -> Vec<MapEvent>;
}

/// Apply a remote mutation directly to the local store.
///
/// Returns false when the event was dropped: originated by this session,
/// scoped to a different map, or a creation/update without a node payload.
pub fn apply_remote_event(store: &mut SessionStore, event: MapEvent, local_session: &str) -> bool {
    if !local_session.is_empty() && event.origin == local_session {
        return false;
    }
    if store.mind_map().map(|m| m.id) != Some(event.mind_map_id) {
        return false;
    }

    match event.kind {
        MapEventKind::NodeCreated => match event.node {
            Some(node) => {
                store.dispatch(StoreAction::AddNode(node));
                true
            }
            None => false,
        },
        MapEventKind::NodeUpdated => match event.node {
            Some(node) => {
                // Last write wins, overwriting any concurrent local edit.
                store.dispatch(StoreAction::UpdateNode(node));
                true
            }
            None => false,
        },
        MapEventKind::NodeDeleted => {
            store.dispatch(StoreAction::RemoveNode(event.node_id));
            true
        }
    }
}

/// An in-process feed fed through a channel.
///
/// The seam used by tests and by embedders that already have an event
/// stream; the SSE feed below is the production transport.
pub struct ChannelFeed {
    rx: mpsc::Receiver<MapEvent>,
}

impl ChannelFeed {
    /// A feed and the sender that supplies it.
    pub fn pair() -> (mpsc::Sender<MapEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl RealtimeFeed for ChannelFeed {
    fn join(&mut self, _mind_map_id: Uuid) -> Result<(), ClientError> {
        Ok(())
    }

    fn leave(&mut self) {}

    fn poll_events(&mut self) -> Vec<MapEvent> {
        self.rx.try_iter().collect()
    }
}

/// SSE-backed feed reading `GET /api/mindmaps/{id}/events` on a
/// background thread.
pub struct SseFeed {
    config: Config,
    session_id: String,
    rx: Option<mpsc::Receiver<MapEvent>>,
    stop: Arc<AtomicBool>,
}

impl SseFeed {
    pub fn new(config: Config, session_id: String) -> Self {
        Self {
            config,
            session_id,
            rx: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RealtimeFeed for SseFeed {
    fn join(&mut self, mind_map_id: Uuid) -> Result<(), ClientError> {
        self.leave();

        let url = self.config.api_url(&format!(
            "/api/mindmaps/{}/events?session={}",
            mind_map_id, self.session_id
        ));
        let token = self.config.token().map(String::from);
        let stop = Arc::new(AtomicBool::new(false));
        self.stop = stop.clone();

        let (tx, rx) = mpsc::channel();
        self.rx = Some(rx);

        std::thread::spawn(move || {
            let client = reqwest::blocking::Client::new();
            let mut request = client.get(&url);
            if let Some(token) = token {
                request = request.header("Authorization", format!("Bearer {}", token));
            }

            let response = match request.send() {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    tracing::warn!("[Realtime] Subscription refused: {}", response.status());
                    return;
                }
                Err(e) => {
                    tracing::warn!("[Realtime] Subscription failed: {}", e);
                    return;
                }
            };

            let reader = BufReader::new(response);
            for line in reader.lines() {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::debug!("[Realtime] Stream closed: {}", e);
                        break;
                    }
                };
                // SSE frames: "event: <name>" then "data: <json>".
                let Some(payload) = line.strip_prefix("data:") else {
                    continue;
                };
                match serde_json::from_str::<MapEvent>(payload.trim()) {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("[Realtime] Ignoring unparseable event: {}", e);
                    }
                }
            }
        });

        Ok(())
    }

    fn leave(&mut self) {
        // The reader thread notices the flag on its next frame; dropping
        // the receiver makes its sends fail immediately after.
        self.stop.store(true, Ordering::Relaxed);
        self.rx = None;
    }

    fn poll_events(&mut self) -> Vec<MapEvent> {
        match &self.rx {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }
}
