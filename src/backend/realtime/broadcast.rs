//! Real-time Event Broadcasting
//!
//! Per-mind-map broadcast channels for realtime mutation delivery. Each
//! open mind map gets its own `tokio::sync::broadcast` channel so events
//! never cross map boundaries; all sessions subscribed to a map receive a
//! copy of each event and filter out their own announcements by origin
//! session id.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::MapEvent;

/// Channel capacity per mind map; plenty for interactive editing bursts
const CHANNEL_CAPACITY: usize = 100;

/// Broadcast state for mind map channels
///
/// Manages per-map broadcast channels for realtime mutation delivery.
/// Cloning shares the underlying channel table.
#[derive(Debug, Clone, Default)]
pub struct MapBroadcastState {
    channels: Arc<std::sync::Mutex<HashMap<Uuid, broadcast::Sender<MapEvent>>>>,
}

impl MapBroadcastState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the broadcast sender for a mind map
    pub fn sender(&self, mind_map_id: Uuid) -> broadcast::Sender<MapEvent> {
        let mut channels = self.channels.lock().expect("channel table poisoned");
        channels
            .entry(mind_map_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribe to a mind map's channel
    pub fn subscribe(&self, mind_map_id: Uuid) -> broadcast::Receiver<MapEvent> {
        self.sender(mind_map_id).subscribe()
    }

    /// Broadcast an event to every subscriber of its mind map.
    ///
    /// Returns the number of active subscribers that received the event
    /// (0 when nobody is listening, which is not an error).
    pub fn broadcast(&self, event: MapEvent) -> usize {
        let sender = {
            let channels = self.channels.lock().expect("channel table poisoned");
            channels.get(&event.mind_map_id).cloned()
        };
        match sender {
            Some(tx) => match tx.send(event) {
                Ok(count) => {
                    tracing::debug!("[Realtime] Event broadcast to {} subscribers", count);
                    count
                }
                Err(_) => {
                    tracing::debug!("[Realtime] No subscribers to receive event");
                    0
                }
            },
            None => 0,
        }
    }

    /// Drop channels with no remaining subscribers
    pub fn cleanup_inactive_channels(&self) {
        self.channels
            .lock()
            .expect("channel table poisoned")
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Subscriber count for a mind map (for diagnostics)
    pub fn subscriber_count(&self, mind_map_id: Uuid) -> usize {
        self.channels
            .lock()
            .expect("channel table poisoned")
            .get(&mind_map_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}
