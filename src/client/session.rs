//! Mind Map Session
//!
//! One open mind map: the document store client, the reducer state
//! container, the canvas engine, the undo/redo history, and an optional
//! realtime feed, orchestrated behind a narrow interface.
//!
//! # Data Flow
//!
//! gesture -> engine computes new local state -> store client persists the
//! change (once, at gesture end) -> the server announces it to the map's
//! channel -> other sessions apply it into their stores. The history
//! snapshots local state before every locally-initiated mutation, never
//! for remotely-received ones.
//!
//! # Failure Compensation
//!
//! A failed connection add/remove commit is compensated by reverting the
//! optimistic in-memory change (the commit carries its own revert); no
//! operation is retried automatically.

use thiserror::Error;
use uuid::Uuid;

use crate::client::api::{ClientError, StoreClient};
use crate::client::bridge::{apply_remote_event, RealtimeFeed};
use crate::client::canvas::{
    CanvasEngine, ConnectOutcome, GestureError, NodeCommit, ResizeDirection,
};
use crate::client::config::Config;
use crate::client::graph::derive_edges;
use crate::client::history::{History, Snapshot};
use crate::client::store::{SessionStore, StoreAction};
use crate::shared::event::generate_session_id;
use crate::shared::model::{CreateNode, Node, NodeStyle, NodeUpdate, Point};

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// A gesture was attempted from an incompatible interaction mode
    #[error(transparent)]
    Gesture(#[from] GestureError),

    /// A document store operation failed
    #[error(transparent)]
    Store(#[from] ClientError),

    /// No mind map is currently open
    #[error("no mind map is open")]
    NoOpenMap,
}

/// Result of a connect-affordance click, from the session's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Started,
    Connected,
    Duplicate,
    Cancelled,
}

/// One open, collaboratively edited mind map.
pub struct MapSession {
    api: StoreClient,
    store: SessionStore,
    engine: CanvasEngine,
    history: History,
    session_id: String,
    feed: Option<Box<dyn RealtimeFeed>>,
    open_map: Option<Uuid>,
    /// Snapshot captured at gesture start, pushed when the gesture commits
    pending_snapshot: Option<Snapshot>,
}

impl MapSession {
    pub fn new(config: Config) -> Self {
        let session_id = generate_session_id();
        Self {
            api: StoreClient::new(config, session_id.clone()),
            store: SessionStore::new(),
            engine: CanvasEngine::new(),
            history: History::default(),
            session_id,
            feed: None,
            open_map: None,
            pending_snapshot: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn engine(&self) -> &CanvasEngine {
        &self.engine
    }

    pub fn api(&mut self) -> &mut StoreClient {
        &mut self.api
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Attach the realtime transport (joined on `open`).
    pub fn attach_feed(&mut self, feed: Box<dyn RealtimeFeed>) {
        self.feed = Some(feed);
    }

    /// Capture the current node and derived connection sets.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.store.nodes().to_vec(),
            connections: derive_edges(self.store.nodes()),
        }
    }

    // ---- lifecycle ----

    /// Open a mind map: fetch it with its nodes, replace the local cache
    /// wholesale, reset history, and join the map's channel.
    pub fn open(&mut self, map_id: Uuid) -> Result<(), SessionError> {
        self.store.dispatch(StoreAction::SetLoading(true));
        let (mind_map, nodes) = match self.api.get_mind_map(map_id) {
            Ok(loaded) => loaded,
            Err(e) => {
                self.store
                    .dispatch(StoreAction::SetError(Some(e.to_string())));
                return Err(e.into());
            }
        };

        self.store
            .dispatch(StoreAction::SetSession { mind_map, nodes });
        self.history.reset(self.snapshot());
        self.engine = CanvasEngine::new();
        self.pending_snapshot = None;

        if let Some(feed) = &mut self.feed {
            feed.join(map_id)?;
        }
        self.open_map = Some(map_id);
        Ok(())
    }

    /// Close the session: leave the channel and drop local state.
    pub fn close(&mut self) {
        if let Some(feed) = &mut self.feed {
            feed.leave();
        }
        self.store.dispatch(StoreAction::Clear);
        self.open_map = None;
        self.pending_snapshot = None;
    }

    /// Drain the realtime feed and apply remote mutations. Returns how
    /// many events were applied. Remote mutations never touch history.
    pub fn pump_remote(&mut self) -> usize {
        let Some(feed) = &mut self.feed else {
            return 0;
        };
        let events = feed.poll_events();
        let mut applied = 0;
        for event in events {
            if apply_remote_event(&mut self.store, event, &self.session_id) {
                applied += 1;
            }
        }
        applied
    }

    // ---- direct mutations ----

    /// Create a node with explicit input.
    pub fn create_node(&mut self, input: CreateNode) -> Result<Node, SessionError> {
        let before = self.snapshot();
        let node = self.api.create_node(&input)?;
        self.history.push_state(before);
        self.store.dispatch(StoreAction::AddNode(node.clone()));
        Ok(node)
    }

    /// Create a default-styled node at a content position (double-click).
    pub fn create_node_at(&mut self, position: Point) -> Result<Node, SessionError> {
        let mind_map = self.open_map.ok_or(SessionError::NoOpenMap)?;
        self.create_node(CreateNode {
            mind_map,
            title: "New Node".to_string(),
            content: "Click to edit".to_string(),
            position,
            parent: None,
            size: None,
            style: Some(NodeStyle::default()),
            kind: Default::default(),
        })
    }

    /// Persist a partial update (node editor flow).
    pub fn update_node(&mut self, id: Uuid, update: NodeUpdate) -> Result<Node, SessionError> {
        let before = self.snapshot();
        let node = self.api.update_node(id, &update)?;
        self.history.push_state(before);
        self.store.dispatch(StoreAction::UpdateNode(node.clone()));
        Ok(node)
    }

    /// Delete a node. The server cascades direct children; the local
    /// cache drops only this node and converges on the broadcast (or the
    /// next reload) for cascaded children.
    pub fn delete_node(&mut self, id: Uuid) -> Result<(), SessionError> {
        let before = self.snapshot();
        self.api.delete_node(id)?;
        self.history.push_state(before);
        self.store.dispatch(StoreAction::RemoveNode(id));
        Ok(())
    }

    // ---- canvas gestures ----

    /// Double-click on empty canvas: create a node at the translated
    /// position. Returns `None` when not in Idle.
    pub fn double_click(&mut self, pointer: Point) -> Result<Option<Node>, SessionError> {
        match self.engine.double_click_canvas(pointer) {
            Some(request) => Ok(Some(self.create_node_at(request.position)?)),
            None => Ok(None),
        }
    }

    pub fn begin_node_drag(&mut self, node_id: Uuid) -> Result<(), SessionError> {
        let before = self.snapshot();
        self.engine.begin_drag(node_id, &self.store)?;
        self.pending_snapshot = Some(before);
        Ok(())
    }

    /// Track the pointer: in-memory only, no network traffic.
    pub fn drag_to(&mut self, position: Point) {
        self.engine.drag_move(position, &mut self.store);
    }

    /// Drop: push the pre-gesture snapshot and persist the final position.
    pub fn end_node_drag(&mut self) -> Result<Option<Node>, SessionError> {
        let pending = self.pending_snapshot.take();
        match self.engine.end_drag(&self.store) {
            Some(commit) => {
                if let Some(snapshot) = pending {
                    self.history.push_state(snapshot);
                }
                Ok(Some(self.persist_commit(commit)?))
            }
            None => Ok(None),
        }
    }

    pub fn begin_node_resize(
        &mut self,
        node_id: Uuid,
        direction: ResizeDirection,
        pointer: Point,
    ) -> Result<(), SessionError> {
        let before = self.snapshot();
        self.engine
            .begin_resize(node_id, direction, pointer, &self.store)?;
        self.pending_snapshot = Some(before);
        Ok(())
    }

    pub fn resize_to(&mut self, pointer: Point) {
        self.engine.resize_move(pointer);
    }

    /// Release: one commit for the whole resize, only if anything changed.
    pub fn end_node_resize(&mut self) -> Result<Option<Node>, SessionError> {
        let pending = self.pending_snapshot.take();
        match self.engine.end_resize(&mut self.store) {
            Some(commit) => {
                if let Some(snapshot) = pending {
                    self.history.push_state(snapshot);
                }
                Ok(Some(self.persist_commit(commit)?))
            }
            None => Ok(None),
        }
    }

    /// Click a node's connect affordance.
    pub fn connect_click(&mut self, node_id: Uuid) -> Result<ConnectStatus, SessionError> {
        let before = self.snapshot();
        match self.engine.click_connect(node_id, &mut self.store)? {
            ConnectOutcome::Started(_) => Ok(ConnectStatus::Started),
            ConnectOutcome::Completed(commit) => {
                self.history.push_state(before);
                self.persist_commit(commit)?;
                Ok(ConnectStatus::Connected)
            }
            ConnectOutcome::Duplicate => Ok(ConnectStatus::Duplicate),
            ConnectOutcome::Cancelled => Ok(ConnectStatus::Cancelled),
        }
    }

    /// Click on empty canvas (cancels an armed connection).
    pub fn canvas_click(&mut self) {
        self.engine.click_canvas();
    }

    /// Delete a rendered connection line. Returns false when no such
    /// connection exists on the source node.
    pub fn delete_connection(&mut self, source: Uuid, target: Uuid) -> Result<bool, SessionError> {
        let before = self.snapshot();
        match self.engine.remove_connection(source, target, &mut self.store) {
            Some(commit) => {
                self.history.push_state(before);
                self.persist_commit(commit)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ---- history ----

    /// Undo: capture the pre-undo state, apply the snapshot under the
    /// cursor, then push the captured state so redo can recover the
    /// position actually being left.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        let before = self.snapshot();
        let Some(target) = self.history.undo().cloned() else {
            return Ok(false);
        };
        self.apply_snapshot(&target);
        self.history.push_state(before);
        Ok(true)
    }

    /// Redo: apply the next snapshot, if any.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        let Some(target) = self.history.redo().cloned() else {
            return Ok(false);
        };
        self.apply_snapshot(&target);
        Ok(true)
    }

    /// Re-issue a full update for every node in the snapshot, whether or
    /// not it changed - correctness over efficiency at the node counts a
    /// mind map actually has. Individual failures are logged and skipped.
    fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        for node in &snapshot.nodes {
            match self.api.update_node(node.id, &NodeUpdate::snapshot_of(node)) {
                Ok(updated) => {
                    self.store.dispatch(StoreAction::UpdateNode(updated));
                }
                Err(e) => {
                    tracing::warn!("Failed to apply snapshot to node {}: {}", node.id, e);
                }
            }
        }
    }

    // ---- plumbing ----

    /// Persist a gesture commit; on failure, apply the commit's revert to
    /// the local copy (no automatic retry).
    fn persist_commit(&mut self, commit: NodeCommit) -> Result<Node, SessionError> {
        match self.api.update_node(commit.node_id, &commit.update) {
            Ok(node) => {
                self.store.dispatch(StoreAction::UpdateNode(node.clone()));
                Ok(node)
            }
            Err(e) => {
                if let Some(revert) = &commit.revert {
                    self.apply_local_update(commit.node_id, revert);
                }
                Err(e.into())
            }
        }
    }

    fn apply_local_update(&mut self, node_id: Uuid, update: &NodeUpdate) {
        if let Some(node) = self.store.node(node_id) {
            let mut reverted = node.clone();
            let modified_by = reverted.last_modified_by;
            let updated_at = reverted.updated_at;
            update.apply_to(&mut reverted, modified_by, updated_at);
            self.store.dispatch(StoreAction::UpdateNode(reverted));
        }
    }
}
