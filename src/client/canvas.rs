//! Canvas Interaction Engine
//!
//! Translates pointer/touch input into position/size/connection mutations
//! through a single tagged interaction mode - never a pile of independent
//! boolean flags. Exactly one of pan/drag/resize/connect/pinch can be
//! active; attempting to enter a gesture from an incompatible mode is
//! rejected with the active mode, not silently mis-handled.
//!
//! Continuous gestures buffer locally and commit once at gesture end: a
//! drag or resize never issues network traffic while tracking the
//! pointer. The commit a gesture produces is described as data
//! (`NodeCommit`) so the session layer can persist it and roll the
//! optimistic change back on failure.

use thiserror::Error;
use uuid::Uuid;

use crate::client::graph::link_exists;
use crate::client::store::{SessionStore, StoreAction};
use crate::shared::model::node::{MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use crate::shared::model::{Connection, NodeUpdate, Point, Size};

/// Wheel zoom bounds
pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 3.0;
/// Pinch zoom bounds (tighter while a pinch is active)
pub const PINCH_ZOOM_MIN: f64 = 0.5;
pub const PINCH_ZOOM_MAX: f64 = 3.0;
/// Zoom factor per wheel notch
const WHEEL_OUT_FACTOR: f64 = 0.9;
const WHEEL_IN_FACTOR: f64 = 1.1;

/// Corner a resize gesture is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl ResizeDirection {
    /// West-anchored handles move the node's x as width changes
    fn anchors_west(&self) -> bool {
        matches!(self, Self::NorthWest | Self::SouthWest)
    }

    /// North-anchored handles move the node's y as height changes
    fn anchors_north(&self) -> bool {
        matches!(self, Self::NorthWest | Self::NorthEast)
    }
}

/// The single canvas interaction mode.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionMode {
    Idle,
    Panning {
        /// Pointer position minus pan offset at gesture start
        origin: Point,
    },
    DraggingNode {
        node_id: Uuid,
    },
    ResizingNode {
        node_id: Uuid,
        direction: ResizeDirection,
        pointer_start: Point,
        start_position: Point,
        start_size: Size,
        /// Buffered values, committed only on release
        position: Point,
        size: Size,
    },
    Connecting {
        source: Uuid,
    },
    PinchZooming {
        last_distance: f64,
    },
}

impl InteractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::DraggingNode { .. } => "dragging",
            Self::ResizingNode { .. } => "resizing",
            Self::Connecting { .. } => "connecting",
            Self::PinchZooming { .. } => "pinch-zooming",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// A gesture that could not run in the current mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GestureError {
    #[error("cannot start {attempted} while {active} is active")]
    Busy {
        active: &'static str,
        attempted: &'static str,
    },

    #[error("node is not part of the open mind map")]
    UnknownNode,
}

/// A buffered mutation to persist at gesture end.
///
/// `revert` carries the update that undoes the optimistic local change;
/// the session applies it when the commit fails.
#[derive(Debug, Clone)]
pub struct NodeCommit {
    pub node_id: Uuid,
    pub update: NodeUpdate,
    pub revert: Option<NodeUpdate>,
}

/// Result of a connect-affordance click.
#[derive(Debug, Clone)]
pub enum ConnectOutcome {
    /// Armed connection mode with this source node
    Started(Uuid),
    /// A connection was created; persist the commit
    Completed(NodeCommit),
    /// An A->B or B->A connection already exists; nothing created
    Duplicate,
    /// Clicked the connect affordance of the armed source again
    Cancelled,
}

/// A request to create a node from a double-click, already translated
/// into content coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNodeRequest {
    pub position: Point,
}

/// The canvas gesture state machine plus the view transform.
///
/// Pan and zoom are view-local and never persisted.
#[derive(Debug, Clone)]
pub struct CanvasEngine {
    pub pan: Point,
    pub zoom: f64,
    mode: InteractionMode,
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self {
            pan: Point::new(0.0, 0.0),
            zoom: 1.0,
            mode: InteractionMode::Idle,
        }
    }
}

impl CanvasEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    fn require_idle(&self, attempted: &'static str) -> Result<(), GestureError> {
        if self.mode.is_idle() {
            Ok(())
        } else {
            Err(GestureError::Busy {
                active: self.mode.name(),
                attempted,
            })
        }
    }

    /// Translate a screen pointer position through the pan/zoom transform
    /// into content coordinates.
    pub fn content_point(&self, pointer: Point) -> Point {
        Point::new(
            (pointer.x - self.pan.x) / self.zoom,
            (pointer.y - self.pan.y) / self.zoom,
        )
    }

    // ---- panning ----

    /// Secondary-button press: start panning. Refused while any other
    /// gesture (connecting in particular) is active.
    pub fn begin_pan(&mut self, pointer: Point) -> Result<(), GestureError> {
        self.require_idle("panning")?;
        self.mode = InteractionMode::Panning {
            origin: Point::new(pointer.x - self.pan.x, pointer.y - self.pan.y),
        };
        Ok(())
    }

    /// Pointer move while panning updates the offset directly; no
    /// persistence, pan is view-local.
    pub fn pan_move(&mut self, pointer: Point) {
        if let InteractionMode::Panning { origin } = &self.mode {
            self.pan = Point::new(pointer.x - origin.x, pointer.y - origin.y);
        }
    }

    pub fn end_pan(&mut self) {
        if matches!(self.mode, InteractionMode::Panning { .. }) {
            self.mode = InteractionMode::Idle;
        }
    }

    // ---- zooming ----

    /// Wheel input scales zoom geometrically, clamped to [0.1, 3.0].
    /// Returns the new zoom.
    pub fn apply_wheel(&mut self, delta_y: f64) -> f64 {
        let factor = if delta_y > 0.0 {
            WHEEL_OUT_FACTOR
        } else {
            WHEEL_IN_FACTOR
        };
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.zoom
    }

    // ---- touch ----

    /// Touch start: one finger pans, two fingers pinch-zoom. A second
    /// finger may replace an active touch pan with a pinch.
    pub fn begin_touch(&mut self, touches: &[Point]) -> Result<(), GestureError> {
        match touches.len() {
            1 => self.begin_pan(touches[0]),
            2 => {
                let pannable = matches!(
                    self.mode,
                    InteractionMode::Idle | InteractionMode::Panning { .. }
                );
                if !pannable {
                    return Err(GestureError::Busy {
                        active: self.mode.name(),
                        attempted: "pinch-zooming",
                    });
                }
                self.mode = InteractionMode::PinchZooming {
                    last_distance: touch_distance(touches),
                };
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        match touches.len() {
            1 => {
                if matches!(self.mode, InteractionMode::Panning { .. }) {
                    self.pan_move(touches[0]);
                }
            }
            2 => {
                if let InteractionMode::PinchZooming { last_distance } = &mut self.mode {
                    let distance = touch_distance(touches);
                    if *last_distance > 0.0 && distance > 0.0 {
                        let scale = distance / *last_distance;
                        self.zoom = (self.zoom * scale).clamp(PINCH_ZOOM_MIN, PINCH_ZOOM_MAX);
                        *last_distance = distance;
                    }
                }
            }
            _ => {}
        }
    }

    pub fn end_touch(&mut self) {
        if matches!(
            self.mode,
            InteractionMode::Panning { .. } | InteractionMode::PinchZooming { .. }
        ) {
            self.mode = InteractionMode::Idle;
        }
    }

    // ---- dragging ----

    pub fn begin_drag(&mut self, node_id: Uuid, store: &SessionStore) -> Result<(), GestureError> {
        self.require_idle("dragging")?;
        if !store.contains(node_id) {
            return Err(GestureError::UnknownNode);
        }
        self.mode = InteractionMode::DraggingNode { node_id };
        Ok(())
    }

    /// Intermediate drag positions update only the in-memory copy; derived
    /// edges follow the node automatically. No network calls here.
    pub fn drag_move(&mut self, position: Point, store: &mut SessionStore) {
        if let InteractionMode::DraggingNode { node_id } = self.mode {
            store.set_node_position(node_id, position);
        }
    }

    /// Drop: the final position becomes one persistence commit.
    pub fn end_drag(&mut self, store: &SessionStore) -> Option<NodeCommit> {
        let InteractionMode::DraggingNode { node_id } = self.mode else {
            return None;
        };
        self.mode = InteractionMode::Idle;
        let node = store.node(node_id)?;
        Some(NodeCommit {
            node_id,
            update: NodeUpdate::position(node.position),
            revert: None,
        })
    }

    // ---- resizing ----

    pub fn begin_resize(
        &mut self,
        node_id: Uuid,
        direction: ResizeDirection,
        pointer: Point,
        store: &SessionStore,
    ) -> Result<(), GestureError> {
        self.require_idle("resizing")?;
        let node = store.node(node_id).ok_or(GestureError::UnknownNode)?;
        self.mode = InteractionMode::ResizingNode {
            node_id,
            direction,
            pointer_start: pointer,
            start_position: node.position,
            start_size: node.size,
            position: node.position,
            size: node.size,
        };
        Ok(())
    }

    /// Recompute the buffered size (and, for n/w-anchored handles, the
    /// position) from the pointer delta, clamped to the size bounds.
    /// Values stay buffered; nothing is persisted per move.
    pub fn resize_move(&mut self, pointer: Point) {
        let InteractionMode::ResizingNode {
            direction,
            pointer_start,
            start_position,
            start_size,
            position,
            size,
            ..
        } = &mut self.mode
        else {
            return;
        };

        let delta_x = pointer.x - pointer_start.x;
        let delta_y = pointer.y - pointer_start.y;

        let mut new_position = *start_position;

        let width = if direction.anchors_west() {
            let width = (start_size.width - delta_x).clamp(MIN_WIDTH, MAX_WIDTH);
            new_position.x = start_position.x + (start_size.width - width);
            width
        } else {
            (start_size.width + delta_x).clamp(MIN_WIDTH, MAX_WIDTH)
        };
        let height = if direction.anchors_north() {
            let height = (start_size.height - delta_y).clamp(MIN_HEIGHT, MAX_HEIGHT);
            new_position.y = start_position.y + (start_size.height - height);
            height
        } else {
            (start_size.height + delta_y).clamp(MIN_HEIGHT, MAX_HEIGHT)
        };

        *size = Size::new(width, height);
        *position = new_position;
    }

    /// Release: apply the buffered values locally and produce one commit,
    /// but only when something actually changed.
    pub fn end_resize(&mut self, store: &mut SessionStore) -> Option<NodeCommit> {
        let InteractionMode::ResizingNode {
            node_id,
            start_position,
            start_size,
            position,
            size,
            ..
        } = self.mode.clone()
        else {
            return None;
        };
        self.mode = InteractionMode::Idle;

        if size == start_size && position == start_position {
            return None;
        }

        if let Some(node) = store.node(node_id) {
            let mut resized = node.clone();
            resized.size = size;
            resized.position = position;
            store.dispatch(StoreAction::UpdateNode(resized));
        }

        Some(NodeCommit {
            node_id,
            update: NodeUpdate {
                size: Some(size),
                position: Some(position),
                ..NodeUpdate::default()
            },
            revert: None,
        })
    }

    // ---- connecting ----

    /// Click on a node's connect affordance.
    ///
    /// With no armed source this arms `Connecting`; with one armed, a
    /// click on a different node creates the connection (rejecting
    /// duplicates symmetrically) and a click on the same node cancels.
    /// Either way the mode returns to `Idle` after the second click.
    pub fn click_connect(
        &mut self,
        node_id: Uuid,
        store: &mut SessionStore,
    ) -> Result<ConnectOutcome, GestureError> {
        if !store.contains(node_id) {
            return Err(GestureError::UnknownNode);
        }

        let source = match &self.mode {
            InteractionMode::Idle => {
                self.mode = InteractionMode::Connecting { source: node_id };
                return Ok(ConnectOutcome::Started(node_id));
            }
            InteractionMode::Connecting { source } => *source,
            other => {
                return Err(GestureError::Busy {
                    active: other.name(),
                    attempted: "connecting",
                })
            }
        };

        self.mode = InteractionMode::Idle;

        if source == node_id {
            return Ok(ConnectOutcome::Cancelled);
        }
        if link_exists(store.nodes(), source, node_id) {
            return Ok(ConnectOutcome::Duplicate);
        }

        let Some(source_node) = store.node(source) else {
            return Err(GestureError::UnknownNode);
        };
        let previous = source_node.connections.clone();
        let mut connections = previous.clone();
        connections.push(Connection::custom(node_id));

        // Optimistic: the edge appears immediately, the commit follows.
        let mut updated = source_node.clone();
        updated.connections = connections.clone();
        store.dispatch(StoreAction::UpdateNode(updated));

        Ok(ConnectOutcome::Completed(NodeCommit {
            node_id: source,
            update: NodeUpdate::connections(connections),
            revert: Some(NodeUpdate::connections(previous)),
        }))
    }

    /// Click on empty canvas: cancels connection mode without effect.
    pub fn click_canvas(&mut self) {
        if matches!(self.mode, InteractionMode::Connecting { .. }) {
            self.mode = InteractionMode::Idle;
        }
    }

    /// Double-click on empty canvas in Idle: a new node at the pointer
    /// position translated through the current pan/zoom transform.
    pub fn double_click_canvas(&self, pointer: Point) -> Option<NewNodeRequest> {
        if !self.mode.is_idle() {
            return None;
        }
        Some(NewNodeRequest {
            position: self.content_point(pointer),
        })
    }

    /// Delete a rendered connection line: the entry leaves the source
    /// node's list immediately, and the commit carries the previous list
    /// so a failed persistence re-inserts it.
    pub fn remove_connection(
        &mut self,
        source: Uuid,
        target: Uuid,
        store: &mut SessionStore,
    ) -> Option<NodeCommit> {
        let source_node = store.node(source)?;
        if !source_node.has_connection_to(target) {
            return None;
        }

        let previous = source_node.connections.clone();
        let filtered: Vec<Connection> = previous
            .iter()
            .filter(|c| c.target != target)
            .cloned()
            .collect();

        let mut updated = source_node.clone();
        updated.connections = filtered.clone();
        store.dispatch(StoreAction::UpdateNode(updated));

        Some(NodeCommit {
            node_id: source,
            update: NodeUpdate::connections(filtered),
            revert: Some(NodeUpdate::connections(previous)),
        })
    }
}

fn touch_distance(touches: &[Point]) -> f64 {
    if touches.len() < 2 {
        return 0.0;
    }
    let dx = touches[1].x - touches[0].x;
    let dy = touches[1].y - touches[0].y;
    (dx * dx + dy * dy).sqrt()
}
