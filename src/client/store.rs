//! Session State Container
//!
//! The client-side copy of one open mind map: an explicit state container
//! with a pure transition function over a tagged action type, rather than
//! ambient mutable globals. Lifecycle is bound to one open mind map
//! session; opening a different map replaces the state wholesale.

use uuid::Uuid;

use crate::shared::model::{MindMap, Node, Point};

/// The canonical in-memory copy of the currently open mind map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub mind_map: Option<MindMap>,
    pub nodes: Vec<Node>,
    pub selected: Option<Uuid>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Tagged state transitions.
#[derive(Debug, Clone)]
pub enum StoreAction {
    SetLoading(bool),
    SetError(Option<String>),
    /// Replace the whole session (a different map was opened)
    SetSession {
        mind_map: MindMap,
        nodes: Vec<Node>,
    },
    UpdateMindMap(MindMap),
    AddNode(Node),
    /// Replace the node with the same id (last write wins)
    UpdateNode(Node),
    RemoveNode(Uuid),
    SelectNode(Option<Uuid>),
    /// Close the session
    Clear,
}

/// Pure transition function: current state + action -> next state.
pub fn reduce(state: &SessionState, action: StoreAction) -> SessionState {
    let mut next = state.clone();
    match action {
        StoreAction::SetLoading(loading) => {
            next.loading = loading;
        }
        StoreAction::SetError(error) => {
            next.error = error;
            next.loading = false;
        }
        StoreAction::SetSession { mind_map, nodes } => {
            next.mind_map = Some(mind_map);
            next.nodes = nodes;
            next.selected = None;
            next.loading = false;
            next.error = None;
        }
        StoreAction::UpdateMindMap(mind_map) => {
            next.mind_map = Some(mind_map);
        }
        StoreAction::AddNode(node) => {
            // A duplicate id means the entity already arrived through
            // another path; the newer copy wins.
            if let Some(existing) = next.nodes.iter_mut().find(|n| n.id == node.id) {
                *existing = node;
            } else {
                next.nodes.push(node);
            }
        }
        StoreAction::UpdateNode(node) => {
            if let Some(existing) = next.nodes.iter_mut().find(|n| n.id == node.id) {
                *existing = node;
            }
        }
        StoreAction::RemoveNode(id) => {
            next.nodes.retain(|n| n.id != id);
            if next.selected == Some(id) {
                next.selected = None;
            }
        }
        StoreAction::SelectNode(selected) => {
            next.selected = selected;
        }
        StoreAction::Clear => {
            next = SessionState::default();
        }
    }
    next
}

/// Narrow interface over the session state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    state: SessionState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: StoreAction) {
        self.state = reduce(&self.state, action);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mind_map(&self) -> Option<&MindMap> {
        self.state.mind_map.as_ref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.state.nodes
    }

    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.state.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.node(id).is_some()
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.state.selected
    }

    /// Move a node in the in-memory copy only (used while dragging; no
    /// network traffic).
    pub fn set_node_position(&mut self, id: Uuid, position: Point) {
        if let Some(node) = self.node(id) {
            let mut moved = node.clone();
            moved.position = position;
            self.dispatch(StoreAction::UpdateNode(moved));
        }
    }
}
