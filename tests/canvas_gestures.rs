//! Gesture-flow tests for the canvas interaction engine
//!
//! Exercises full gesture sequences against the in-memory session store:
//! mode exclusion, the commit-on-gesture-end contract, and the connection
//! lifecycle, all without a network.

use pretty_assertions::assert_eq;
use uuid::Uuid;

use mindcanvas::client::canvas::{
    CanvasEngine, ConnectOutcome, GestureError, InteractionMode, ResizeDirection,
};
use mindcanvas::client::graph::{derive_edges, edge_endpoints};
use mindcanvas::client::store::{SessionStore, StoreAction};
use mindcanvas::shared::model::node::{
    NodeMetadata, NodeStyle, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
};
use mindcanvas::shared::model::{MapSettings, MindMap, Node, NodeKind, Point, Size};

fn build_node(map_id: Uuid, x: f64, y: f64) -> Node {
    let user = Uuid::new_v4();
    let now = chrono::Utc::now();
    Node {
        id: Uuid::new_v4(),
        mind_map: map_id,
        title: "node".to_string(),
        content: String::new(),
        position: Point::new(x, y),
        size: Size::new(100.0, 100.0),
        style: NodeStyle::default(),
        kind: NodeKind::Text,
        metadata: NodeMetadata::default(),
        parent: None,
        children: Vec::new(),
        connections: Vec::new(),
        collapsed: false,
        z_index: 1,
        created_by: user,
        last_modified_by: user,
        created_at: now,
        updated_at: now,
    }
}

fn open_store(node_count: usize) -> (SessionStore, Vec<Uuid>) {
    let now = chrono::Utc::now();
    let owner = Uuid::new_v4();
    let map = MindMap {
        id: Uuid::new_v4(),
        title: "Plan".to_string(),
        description: String::new(),
        owner,
        collaborators: Vec::new(),
        is_public: false,
        settings: MapSettings::default(),
        tags: Vec::new(),
        created_at: now,
        last_modified: now,
        version: 1,
    };
    let nodes: Vec<Node> = (0..node_count)
        .map(|i| build_node(map.id, i as f64 * 300.0, 0.0))
        .collect();
    let ids = nodes.iter().map(|n| n.id).collect();
    let mut store = SessionStore::new();
    store.dispatch(StoreAction::SetSession {
        mind_map: map,
        nodes,
    });
    (store, ids)
}

#[test]
fn only_one_gesture_at_a_time() {
    let (mut store, ids) = open_store(2);
    let mut engine = CanvasEngine::new();

    engine.begin_drag(ids[0], &store).unwrap();

    assert!(matches!(
        engine.begin_pan(Point::new(0.0, 0.0)),
        Err(GestureError::Busy { active: "dragging", .. })
    ));
    assert!(matches!(
        engine.begin_resize(ids[1], ResizeDirection::SouthEast, Point::new(0.0, 0.0), &store),
        Err(GestureError::Busy { .. })
    ));
    assert!(matches!(
        engine.click_connect(ids[1], &mut store),
        Err(GestureError::Busy { .. })
    ));

    // Ending the drag releases the machine.
    engine.end_drag(&store);
    assert!(engine.mode().is_idle());
    engine.begin_pan(Point::new(0.0, 0.0)).unwrap();
}

#[test]
fn drag_produces_exactly_one_commit() {
    let (mut store, ids) = open_store(1);
    let mut engine = CanvasEngine::new();

    engine.begin_drag(ids[0], &store).unwrap();
    // Many intermediate moves: in-memory only.
    for step in 1..=20 {
        engine.drag_move(Point::new(step as f64 * 6.0, step as f64 * 4.0), &mut store);
    }
    let commit = engine.end_drag(&store).unwrap();

    assert_eq!(commit.update.position, Some(Point::new(120.0, 80.0)));
    assert!(commit.update.size.is_none());
    assert!(commit.update.connections.is_none());
}

#[test]
fn edges_follow_dragged_node() {
    let (mut store, ids) = open_store(2);
    let mut engine = CanvasEngine::new();

    engine.click_connect(ids[0], &mut store).unwrap();
    engine.click_connect(ids[1], &mut store).unwrap();

    engine.begin_drag(ids[0], &store).unwrap();
    engine.drag_move(Point::new(50.0, 50.0), &mut store);

    // Edges are derived from node state, so the endpoint moved with the
    // node before any commit happened.
    let nodes = store.nodes();
    let edges = derive_edges(nodes);
    assert_eq!(edges.len(), 1);
    let from = store.node(ids[0]).unwrap();
    let to = store.node(ids[1]).unwrap();
    let (start, _) = edge_endpoints(from, to).unwrap();
    assert!(start.x > 50.0);
}

#[test]
fn resize_clamp_invariants() {
    let (mut store, ids) = open_store(1);
    let mut engine = CanvasEngine::new();

    // Below minimum clamps to the minimum.
    engine
        .begin_resize(ids[0], ResizeDirection::SouthEast, Point::new(0.0, 0.0), &store)
        .unwrap();
    engine.resize_move(Point::new(-500.0, -500.0));
    let commit = engine.end_resize(&mut store).unwrap();
    assert_eq!(commit.update.size, Some(Size::new(MIN_WIDTH, MIN_HEIGHT)));

    // Above maximum clamps to the maximum.
    engine
        .begin_resize(ids[0], ResizeDirection::SouthEast, Point::new(0.0, 0.0), &store)
        .unwrap();
    engine.resize_move(Point::new(5000.0, 5000.0));
    let commit = engine.end_resize(&mut store).unwrap();
    assert_eq!(commit.update.size, Some(Size::new(MAX_WIDTH, MAX_HEIGHT)));

    // The local copy carries the clamped values too.
    assert_eq!(
        store.node(ids[0]).unwrap().size,
        Size::new(MAX_WIDTH, MAX_HEIGHT)
    );
}

#[test]
fn connection_symmetry_and_deletion() {
    let (mut store, ids) = open_store(2);
    let mut engine = CanvasEngine::new();

    // A -> B succeeds.
    engine.click_connect(ids[0], &mut store).unwrap();
    let outcome = engine.click_connect(ids[1], &mut store).unwrap();
    assert!(matches!(outcome, ConnectOutcome::Completed(_)));

    // B -> A is a duplicate of the existing A -> B.
    engine.click_connect(ids[1], &mut store).unwrap();
    let outcome = engine.click_connect(ids[0], &mut store).unwrap();
    assert!(matches!(outcome, ConnectOutcome::Duplicate));

    // A second A -> B is equally rejected.
    engine.click_connect(ids[0], &mut store).unwrap();
    let outcome = engine.click_connect(ids[1], &mut store).unwrap();
    assert!(matches!(outcome, ConnectOutcome::Duplicate));

    // Deleting A -> B touches only A's list; B never stored anything.
    engine.remove_connection(ids[0], ids[1], &mut store).unwrap();
    assert!(store.node(ids[0]).unwrap().connections.is_empty());
    assert!(store.node(ids[1]).unwrap().connections.is_empty());
    assert!(derive_edges(store.nodes()).is_empty());
}

#[test]
fn wheel_zoom_scenario() {
    let mut engine = CanvasEngine::new();
    assert_eq!(engine.zoom, 1.0);

    // Three wheel-out notches: 0.9^3, no clamping triggered.
    engine.apply_wheel(1.0);
    engine.apply_wheel(1.0);
    let zoom = engine.apply_wheel(1.0);
    assert!((zoom - 0.729).abs() < 1e-9);

    // Zooming back in walks the same geometric ladder.
    let zoom = engine.apply_wheel(-1.0);
    assert!((zoom - 0.8019).abs() < 1e-9);
}

#[test]
fn double_click_respects_transform_and_mode() {
    let (mut store, ids) = open_store(1);
    let mut engine = CanvasEngine::new();
    engine.pan = Point::new(-100.0, 40.0);
    engine.zoom = 0.5;

    let request = engine.double_click_canvas(Point::new(100.0, 140.0)).unwrap();
    assert_eq!(request.position, Point::new(400.0, 200.0));

    // While connecting, double-click is ignored.
    engine.click_connect(ids[0], &mut store).unwrap();
    assert!(engine.double_click_canvas(Point::new(0.0, 0.0)).is_none());

    // Empty-canvas click cancels connecting without side effects.
    engine.click_canvas();
    assert!(matches!(engine.mode(), InteractionMode::Idle));
    assert!(store.node(ids[0]).unwrap().connections.is_empty());
}

#[test]
fn touch_pan_and_pinch_flow() {
    let mut engine = CanvasEngine::new();

    // Single finger pans.
    engine.begin_touch(&[Point::new(10.0, 10.0)]).unwrap();
    engine.touch_move(&[Point::new(40.0, 25.0)]);
    assert_eq!(engine.pan, Point::new(30.0, 15.0));

    // A second finger upgrades to pinch; spreading the fingers zooms in.
    engine
        .begin_touch(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)])
        .unwrap();
    engine.touch_move(&[Point::new(0.0, 0.0), Point::new(150.0, 0.0)]);
    assert!((engine.zoom - 1.5).abs() < 1e-9);

    engine.end_touch();
    assert!(engine.mode().is_idle());
    // The pan survives the gesture; it is view-local state.
    assert_eq!(engine.pan, Point::new(30.0, 15.0));
}
