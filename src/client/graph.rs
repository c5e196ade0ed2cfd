//! Connection Graph Manager
//!
//! Derives the renderable edge set from each node's embedded connection
//! list. Edges are rebuilt per render pass, so moving a node keeps line
//! endpoints correct without bookkeeping; connection entries whose target
//! is not in the loaded node set are silently dropped (dangling references
//! are an accepted defect class, filtered here rather than surfaced).

use uuid::Uuid;

use crate::shared::model::{ConnectionKind, LineStyle, Node, Point};

/// A renderable edge between two loaded nodes.
///
/// Ephemeral identity: `"{source}-{target}"`; edges are not stored
/// entities and are recomputed from node state.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub from: Uuid,
    pub to: Uuid,
    pub kind: ConnectionKind,
    pub label: String,
    pub line: LineStyle,
}

/// Rebuild the edge set from the loaded nodes.
pub fn derive_edges(nodes: &[Node]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for node in nodes {
        for connection in &node.connections {
            // Dangling targets (deleted nodes) simply don't render.
            if nodes.iter().any(|n| n.id == connection.target) {
                edges.push(Edge {
                    id: format!("{}-{}", node.id, connection.target),
                    from: node.id,
                    to: connection.target,
                    kind: connection.kind,
                    label: connection.label.clone(),
                    line: connection.line.clone(),
                });
            }
        }
    }
    edges
}

/// Whether any connection exists between the two nodes, in either
/// direction. Used to reject duplicate connections symmetrically.
pub fn link_exists(nodes: &[Node], a: Uuid, b: Uuid) -> bool {
    nodes.iter().any(|n| {
        (n.id == a && n.has_connection_to(b)) || (n.id == b && n.has_connection_to(a))
    })
}

/// Projection radius of a node: half its larger dimension.
fn node_radius(node: &Node) -> f64 {
    node.size.width.max(node.size.height) / 2.0
}

/// Endpoints of the rendered line between two nodes.
///
/// Each endpoint is the node's center projected inward along the
/// center-to-center vector by the node's radius, so lines touch node
/// borders rather than centers. Coincident centers yield `None` (guards
/// the division by zero) and the edge is not rendered.
pub fn edge_endpoints(from: &Node, to: &Node) -> Option<(Point, Point)> {
    let from_center = from.center();
    let to_center = to.center();

    let dx = to_center.x - from_center.x;
    let dy = to_center.y - from_center.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return None;
    }

    let (ux, uy) = (dx / length, dy / length);
    let start = Point::new(
        from_center.x + ux * node_radius(from),
        from_center.y + uy * node_radius(from),
    );
    let end = Point::new(
        to_center.x - ux * node_radius(to),
        to_center.y - uy * node_radius(to),
    );
    Some((start, end))
}
