//! Node Model
//!
//! A node is a positioned, styled, rectangular unit of content within a
//! mind map. Nodes carry their outgoing connections: a connection is
//! directional and stored once, on the source node, so deleting it touches
//! only the source node's list.
//!
//! # Bounds
//!
//! Size and style values are clamped/validated against fixed bounds:
//! width 60..=300, height 40..=200, border width 0..=5, border radius
//! 0..=20, font size 8..=24, connection line width 1..=10.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Maximum node title length
pub const TITLE_MAX_LEN: usize = 200;
/// Maximum node content length
pub const CONTENT_MAX_LEN: usize = 2000;
/// Minimum node width
pub const MIN_WIDTH: f64 = 60.0;
/// Maximum node width
pub const MAX_WIDTH: f64 = 300.0;
/// Minimum node height
pub const MIN_HEIGHT: f64 = 40.0;
/// Maximum node height
pub const MAX_HEIGHT: f64 = 200.0;

/// A point in canvas content coordinates (origin top-left, unit-less).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node dimensions in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions to the allowed bounds.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(MIN_WIDTH, MAX_WIDTH),
            height: self.height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 80.0,
        }
    }
}

/// Node content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Text,
    Image,
    Link,
    Note,
}

/// Kind-specific metadata for image/link/note nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default)]
    pub note_kind: NoteKind,
}

/// Flavor of a note-type node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    #[default]
    Idea,
    Task,
    Question,
    Important,
}

/// Font weight for node text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Visual style of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    pub border_width: f64,
    pub border_radius: f64,
    pub font_size: f64,
    pub font_weight: FontWeight,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            text_color: "#1f2937".to_string(),
            border_color: "#d1d5db".to_string(),
            border_width: 1.0,
            border_radius: 8.0,
            font_size: 14.0,
            font_weight: FontWeight::Normal,
        }
    }
}

impl NodeStyle {
    /// Clamp numeric style values to their allowed ranges.
    pub fn clamped(mut self) -> Self {
        self.border_width = self.border_width.clamp(0.0, 5.0);
        self.border_radius = self.border_radius.clamp(0.0, 20.0);
        self.font_size = self.font_size.clamp(8.0, 24.0);
        self
    }
}

/// Connection kind between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Parent,
    #[default]
    Child,
    Sibling,
    Custom,
}

/// Dash pattern of a connection line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineDash {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Visual style of a connection line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub dash: LineDash,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "#6b7280".to_string(),
            width: 2.0,
            dash: LineDash::Solid,
        }
    }
}

/// A directed connection entry, stored on the source node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Target node id; must reference a node in the same mind map
    /// (not enforced server-side; stale targets are filtered at render time)
    pub target: Uuid,
    #[serde(default)]
    pub kind: ConnectionKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub line: LineStyle,
}

impl Connection {
    /// A plain custom connection with default styling.
    pub fn custom(target: Uuid) -> Self {
        Self {
            target,
            kind: ConnectionKind::Custom,
            label: String::new(),
            line: LineStyle::default(),
        }
    }
}

/// A positioned, styled unit of content within a mind map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Uuid,
    /// Owning mind map
    pub mind_map: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub metadata: NodeMetadata,
    #[serde(default)]
    pub parent: Option<Uuid>,
    /// Denormalized child list; may drift from actual parent pointers
    #[serde(default)]
    pub children: Vec<Uuid>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default = "default_z_index")]
    pub z_index: i32,
    pub created_by: Uuid,
    pub last_modified_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_z_index() -> i32 {
    1
}

impl Node {
    /// Center of the node rectangle in canvas coordinates.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2.0,
            self.position.y + self.size.height / 2.0,
        )
    }

    /// Whether this node stores a connection entry targeting `target`.
    pub fn has_connection_to(&self, target: Uuid) -> bool {
        self.connections.iter().any(|c| c.target == target)
    }

    /// Validate title and position for create/update requests.
    pub fn validate_title(title: &str) -> Result<(), SharedError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(SharedError::validation("title", "Title is required"));
        }
        if trimmed.len() > TITLE_MAX_LEN {
            return Err(SharedError::validation(
                "title",
                format!("Title must be at most {} characters", TITLE_MAX_LEN),
            ));
        }
        Ok(())
    }

    /// Positions must be finite numbers; NaN/infinity never reach the store.
    pub fn validate_position(position: &Point) -> Result<(), SharedError> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(SharedError::validation(
                "position",
                "Position coordinates must be finite numbers",
            ));
        }
        Ok(())
    }
}

/// Partial update for a node. Only supplied fields are merged; `style` is
/// deep-merged field-wise and `connections` replaces the stored list
/// wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// `Some(None)` re-roots the node, `None` leaves the parent untouched
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub parent: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

/// Distinguishes an absent field from an explicit null.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

impl NodeUpdate {
    /// An update carrying only a new position (drag commit).
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// An update replacing the connection list (connect/disconnect commit).
    pub fn connections(connections: Vec<Connection>) -> Self {
        Self {
            connections: Some(connections),
            ..Self::default()
        }
    }

    /// The full-snapshot update used when applying undo/redo history.
    pub fn snapshot_of(node: &Node) -> Self {
        Self {
            position: Some(node.position),
            size: Some(node.size),
            style: Some(StyleUpdate::from_style(&node.style)),
            connections: Some(node.connections.clone()),
            ..Self::default()
        }
    }

    /// Merge this update into `node`, clamping sizes and styles.
    pub fn apply_to(&self, node: &mut Node, modified_by: Uuid, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            node.title = title.clone();
        }
        if let Some(content) = &self.content {
            node.content = content.clone();
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(parent) = self.parent {
            node.parent = parent;
        }
        if let Some(size) = self.size {
            node.size = size.clamped();
        }
        if let Some(style) = &self.style {
            node.style = style.merged_into(&node.style).clamped();
        }
        if let Some(connections) = &self.connections {
            node.connections = connections.clone();
        }
        if let Some(collapsed) = self.collapsed {
            node.collapsed = collapsed;
        }
        if let Some(z_index) = self.z_index {
            node.z_index = z_index;
        }
        node.last_modified_by = modified_by;
        node.updated_at = now;
    }
}

/// Partial style update, deep-merged into the stored style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
}

impl StyleUpdate {
    /// A full-style update mirroring `style` exactly.
    pub fn from_style(style: &NodeStyle) -> Self {
        Self {
            background_color: Some(style.background_color.clone()),
            text_color: Some(style.text_color.clone()),
            border_color: Some(style.border_color.clone()),
            border_width: Some(style.border_width),
            border_radius: Some(style.border_radius),
            font_size: Some(style.font_size),
            font_weight: Some(style.font_weight),
        }
    }

    /// Merge supplied fields over `base`, leaving the rest untouched.
    pub fn merged_into(&self, base: &NodeStyle) -> NodeStyle {
        NodeStyle {
            background_color: self
                .background_color
                .clone()
                .unwrap_or_else(|| base.background_color.clone()),
            text_color: self
                .text_color
                .clone()
                .unwrap_or_else(|| base.text_color.clone()),
            border_color: self
                .border_color
                .clone()
                .unwrap_or_else(|| base.border_color.clone()),
            border_width: self.border_width.unwrap_or(base.border_width),
            border_radius: self.border_radius.unwrap_or(base.border_radius),
            font_size: self.font_size.unwrap_or(base.font_size),
            font_weight: self.font_weight.unwrap_or(base.font_weight),
        }
    }
}

/// Request body for creating a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNode {
    pub mind_map: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(default)]
    pub kind: NodeKind,
}
