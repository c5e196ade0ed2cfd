//! Domain models shared between the client and the backend.

pub mod mindmap;
pub mod node;

pub use mindmap::{
    AddCollaborator, Collaborator, CollaboratorRole, CreateMindMap, LayoutKind, MapSettings,
    MindMap, MindMapUpdate, SettingsUpdate, ThemeColors,
};
pub use node::{
    Connection, ConnectionKind, CreateNode, FontWeight, LineDash, LineStyle, Node, NodeKind,
    NodeMetadata, NodeStyle, NodeUpdate, NoteKind, Point, Size, StyleUpdate,
};
