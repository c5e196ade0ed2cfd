//! Node CRUD endpoints.

pub mod handlers;

pub use handlers::{create_node, delete_node, get_node, get_nodes_by_mind_map, update_node};
