//! Mind map CRUD endpoints.

pub mod handlers;

pub use handlers::{
    add_collaborator, create_mind_map, delete_mind_map, get_mind_map, list_mind_maps,
    update_mind_map,
};
