//! Shared Types
//!
//! Types shared between the backend server and the client session core:
//! domain models, the uniform API envelope, realtime events, errors, and
//! client configuration.

pub mod config;
pub mod envelope;
pub mod error;
pub mod event;
pub mod model;

pub use envelope::{Envelope, Pagination};
pub use error::SharedError;
pub use event::{generate_session_id, MapEvent, MapEventKind};
pub use model::{MindMap, Node};
