//! Client Session Core
//!
//! Everything a canvas UI needs to edit one mind map collaboratively:
//!
//! - `config` - server URL and persisted credentials
//! - `api` - typed document store client with refresh-on-401
//! - `store` - reducer-style session state container
//! - `canvas` - the gesture state machine (pan/zoom/drag/resize/connect)
//! - `graph` - derived edges and their geometry
//! - `history` - bounded undo/redo snapshots
//! - `bridge` - realtime feed and remote mutation application
//! - `session` - the orchestrating `MapSession`
//!
//! Rendering is out of scope: this layer computes state; a UI draws it.

pub mod api;
pub mod bridge;
pub mod canvas;
pub mod config;
pub mod graph;
pub mod history;
pub mod session;
pub mod store;

pub use api::{ClientError, StoreClient};
pub use bridge::{apply_remote_event, ChannelFeed, RealtimeFeed, SseFeed};
pub use canvas::{CanvasEngine, ConnectOutcome, GestureError, InteractionMode, ResizeDirection};
pub use config::Config;
pub use graph::{derive_edges, edge_endpoints, Edge};
pub use history::{History, Snapshot, HISTORY_CAP};
pub use session::{ConnectStatus, MapSession, SessionError};
pub use store::{reduce, SessionState, SessionStore, StoreAction};
