//! Mindcanvas - Main Library
//!
//! Mindcanvas is a collaborative mind-mapping application built with Rust:
//! positioned, styled nodes connected by labeled edges, edited through a
//! canvas and shared live with collaborators over a per-map realtime
//! channel.
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types shared between client and backend
//!   - Mind map / node / connection models, realtime events
//!   - The uniform API envelope and error types
//!
//! - **`backend`** - Server-side code (only compiled with the `ssr`
//!   feature, which is on by default)
//!   - Axum HTTP server with mind-map/node CRUD handlers
//!   - Authentication token issuance and verification
//!   - Per-map realtime broadcast with SSE subscriptions
//!
//! - **`client`** - The canvas session core consumed by a UI layer
//!   - Typed document store client with credential refresh
//!   - Reducer-style session state container
//!   - Canvas interaction engine (pan/zoom/drag/resize/connect)
//!   - Connection graph derivation and edge geometry
//!   - Bounded undo/redo history
//!   - Realtime bridge applying remote mutations (last write wins)
//!
//! # Concurrency Model
//!
//! The server keeps all document state behind `Arc<RwLock<>>` and fans
//! mutations out over per-map `tokio::sync::broadcast` channels. The
//! client session is single-threaded and event-driven: exactly one canvas
//! interaction mode is active at a time, and persistence happens only at
//! gesture end, never while a gesture is tracking.
//!
//! # Error Handling
//!
//! - `Result<T, E>` with typed `thiserror` enums at every boundary
//! - Store outcomes carry user-facing messages instead of panicking
//! - Failed optimistic mutations are compensated by rollback, not retried

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Client session core (canvas engine, store client, history, bridge)
pub mod client;
