//! Backend Server
//!
//! The Axum HTTP server: authentication token issuance/verification, the
//! server-authoritative document store with mind-map/node CRUD handlers,
//! and per-map realtime broadcast with SSE subscriptions.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod mindmap;
pub mod node;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod store;
