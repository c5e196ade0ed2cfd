//! Authentication
//!
//! Token issuance/verification (`sessions`), the Postgres user store
//! (`users`), and the HTTP handlers for signup/login/refresh/me.

pub mod handlers;
pub mod sessions;
pub mod users;

pub use handlers::{get_me, login, refresh, signup};
