//! Authentication HTTP Handlers
//!
//! - `POST /api/auth/signup` - create an account, returns a credential pair
//! - `POST /api/auth/login` - verify credentials, returns a credential pair
//! - `POST /api/auth/refresh` - exchange a refresh token for a new pair
//! - `GET /api/auth/me` - current authenticated user

pub mod login;
pub mod me;
pub mod refresh;
pub mod signup;
pub mod types;

pub use login::login;
pub use me::get_me;
pub use refresh::refresh;
pub use signup::signup;
