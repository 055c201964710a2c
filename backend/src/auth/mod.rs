//! Authentication module
//!
//! Token-based authentication with bcrypt password hashing, a per-request
//! guard, and the cookie transport policy.

pub mod cookies;
mod guard;
mod password;
mod token;

pub use guard::{require_auth, CurrentIdentity, RouteExemptions};
pub use password::PasswordService;
pub use token::{AuthIdentity, Claims, TokenError, TokenService};
