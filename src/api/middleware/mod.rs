//! API middleware.

mod auth;

pub use auth::auth_middleware;
pub use crate::services::CurrentUser;
