//! HTTP request handlers.

pub mod auth_handler;
pub mod category_handler;
mod rules;
pub mod transaction_handler;
pub mod user_handler;

pub use auth_handler::{auth_routes, session_routes};
pub use category_handler::category_routes;
pub use transaction_handler::transaction_routes;
pub use user_handler::user_routes;
