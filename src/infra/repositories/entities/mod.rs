//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod access_token;
pub mod category;
pub mod product;
pub mod transaction;
pub mod transaction_item;
pub mod user;
