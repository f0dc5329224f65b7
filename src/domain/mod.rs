//! Domain layer - Core business entities and logic
//!
//! Entities and value objects independent of storage and HTTP concerns.

pub mod catalog;
pub mod password;
pub mod token;
pub mod transaction;
pub mod user;

pub use catalog::{Category, CategoryFilter, Product};
pub use password::Password;
pub use token::AccessToken;
pub use transaction::{
    CartItem, Checkout, NewTransaction, Transaction, TransactionFilter, TransactionItem,
    TransactionStatus, UnknownStatus,
};
pub use user::{NewUser, User, UserChanges, UserRole};
