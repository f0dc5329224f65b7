//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod catalog_repository;
pub mod entities;
mod token_repository;
mod transaction_repository;
mod user_repository;

pub use catalog_repository::{CategoryRepository, CategoryStore, ProductRepository, ProductStore};
pub use token_repository::{TokenRepository, TokenStore};
pub use transaction_repository::{TransactionRepository, TransactionStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_repository::{MockCategoryRepository, MockProductRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use token_repository::MockTokenRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use transaction_repository::MockTransactionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
