//! Infrastructure layer - External systems integration
//!
//! Database connection and migrations, repositories, and the
//! Unit of Work that groups writes into one database transaction.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    CategoryRepository, CategoryStore, ProductRepository, ProductStore, TokenRepository,
    TokenStore, TransactionRepository, TransactionStore, UserRepository, UserStore,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxCheckoutRepository, TxFuture, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockCategoryRepository, MockProductRepository, MockTokenRepository,
    MockTransactionRepository, MockUserRepository,
};
