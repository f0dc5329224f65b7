//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and reach the repositories through the
//! Unit of Work.

mod auth_service;
mod category_service;
pub mod container;
mod transaction_service;
mod user_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{
    AuthService, Authenticator, Claims, CurrentUser, RevokedToken, TokenResponse,
};
pub use category_service::{CategoryCatalog, CategoryService, CATEGORY_NOT_FOUND};
pub use transaction_service::{TransactionManager, TransactionService, TRANSACTION_NOT_FOUND};
pub use user_service::{AuthPayload, ProfileUpdate, RegisterUser, UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use category_service::MockCategoryService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use transaction_service::MockTransactionService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
