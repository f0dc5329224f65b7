//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits; this container wires the
//! concrete implementations around one shared Unit of Work.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, CategoryCatalog, CategoryService, TransactionManager,
    TransactionService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn categories(&self) -> Arc<dyn CategoryService>;

    fn transactions(&self) -> Arc<dyn TransactionService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    category_service: Arc<dyn CategoryService>,
    transaction_service: Arc<dyn TransactionService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        category_service: Arc<dyn CategoryService>,
        transaction_service: Arc<dyn TransactionService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            category_service,
            transaction_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let auth_service: Arc<dyn AuthService> =
            Arc::new(Authenticator::new(uow.clone(), config));

        Self {
            user_service: Arc::new(UserManager::new(uow.clone(), auth_service.clone())),
            category_service: Arc::new(CategoryCatalog::new(uow.clone())),
            transaction_service: Arc::new(TransactionManager::new(uow)),
            auth_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryService> {
        self.category_service.clone()
    }

    fn transactions(&self) -> Arc<dyn TransactionService> {
        self.transaction_service.clone()
    }
}
