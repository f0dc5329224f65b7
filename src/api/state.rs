//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, CategoryService, ServiceContainer, Services, TransactionService, UserService,
};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub category_service: Arc<dyn CategoryService>,
    pub transaction_service: Arc<dyn TransactionService>,
    /// Database handle (health checks)
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the production services around the database connection.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container, database)
    }

    /// Build state from any service container (tests pass fakes here).
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            category_service: container.categories(),
            transaction_service: container.transactions(),
            database,
        }
    }
}
