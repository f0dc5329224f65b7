//! Unit of Work pattern implementation.
//!
//! Centralizes access to the repositories and runs multi-row writes
//! (checkout) inside a single database transaction.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, IsolationLevel, Set, TransactionTrait,
};

use super::repositories::entities::{transaction, transaction_item};
use super::repositories::{
    CategoryRepository, CategoryStore, ProductRepository, ProductStore, TokenRepository,
    TokenStore, TransactionRepository, TransactionStore, UserRepository, UserStore,
};
use crate::domain::{CartItem, NewTransaction};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transactional closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic `transaction` method;
/// tests provide a small hand-written implementation instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn categories(&self) -> Arc<dyn CategoryRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn transactions(&self) -> Arc<dyn TransactionRepository>;

    fn tokens(&self) -> Arc<dyn TokenRepository>;

    /// Execute a closure within a database transaction.
    ///
    /// Committed when the closure succeeds, rolled back when it fails.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to one open database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Order writes for this transaction
    pub fn checkout(&self) -> TxCheckoutRepository<'_> {
        TxCheckoutRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    category_repo: Arc<CategoryStore>,
    product_repo: Arc<ProductStore>,
    transaction_repo: Arc<TransactionStore>,
    token_repo: Arc<TokenStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            category_repo: Arc::new(CategoryStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            transaction_repo: Arc::new(TransactionStore::new(db.clone())),
            token_repo: Arc::new(TokenStore::new(db.clone())),
            db,
        }
    }

    /// SQLite has no per-transaction isolation or access mode.
    fn transaction_config(&self) -> (Option<IsolationLevel>, Option<AccessMode>) {
        match self.db.get_database_backend() {
            DatabaseBackend::Sqlite => (None, None),
            _ => (
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            ),
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn categories(&self) -> Arc<dyn CategoryRepository> {
        self.category_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn transactions(&self) -> Arc<dyn TransactionRepository> {
        self.transaction_repo.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenRepository> {
        self.token_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let (isolation, access_mode) = self.transaction_config();
        let txn = self
            .db
            .begin_with_config(isolation, access_mode)
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Order writes scoped to an open transaction.
pub struct TxCheckoutRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCheckoutRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Insert the order header, returning its ID
    pub async fn create_transaction(&self, header: &NewTransaction) -> AppResult<i32> {
        let now = chrono::Utc::now();
        let active_model = transaction::ActiveModel {
            user_id: Set(header.user_id),
            address: Set(header.address.clone()),
            total_price: Set(header.total_price),
            shipping_price: Set(header.shipping_price),
            status: Set(header.status.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(model.id)
    }

    /// Insert one order line
    pub async fn create_item(
        &self,
        user_id: i32,
        transaction_id: i32,
        item: &CartItem,
    ) -> AppResult<()> {
        let now = chrono::Utc::now();
        let active_model = transaction_item::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(item.product_id),
            transaction_id: Set(transaction_id),
            quantity: Set(item.quantity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(())
    }
}

/// Simpler API for executing transactional operations.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
