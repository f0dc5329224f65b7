//! Transaction service - order history and checkout.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use super::auth_service::CurrentUser;
use crate::domain::{Checkout, Transaction, TransactionFilter};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::infra::UnitOfWork;
use crate::types::{PageRequest, Paginated};
use crate::with_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

pub const TRANSACTION_NOT_FOUND: &str = "Transaction data does not exist";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// One order visible to the caller (owner or admin)
    async fn get(&self, current: &CurrentUser, id: i32) -> AppResult<Transaction>;

    /// The caller's own orders, newest first
    async fn list(
        &self,
        current: &CurrentUser,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> AppResult<Paginated<Transaction>>;

    /// Persist an order with its lines atomically and return it reloaded
    async fn checkout(&self, current: &CurrentUser, checkout: Checkout) -> AppResult<Transaction>;
}

pub struct TransactionManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> TransactionManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Every cart line must reference an existing product.
    async fn ensure_products_exist(&self, checkout: &Checkout) -> AppResult<()> {
        let ids: Vec<i32> = checkout.items.iter().map(|item| item.product_id).collect();
        let existing: HashSet<i32> = self
            .uow
            .products()
            .existing_ids(ids)
            .await?
            .into_iter()
            .collect();

        let mut errors = FieldErrors::new();
        for (index, item) in checkout.items.iter().enumerate() {
            if !existing.contains(&item.product_id) {
                let field = format!("items.{}.id", index);
                let message = format!("The selected {} is invalid.", field);
                errors.add(field, message);
            }
        }
        errors.into_result()
    }
}

#[async_trait]
impl<U: UnitOfWork> TransactionService for TransactionManager<U> {
    async fn get(&self, current: &CurrentUser, id: i32) -> AppResult<Transaction> {
        match self.uow.transactions().find_by_id(id).await? {
            Some(found) if found.is_visible_to(current.id(), current.is_admin()) => Ok(found),
            _ => Err(AppError::not_found(TRANSACTION_NOT_FOUND)),
        }
    }

    async fn list(
        &self,
        current: &CurrentUser,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> AppResult<Paginated<Transaction>> {
        let (transactions, total) = self
            .uow
            .transactions()
            .list_for_user(current.id(), filter, page)
            .await?;

        Ok(Paginated::new(transactions, page, total))
    }

    async fn checkout(&self, current: &CurrentUser, checkout: Checkout) -> AppResult<Transaction> {
        if checkout.items.is_empty() {
            return Err(AppError::validation("items", "The items field is required."));
        }
        self.ensure_products_exist(&checkout).await?;

        let user_id = current.id();
        let (header, items) = checkout.into_parts(user_id);

        let transaction_id = with_transaction!(self.uow, |ctx| {
            let orders = ctx.checkout();
            let transaction_id = orders.create_transaction(&header).await?;
            for item in &items {
                orders.create_item(user_id, transaction_id, item).await?;
            }
            Ok::<_, AppError>(transaction_id)
        })?;

        tracing::info!(user_id, transaction_id, "Checkout completed");

        self.uow
            .transactions()
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("transaction {} vanished", transaction_id)))
    }
}
