//! Category service - catalog lookups.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Category, CategoryFilter};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{PageRequest, Paginated};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

pub const CATEGORY_NOT_FOUND: &str = "Category data does not exist";

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Single category with its parent
    async fn get(&self, id: i32) -> AppResult<Category>;

    /// Filtered, paginated listing
    async fn list(&self, filter: CategoryFilter, page: PageRequest)
        -> AppResult<Paginated<Category>>;
}

pub struct CategoryCatalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CategoryCatalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CategoryService for CategoryCatalog<U> {
    async fn get(&self, id: i32) -> AppResult<Category> {
        self.uow
            .categories()
            .find_with_parent(id)
            .await?
            .ok_or_not_found(CATEGORY_NOT_FOUND)
    }

    async fn list(
        &self,
        filter: CategoryFilter,
        page: PageRequest,
    ) -> AppResult<Paginated<Category>> {
        let (categories, total) = self.uow.categories().list(filter, page).await?;
        Ok(Paginated::new(categories, page, total))
    }
}
