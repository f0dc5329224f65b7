//! Catalog repositories: categories (single lookups with the parent,
//! filtered listings) and product existence checks.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use super::entities::{category, product};
use crate::domain::{Category, CategoryFilter, Product};
use crate::errors::{AppError, AppResult};
use crate::types::PageRequest;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category by ID with its parent category attached
    async fn find_with_parent(&self, id: i32) -> AppResult<Option<Category>>;

    /// One page of categories matching `filter`, plus the total match count
    async fn list(&self, filter: CategoryFilter, page: PageRequest)
        -> AppResult<(Vec<Category>, u64)>;
}

pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn find_with_parent(&self, id: i32) -> AppResult<Option<Category>> {
        let Some(model) = category::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
        else {
            return Ok(None);
        };

        let parent = match model.parent_id {
            Some(parent_id) => category::Entity::find_by_id(parent_id)
                .one(&self.db)
                .await
                .map_err(AppError::from)?
                .map(|parent| Box::new(Category::from(parent))),
            None => None,
        };

        let mut found = Category::from(model);
        found.parent = parent;
        Ok(Some(found))
    }

    async fn list(
        &self,
        filter: CategoryFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Category>, u64)> {
        let mut query = category::Entity::find();

        if let Some(name) = filter.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(category::Column::Name)))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            );
        }

        let paginator = query
            .order_by_asc(category::Column::Id)
            .paginate(&self.db, page.per_page);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.index()).await?;

        if !filter.with_products {
            return Ok((models.into_iter().map(Category::from).collect(), total));
        }

        let products = models
            .load_many(product::Entity::find().order_by_asc(product::Column::Id), &self.db)
            .await?;

        let categories = models
            .into_iter()
            .zip(products)
            .map(|(model, products)| {
                let mut category = Category::from(model);
                category.products = Some(products.into_iter().map(Product::from).collect());
                category
            })
            .collect();

        Ok((categories, total))
    }
}

const LIKE_ESCAPE: char = '\\';

/// Make `%`, `_` and the escape character match literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Narrow lookups on products used when validating carts.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Subset of `ids` that exist as products
    async fn existing_ids(&self, ids: Vec<i32>) -> AppResult<Vec<i32>>;
}

pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn existing_ids(&self, ids: Vec<i32>) -> AppResult<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(|m| m.id).collect())
    }
}
