//! Transaction (order) repository with eager-loaded lines and products.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use super::entities::{product, transaction, transaction_item};
use crate::domain::{Product, Transaction, TransactionFilter, TransactionItem, TransactionStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PageRequest;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Find an order by ID with its lines and their products
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Transaction>>;

    /// One page of a user's orders, newest first, plus the total count
    async fn list_for_user(
        &self,
        user_id: i32,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Transaction>, u64)>;
}

pub struct TransactionStore {
    db: DatabaseConnection,
}

impl TransactionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionRepository for TransactionStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Transaction>> {
        let Some(header) = transaction::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
        else {
            return Ok(None);
        };

        let mut loaded = with_items(&self.db, vec![header]).await?;
        Ok(loaded.pop())
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Transaction>, u64)> {
        let mut query = transaction::Entity::find().filter(transaction::Column::UserId.eq(user_id));

        if let Some(status) = filter.status {
            query = query.filter(transaction::Column::Status.eq(status.as_str()));
        }

        let paginator = query
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id)
            .paginate(&self.db, page.per_page);
        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.index()).await?;

        Ok((with_items(&self.db, headers).await?, total))
    }
}

/// Attach lines (and each line's product) to order headers, keeping order.
async fn with_items<C>(
    db: &C,
    headers: Vec<transaction::Model>,
) -> AppResult<Vec<Transaction>>
where
    C: ConnectionTrait,
{
    let items = headers
        .load_many(
            transaction_item::Entity::find().order_by_asc(transaction_item::Column::Id),
            db,
        )
        .await?;

    let flat: Vec<transaction_item::Model> = items.iter().flatten().cloned().collect();
    let mut products = flat.load_one(product::Entity, db).await?.into_iter();

    let mut loaded = Vec::with_capacity(headers.len());
    for (header, lines) in headers.into_iter().zip(items) {
        let lines = lines
            .into_iter()
            .map(|line| {
                let product = products.next().flatten().map(Product::from);
                to_item(line, product)
            })
            .collect();
        loaded.push(to_transaction(header, lines)?);
    }

    Ok(loaded)
}

fn to_item(model: transaction_item::Model, product: Option<Product>) -> TransactionItem {
    TransactionItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        transaction_id: model.transaction_id,
        quantity: model.quantity,
        created_at: model.created_at,
        updated_at: model.updated_at,
        product,
    }
}

fn to_transaction(
    model: transaction::Model,
    items: Vec<TransactionItem>,
) -> AppResult<Transaction> {
    let status = model
        .status
        .parse::<TransactionStatus>()
        .map_err(|e| AppError::internal(format!("transaction {}: {}", model.id, e)))?;

    Ok(Transaction {
        id: model.id,
        user_id: model.user_id,
        address: model.address,
        total_price: model.total_price,
        shipping_price: model.shipping_price,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
        items,
    })
}
