//! Transaction (order) handlers. All routes require authentication.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::rules::validate_status;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::DEFAULT_TRANSACTION_PAGE_SIZE;
use crate::domain::{CartItem, Checkout, Transaction, TransactionFilter, TransactionStatus};
use crate::errors::{AppError, AppResult};
use crate::types::{Envelope, PageRequest};

/// Order lookup / listing parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    /// Fetch a single order instead of a list
    pub id: Option<i32>,
    /// Page size (default 6, max 100)
    pub limit: Option<u64>,
    /// 1-based page number
    pub page: Option<u64>,
    /// Exact status filter
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

/// One cart entry
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartItemRequest {
    /// Product id
    #[validate(required)]
    #[schema(example = 1)]
    pub id: Option<i32>,
    #[validate(required, range(min = 1))]
    #[schema(example = 2)]
    pub quantity: Option<i32>,
}

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(required, length(min = 1, message = "The items field is required."), nested)]
    pub items: Option<Vec<CartItemRequest>>,
    #[validate(required, range(min = 0.0))]
    #[schema(example = 100000.0)]
    pub total_price: Option<f64>,
    #[validate(required, range(min = 0.0))]
    #[schema(example = 10000.0)]
    pub shipping_price: Option<f64>,
    #[validate(required, custom(function = "validate_status"))]
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    #[validate(length(max = 255))]
    #[schema(example = "Jl. Merdeka No. 1, Jakarta")]
    pub address: Option<String>,
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| {
        AppError::validation(field, format!("The {} field is required.", field))
    })
}

fn parse_status(value: &str) -> AppResult<TransactionStatus> {
    value
        .parse()
        .map_err(|_| AppError::validation("status", "The selected status is invalid."))
}

impl CheckoutRequest {
    /// Convert an already validated request into the domain command
    fn into_checkout(self) -> AppResult<Checkout> {
        let items = required(self.items, "items")?
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                Ok(CartItem {
                    product_id: required(item.id, &format!("items.{}.id", index))?,
                    quantity: required(item.quantity, &format!("items.{}.quantity", index))?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Checkout {
            items,
            address: self.address,
            total_price: required(self.total_price, "total_price")?,
            shipping_price: required(self.shipping_price, "shipping_price")?,
            status: parse_status(&required(self.status, "status")?)?,
        })
    }
}

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(all))
        .route("/checkout", post(checkout))
}

/// Get one of the caller's orders by id, or a page of them
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    params(TransactionQuery),
    responses(
        (status = 200, description = "Order with lines or paginated order list", body = Transaction),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Unknown status filter"),
        (status = 484, description = "Transaction data does not exist (legacy status policy)")
    ),
    security(("bearer_auth" = []))
)]
pub async fn all(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedQuery(query): ValidatedQuery<TransactionQuery>,
) -> AppResult<impl IntoResponse> {
    if let Some(id) = query.id {
        let transaction = state.transaction_service.get(&current_user, id).await?;
        return Ok(Envelope::success(transaction, "Transaction data retrieved").into_response());
    }

    let filter = TransactionFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
    };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_TRANSACTION_PAGE_SIZE);
    let transactions = state
        .transaction_service
        .list(&current_user, filter, page)
        .await?;

    Ok(Envelope::success(transactions, "Transaction list retrieved").into_response())
}

/// Place an order
#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "Transactions",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Transaction successful", body = Transaction),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CheckoutRequest>,
) -> AppResult<Envelope<Transaction>> {
    let transaction = state
        .transaction_service
        .checkout(&current_user, payload.into_checkout()?)
        .await?;

    Ok(Envelope::success(transaction, "Transaction successful"))
}
