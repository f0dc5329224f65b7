//! Category handlers.

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use super::rules::is_truthy;
use crate::api::extractors::ValidatedQuery;
use crate::api::AppState;
use crate::config::DEFAULT_CATEGORY_PAGE_SIZE;
use crate::domain::CategoryFilter;
use crate::errors::AppResult;
use crate::types::{Envelope, PageRequest};

/// Category lookup / listing parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// Fetch a single category (with its parent) instead of a list
    pub id: Option<i32>,
    /// Page size (default 15, max 100)
    pub limit: Option<u64>,
    /// 1-based page number
    pub page: Option<u64>,
    /// Case-insensitive name substring
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Include products (`1`, `true`, `yes`, `on`)
    pub show_product: Option<String>,
}

impl CategoryQuery {
    fn filter(&self) -> CategoryFilter {
        CategoryFilter {
            name: self.name.clone(),
            with_products: is_truthy(self.show_product.as_deref()),
        }
    }
}

pub fn category_routes() -> Router<AppState> {
    Router::new().route("/categories", get(all))
}

/// Get one category by id, or a filtered page of categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Category (with parent) or paginated category list", body = crate::domain::Category),
        (status = 484, description = "Category data does not exist (legacy status policy)"),
        (status = 404, description = "Category data does not exist (standard status policy)")
    )
)]
pub async fn all(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<CategoryQuery>,
) -> AppResult<impl IntoResponse> {
    if let Some(id) = query.id {
        let category = state.category_service.get(id).await?;
        return Ok(Envelope::success(category, "Category data retrieved").into_response());
    }

    let page = PageRequest::new(query.page, query.limit, DEFAULT_CATEGORY_PAGE_SIZE);
    let categories = state.category_service.list(query.filter(), page).await?;

    Ok(Envelope::success(categories, "Category list retrieved").into_response())
}
