//! Catalog entities: product categories and products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product referenced by categories and order lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Running Shoes")]
    pub name: String,
    #[schema(example = 450000.0)]
    pub price: f64,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product category.
///
/// Relations are only present when they were eager-loaded: `parent` on
/// single lookups, `products` when a listing asked for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Sport")]
    pub name: String,
    pub parent_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub parent: Option<Box<Category>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
}

/// Listing filter for categories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Case-insensitive substring of the category name
    pub name: Option<String>,
    /// Eager-load each category's products
    pub with_products: bool,
}
