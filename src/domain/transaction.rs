//! Order (transaction) entities and the checkout command.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::Product;

/// Order status asserted by the client at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Success,
    Canceled,
    Failed,
    Shipping,
    Shipped,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 6] = [
        TransactionStatus::Pending,
        TransactionStatus::Success,
        TransactionStatus::Canceled,
        TransactionStatus::Failed,
        TransactionStatus::Shipping,
        TransactionStatus::Shipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Canceled => "CANCELED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Shipping => "SHIPPING",
            TransactionStatus::Shipped => "SHIPPED",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for values outside the status enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown transaction status '{}'", self.0)
    }
}

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransactionItem {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub transaction_id: i32,
    #[schema(example = 2)]
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Eager-loaded product (absent if the product row is gone)
    pub product: Option<Product>,
}

/// Order with its lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub address: Option<String>,
    #[schema(example = 100000.0)]
    pub total_price: f64,
    #[schema(example = 10000.0)]
    pub shipping_price: f64,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<TransactionItem>,
}

impl Transaction {
    /// Visible to its owner and to administrators
    pub fn is_visible_to(&self, user_id: i32, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id
    }
}

/// Listing filter for a user's orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
}

/// One cart entry at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Validated checkout request
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub items: Vec<CartItem>,
    pub address: Option<String>,
    pub total_price: f64,
    pub shipping_price: f64,
    pub status: TransactionStatus,
}

/// Order header row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: i32,
    pub address: Option<String>,
    pub total_price: f64,
    pub shipping_price: f64,
    pub status: TransactionStatus,
}

impl Checkout {
    /// Split into the header row for `user_id` and its cart lines
    pub fn into_parts(self, user_id: i32) -> (NewTransaction, Vec<CartItem>) {
        (
            NewTransaction {
                user_id,
                address: self.address,
                total_price: self.total_price,
                shipping_price: self.shipping_price,
                status: self.status,
            },
            self.items,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("PENDING".parse::<TransactionStatus>(), Ok(TransactionStatus::Pending));
        assert_eq!("SHIPPED".parse::<TransactionStatus>(), Ok(TransactionStatus::Shipped));
        assert!("pending".parse::<TransactionStatus>().is_err());
        assert!("DELIVERED".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        for status in TransactionStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
    }

    #[test]
    fn test_checkout_into_parts() {
        let checkout = Checkout {
            items: vec![CartItem { product_id: 1, quantity: 2 }],
            address: Some("Jl. Merdeka 1".to_string()),
            total_price: 100.0,
            shipping_price: 10.0,
            status: TransactionStatus::Pending,
        };

        let (header, items) = checkout.into_parts(9);
        assert_eq!(header.user_id, 9);
        assert_eq!(header.status, TransactionStatus::Pending);
        assert_eq!(items, vec![CartItem { product_id: 1, quantity: 2 }]);
    }
}
