//! Order record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Address, Cart, CartItem, OrderId, OrderStatus, UserId};

/// A snapshot of a cart at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot `cart` into a new pending order.
    ///
    /// Lines and total are copied as-is.
    #[must_use]
    pub fn from_cart(id: OrderId, cart: &Cart, shipping_address: Address) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: cart.user_id.clone(),
            items: cart.items.clone(),
            total: cart.total,
            status: OrderStatus::Pending,
            shipping_address,
            created_at: now,
            updated_at: now,
        }
    }
}
