//! Wire shapes of the cross-service HTTP calls.

use crate::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A line of a cart, priced when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// `GET /api/cart`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartSnapshot {
    pub user_id: Uuid,
    pub items: Vec<CartLine>,
    pub total_cents: i64,
    pub updated_at: DateTime<Utc>,
}

impl CartSnapshot {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total_cents: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `GET /api/products/{id}`, as read by other services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub is_available: bool,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// `GET /api/users/{id}/public`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// The fields of `GET /api/orders/{id}` that payments and reviews rely on.
/// Unknown fields of the full order are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub customer_email: String,
}
