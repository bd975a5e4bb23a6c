use chrono::{DateTime, Utc};
use contracts::{CartLine, CartSnapshot};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A cart line has the same shape on the wire and in storage.
pub type CartItem = CartLine;

/// Most units of one product a cart may hold
pub const MAX_QUANTITY: u32 = 50;

/// The stored cart of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn item_mut(&mut self, product_id: Uuid) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(CartLine::line_total_cents).sum()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            user_id: self.user_id,
            items: self.items.clone(),
            total_cents: self.total_cents(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddCartItem {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 50))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItem {
    /// 0 removes the line
    #[validate(range(max = 50))]
    pub quantity: u32,
}
