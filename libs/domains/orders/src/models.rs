use chrono::{DateTime, Utc};
use contracts::{OrderCreated, OrderLine, OrderStatus, OrderUpdated};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A line of an order, frozen at the catalog price when the order was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
}

impl OrderItem {
    pub fn new(product_id: Uuid, name: String, unit_price_cents: i64, quantity: u32) -> Self {
        Self {
            product_id,
            name,
            unit_price_cents,
            quantity,
            line_total_cents: unit_price_cents * i64::from(quantity),
        }
    }
}

/// Order entity, one row of `orders` plus its `order_items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total_cents: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub delivery_address: String,
    pub phone: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
}

/// Who the order is for, resolved by the service before creation
#[derive(Debug, Clone)]
pub struct Customer {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Order {
    /// New Draft order; the total is the sum of the line totals
    pub fn new(customer: Customer, items: Vec<OrderItem>, input: CreateOrder) -> Self {
        let now = Utc::now();
        let total_cents = items.iter().map(|i| i.line_total_cents).sum();
        Self {
            id: Uuid::now_v7(),
            user_id: customer.user_id,
            status: OrderStatus::Draft,
            items,
            total_cents,
            customer_name: customer.name,
            customer_email: customer.email,
            delivery_address: input.delivery_address.trim().to_string(),
            phone: input.phone.trim().to_string(),
            comment: input.comment,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            paid_at: None,
            completed_at: None,
            canceled_at: None,
        }
    }

    pub fn apply_update(&mut self, update: UpdateOrder) {
        if let Some(address) = update.delivery_address {
            self.delivery_address = address.trim().to_string();
        }
        if let Some(phone) = update.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(comment) = update.comment {
            self.comment = Some(comment);
        }
        self.updated_at = Utc::now();
    }

    /// Moves to `next` and stamps the matching timestamp.
    /// Returns false, leaving the order untouched, if the move is not allowed.
    pub fn transition(&mut self, next: OrderStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        let now = Utc::now();
        match next {
            OrderStatus::Pending => self.confirmed_at = Some(now),
            OrderStatus::Paid => self.paid_at = Some(now),
            OrderStatus::Completed => self.completed_at = Some(now),
            OrderStatus::Canceled => self.canceled_at = Some(now),
            OrderStatus::Draft => {}
        }
        self.status = next;
        self.updated_at = now;
        true
    }

    pub fn created_event(&self) -> OrderCreated {
        OrderCreated {
            order_id: self.id,
            user_id: self.user_id,
            customer_email: self.customer_email.clone(),
            customer_name: self.customer_name.clone(),
            items: self
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    unit_price_cents: item.unit_price_cents,
                    quantity: item.quantity,
                })
                .collect(),
            total_cents: self.total_cents,
            created_at: self.created_at,
        }
    }

    pub fn updated_event(&self, previous_status: OrderStatus) -> OrderUpdated {
        OrderUpdated {
            order_id: self.id,
            user_id: self.user_id,
            customer_email: self.customer_email.clone(),
            customer_name: self.customer_name.clone(),
            status: self.status,
            previous_status,
            total_cents: self.total_cents,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrder {
    #[validate(length(min = 1, max = 500))]
    pub delivery_address: String,
    #[validate(length(min = 5, max = 32))]
    pub phone: String,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOrder {
    #[validate(length(min = 1, max = 500))]
    pub delivery_address: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

/// Query filters for listing orders; `user_id` is forced for non-staff callers
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u64,
    #[serde(default)]
    #[validate(range(max = 1_000_000))]
    pub offset: u64,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            user_id: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> u64 {
    50
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(user_id) = self.user_id
            && order.user_id != user_id
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
    pub total: u64,
}
