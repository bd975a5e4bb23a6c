//! Integration events carried on the `bistro:events` stream.
//!
//! Every message is an [`IntegrationEvent`] envelope whose `event` field is
//! tagged as `{"type": "OrderCreated", "payload": {...}}`.

use crate::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stream_worker::{StreamDef, StreamJob};
use uuid::Uuid;

/// The single event stream shared by all services.
pub struct BistroEvents;

impl StreamDef for BistroEvents {
    const STREAM_NAME: &'static str = "bistro:events";
    const DLQ_STREAM: &'static str = "bistro:events:dlq";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub items: Vec<OrderLine>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdated {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub status: OrderStatus,
    pub previous_status: OrderStatus,
    pub total_cents: i64,
    pub updated_at: DateTime<Utc>,
}

impl OrderUpdated {
    pub fn status_changed(&self) -> bool {
        self.status != self.previous_status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDeleted {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCompleted {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub customer_email: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCreated {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub contact_email: String,
    pub contact_name: String,
    /// Display name of the zone, e.g. "Main hall"
    pub zone: String,
    pub starts_at: DateTime<Utc>,
    pub guests: u32,
    pub hookahs_count: u32,
}

/// Carries the plaintext token; only its hash is stored by the users service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordResetRequested {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub reset_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BistroEvent {
    OrderCreated(OrderCreated),
    OrderUpdated(OrderUpdated),
    OrderDeleted(OrderDeleted),
    PaymentCompleted(PaymentCompleted),
    UserRegistered(UserRegistered),
    BookingCreated(BookingCreated),
    PasswordResetRequested(PasswordResetRequested),
}

impl BistroEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            BistroEvent::OrderCreated(_) => "OrderCreated",
            BistroEvent::OrderUpdated(_) => "OrderUpdated",
            BistroEvent::OrderDeleted(_) => "OrderDeleted",
            BistroEvent::PaymentCompleted(_) => "PaymentCompleted",
            BistroEvent::UserRegistered(_) => "UserRegistered",
            BistroEvent::BookingCreated(_) => "BookingCreated",
            BistroEvent::PasswordResetRequested(_) => "PasswordResetRequested",
        }
    }
}

/// Stream envelope around a [`BistroEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
    pub event: BistroEvent,
}

impl IntegrationEvent {
    pub fn new(event: BistroEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            retry_count: 0,
            event,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}

impl StreamJob for IntegrationEvent {
    fn job_id(&self) -> String {
        self.event_id.to_string()
    }

    fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Same event id, so consumers can correlate redeliveries.
    fn with_retry(&self) -> Self {
        Self {
            retry_count: self.retry_count + 1,
            ..self.clone()
        }
    }
}
