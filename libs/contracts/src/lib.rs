//! Shared contracts between the bistro services.
//!
//! - [`events`]: integration events carried on the `bistro:events` stream
//! - [`publisher`]: the [`EventPublisher`] seam used by domain services
//! - [`dto`]: response shapes other services read over HTTP
//! - [`OrderStatus`]: the order lifecycle, shared by orders, payments and reviews

pub mod dto;
pub mod events;
pub mod publisher;
mod status;

pub use dto::{CartLine, CartSnapshot, OrderSummary, ProductSummary, UserPublicProfile};
pub use events::{
    BistroEvent, BistroEvents, BookingCreated, IntegrationEvent, OrderCreated, OrderDeleted,
    OrderLine, OrderUpdated, PasswordResetRequested, PaymentCompleted, UserRegistered,
};
pub use publisher::{EventPublisher, InMemoryEventPublisher, RedisEventPublisher};
pub use status::OrderStatus;
