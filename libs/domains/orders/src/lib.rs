//! Orders Domain
//!
//! Turns a cart into an order and walks it through its lifecycle:
//! Draft → Pending → Paid → Completed, or Canceled on the way.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────────────────┐
//! │  Handlers   │      │ PaymentCompletedHandler  │ ← bistro:events, group "orders"
//! └──────┬──────┘      └────────────┬─────────────┘
//!        │                          │
//! ┌──────▼──────────────────────────▼─┐
//! │             Service               │ ← cart/catalog/users clients, events
//! └──────┬────────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← orders + order_items (in-memory and Postgres)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_orders::{handlers, InMemoryOrderRepository, OrderClients, OrderService};
//!
//! let service = OrderService::new(InMemoryOrderRepository::new(), publisher, clients);
//! let router = handlers::router(service);
//! ```

pub mod consumer;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use consumer::PaymentCompletedHandler;
pub use contracts::OrderStatus;
pub use error::{OrderError, OrderResult};
pub use handlers::ApiDoc;
pub use models::{CreateOrder, Customer, Order, OrderFilter, OrderItem, OrderList, UpdateOrder};
pub use postgres::PgOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::{OrderClients, OrderService, PaymentOutcome};
