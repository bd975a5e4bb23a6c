//! Payments Domain
//!
//! Hosted checkout for Pending orders and the provider webhook that turns a
//! finished checkout into a `PaymentCompleted` event.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← checkout, webhook (signature checked), lookups
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────────┐
//! │   Service   │ ──► │ PaymentGateway │  ← Stripe or fake
//! └──────┬──────┘     └────────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← in-memory and Postgres
//! └─────────────┘
//! ```

pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod stripe;

pub use error::{PaymentError, PaymentResult};
pub use gateway::{
    CheckoutRequest, FakePaymentGateway, GatewayError, GatewaySession, PaymentGateway,
    WebhookEvent, WebhookEventKind,
};
pub use handlers::ApiDoc;
pub use models::{
    CheckoutSession, CreateCheckout, Payment, PaymentFilter, PaymentList, PaymentStatus,
};
pub use postgres::PgPaymentRepository;
pub use repository::{InMemoryPaymentRepository, PaymentRepository};
pub use service::{CheckoutSettings, PaymentService, WebhookOutcome};
pub use stripe::{StripeConfig, StripeGateway};
