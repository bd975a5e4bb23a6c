//! Payment provider abstraction.
//!
//! The service talks to a [`PaymentGateway`]; [`crate::stripe::StripeGateway`]
//! is the production implementation and [`FakePaymentGateway`] serves tests
//! and local runs without provider credentials.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

/// What the service asks the provider to charge
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub customer_email: String,
    pub description: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySession {
    pub session_id: String,
    pub checkout_url: String,
}

/// A verified provider notification
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: String,
    pub kind: WebhookEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEventKind {
    CheckoutCompleted { session_id: String },
    CheckoutExpired { session_id: String },
    /// Identified by session id or, failing that, our own payment id from metadata
    PaymentFailed {
        session_id: Option<String>,
        payment_id: Option<Uuid>,
    },
    Other(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Stored on each payment as `provider`
    fn provider(&self) -> &'static str;

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, GatewayError>;

    /// Authenticate and decode a webhook delivery
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, GatewayError>;
}

/// Hands out `cs_fake_*` sessions and accepts webhooks signed with a fixed
/// signature header value.
#[derive(Clone, Default)]
pub struct FakePaymentGateway {
    sessions_created: Arc<AtomicUsize>,
}

impl FakePaymentGateway {
    pub const SIGNATURE: &'static str = "fake-signature";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    fn provider(&self) -> &'static str {
        "fake"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, GatewayError> {
        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        let session_id = format!("cs_fake_{}", request.payment_id.simple());
        tracing::info!(
            session_id = %session_id,
            amount_cents = request.amount_cents,
            "Fake checkout session created"
        );
        Ok(GatewaySession {
            checkout_url: format!("https://checkout.fake.test/{}", session_id),
            session_id,
        })
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        if signature_header != Self::SIGNATURE {
            return Err(GatewayError::InvalidSignature(
                "signature does not match".to_string(),
            ));
        }
        crate::stripe::parse_event(payload)
    }
}
