use axum_helpers::CurrentUser;
use chrono::Utc;
use clients::{ClientError, OrderClient};
use contracts::{BistroEvent, EventPublisher, OrderStatus, PaymentCompleted};
use core_config::{ConfigError, FromEnv, env_optional, env_or_default};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::{CheckoutRequest, PaymentGateway, WebhookEventKind};
use crate::models::{
    CheckoutSession, CreateCheckout, Payment, PaymentFilter, PaymentList, PaymentStatus,
};
use crate::repository::PaymentRepository;

/// Currency and default redirect targets for new checkout sessions
#[derive(Clone, Debug)]
pub struct CheckoutSettings {
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl FromEnv for CheckoutSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let frontend = env_or_default("FRONTEND_URL", "http://localhost:3000");
        Ok(Self {
            currency: env_or_default("PAYMENT_CURRENCY", "usd").to_lowercase(),
            success_url: env_optional("PAYMENT_SUCCESS_URL")
                .unwrap_or_else(|| format!("{}/payment/success", frontend)),
            cancel_url: env_optional("PAYMENT_CANCEL_URL")
                .unwrap_or_else(|| format!("{}/payment/cancel", frontend)),
        })
    }
}

/// Result of a webhook delivery; every variant answers 200
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Completed(Uuid),
    AlreadyCompleted(Uuid),
    Canceled(Uuid),
    Failed(Uuid),
    Ignored(String),
}

/// Service layer for checkout and provider notifications
pub struct PaymentService<R: PaymentRepository> {
    repository: Arc<R>,
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrderClient>,
    publisher: Arc<dyn EventPublisher>,
    settings: CheckoutSettings,
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(
        repository: R,
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrderClient>,
        publisher: Arc<dyn EventPublisher>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            gateway,
            orders,
            publisher,
            settings,
        }
    }

    /// Start (or resume) paying for a Pending order owned by the caller.
    pub async fn checkout(
        &self,
        user: &CurrentUser,
        input: CreateCheckout,
    ) -> PaymentResult<CheckoutSession> {
        let order = self
            .orders
            .get_order(input.order_id, &user.token)
            .await
            .map_err(|e| match e {
                ClientError::NotFound => PaymentError::OrderNotFound(input.order_id),
                ClientError::Forbidden => {
                    PaymentError::Forbidden("Only the owner can pay for this order".to_string())
                }
                other => PaymentError::Orders(other),
            })?;

        if order.user_id != user.id {
            return Err(PaymentError::Forbidden(
                "Only the owner can pay for this order".to_string(),
            ));
        }
        if order.status != OrderStatus::Pending {
            return Err(PaymentError::InvalidOrder(format!(
                "Order is {}, only pending orders can be paid",
                order.status
            )));
        }

        if let Some(existing) = self.repository.find_by_order(order.id).await?
            && existing.status == PaymentStatus::Pending
        {
            tracing::debug!(payment_id = %existing.id, "Reusing pending checkout session");
            return Ok(existing.checkout_session());
        }

        let payment_id = Uuid::now_v7();
        let request = CheckoutRequest {
            payment_id,
            order_id: order.id,
            amount_cents: order.total_cents,
            currency: self.settings.currency.clone(),
            customer_email: order.customer_email.clone(),
            description: format!("Bistro order {}", order.id),
            success_url: input
                .success_url
                .unwrap_or_else(|| self.settings.success_url.clone()),
            cancel_url: input
                .cancel_url
                .unwrap_or_else(|| self.settings.cancel_url.clone()),
        };
        let session = self.gateway.create_checkout_session(&request).await?;

        let now = Utc::now();
        let payment = self
            .repository
            .create(Payment {
                id: payment_id,
                order_id: order.id,
                user_id: order.user_id,
                amount_cents: order.total_cents,
                currency: request.currency,
                status: PaymentStatus::Pending,
                provider: self.gateway.provider().to_string(),
                provider_session_id: session.session_id,
                checkout_url: Some(session.checkout_url),
                customer_email: order.customer_email,
                created_at: now,
                updated_at: now,
                completed_at: None,
            })
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            amount_cents = payment.amount_cents,
            "Checkout session created"
        );
        Ok(payment.checkout_session())
    }

    /// Verify and apply a provider notification.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<WebhookOutcome> {
        let event = self.gateway.verify_webhook(payload, signature)?;
        tracing::debug!(event_id = %event.id, kind = ?event.kind, "Webhook verified");

        match event.kind {
            WebhookEventKind::CheckoutCompleted { session_id } => {
                self.complete_session(&session_id).await
            }
            WebhookEventKind::CheckoutExpired { session_id } => {
                let payment = self.repository.find_by_session(&session_id).await?;
                self.settle(payment, PaymentStatus::Canceled, &session_id)
                    .await
            }
            WebhookEventKind::PaymentFailed {
                session_id,
                payment_id,
            } => {
                let payment = match (&session_id, payment_id) {
                    (Some(session_id), _) => self.repository.find_by_session(session_id).await?,
                    (None, Some(id)) => self.repository.get_by_id(id).await?,
                    (None, None) => None,
                };
                let reference = session_id
                    .or_else(|| payment_id.map(|id| id.to_string()))
                    .unwrap_or_default();
                self.settle(payment, PaymentStatus::Failed, &reference)
                    .await
            }
            WebhookEventKind::Other(event_type) => {
                tracing::debug!(%event_type, "Ignoring webhook event");
                Ok(WebhookOutcome::Ignored(event_type))
            }
        }
    }

    /// Latest payment for an order (owner or staff)
    pub async fn get_for_order(&self, user: &CurrentUser, order_id: Uuid) -> PaymentResult<Payment> {
        let payment = self
            .repository
            .find_by_order(order_id)
            .await?
            .ok_or(PaymentError::NotFoundForOrder(order_id))?;

        if payment.user_id != user.id && !user.is_staff() {
            return Err(PaymentError::Forbidden(
                "Not allowed to view this payment".to_string(),
            ));
        }
        Ok(payment)
    }

    pub async fn list_payments(&self, filter: PaymentFilter) -> PaymentResult<PaymentList> {
        let total = self.repository.count(filter.clone()).await?;
        let items = self.repository.list(filter).await?;
        Ok(PaymentList { items, total })
    }

    async fn complete_session(&self, session_id: &str) -> PaymentResult<WebhookOutcome> {
        let mut payment = self
            .repository
            .find_by_session(session_id)
            .await?
            .ok_or_else(|| PaymentError::UnknownSession(session_id.to_string()))?;

        if payment.status == PaymentStatus::Completed {
            tracing::info!(payment_id = %payment.id, "Payment already completed, skipping");
            return Ok(WebhookOutcome::AlreadyCompleted(payment.id));
        }

        let completed_at = payment.complete();
        let event = BistroEvent::PaymentCompleted(PaymentCompleted {
            payment_id: payment.id,
            order_id: payment.order_id,
            user_id: payment.user_id,
            amount_cents: payment.amount_cents,
            currency: payment.currency.clone(),
            customer_email: payment.customer_email.clone(),
            completed_at,
        });

        // Publish before storing Completed: until the status is saved, a
        // redelivered webhook runs this step again.
        self.publisher.publish(event).await.map_err(|e| {
            tracing::error!(payment_id = %payment.id, error = %e, "Failed to publish PaymentCompleted");
            PaymentError::Events(e.to_string())
        })?;
        let payment = self.repository.update(payment).await?;

        tracing::info!(payment_id = %payment.id, order_id = %payment.order_id, "Payment completed");
        Ok(WebhookOutcome::Completed(payment.id))
    }

    /// Move a Pending payment to a final non-success state.
    async fn settle(
        &self,
        payment: Option<Payment>,
        status: PaymentStatus,
        reference: &str,
    ) -> PaymentResult<WebhookOutcome> {
        let Some(mut payment) = payment else {
            tracing::warn!(reference, %status, "Webhook for unknown payment");
            return Ok(WebhookOutcome::Ignored(format!("unknown payment {}", reference)));
        };
        if payment.status != PaymentStatus::Pending {
            tracing::info!(payment_id = %payment.id, current = %payment.status, "Payment already settled");
            return Ok(WebhookOutcome::Ignored(format!("payment is {}", payment.status)));
        }

        payment.mark(status);
        let payment = self.repository.update(payment).await?;
        tracing::info!(payment_id = %payment.id, %status, "Payment settled");

        Ok(match status {
            PaymentStatus::Canceled => WebhookOutcome::Canceled(payment.id),
            _ => WebhookOutcome::Failed(payment.id),
        })
    }
}
