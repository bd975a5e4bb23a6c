//! Stream consumer for the `orders` group.
//!
//! Marks Pending orders Paid when payments reports a completed payment.
//! Everything except storage failures is acknowledged, so a replayed or
//! stray event never lands in the DLQ.

use async_trait::async_trait;
use contracts::{BistroEvent, IntegrationEvent};
use std::sync::Arc;
use stream_worker::{StreamError, StreamProcessor};
use tracing::{debug, info, warn};

use crate::repository::OrderRepository;
use crate::service::{OrderService, PaymentOutcome};

pub struct PaymentCompletedHandler<R: OrderRepository> {
    service: Arc<OrderService<R>>,
}

impl<R: OrderRepository> PaymentCompletedHandler<R> {
    pub fn new(service: Arc<OrderService<R>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<R: OrderRepository + 'static> StreamProcessor<IntegrationEvent> for PaymentCompletedHandler<R> {
    async fn process(&self, job: &IntegrationEvent) -> Result<(), StreamError> {
        let BistroEvent::PaymentCompleted(payment) = &job.event else {
            debug!(event_type = job.event_type(), "Ignoring event");
            return Ok(());
        };

        let outcome = self
            .service
            .apply_payment(payment)
            .await
            .map_err(|e| StreamError::processing(e.to_string()))?;

        match outcome {
            PaymentOutcome::MarkedPaid => {
                info!(order_id = %payment.order_id, payment_id = %payment.payment_id, "Order paid");
            }
            PaymentOutcome::Duplicate => {
                info!(order_id = %payment.order_id, "Duplicate payment event, order already paid");
            }
            PaymentOutcome::OrderMissing => {
                warn!(order_id = %payment.order_id, "Payment for unknown order");
            }
            PaymentOutcome::Ignored(status) => {
                warn!(order_id = %payment.order_id, %status, "Payment for order in unexpected state");
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "PaymentCompletedHandler"
    }
}
