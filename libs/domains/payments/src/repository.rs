use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PaymentError, PaymentResult};
use crate::models::{Payment, PaymentFilter};

/// Repository trait for Payment persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> PaymentResult<Payment>;

    async fn get_by_id(&self, id: Uuid) -> PaymentResult<Option<Payment>>;

    /// Most recent payment for the order
    async fn find_by_order(&self, order_id: Uuid) -> PaymentResult<Option<Payment>>;

    async fn find_by_session(&self, session_id: &str) -> PaymentResult<Option<Payment>>;

    /// Newest first, paginated
    async fn list(&self, filter: PaymentFilter) -> PaymentResult<Vec<Payment>>;

    async fn count(&self, filter: PaymentFilter) -> PaymentResult<u64>;

    /// Persist status and timestamps
    async fn update(&self, payment: Payment) -> PaymentResult<Payment>;
}

/// In-memory implementation of PaymentRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create(&self, payment: Payment) -> PaymentResult<Payment> {
        let mut payments = self.payments.write().await;
        if payments
            .values()
            .any(|p| p.provider_session_id == payment.provider_session_id)
        {
            return Err(PaymentError::Internal(format!(
                "Duplicate checkout session {}",
                payment.provider_session_id
            )));
        }
        payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_by_id(&self, id: Uuid) -> PaymentResult<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_by_order(&self, order_id: Uuid) -> PaymentResult<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.order_id == order_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn find_by_session(&self, session_id: &str) -> PaymentResult<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .find(|p| p.provider_session_id == session_id)
            .cloned())
    }

    async fn list(&self, filter: PaymentFilter) -> PaymentResult<Vec<Payment>> {
        let payments = self.payments.read().await;

        let mut result: Vec<Payment> = payments
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, filter: PaymentFilter) -> PaymentResult<u64> {
        let payments = self.payments.read().await;
        Ok(payments.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update(&self, payment: Payment) -> PaymentResult<Payment> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment.id) {
            Some(existing) => {
                *existing = payment.clone();
                Ok(payment)
            }
            None => Err(PaymentError::Internal(format!(
                "Payment {} vanished during update",
                payment.id
            ))),
        }
    }
}
