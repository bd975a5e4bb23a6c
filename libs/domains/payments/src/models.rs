use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Canceled,
}

/// Payment entity, one row of `payments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    /// ISO 4217, lowercase
    pub currency: String,
    pub status: PaymentStatus,
    /// Gateway name, e.g. "stripe"
    pub provider: String,
    pub provider_session_id: String,
    pub checkout_url: Option<String>,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Marks the payment Completed and returns the completion time.
    pub fn complete(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.status = PaymentStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        now
    }

    pub fn mark(&mut self, status: PaymentStatus) {
        if status == PaymentStatus::Completed {
            self.complete();
            return;
        }
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn checkout_session(&self) -> CheckoutSession {
        CheckoutSession {
            payment_id: self.id,
            session_id: self.provider_session_id.clone(),
            checkout_url: self.checkout_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCheckout {
    pub order_id: Uuid,
    /// Overrides the configured redirect after payment
    #[validate(url)]
    pub success_url: Option<String>,
    #[validate(url)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSession {
    pub payment_id: Uuid,
    pub session_id: String,
    /// Hosted payment page to redirect the customer to
    pub checkout_url: String,
}

/// Query filters for the staff payment listing
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u64,
    #[serde(default)]
    #[validate(range(max = 1_000_000))]
    pub offset: u64,
}

impl Default for PaymentFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> u64 {
    50
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.status.is_none_or(|status| payment.status == status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentList {
    pub items: Vec<Payment>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::now_v7(),
            order_id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            amount_cents: 2500,
            currency: "usd".into(),
            status: PaymentStatus::Pending,
            provider: "fake".into(),
            provider_session_id: "cs_1".into(),
            checkout_url: Some("https://pay.test/cs_1".into()),
            customer_email: "ann@bistro.test".into(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn test_mark_completed_sets_timestamp() {
        let mut p = payment();
        p.mark(PaymentStatus::Canceled);
        assert!(p.completed_at.is_none());
        p.mark(PaymentStatus::Completed);
        assert!(p.completed_at.is_some());
        assert_eq!(p.status, PaymentStatus::Completed);
    }

    #[test]
    fn test_complete_returns_stored_timestamp() {
        let mut p = payment();
        let completed_at = p.complete();
        assert_eq!(p.completed_at, Some(completed_at));
        assert_eq!(p.updated_at, completed_at);
    }

    #[test]
    fn test_status_text_form() {
        assert_eq!(PaymentStatus::Canceled.to_string(), "canceled");
        assert_eq!(
            "completed".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Completed
        );
    }

    #[test]
    fn test_filter_matches() {
        let p = payment();
        assert!(PaymentFilter::default().matches(&p));
        let failed = PaymentFilter {
            status: Some(PaymentStatus::Failed),
            ..Default::default()
        };
        assert!(!failed.matches(&p));
    }
}
