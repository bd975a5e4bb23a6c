//! NotificationProcessor - turns integration events into emails.
//!
//! Implements `stream_worker::StreamProcessor<IntegrationEvent>` so it can be
//! driven by a `StreamWorker` reading the `notifications` consumer group.
//! Returning an error makes the worker re-enqueue the event and, after the
//! retry limit, dead-letter it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::{
    BistroEvent, BookingCreated, IntegrationEvent, OrderCreated, OrderStatus, OrderUpdated,
    PasswordResetRequested, PaymentCompleted, UserRegistered,
};
use core_config::{ConfigError, FromEnv, env_or_default};
use serde_json::{Value, json};
use std::sync::Arc;
use stream_worker::{StreamError, StreamProcessor};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::Email;
use crate::provider::EmailProvider;
use crate::templates::{
    BOOKING_CONFIRMATION, ORDER_CONFIRMATION, ORDER_STATUS, PASSWORD_RESET, PAYMENT_RECEIPT,
    TemplateEngine, WELCOME,
};

/// Values shared by every template
#[derive(Clone, Debug)]
pub struct NotificationSettings {
    pub app_name: String,
    /// Base URL of the web frontend, used for links in emails
    pub frontend_url: String,
    /// Currency code shown next to order totals
    pub currency: String,
}

impl FromEnv for NotificationSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app_name: env_or_default("APP_NAME", "Bistro"),
            frontend_url: env_or_default("FRONTEND_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            currency: env_or_default("CURRENCY", "USD").to_uppercase(),
        })
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            app_name: "Bistro".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// `1250, "usd"` → `"12.50 USD"`
pub fn format_money(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!(
        "{}{}.{:02} {}",
        sign,
        abs / 100,
        abs % 100,
        currency.to_uppercase()
    )
}

/// Last eight hex digits of an id, the part customers quote on the phone
pub fn short_ref(id: Uuid) -> String {
    let simple = id.simple().to_string();
    simple[simple.len() - 8..].to_uppercase()
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Draft => "Draft",
        OrderStatus::Pending => "Pending",
        OrderStatus::Paid => "Paid",
        OrderStatus::Completed => "Completed",
        OrderStatus::Canceled => "Canceled",
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%-d %B %Y, %H:%M UTC").to_string()
}

pub struct NotificationProcessor<P: EmailProvider> {
    provider: Arc<P>,
    templates: Arc<TemplateEngine>,
    settings: NotificationSettings,
}

impl<P: EmailProvider> Clone for NotificationProcessor<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            templates: Arc::clone(&self.templates),
            settings: self.settings.clone(),
        }
    }
}

impl<P: EmailProvider + 'static> NotificationProcessor<P> {
    pub fn new(provider: P, templates: TemplateEngine, settings: NotificationSettings) -> Self {
        Self {
            provider: Arc::new(provider),
            templates: Arc::new(templates),
            settings,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The email an event should produce, or `None` when it only gets logged.
    pub fn compose(&self, event: &BistroEvent) -> NotificationResult<Option<Email>> {
        let email = match event {
            BistroEvent::UserRegistered(e) => self.welcome(e)?,
            BistroEvent::OrderCreated(e) => self.order_confirmation(e)?,
            BistroEvent::OrderUpdated(e) if e.status_changed() => self.order_status(e)?,
            BistroEvent::OrderUpdated(e) => {
                debug!(order_id = %e.order_id, status = %e.status, "Order updated without status change, no email");
                return Ok(None);
            }
            BistroEvent::PaymentCompleted(e) => self.payment_receipt(e)?,
            BistroEvent::BookingCreated(e) => self.booking_confirmation(e)?,
            BistroEvent::PasswordResetRequested(e) => self.password_reset(e)?,
            BistroEvent::OrderDeleted(e) => {
                info!(order_id = %e.order_id, user_id = %e.user_id, "Order deleted");
                return Ok(None);
            }
        };
        Ok(Some(email))
    }

    fn render(
        &self,
        template: &str,
        to: &str,
        name: Option<&str>,
        mut data: Value,
    ) -> NotificationResult<Email> {
        data["app_name"] = json!(self.settings.app_name);
        let rendered = self.templates.render(template, &data)?;

        let email = Email::new(to, rendered.subject)
            .with_text(rendered.body_text)
            .with_html(rendered.body_html);
        Ok(match name {
            Some(name) => email.with_name(name),
            None => email,
        })
    }

    fn money(&self, cents: i64) -> String {
        format_money(cents, &self.settings.currency)
    }

    fn welcome(&self, e: &UserRegistered) -> NotificationResult<Email> {
        self.render(WELCOME, &e.email, Some(&e.name), json!({ "name": e.name }))
    }

    fn order_confirmation(&self, e: &OrderCreated) -> NotificationResult<Email> {
        let items: Vec<Value> = e
            .items
            .iter()
            .map(|line| {
                json!({
                    "name": line.name,
                    "quantity": line.quantity,
                    "unit_price": self.money(line.unit_price_cents),
                    "line_total": self.money(line.unit_price_cents * i64::from(line.quantity)),
                })
            })
            .collect();

        self.render(
            ORDER_CONFIRMATION,
            &e.customer_email,
            Some(&e.customer_name),
            json!({
                "name": e.customer_name,
                "order_ref": short_ref(e.order_id),
                "items": items,
                "total": self.money(e.total_cents),
            }),
        )
    }

    fn order_status(&self, e: &OrderUpdated) -> NotificationResult<Email> {
        self.render(
            ORDER_STATUS,
            &e.customer_email,
            Some(&e.customer_name),
            json!({
                "name": e.customer_name,
                "order_ref": short_ref(e.order_id),
                "status": status_label(e.status),
                "previous_status": status_label(e.previous_status),
                "total": self.money(e.total_cents),
            }),
        )
    }

    fn payment_receipt(&self, e: &PaymentCompleted) -> NotificationResult<Email> {
        self.render(
            PAYMENT_RECEIPT,
            &e.customer_email,
            None,
            json!({
                "order_ref": short_ref(e.order_id),
                "amount": format_money(e.amount_cents, &e.currency),
                "payment_id": e.payment_id,
                "paid_at": format_timestamp(e.completed_at),
            }),
        )
    }

    fn booking_confirmation(&self, e: &BookingCreated) -> NotificationResult<Email> {
        self.render(
            BOOKING_CONFIRMATION,
            &e.contact_email,
            Some(&e.contact_name),
            json!({
                "name": e.contact_name,
                "booking_ref": short_ref(e.booking_id),
                "zone": e.zone,
                "date": e.starts_at.format("%A, %-d %B %Y").to_string(),
                "time": e.starts_at.format("%H:%M UTC").to_string(),
                "guests": e.guests,
                "hookahs_count": e.hookahs_count,
            }),
        )
    }

    fn password_reset(&self, e: &PasswordResetRequested) -> NotificationResult<Email> {
        let reset_link = format!(
            "{}/reset-password?token={}",
            self.settings.frontend_url, e.reset_token
        );
        self.render(
            PASSWORD_RESET,
            &e.email,
            Some(&e.name),
            json!({
                "name": e.name,
                "reset_link": reset_link,
                "expires_at": format_timestamp(e.expires_at),
            }),
        )
    }
}

#[async_trait]
impl<P: EmailProvider + 'static> StreamProcessor<IntegrationEvent> for NotificationProcessor<P> {
    async fn process(&self, job: &IntegrationEvent) -> Result<(), StreamError> {
        debug!(
            event_id = %job.event_id,
            event_type = job.event_type(),
            retry_count = job.retry_count,
            "Processing integration event"
        );

        let Some(email) = self.compose(&job.event)? else {
            return Ok(());
        };

        let result = self.provider.send(&email).await.map_err(|e| {
            StreamError::processing(format!("{} provider failed: {:#}", self.provider.name(), e))
        })?;

        info!(
            event_id = %job.event_id,
            event_type = job.event_type(),
            message_id = %result.message_id,
            to = %email.to,
            "Notification sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "notification_processor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1250, "usd"), "12.50 USD");
        assert_eq!(format_money(5, "EUR"), "0.05 EUR");
        assert_eq!(format_money(0, "USD"), "0.00 USD");
        assert_eq!(format_money(-199, "USD"), "-1.99 USD");
    }

    #[test]
    fn test_short_ref_is_last_eight_hex_digits() {
        let id = Uuid::parse_str("0190ab12-3456-7890-abcd-ef0123456789").unwrap();
        assert_eq!(short_ref(id), "23456789");
    }

    #[test]
    fn test_settings_from_env() {
        temp_env::with_vars(
            [
                ("APP_NAME", None),
                ("FRONTEND_URL", Some("https://bistro.example/")),
                ("CURRENCY", Some("eur")),
            ],
            || {
                let settings = NotificationSettings::from_env().unwrap();
                assert_eq!(settings.app_name, "Bistro");
                assert_eq!(settings.frontend_url, "https://bistro.example");
                assert_eq!(settings.currency, "EUR");
            },
        );
    }
}
