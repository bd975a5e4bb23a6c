//! Stripe Checkout over its REST API.
//!
//! Sessions are created with a form-encoded `POST /v1/checkout/sessions`.
//! Webhooks are authenticated the way Stripe signs them: the
//! `Stripe-Signature` header carries `t=<unix ts>` and one or more
//! `v1=<hex hmac>` entries, where the HMAC-SHA256 is computed over
//! `"{t}.{raw body}"` with the endpoint secret.

use async_trait::async_trait;
use chrono::Utc;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use reqwest::Client;
use serde::Deserialize;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::gateway::{
    CheckoutRequest, GatewayError, GatewaySession, PaymentGateway, WebhookEvent, WebhookEventKind,
};

pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub api_base: String,
    pub secret_key: String,
    pub webhook_secret: String,
    pub tolerance_secs: i64,
}

impl FromEnv for StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: env_or_default("STRIPE_API_BASE", "https://api.stripe.com"),
            secret_key: env_required("STRIPE_SECRET_KEY")?,
            webhook_secret: env_required("STRIPE_WEBHOOK_SECRET")?,
            tolerance_secs: env_parse("STRIPE_WEBHOOK_TOLERANCE_SECS", DEFAULT_TOLERANCE_SECS)?,
        })
    }
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(client: Client, config: StripeConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn provider(&self) -> &'static str {
        "stripe"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<GatewaySession, GatewayError> {
        let payment_id = request.payment_id.to_string();
        let order_id = request.order_id.to_string();
        let params = [
            ("mode", "payment".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("customer_email", request.customer_email.clone()),
            ("client_reference_id", order_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", request.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.description.clone(),
            ),
            ("metadata[order_id]", order_id),
            ("metadata[payment_id]", payment_id.clone()),
            ("payment_intent_data[metadata][payment_id]", payment_id),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;
        let checkout_url = session.url.ok_or_else(|| {
            GatewayError::InvalidPayload("checkout session has no url".to_string())
        })?;

        tracing::info!(session_id = %session.id, order_id = %request.order_id, "Stripe checkout session created");
        Ok(GatewaySession {
            session_id: session.id,
            checkout_url,
        })
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        verify_signature(
            payload,
            signature_header,
            &self.config.webhook_secret,
            self.config.tolerance_secs,
            Utc::now().timestamp(),
        )?;
        parse_event(payload)
    }
}

/// Check a `Stripe-Signature` header against `payload` as of `now` (unix seconds).
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), GatewayError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| GatewayError::InvalidSignature("missing timestamp".to_string()))?;
    if candidates.is_empty() {
        return Err(GatewayError::InvalidSignature(
            "missing v1 signature".to_string(),
        ));
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(GatewayError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let mac = signed_payload(secret, timestamp, payload)?;
    let matched = candidates.iter().any(|candidate| {
        const_hex::decode(candidate)
            .map(|expected| mac.clone().verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });
    if matched {
        Ok(())
    } else {
        Err(GatewayError::InvalidSignature(
            "signature does not match".to_string(),
        ))
    }
}

/// The `v1` HMAC for a payload signed at `timestamp`
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, GatewayError> {
    Ok(signed_payload(secret, timestamp, payload)?
        .finalize()
        .into_bytes()
        .to_vec())
}

fn signed_payload(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<HmacSha256, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

/// Decode a Stripe event body into the kinds the service acts on.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, GatewayError> {
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;
    let object = &raw.data.object;

    let object_id = || {
        object["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::InvalidPayload("event object has no id".to_string()))
    };

    let kind = match raw.event_type.as_str() {
        "checkout.session.completed" => WebhookEventKind::CheckoutCompleted {
            session_id: object_id()?,
        },
        "checkout.session.expired" => WebhookEventKind::CheckoutExpired {
            session_id: object_id()?,
        },
        "payment_intent.payment_failed" => {
            let metadata = &object["metadata"];
            WebhookEventKind::PaymentFailed {
                session_id: metadata["session_id"].as_str().map(str::to_string),
                payment_id: metadata["payment_id"]
                    .as_str()
                    .and_then(|id| Uuid::parse_str(id).ok()),
            }
        }
        other => WebhookEventKind::Other(other.to_string()),
    };

    Ok(WebhookEvent { id: raw.id, kind })
}
