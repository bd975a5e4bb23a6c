//! StripeGateway against a mock Stripe API.

use chrono::Utc;
use domain_payments::stripe::sign;
use domain_payments::*;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(api_base: String) -> StripeGateway {
    StripeGateway::new(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap(),
        StripeConfig {
            api_base,
            secret_key: "sk_test_123".into(),
            webhook_secret: "whsec_test".into(),
            tolerance_secs: 300,
        },
    )
}

fn request() -> CheckoutRequest {
    CheckoutRequest {
        payment_id: Uuid::now_v7(),
        order_id: Uuid::now_v7(),
        amount_cents: 3250,
        currency: "usd".into(),
        customer_email: "ann@bistro.test".into(),
        description: "Bistro order".into(),
        success_url: "https://bistro.test/ok".into(),
        cancel_url: "https://bistro.test/cancel".into(),
    }
}

#[tokio::test]
async fn test_create_checkout_session_posts_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("mode=payment"))
        .and(body_string_contains(
            "line_items%5B0%5D%5Bprice_data%5D%5Bunit_amount%5D=3250",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_abc",
            "url": "https://checkout.stripe.com/c/pay/cs_test_abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = gateway(server.uri())
        .create_checkout_session(&request())
        .await
        .unwrap();

    assert_eq!(session.session_id, "cs_test_abc");
    assert_eq!(
        session.checkout_url,
        "https://checkout.stripe.com/c/pay/cs_test_abc"
    );
}

#[tokio::test]
async fn test_stripe_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Invalid currency: xyz", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let result = gateway(server.uri())
        .create_checkout_session(&request())
        .await;

    assert_eq!(
        result,
        Err(GatewayError::Api {
            status: 400,
            message: "Invalid currency: xyz".into()
        })
    );
}

#[tokio::test]
async fn test_unreachable_api_is_a_transport_error() {
    let result = gateway("http://127.0.0.1:9".into())
        .create_checkout_session(&request())
        .await;

    assert!(matches!(result, Err(GatewayError::Transport(_))));
}

#[test]
fn test_verify_webhook_end_to_end() {
    let gateway = gateway("http://unused".into());
    let payload = json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_test_abc" } }
    })
    .to_string();
    let now = Utc::now().timestamp();
    let signature = format!(
        "t={},v1={}",
        now,
        const_hex::encode(sign("whsec_test", now, payload.as_bytes()).unwrap())
    );

    let event = gateway
        .verify_webhook(payload.as_bytes(), &signature)
        .unwrap();
    assert_eq!(event.id, "evt_1");
    assert_eq!(
        event.kind,
        WebhookEventKind::CheckoutCompleted {
            session_id: "cs_test_abc".into()
        }
    );

    let stale = format!(
        "t={},v1={}",
        now - 600,
        const_hex::encode(sign("whsec_test", now - 600, payload.as_bytes()).unwrap())
    );
    assert!(matches!(
        gateway.verify_webhook(payload.as_bytes(), &stale),
        Err(GatewayError::InvalidSignature(_))
    ));
}
