//! Event to email mapping through the mock provider

use chrono::{TimeZone, Utc};
use contracts::{
    BistroEvent, BookingCreated, IntegrationEvent, OrderCreated, OrderDeleted, OrderLine,
    OrderStatus, OrderUpdated, PasswordResetRequested, PaymentCompleted, UserRegistered,
};
use email::{MockEmailProvider, NotificationProcessor, NotificationSettings, TemplateEngine};
use stream_worker::StreamProcessor;
use uuid::Uuid;

fn processor(provider: MockEmailProvider) -> NotificationProcessor<MockEmailProvider> {
    let settings = NotificationSettings {
        app_name: "Bistro".into(),
        frontend_url: "https://bistro.example".into(),
        currency: "USD".into(),
    };
    NotificationProcessor::new(provider, TemplateEngine::new().unwrap(), settings)
}

async fn deliver(event: BistroEvent) -> (MockEmailProvider, Result<(), stream_worker::StreamError>) {
    let provider = MockEmailProvider::new();
    let result = processor(provider.clone())
        .process(&IntegrationEvent::new(event))
        .await;
    (provider, result)
}

fn order_updated(status: OrderStatus, previous_status: OrderStatus) -> BistroEvent {
    BistroEvent::OrderUpdated(OrderUpdated {
        order_id: Uuid::now_v7(),
        user_id: Uuid::now_v7(),
        customer_email: "ann@bistro.test".into(),
        customer_name: "Ann".into(),
        status,
        previous_status,
        total_cents: 3450,
        updated_at: Utc::now(),
    })
}

#[tokio::test]
async fn test_user_registered_sends_welcome() {
    let (provider, result) = deliver(BistroEvent::UserRegistered(UserRegistered {
        user_id: Uuid::now_v7(),
        email: "ann@bistro.test".into(),
        name: "Ann".into(),
        registered_at: Utc::now(),
    }))
    .await;

    result.unwrap();
    let sent = provider.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ann@bistro.test");
    assert_eq!(sent[0].to_name.as_deref(), Some("Ann"));
    assert_eq!(sent[0].subject, "Welcome to Bistro, Ann!");
}

#[tokio::test]
async fn test_order_created_lists_lines_and_total() {
    let (provider, result) = deliver(BistroEvent::OrderCreated(OrderCreated {
        order_id: Uuid::now_v7(),
        user_id: Uuid::now_v7(),
        customer_email: "ann@bistro.test".into(),
        customer_name: "Ann".into(),
        items: vec![
            OrderLine {
                product_id: Uuid::now_v7(),
                name: "Borscht".into(),
                unit_price_cents: 1250,
                quantity: 2,
            },
            OrderLine {
                product_id: Uuid::now_v7(),
                name: "Pelmeni".into(),
                unit_price_cents: 950,
                quantity: 1,
            },
        ],
        total_cents: 3450,
        created_at: Utc::now(),
    }))
    .await;

    result.unwrap();
    let sent = provider.sent_emails().await;
    let text = sent[0].body_text.as_deref().unwrap();
    assert!(sent[0].subject.ends_with("confirmed"));
    assert!(text.contains("2 x Borscht  25.00 USD"));
    assert!(text.contains("1 x Pelmeni  9.50 USD"));
    assert!(text.contains("Total: 34.50 USD"));
    assert!(sent[0].body_html.as_deref().unwrap().contains("Borscht"));
}

#[tokio::test]
async fn test_order_status_change_is_announced() {
    let (provider, result) = deliver(order_updated(OrderStatus::Completed, OrderStatus::Paid)).await;

    result.unwrap();
    let sent = provider.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.ends_with("is now Completed"));
    assert!(
        sent[0]
            .body_text
            .as_deref()
            .unwrap()
            .contains("from Paid to Completed")
    );
}

#[tokio::test]
async fn test_order_update_without_status_change_is_silent() {
    let (provider, result) = deliver(order_updated(OrderStatus::Pending, OrderStatus::Pending)).await;

    result.unwrap();
    assert_eq!(provider.sent_count().await, 0);
}

#[tokio::test]
async fn test_order_deleted_is_only_logged() {
    let (provider, result) = deliver(BistroEvent::OrderDeleted(OrderDeleted {
        order_id: Uuid::now_v7(),
        user_id: Uuid::now_v7(),
        deleted_at: Utc::now(),
    }))
    .await;

    result.unwrap();
    assert_eq!(provider.sent_count().await, 0);
}

#[tokio::test]
async fn test_payment_completed_sends_receipt() {
    let (provider, result) = deliver(BistroEvent::PaymentCompleted(PaymentCompleted {
        payment_id: Uuid::now_v7(),
        order_id: Uuid::now_v7(),
        user_id: Uuid::now_v7(),
        amount_cents: 3450,
        currency: "usd".into(),
        customer_email: "ann@bistro.test".into(),
        completed_at: Utc.with_ymd_and_hms(2030, 6, 7, 18, 30, 0).unwrap(),
    }))
    .await;

    result.unwrap();
    let sent = provider.sent_emails().await;
    assert!(sent[0].subject.starts_with("Payment receipt"));
    let text = sent[0].body_text.as_deref().unwrap();
    assert!(text.contains("34.50 USD"));
    assert!(text.contains("7 June 2030, 18:30 UTC"));
}

#[tokio::test]
async fn test_booking_created_sends_confirmation() {
    let (provider, result) = deliver(BistroEvent::BookingCreated(BookingCreated {
        booking_id: Uuid::now_v7(),
        user_id: Uuid::now_v7(),
        contact_email: "ann@bistro.test".into(),
        contact_name: "Ann".into(),
        zone: "Main hall".into(),
        starts_at: Utc.with_ymd_and_hms(2030, 6, 7, 19, 0, 0).unwrap(),
        guests: 4,
        hookahs_count: 2,
    }))
    .await;

    result.unwrap();
    let sent = provider.sent_emails().await;
    assert_eq!(sent[0].subject, "Your table on Friday, 7 June 2030");
    let text = sent[0].body_text.as_deref().unwrap();
    assert!(text.contains("Zone: Main hall"));
    assert!(text.contains("19:00 UTC"));
    assert!(text.contains("Guests: 4"));
    assert!(text.contains("Hookahs pre-ordered: 2"));
}

#[tokio::test]
async fn test_password_reset_links_to_frontend() {
    let (provider, result) = deliver(BistroEvent::PasswordResetRequested(PasswordResetRequested {
        user_id: Uuid::now_v7(),
        email: "ann@bistro.test".into(),
        name: "Ann".into(),
        reset_token: "abc123".into(),
        expires_at: Utc::now(),
    }))
    .await;

    result.unwrap();
    let sent = provider.sent_emails().await;
    let link = "https://bistro.example/reset-password?token=abc123";
    assert!(sent[0].body_text.as_deref().unwrap().contains(link));
    assert!(sent[0].body_html.as_deref().unwrap().contains(link));
}

#[tokio::test]
async fn test_provider_failure_fails_the_job() {
    let provider = MockEmailProvider::failing("connection refused");
    let result = processor(provider)
        .process(&IntegrationEvent::new(order_updated(
            OrderStatus::Paid,
            OrderStatus::Pending,
        )))
        .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("connection refused"));
}
