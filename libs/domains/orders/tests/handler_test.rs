//! Handler tests for the Orders domain

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum_helpers::{JwtAuth, JwtConfig, Role, optional_jwt_auth_middleware};
use chrono::Utc;
use clients::fake::{FakeCartClient, FakeProductClient, FakeUserClient};
use contracts::{
    BistroEvent, CartLine, CartSnapshot, InMemoryEventPublisher, ProductSummary, UserPublicProfile,
};
use domain_orders::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::TestDataBuilder;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    app: Router,
    carts: FakeCartClient,
    products: FakeProductClient,
    users: FakeUserClient,
    publisher: InMemoryEventPublisher,
    owner_id: Uuid,
    owner_token: String,
    other_token: String,
    manager_token: String,
    admin_token: String,
}

fn setup() -> TestApp {
    let jwt = JwtAuth::new(&JwtConfig::new("orders-handler-test-secret-32-chars!!!").unwrap());
    let builder = TestDataBuilder::from_test_name("orders_handlers");
    let owner_id = builder.user_id();

    let token = |id: Uuid, email: &str, name: &str, role: Role| {
        jwt.issue(id, email, name, &[role]).unwrap().access_token
    };
    let owner_token = token(owner_id, "ann@bistro.test", "Ann", Role::User);
    let other_token = token(builder.other_user_id(), "bob@bistro.test", "Bob", Role::User);
    let manager_token = token(Uuid::now_v7(), "chef@bistro.test", "Chef", Role::Manager);
    let admin_token = token(Uuid::now_v7(), "root@bistro.test", "Root", Role::Admin);

    let carts = FakeCartClient::new();
    let products = FakeProductClient::new();
    let users = FakeUserClient::new();
    let publisher = InMemoryEventPublisher::new();

    let service = OrderService::new(
        InMemoryOrderRepository::new(),
        Arc::new(publisher.clone()),
        OrderClients {
            carts: Arc::new(carts.clone()),
            products: Arc::new(products.clone()),
            users: Arc::new(users.clone()),
        },
    );
    let app = handlers::router(service)
        .layer(middleware::from_fn_with_state(jwt, optional_jwt_auth_middleware));

    TestApp {
        app,
        carts,
        products,
        users,
        publisher,
        owner_id,
        owner_token,
        other_token,
        manager_token,
        admin_token,
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn delivery() -> Value {
    json!({ "delivery_address": "1 Main St", "phone": "+100000000", "comment": "Ring twice" })
}

async fn add_product(t: &TestApp, name: &str, price_cents: i64, is_available: bool) -> Uuid {
    let id = Uuid::now_v7();
    t.products
        .insert(ProductSummary {
            id,
            name: name.to_string(),
            price_cents,
            is_available,
            category_id: Uuid::now_v7(),
            image_url: None,
        })
        .await;
    id
}

/// Cart lines carry the price at add time; `quantity` per product id
async fn fill_cart(t: &TestApp, lines: &[(Uuid, &str, i64, u32)]) {
    let items: Vec<CartLine> = lines
        .iter()
        .map(|(product_id, name, price, quantity)| CartLine {
            product_id: *product_id,
            name: name.to_string(),
            unit_price_cents: *price,
            quantity: *quantity,
            image_url: None,
        })
        .collect();
    let total_cents = items.iter().map(|i| i.line_total_cents()).sum();
    t.carts
        .set_cart(
            &t.owner_token,
            CartSnapshot {
                user_id: t.owner_id,
                items,
                total_cents,
                updated_at: Utc::now(),
            },
        )
        .await;
}

async fn send(t: &TestApp, method: &str, uri: &str, token: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = t
        .app
        .clone()
        .oneshot(request(method, uri, Some(token), body))
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn draft_order(t: &TestApp) -> Order {
    let borscht = add_product(t, "Borscht", 1250, true).await;
    fill_cart(t, &[(borscht, "Borscht", 1250, 2)]).await;

    let response = t
        .app
        .clone()
        .oneshot(request("POST", "/", Some(&t.owner_token), Some(delivery())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_requires_auth() {
    let t = setup();

    let response = t
        .app
        .oneshot(request("POST", "/", None, Some(delivery())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_from_cart_uses_catalog_prices_and_profile() {
    let t = setup();
    t.users
        .insert(UserPublicProfile {
            id: t.owner_id,
            name: "Ann Profile".into(),
            email: "ann.profile@bistro.test".into(),
        })
        .await;
    let borscht = add_product(&t, "Borscht", 1400, true).await;
    let lemonade = add_product(&t, "Lemonade", 450, true).await;
    fill_cart(
        &t,
        &[(borscht, "Borscht", 1250, 2), (lemonade, "Lemonade", 450, 1)],
    )
    .await;

    let (status, body) = send(&t, "POST", "/", &t.owner_token, Some(delivery())).await;

    assert_eq!(status, StatusCode::CREATED);
    let order: Order = serde_json::from_value(body).unwrap();
    assert_eq!(order.status, OrderStatus::Draft);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].unit_price_cents, 1400);
    assert_eq!(order.items[0].line_total_cents, 2800);
    assert_eq!(order.total_cents, 3250);
    assert_eq!(order.customer_name, "Ann Profile");
    assert_eq!(order.comment.as_deref(), Some("Ring twice"));
    assert!(t.publisher.published().await.is_empty());
}

#[tokio::test]
async fn test_create_falls_back_to_token_identity() {
    let t = setup();
    let order = draft_order(&t).await;

    assert_eq!(order.customer_name, "Ann");
    assert_eq!(order.customer_email, "ann@bistro.test");
}

#[tokio::test]
async fn test_create_with_empty_cart_returns_400() {
    let t = setup();
    t.carts
        .set_cart(&t.owner_token, CartSnapshot::empty(t.owner_id))
        .await;

    let (status, body) = send(&t, "POST", "/", &t.owner_token, Some(delivery())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");
}

#[tokio::test]
async fn test_create_with_unavailable_or_missing_product_returns_400() {
    let t = setup();
    let sold_out = add_product(&t, "Ramen", 1500, false).await;
    fill_cart(&t, &[(sold_out, "Ramen", 1500, 1)]).await;

    let (status, body) = send(&t, "POST", "/", &t.owner_token, Some(delivery())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product Ramen is no longer available");

    fill_cart(&t, &[(Uuid::now_v7(), "Ghost soup", 900, 1)]).await;
    let (status, body) = send(&t, "POST", "/", &t.owner_token, Some(delivery())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product Ghost soup is no longer available");
}

#[tokio::test]
async fn test_confirm_publishes_order_created_and_clears_cart() {
    let t = setup();
    let order = draft_order(&t).await;

    let uri = format!("/{}/confirm", order.id);
    let (status, body) = send(&t, "POST", &uri, &t.owner_token, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert!(!body["confirmed_at"].is_null());
    assert_eq!(t.carts.clear_calls(), 1);

    match t.publisher.published().await.as_slice() {
        [BistroEvent::OrderCreated(event)] => {
            assert_eq!(event.order_id, order.id);
            assert_eq!(event.total_cents, 2500);
            assert_eq!(event.items[0].quantity, 2);
        }
        other => panic!("unexpected events: {:?}", other),
    }

    // Only Drafts can be confirmed
    let (status, _) = send(&t, "POST", &uri, &t.owner_token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirm_by_non_owner_returns_403() {
    let t = setup();
    let order = draft_order(&t).await;

    let uri = format!("/{}/confirm", order.id);
    let (status, _) = send(&t, "POST", &uri, &t.other_token, None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_only_while_draft() {
    let t = setup();
    let order = draft_order(&t).await;
    let uri = format!("/{}", order.id);

    let (status, body) = send(
        &t,
        "PUT",
        &uri,
        &t.owner_token,
        Some(json!({ "delivery_address": "2 Side St" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery_address"], "2 Side St");
    assert_eq!(t.publisher.event_types().await, vec!["OrderUpdated"]);

    send(&t, "POST", &format!("{}/confirm", uri), &t.owner_token, None).await;
    let (status, _) = send(
        &t,
        "PUT",
        &uri,
        &t.owner_token,
        Some(json!({ "phone": "+199999999" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_order_visibility() {
    let t = setup();
    let order = draft_order(&t).await;
    let uri = format!("/{}", order.id);

    let (status, _) = send(&t, "GET", &uri, &t.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&t, "GET", &uri, &t.manager_token, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&t, "GET", &uri, &t.other_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t, "GET", &format!("/{}", Uuid::now_v7()), &t.owner_token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_scopes_to_caller_unless_staff() {
    let t = setup();
    let order = draft_order(&t).await;

    let (status, body) = send(&t, "GET", "/", &t.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);
    let mine: OrderList = serde_json::from_value(body).unwrap();
    assert_eq!(mine.total, 1);
    assert_eq!(mine.items[0].id, order.id);

    // A user filter from a non-staff caller is overridden
    let (_, body) = send(
        &t,
        "GET",
        &format!("/?user_id={}", t.owner_id),
        &t.other_token,
        None,
    )
    .await;
    assert_eq!(body["total"], 0);

    let (_, body) = send(&t, "GET", "/?status=draft", &t.manager_token, None).await;
    assert_eq!(body["total"], 1);

    let (_, body) = send(&t, "GET", "/?status=paid", &t.manager_token, None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_list_rejects_out_of_range_paging() {
    let t = setup();
    draft_order(&t).await;

    for uri in [
        "/?limit=0",
        "/?limit=201",
        "/?limit=9223372036854775808",
        "/?offset=9223372036854775808",
    ] {
        let (status, body) = send(&t, "GET", uri, &t.manager_token, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "VALIDATION_ERROR", "{}", uri);
    }

    let (status, body) =
        send(&t, "GET", "/?limit=200&offset=0", &t.manager_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_owner_cancels_pending_order() {
    let t = setup();
    let order = draft_order(&t).await;
    send(&t, "POST", &format!("/{}/confirm", order.id), &t.owner_token, None).await;

    let uri = format!("/{}/cancel", order.id);
    let (status, body) = send(&t, "POST", &uri, &t.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "canceled");
    assert!(!body["canceled_at"].is_null());

    // Canceled is terminal
    let (status, _) = send(&t, "POST", &uri, &t.admin_token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(
        t.publisher.event_types().await,
        vec!["OrderCreated", "OrderUpdated"]
    );
}

#[tokio::test]
async fn test_stranger_cannot_cancel() {
    let t = setup();
    let order = draft_order(&t).await;

    let (status, _) = send(
        &t,
        "POST",
        &format!("/{}/cancel", order.id),
        &t.other_token,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_complete_requires_staff_and_paid_status() {
    let t = setup();
    let order = draft_order(&t).await;
    let uri = format!("/{}/complete", order.id);

    let (status, _) = send(&t, "POST", &uri, &t.owner_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&t, "POST", &uri, &t.manager_token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot change order from draft to completed");
}

#[tokio::test]
async fn test_delete_is_admin_only() {
    let t = setup();
    let order = draft_order(&t).await;
    let uri = format!("/{}", order.id);

    let (status, _) = send(&t, "DELETE", &uri, &t.manager_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t, "DELETE", &uri, &t.admin_token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(t.publisher.event_types().await, vec!["OrderDeleted"]);

    let (status, _) = send(&t, "DELETE", &uri, &t.admin_token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
