//! Handler tests for the Cart domain

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum_helpers::{JwtAuth, JwtConfig, Role, optional_jwt_auth_middleware};
use clients::fake::FakeProductClient;
use contracts::{CartSnapshot, ProductSummary};
use domain_cart::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::TestDataBuilder;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    app: Router,
    token: String,
    other_token: String,
    soup: ProductSummary,
    sold_out: ProductSummary,
}

fn product(name: &str, price_cents: i64, is_available: bool) -> ProductSummary {
    ProductSummary {
        id: Uuid::now_v7(),
        name: name.to_string(),
        price_cents,
        is_available,
        category_id: Uuid::now_v7(),
        image_url: None,
    }
}

async fn setup(test_name: &str) -> TestApp {
    let jwt = JwtAuth::new(&JwtConfig::new("cart-handler-test-secret-32-chars!!!!").unwrap());
    let builder = TestDataBuilder::from_test_name(test_name);

    let token = jwt
        .issue(builder.user_id(), "ann@bistro.test", "Ann", &[Role::User])
        .unwrap()
        .access_token;
    let other_token = jwt
        .issue(builder.other_user_id(), "bob@bistro.test", "Bob", &[Role::User])
        .unwrap()
        .access_token;

    let soup = product("Borscht", 1250, true);
    let sold_out = product("Oysters", 4200, false);
    let products = FakeProductClient::new();
    products.insert(soup.clone()).await;
    products.insert(sold_out.clone()).await;

    let service = CartService::new(InMemoryCartStore::new(), Arc::new(products));
    let app = handlers::router(service)
        .layer(middleware::from_fn_with_state(jwt, optional_jwt_auth_middleware));

    TestApp {
        app,
        token,
        other_token,
        soup,
        sold_out,
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

async fn add(t: &TestApp, product_id: Uuid, quantity: u32) -> axum::response::Response {
    t.app
        .clone()
        .oneshot(request(
            "POST",
            "/items",
            Some(&t.token),
            Some(json!({ "product_id": product_id, "quantity": quantity })),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_cart_requires_auth() {
    let t = setup("cart_requires_auth").await;

    let response = t.app.oneshot(request("GET", "/", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_cart_is_empty() {
    let t = setup("cart_missing_is_empty").await;

    let response = t
        .app
        .oneshot(request("GET", "/", Some(&t.token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cart: CartSnapshot = json_body(response.into_body()).await;
    assert!(cart.is_empty());
    assert_eq!(cart.total_cents, 0);
}

#[tokio::test]
async fn test_add_merges_lines_and_totals() {
    let t = setup("cart_add_merges").await;

    assert_eq!(add(&t, t.soup.id, 2).await.status(), StatusCode::OK);
    let response = add(&t, t.soup.id, 3).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cart: CartSnapshot = json_body(response.into_body()).await;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.items[0].name, "Borscht");
    assert_eq!(cart.total_cents, 6250);
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let t = setup("cart_per_user").await;
    add(&t, t.soup.id, 1).await;

    let response = t
        .app
        .oneshot(request("GET", "/", Some(&t.other_token), None))
        .await
        .unwrap();

    let cart: CartSnapshot = json_body(response.into_body()).await;
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_add_rejections() {
    let t = setup("cart_add_rejections").await;

    assert_eq!(add(&t, Uuid::now_v7(), 1).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(add(&t, t.sold_out.id, 1).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(add(&t, t.soup.id, 0).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(add(&t, t.soup.id, 51).await.status(), StatusCode::BAD_REQUEST);

    assert_eq!(add(&t, t.soup.id, 30).await.status(), StatusCode::OK);
    let over = add(&t, t.soup.id, 21).await;
    assert_eq!(over.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(over.into_body()).await;
    assert_eq!(body["message"], "Quantity cannot exceed 50");
}

#[tokio::test]
async fn test_update_and_remove_lines() {
    let t = setup("cart_update_remove").await;
    add(&t, t.soup.id, 2).await;
    let uri = format!("/items/{}", t.soup.id);

    let response = t
        .app
        .clone()
        .oneshot(request("PUT", &uri, Some(&t.token), Some(json!({ "quantity": 4 }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cart: CartSnapshot = json_body(response.into_body()).await;
    assert_eq!(cart.items[0].quantity, 4);

    let response = t
        .app
        .clone()
        .oneshot(request("PUT", &uri, Some(&t.token), Some(json!({ "quantity": 0 }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cart: CartSnapshot = json_body(response.into_body()).await;
    assert!(cart.is_empty());

    let missing = t
        .app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&t.token), None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let missing_update = t
        .app
        .oneshot(request("PUT", &uri, Some(&t.token), Some(json!({ "quantity": 1 }))))
        .await
        .unwrap();
    assert_eq!(missing_update.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let t = setup("cart_clear").await;
    add(&t, t.soup.id, 2).await;

    for _ in 0..2 {
        let response = t
            .app
            .clone()
            .oneshot(request("DELETE", "/", Some(&t.token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = t
        .app
        .oneshot(request("GET", "/", Some(&t.token), None))
        .await
        .unwrap();
    let cart: CartSnapshot = json_body(response.into_body()).await;
    assert!(cart.is_empty());
}
