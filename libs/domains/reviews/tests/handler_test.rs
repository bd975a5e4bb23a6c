//! Handler tests for the Reviews domain

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum_helpers::{JwtAuth, JwtConfig, Role, optional_jwt_auth_middleware};
use clients::fake::{FakeOrderClient, FakeProductClient};
use contracts::{OrderStatus, OrderSummary, ProductSummary};
use domain_reviews::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::TestDataBuilder;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    app: Router,
    products: FakeProductClient,
    orders: FakeOrderClient,
    ann_id: Uuid,
    ann_token: String,
    bob_token: String,
    manager_token: String,
}

fn setup() -> TestApp {
    let jwt = JwtAuth::new(&JwtConfig::new("reviews-handler-test-secret-32-chars!!").unwrap());
    let builder = TestDataBuilder::from_test_name("reviews_handlers");
    let ann_id = builder.user_id();

    let token = |id: Uuid, email: &str, name: &str, role: Role| {
        jwt.issue(id, email, name, &[role]).unwrap().access_token
    };
    let ann_token = token(ann_id, "ann@bistro.test", "Ann", Role::User);
    let bob_token = token(builder.other_user_id(), "bob@bistro.test", "Bob", Role::User);
    let manager_token = token(Uuid::now_v7(), "chef@bistro.test", "Chef", Role::Manager);

    let products = FakeProductClient::new();
    let orders = FakeOrderClient::new();
    let service = ReviewService::new(
        InMemoryReviewRepository::new(),
        Arc::new(products.clone()),
        Arc::new(orders.clone()),
    );
    let app = handlers::router(service)
        .layer(middleware::from_fn_with_state(jwt, optional_jwt_auth_middleware));

    TestApp {
        app,
        products,
        orders,
        ann_id,
        ann_token,
        bob_token,
        manager_token,
    }
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

async fn send(t: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let response = t.app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn product(t: &TestApp) -> Uuid {
    let id = Uuid::now_v7();
    t.products
        .insert(ProductSummary {
            id,
            name: "Borscht".into(),
            price_cents: 1250,
            is_available: true,
            category_id: Uuid::now_v7(),
            image_url: None,
        })
        .await;
    id
}

async fn order(t: &TestApp, user_id: Uuid, status: OrderStatus) -> Uuid {
    let id = Uuid::now_v7();
    t.orders
        .insert(OrderSummary {
            id,
            user_id,
            status,
            total_cents: 3250,
            customer_email: "ann@bistro.test".into(),
        })
        .await;
    id
}

async fn review(t: &TestApp, token: &str, kind: &str, target_id: Uuid, rating: u8) -> Review {
    let (status, body) = send(
        t,
        request(
            "POST",
            "/",
            Some(token),
            Some(json!({ "review_type": kind, "target_id": target_id, "rating": rating })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_review_product() {
    let t = setup();
    let borscht = product(&t).await;

    let created = review(&t, &t.ann_token, "product", borscht, 5).await;

    assert_eq!(created.author_name, "Ann");
    assert_eq!(created.review_type, ReviewType::Product);
    assert_eq!(created.rating, 5);
}

#[tokio::test]
async fn test_create_requires_auth_and_valid_rating() {
    let t = setup();
    let borscht = product(&t).await;
    let body = json!({ "review_type": "product", "target_id": borscht, "rating": 4 });

    let (status, _) = send(&t, request("POST", "/", None, Some(body))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &t,
        request(
            "POST",
            "/",
            Some(&t.ann_token),
            Some(json!({ "review_type": "product", "target_id": borscht, "rating": 6 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_product_returns_404() {
    let t = setup();

    let (status, body) = send(
        &t,
        request(
            "POST",
            "/",
            Some(&t.ann_token),
            Some(json!({ "review_type": "product", "target_id": Uuid::now_v7(), "rating": 3 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().starts_with("Product "));
}

#[tokio::test]
async fn test_order_reviews_need_a_completed_own_order() {
    let t = setup();
    let paid = order(&t, t.ann_id, OrderStatus::Paid).await;
    let completed = order(&t, t.ann_id, OrderStatus::Completed).await;

    let body = |id: Uuid| json!({ "review_type": "order", "target_id": id, "rating": 4 });

    let (status, response) = send(&t, request("POST", "/", Some(&t.ann_token), Some(body(paid)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Only completed orders can be reviewed");

    let (status, response) =
        send(&t, request("POST", "/", Some(&t.bob_token), Some(body(completed)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "You can only review your own orders");

    let (status, _) = send(
        &t,
        request("POST", "/", Some(&t.ann_token), Some(body(Uuid::now_v7()))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    review(&t, &t.ann_token, "order", completed, 4).await;
}

#[tokio::test]
async fn test_second_review_of_same_target_returns_409() {
    let t = setup();
    let borscht = product(&t).await;
    review(&t, &t.ann_token, "product", borscht, 5).await;

    let (status, body) = send(
        &t,
        request(
            "POST",
            "/",
            Some(&t.ann_token),
            Some(json!({ "review_type": "product", "target_id": borscht, "rating": 1 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You have already reviewed this product");

    // Another author is fine
    review(&t, &t.bob_token, "product", borscht, 2).await;
}

#[tokio::test]
async fn test_list_and_summary_are_public() {
    let t = setup();
    let borscht = product(&t).await;
    let ramen = product(&t).await;

    review(&t, &t.ann_token, "product", borscht, 5).await;
    review(&t, &t.bob_token, "product", borscht, 4).await;
    review(&t, &t.manager_token, "product", borscht, 4).await;
    review(&t, &t.ann_token, "product", ramen, 1).await;

    let (status, body) = send(
        &t,
        request("GET", &format!("/?type=product&target_id={}", borscht), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list: ReviewList = serde_json::from_value(body).unwrap();
    assert_eq!(list.total, 3);
    assert_eq!(list.items[0].author_name, "Chef");

    let (status, body) = send(
        &t,
        request("GET", &format!("/summary?type=product&target_id={}", borscht), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"], 4.33);
    assert_eq!(body["count"], 3);

    let (_, body) = send(
        &t,
        request("GET", &format!("/summary?type=order&target_id={}", borscht), None, None),
    )
    .await;
    assert_eq!(body["average"], 0.0);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_mine_lists_only_the_callers_reviews() {
    let t = setup();
    let borscht = product(&t).await;
    let ramen = product(&t).await;
    review(&t, &t.ann_token, "product", borscht, 5).await;
    review(&t, &t.ann_token, "product", ramen, 3).await;
    review(&t, &t.bob_token, "product", ramen, 2).await;

    let (status, _) = send(&t, request("GET", "/mine", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&t, request("GET", "/mine", Some(&t.ann_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let mine: ReviewList = serde_json::from_value(body).unwrap();
    assert_eq!(mine.total, 2);
    assert!(mine.items.iter().all(|r| r.user_id == t.ann_id));
}

#[tokio::test]
async fn test_only_author_updates() {
    let t = setup();
    let borscht = product(&t).await;
    let created = review(&t, &t.ann_token, "product", borscht, 3).await;
    let uri = format!("/{}", created.id);
    let update = json!({ "rating": 4, "comment": "Better the second time" });

    let (status, _) = send(&t, request("PUT", &uri, Some(&t.bob_token), Some(update.clone()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&t, request("PUT", &uri, Some(&t.ann_token), Some(update))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4);
    assert_eq!(body["comment"], "Better the second time");
}

#[tokio::test]
async fn test_delete_by_author_or_staff() {
    let t = setup();
    let borscht = product(&t).await;
    let anns = review(&t, &t.ann_token, "product", borscht, 3).await;
    let bobs = review(&t, &t.bob_token, "product", borscht, 1).await;

    let (status, _) = send(
        &t,
        request("DELETE", &format!("/{}", anns.id), Some(&t.bob_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t,
        request("DELETE", &format!("/{}", anns.id), Some(&t.ann_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &t,
        request("DELETE", &format!("/{}", bobs.id), Some(&t.manager_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &t,
        request("DELETE", &format!("/{}", bobs.id), Some(&t.manager_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
