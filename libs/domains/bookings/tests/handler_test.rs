//! Handler tests for the Bookings domain

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum_helpers::{JwtAuth, JwtConfig, Role, optional_jwt_auth_middleware};
use chrono::{DateTime, Days, Duration, SecondsFormat, Utc};
use contracts::{BistroEvent, InMemoryEventPublisher};
use domain_bookings::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::TestDataBuilder;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    app: Router,
    publisher: InMemoryEventPublisher,
    owner_token: String,
    other_token: String,
    manager_token: String,
}

fn setup() -> TestApp {
    let jwt = JwtAuth::new(&JwtConfig::new("bookings-handler-test-secret-32-chars!").unwrap());
    let builder = TestDataBuilder::from_test_name("bookings_handlers");

    let token = |id: Uuid, email: &str, name: &str, role: Role| {
        jwt.issue(id, email, name, &[role]).unwrap().access_token
    };
    let owner_token = token(builder.user_id(), "ann@bistro.test", "Ann", Role::User);
    let other_token = token(builder.other_user_id(), "bob@bistro.test", "Bob", Role::User);
    let manager_token = token(Uuid::now_v7(), "host@bistro.test", "Host", Role::Manager);

    let publisher = InMemoryEventPublisher::new();
    let service = BookingService::new(
        InMemoryBookingRepository::new(),
        Arc::new(publisher.clone()),
    );
    let app = handlers::router(service)
        .layer(middleware::from_fn_with_state(jwt, optional_jwt_auth_middleware));

    TestApp {
        app,
        publisher,
        owner_token,
        other_token,
        manager_token,
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

/// 19:00 UTC, two days from now
fn evening() -> DateTime<Utc> {
    (Utc::now().date_naive() + Days::new(2))
        .and_hms_opt(19, 0, 0)
        .unwrap()
        .and_utc()
}

fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn booking_body(zone: &str, starts_at: DateTime<Utc>, guests: u32) -> Value {
    json!({
        "zone": zone,
        "starts_at": stamp(starts_at),
        "guests": guests,
        "contact_phone": "+100000000"
    })
}

async fn book(t: &TestApp, token: &str, body: Value) -> Booking {
    let response = t
        .app
        .clone()
        .oneshot(request("POST", "/", Some(token), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_booking_requires_auth() {
    let t = setup();
    let (status, _) = send(
        &t,
        request("POST", "/", None, Some(booking_body("terrace", evening(), 2))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_booking_with_hookahs() {
    let t = setup();
    let starts_at = evening();

    let mut body = booking_body("main_hall", starts_at, 5);
    body["contact_name"] = json!("Ann & friends");
    body["hookahs"] = json!([
        { "flavor": "Mint", "strength": "light", "quantity": 1 },
        {
            "flavor": "Double apple",
            "strength": "strong",
            "quantity": 2,
            "serve_at": stamp(starts_at + Duration::minutes(30))
        }
    ]);
    let booking = book(&t, &t.owner_token, body).await;

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.ends_at, starts_at + Duration::hours(2));
    assert_eq!(booking.contact_name, "Ann & friends");
    assert_eq!(booking.contact_email, "ann@bistro.test");
    assert_eq!(booking.hookahs.len(), 2);
    assert_eq!(booking.hookahs[1].price_cents, 4400);

    let published = t.publisher.published().await;
    assert_eq!(published.len(), 1);
    match &published[0] {
        BistroEvent::BookingCreated(event) => {
            assert_eq!(event.booking_id, booking.id);
            assert_eq!(event.zone, "Main hall");
            assert_eq!(event.guests, 5);
            assert_eq!(event.hookahs_count, 3);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_booking_rules() {
    let t = setup();

    let (status, body) = send(
        &t,
        request(
            "POST",
            "/",
            Some(&t.owner_token),
            Some(booking_body("terrace", Utc::now() - Duration::hours(1), 2)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Booking must start in the future");

    let (status, _) = send(
        &t,
        request(
            "POST",
            "/",
            Some(&t.owner_token),
            Some(booking_body("terrace", evening(), 7)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The VIP room seats larger parties than the terrace
    let (status, _) = send(
        &t,
        request(
            "POST",
            "/",
            Some(&t.owner_token),
            Some(booking_body("vip", evening(), 12)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut late_hookah = booking_body("terrace", evening(), 2);
    late_hookah["hookahs"] = json!([{
        "flavor": "Mint",
        "strength": "medium",
        "quantity": 1,
        "serve_at": stamp(evening() + Duration::hours(3))
    }]);
    let (status, _) = send(
        &t,
        request("POST", "/", Some(&t.owner_token), Some(late_hookah)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_zone_returns_409_until_a_table_frees_up() {
    let t = setup();
    let starts_at = evening();

    let mut bookings = Vec::new();
    for _ in 0..BookingZone::Vip.capacity() {
        bookings.push(book(&t, &t.owner_token, booking_body("vip", starts_at, 2)).await);
    }

    // Overlaps the last hour of every existing booking
    let (status, _) = send(
        &t,
        request(
            "POST",
            "/",
            Some(&t.other_token),
            Some(booking_body("vip", starts_at + Duration::hours(1), 2)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Back to back is fine
    book(
        &t,
        &t.other_token,
        booking_body("vip", starts_at + Duration::hours(2), 2),
    )
    .await;

    let (status, _) = send(
        &t,
        request(
            "POST",
            &format!("/{}/cancel", bookings[0].id),
            Some(&t.owner_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    book(&t, &t.other_token, booking_body("vip", starts_at, 2)).await;
}

#[tokio::test]
async fn test_availability_is_public() {
    let t = setup();
    let starts_at = evening();
    book(&t, &t.owner_token, booking_body("terrace", starts_at, 2)).await;
    book(&t, &t.other_token, booking_body("terrace", starts_at + Duration::minutes(90), 2)).await;

    let uri = format!("/availability?zone=terrace&starts_at={}", stamp(starts_at));
    let (status, body) = send(&t, request("GET", &uri, None, None)).await;

    assert_eq!(status, StatusCode::OK);
    let availability: Availability = serde_json::from_value(body).unwrap();
    assert_eq!(availability.capacity, 8);
    assert_eq!(availability.booked, 2);
    assert_eq!(availability.available, 6);
    assert_eq!(availability.ends_at, starts_at + Duration::hours(2));
}

#[tokio::test]
async fn test_booking_visibility() {
    let t = setup();
    let booking = book(&t, &t.owner_token, booking_body("terrace", evening(), 2)).await;
    let uri = format!("/{}", booking.id);

    let (status, _) = send(&t, request("GET", &uri, Some(&t.owner_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&t, request("GET", &uri, Some(&t.manager_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&t, request("GET", &uri, Some(&t.other_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t,
        request("GET", &format!("/{}", Uuid::now_v7()), Some(&t.owner_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_scoping_and_staff_filters() {
    let t = setup();
    let starts_at = evening();
    book(&t, &t.owner_token, booking_body("terrace", starts_at, 2)).await;
    book(&t, &t.owner_token, booking_body("vip", starts_at, 2)).await;
    book(&t, &t.other_token, booking_body("vip", starts_at + Duration::days(1), 2)).await;

    let (_, body) = send(&t, request("GET", "/", Some(&t.owner_token), None)).await;
    let mine: BookingList = serde_json::from_value(body).unwrap();
    assert_eq!(mine.total, 2);

    let (_, body) = send(&t, request("GET", "/?zone=vip", Some(&t.manager_token), None)).await;
    let vip: BookingList = serde_json::from_value(body).unwrap();
    assert_eq!(vip.total, 2);

    let uri = format!("/?date={}", starts_at.date_naive());
    let (_, body) = send(&t, request("GET", &uri, Some(&t.manager_token), None)).await;
    let that_day: BookingList = serde_json::from_value(body).unwrap();
    assert_eq!(that_day.total, 2);
    assert!(that_day.items.iter().all(|b| b.starts_at == starts_at));
}

#[tokio::test]
async fn test_hookahs_are_owner_only_and_closed_after_cancel() {
    let t = setup();
    let booking = book(&t, &t.owner_token, booking_body("terrace", evening(), 2)).await;
    let hookahs_uri = format!("/{}/hookahs", booking.id);
    let hookah = json!({ "flavor": "Grape", "strength": "medium", "quantity": 2 });

    let (status, _) = send(
        &t,
        request("POST", &hookahs_uri, Some(&t.other_token), Some(hookah.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &t,
        request("POST", &hookahs_uri, Some(&t.owner_token), Some(hookah.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let with_hookah: Booking = serde_json::from_value(body).unwrap();
    assert_eq!(with_hookah.hookahs.len(), 1);
    assert_eq!(with_hookah.hookahs[0].price_cents, 4000);
    let hookah_id = with_hookah.hookahs[0].id;

    let (status, body) = send(
        &t,
        request(
            "DELETE",
            &format!("{}/{}", hookahs_uri, hookah_id),
            Some(&t.owner_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hookahs"], json!([]));

    let (status, _) = send(
        &t,
        request(
            "DELETE",
            &format!("{}/{}", hookahs_uri, hookah_id),
            Some(&t.owner_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &t,
        request("POST", &format!("/{}/cancel", booking.id), Some(&t.owner_token), None),
    )
    .await;
    let (status, body) = send(
        &t,
        request("POST", &hookahs_uri, Some(&t.owner_token), Some(hookah)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Hookahs can no longer be changed, booking is canceled"
    );
}

#[tokio::test]
async fn test_staff_lifecycle() {
    let t = setup();
    let booking = book(&t, &t.owner_token, booking_body("main_hall", evening(), 4)).await;

    let (status, _) = send(
        &t,
        request("POST", &format!("/{}/confirm", booking.id), Some(&t.owner_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &t,
        request("POST", &format!("/{}/complete", booking.id), Some(&t.manager_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot change booking from pending to completed");

    let (status, body) = send(
        &t,
        request("POST", &format!("/{}/confirm", booking.id), Some(&t.manager_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = send(
        &t,
        request("POST", &format!("/{}/complete", booking.id), Some(&t.manager_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (status, _) = send(
        &t,
        request("POST", &format!("/{}/cancel", booking.id), Some(&t.manager_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stranger_cannot_cancel() {
    let t = setup();
    let booking = book(&t, &t.owner_token, booking_body("terrace", evening(), 2)).await;

    let (status, _) = send(
        &t,
        request("POST", &format!("/{}/cancel", booking.id), Some(&t.other_token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
