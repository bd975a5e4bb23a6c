use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, CurrentUser, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadGatewayResponse, BadRequestResponse, BadRequestUuidResponse,
        BadRequestValidationResponse, ForbiddenResponse, NotFoundResponse,
        ServiceUnavailableResponse, UnauthorizedResponse,
    },
};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::PaymentError;
use crate::models::{
    CheckoutSession, CreateCheckout, Payment, PaymentFilter, PaymentList, PaymentStatus,
};
use crate::repository::PaymentRepository;
use crate::service::{PaymentService, WebhookOutcome};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// OpenAPI documentation for the Payments API
#[derive(OpenApi)]
#[openapi(
    paths(checkout, webhook, get_for_order, list_payments),
    components(
        schemas(Payment, PaymentStatus, PaymentList, CreateCheckout, CheckoutSession),
        responses(
            BadGatewayResponse,
            BadRequestResponse,
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ServiceUnavailableResponse,
            UnauthorizedResponse
        )
    ),
    tags(
        (name = "payments", description = "Checkout sessions and provider webhooks")
    )
)]
pub struct ApiDoc;

/// Create the payments router, nested at `/payments`
pub fn router<R: PaymentRepository + 'static>(service: PaymentService<R>) -> Router {
    Router::new()
        .route("/", get(list_payments))
        .route("/checkout", post(checkout))
        .route("/webhook", post(webhook))
        .route("/order/{order_id}", get(get_for_order))
        .with_state(Arc::new(service))
}

/// Start a checkout for a Pending order
#[utoipa::path(
    post,
    path = "/checkout",
    tag = "payments",
    request_body = CreateCheckout,
    responses(
        (status = 201, description = "Checkout session ready", body = CheckoutSession),
        (status = 400, description = "Order is not pending", response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn checkout<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateCheckout>,
) -> Result<impl IntoResponse, AppError> {
    let session = service.checkout(&user, input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Provider notifications, authenticated by the `Stripe-Signature` header
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "payments",
    request_body(content = String, description = "Raw provider event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event handled or ignored"),
        (status = 400, description = "Bad signature or payload", response = BadRequestResponse),
        (status = 404, description = "Unknown checkout session", response = NotFoundResponse)
    )
)]
async fn webhook<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let outcome = match service.handle_webhook(&body, signature).await {
        Ok(outcome) => outcome,
        Err(e @ PaymentError::InvalidWebhook(_)) => {
            AuditEvent::new(None, "payment.webhook", None, AuditOutcome::Denied)
                .with_request(&headers)
                .log();
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let resource = match &outcome {
        WebhookOutcome::Completed(id)
        | WebhookOutcome::AlreadyCompleted(id)
        | WebhookOutcome::Canceled(id)
        | WebhookOutcome::Failed(id) => Some(format!("payment:{}", id)),
        WebhookOutcome::Ignored(_) => None,
    };
    AuditEvent::new(None, "payment.webhook", resource, AuditOutcome::Success)
        .with_request(&headers)
        .with_details(json!({ "outcome": format!("{:?}", outcome) }))
        .log();

    Ok(Json(json!({ "received": true })))
}

/// Latest payment of an order (owner or staff)
#[utoipa::path(
    get,
    path = "/order/{order_id}",
    tag = "payments",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Payment found", body = Payment),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_for_order<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    user: CurrentUser,
    UuidPath(order_id): UuidPath,
) -> Result<Json<Payment>, AppError> {
    Ok(Json(service.get_for_order(&user, order_id).await?))
}

/// List payments (staff only)
#[utoipa::path(
    get,
    path = "",
    tag = "payments",
    params(PaymentFilter),
    responses(
        (status = 200, description = "Page of payments", body = PaymentList),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn list_payments<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    user: CurrentUser,
    ValidatedQuery(filter): ValidatedQuery<PaymentFilter>,
) -> Result<Json<PaymentList>, AppError> {
    user.require_staff()?;
    Ok(Json(service.list_payments(filter).await?))
}
