use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, CurrentUser, Role, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadGatewayResponse, BadRequestResponse, BadRequestUuidResponse,
        BadRequestValidationResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, ServiceUnavailableResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{CreateOrder, Order, OrderFilter, OrderItem, OrderList, UpdateOrder};
use crate::repository::OrderRepository;
use crate::service::OrderService;

/// OpenAPI documentation for the Orders API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_order,
        list_orders,
        get_order,
        update_order,
        delete_order,
        confirm_order,
        cancel_order,
        complete_order,
    ),
    components(
        schemas(Order, OrderItem, OrderList, CreateOrder, UpdateOrder, contracts::OrderStatus),
        responses(
            BadGatewayResponse,
            BadRequestResponse,
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            ServiceUnavailableResponse,
            UnauthorizedResponse
        )
    ),
    tags(
        (name = "orders", description = "Order lifecycle from cart to completion")
    )
)]
pub struct ApiDoc;

/// Create the orders router, nested at `/orders`
pub fn router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    router_with_shared(Arc::new(service))
}

/// Same as [`router`], for a service that is also shared with the event consumer
pub fn router_with_shared<R: OrderRepository + 'static>(service: Arc<OrderService<R>>) -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route(
            "/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/{id}/confirm", post(confirm_order))
        .route("/{id}/cancel", post(cancel_order))
        .route("/{id}/complete", post(complete_order))
        .with_state(service)
}

/// Create a Draft order from the caller's cart
#[utoipa::path(
    post,
    path = "",
    tag = "orders",
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Draft order created", body = Order),
        (status = 400, description = "Empty cart or unavailable product", response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> Result<impl IntoResponse, AppError> {
    let order = service.create_order(&user, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List orders; non-staff callers only see their own
#[utoipa::path(
    get,
    path = "",
    tag = "orders",
    params(OrderFilter),
    responses(
        (status = 200, description = "Page of orders", body = OrderList),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn list_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    ValidatedQuery(filter): ValidatedQuery<OrderFilter>,
) -> Result<Json<OrderList>, AppError> {
    Ok(Json(service.list_orders(&user, filter).await?))
}

/// Get an order (owner or staff)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    Ok(Json(service.get_order(&user, id).await?))
}

/// Edit delivery details while the order is still a Draft
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrder,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateOrder>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(service.update_order(&user, id, input).await?))
}

/// Delete an order (admin only)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    user.require_any(&[Role::Admin])?;
    service.delete_order(id).await?;

    AuditEvent::new(
        Some(user.id),
        "order.delete",
        Some(format!("order:{}", id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Confirm a Draft order; it becomes Pending and the cart is emptied
#[utoipa::path(
    post,
    path = "/{id}/confirm",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order confirmed", body = Order),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn confirm_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    Ok(Json(service.confirm_order(&user, id).await?))
}

/// Cancel an order (owner before payment, staff until completion)
#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order canceled", body = Order),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn cancel_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    let order = service.cancel_order(&user, id).await?;

    AuditEvent::new(
        Some(user.id),
        "order.cancel",
        Some(format!("order:{}", id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "by_staff": order.user_id != user.id }))
    .log();

    Ok(Json(order))
}

/// Mark a Paid order Completed (staff only)
#[utoipa::path(
    post,
    path = "/{id}/complete",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order completed", body = Order),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn complete_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    user.require_staff()?;
    Ok(Json(service.complete_order(id).await?))
}
