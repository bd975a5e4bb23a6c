use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, CurrentUser, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::models::{
    AddHookah, Availability, AvailabilityQuery, Booking, BookingFilter, BookingList,
    BookingStatus, BookingZone, CreateBooking, HookahBooking, HookahStrength,
};
use crate::repository::BookingRepository;
use crate::service::BookingService;

/// OpenAPI documentation for the Bookings API
#[derive(OpenApi)]
#[openapi(
    paths(
        availability,
        create_booking,
        list_bookings,
        get_booking,
        add_hookah,
        remove_hookah,
        confirm_booking,
        cancel_booking,
        complete_booking,
    ),
    components(
        schemas(
            Booking, BookingList, BookingZone, BookingStatus, CreateBooking, Availability,
            HookahBooking, HookahStrength, AddHookah
        ),
        responses(
            BadRequestResponse,
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            ForbiddenResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags(
        (name = "bookings", description = "Table bookings with pre-ordered hookahs")
    )
)]
pub struct ApiDoc;

/// Create the bookings router, nested at `/bookings`
pub fn router<R: BookingRepository + 'static>(service: BookingService<R>) -> Router {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/availability", get(availability))
        .route("/{id}", get(get_booking))
        .route("/{id}/hookahs", post(add_hookah))
        .route("/{id}/hookahs/{hookah_id}", delete(remove_hookah))
        .route("/{id}/confirm", post(confirm_booking))
        .route("/{id}/cancel", post(cancel_booking))
        .route("/{id}/complete", post(complete_booking))
        .with_state(Arc::new(service))
}

/// Free tables in a zone for a two-hour slot
#[utoipa::path(
    get,
    path = "/availability",
    tag = "bookings",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Zone availability", body = Availability),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn availability<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    Query(query): Query<AvailabilityQuery>,
) -> BookingResult<Json<Availability>> {
    Ok(Json(service.availability(query.zone, query.starts_at).await?))
}

/// Book a table, optionally with hookahs
#[utoipa::path(
    post,
    path = "",
    tag = "bookings",
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, description = "No free tables in the zone", response = ConflictResponse)
    )
)]
async fn create_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateBooking>,
) -> Result<impl IntoResponse, AppError> {
    let booking = service.create_booking(&user, input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings; non-staff callers only see their own
#[utoipa::path(
    get,
    path = "",
    tag = "bookings",
    params(BookingFilter),
    responses(
        (status = 200, description = "Page of bookings", body = BookingList),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn list_bookings<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    ValidatedQuery(filter): ValidatedQuery<BookingFilter>,
) -> Result<Json<BookingList>, AppError> {
    Ok(Json(service.list_bookings(&user, filter).await?))
}

/// Get a booking (owner or staff)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking found", body = Booking),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(service.get_booking(&user, id).await?))
}

/// Pre-order a hookah for an open booking (owner only)
#[utoipa::path(
    post,
    path = "/{id}/hookahs",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = AddHookah,
    responses(
        (status = 201, description = "Hookah added", body = Booking),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn add_hookah<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<AddHookah>,
) -> Result<impl IntoResponse, AppError> {
    let booking = service.add_hookah(&user, id, input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Drop a hookah from an open booking (owner only)
#[utoipa::path(
    delete,
    path = "/{id}/hookahs/{hookah_id}",
    tag = "bookings",
    params(
        ("id" = Uuid, Path, description = "Booking ID"),
        ("hookah_id" = Uuid, Path, description = "Hookah line ID")
    ),
    responses(
        (status = 200, description = "Hookah removed", body = Booking),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn remove_hookah<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    Path((id, hookah_id)): Path<(String, String)>,
) -> Result<Json<Booking>, AppError> {
    let id = Uuid::parse_str(&id)?;
    let hookah_id = Uuid::parse_str(&hookah_id)?;
    Ok(Json(service.remove_hookah(&user, id, hookah_id).await?))
}

/// Pending → Confirmed (staff only)
#[utoipa::path(
    post,
    path = "/{id}/confirm",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking confirmed", body = Booking),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn confirm_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Booking>, AppError> {
    user.require_staff()?;
    Ok(Json(service.confirm_booking(id).await?))
}

/// Cancel an open booking (owner or staff)
#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking canceled", body = Booking),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn cancel_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    headers: HeaderMap,
) -> Result<Json<Booking>, AppError> {
    let result = service.cancel_booking(&user, id).await;

    let outcome = match &result {
        Ok(_) => AuditOutcome::Success,
        Err(BookingError::Forbidden(_)) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    };
    AuditEvent::new(
        Some(user.id),
        "booking.cancel",
        Some(format!("booking:{}", id)),
        outcome,
    )
    .with_request(&headers)
    .with_details(json!({ "by_staff": user.is_staff() }))
    .log();

    Ok(Json(result?))
}

/// Confirmed → Completed (staff only)
#[utoipa::path(
    post,
    path = "/{id}/complete",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking completed", body = Booking),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn complete_booking<R: BookingRepository>(
    State(service): State<Arc<BookingService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Booking>, AppError> {
    user.require_staff()?;
    Ok(Json(service.complete_booking(id).await?))
}
