use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    AppError, CurrentUser, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadGatewayResponse, BadRequestResponse, BadRequestUuidResponse,
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
        UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ReviewResult;
use crate::models::{
    CreateReview, Page, RatingSummary, Review, ReviewFilter, ReviewList, ReviewTarget,
    ReviewType, TargetReviewsQuery, UpdateReview,
};
use crate::repository::ReviewRepository;
use crate::service::ReviewService;

/// OpenAPI documentation for the Reviews API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_review,
        list_reviews,
        rating_summary,
        my_reviews,
        update_review,
        delete_review,
    ),
    components(
        schemas(Review, ReviewList, ReviewType, CreateReview, UpdateReview, RatingSummary),
        responses(
            BadGatewayResponse,
            BadRequestResponse,
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            ForbiddenResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            ServiceUnavailableResponse,
            UnauthorizedResponse
        )
    ),
    tags(
        (name = "reviews", description = "Ratings of dishes and past orders")
    )
)]
pub struct ApiDoc;

/// Create the reviews router, nested at `/reviews`
pub fn router<R: ReviewRepository + 'static>(service: ReviewService<R>) -> Router {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/summary", get(rating_summary))
        .route("/mine", get(my_reviews))
        .route("/{id}", put(update_review).delete(delete_review))
        .with_state(Arc::new(service))
}

/// Review a product or one of your completed orders
#[utoipa::path(
    post,
    path = "",
    tag = "reviews",
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Order not reviewable", response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, description = "Target not found", response = NotFoundResponse),
        (status = 409, description = "Already reviewed", response = ConflictResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_review<R: ReviewRepository>(
    State(service): State<Arc<ReviewService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateReview>,
) -> Result<impl IntoResponse, AppError> {
    let review = service.create_review(&user, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Reviews of a target, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "reviews",
    params(TargetReviewsQuery),
    responses(
        (status = 200, description = "Page of reviews", body = ReviewList),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn list_reviews<R: ReviewRepository>(
    State(service): State<Arc<ReviewService<R>>>,
    ValidatedQuery(query): ValidatedQuery<TargetReviewsQuery>,
) -> ReviewResult<Json<ReviewList>> {
    Ok(Json(
        service
            .list_for_target(ReviewFilter::for_target(query))
            .await?,
    ))
}

/// Average rating and review count of a target
#[utoipa::path(
    get,
    path = "/summary",
    tag = "reviews",
    params(ReviewTarget),
    responses(
        (status = 200, description = "Rating summary", body = RatingSummary),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn rating_summary<R: ReviewRepository>(
    State(service): State<Arc<ReviewService<R>>>,
    Query(target): Query<ReviewTarget>,
) -> ReviewResult<Json<RatingSummary>> {
    Ok(Json(service.summary(target).await?))
}

/// The caller's own reviews
#[utoipa::path(
    get,
    path = "/mine",
    tag = "reviews",
    params(Page),
    responses(
        (status = 200, description = "Page of reviews", body = ReviewList),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn my_reviews<R: ReviewRepository>(
    State(service): State<Arc<ReviewService<R>>>,
    user: CurrentUser,
    ValidatedQuery(page): ValidatedQuery<Page>,
) -> Result<Json<ReviewList>, AppError> {
    Ok(Json(
        service
            .list_for_target(ReviewFilter::for_author(user.id, page))
            .await?,
    ))
}

/// Change rating or comment (author only)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "reviews",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_review<R: ReviewRepository>(
    State(service): State<Arc<ReviewService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateReview>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(service.update_review(&user, id, input).await?))
}

/// Delete a review (author or staff)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "reviews",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_review<R: ReviewRepository>(
    State(service): State<Arc<ReviewService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    service.delete_review(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
