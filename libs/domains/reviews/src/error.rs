use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use clients::ClientError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ReviewType;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Review not found: {0}")]
    NotFound(Uuid),

    #[error("{} {} not found", .0.label(), .1)]
    TargetNotFound(ReviewType, Uuid),

    /// The target exists but the caller may not review it (yet)
    #[error("{0}")]
    NotReviewable(String),

    #[error("You have already reviewed this {0}")]
    Duplicate(ReviewType),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} service error: {1}")]
    Upstream(&'static str, ClientError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ReviewResult<T> = Result<T, ReviewError>;

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound(id) => AppError::NotFound(format!("Review {} not found", id)),
            e @ ReviewError::TargetNotFound(..) => AppError::NotFound(e.to_string()),
            ReviewError::NotReviewable(msg) => AppError::BadRequest(msg),
            e @ ReviewError::Duplicate(_) => AppError::Conflict(e.to_string()),
            ReviewError::Forbidden(msg) => AppError::Forbidden(msg),
            ReviewError::Upstream(service, ClientError::Transport(msg)) => {
                AppError::ServiceUnavailable(format!("{} service unreachable: {}", service, msg))
            }
            ReviewError::Upstream(service, e) => {
                AppError::BadGateway(format!("{} service error: {}", service, e))
            }
            ReviewError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(err: sea_orm::DbErr) -> Self {
        ReviewError::Internal(format!("Database error: {}", err))
    }
}
