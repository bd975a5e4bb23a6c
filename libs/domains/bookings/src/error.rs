use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BookingStatus, BookingZone};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error("Hookah not found: {0}")]
    HookahNotFound(Uuid),

    #[error("{0}")]
    Forbidden(String),

    #[error("No free tables in {} for this time", .0.display_name())]
    ZoneFull(BookingZone),

    /// Request is well-formed but breaks a booking rule
    #[error("{0}")]
    Invalid(String),

    #[error("Cannot change booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Hookahs can no longer be changed, booking is {0}")]
    HookahsClosed(BookingStatus),

    #[error("Event publishing failed: {0}")]
    Events(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(id) => AppError::NotFound(format!("Booking {} not found", id)),
            BookingError::HookahNotFound(id) => {
                AppError::NotFound(format!("Hookah {} not found", id))
            }
            BookingError::Forbidden(msg) => AppError::Forbidden(msg),
            e @ BookingError::ZoneFull(_) => AppError::Conflict(e.to_string()),
            BookingError::Invalid(msg) => AppError::BadRequest(msg),
            e @ (BookingError::InvalidTransition { .. } | BookingError::HookahsClosed(_)) => {
                AppError::BadRequest(e.to_string())
            }
            BookingError::Events(msg) | BookingError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for BookingError {
    fn from(err: sea_orm::DbErr) -> Self {
        BookingError::Internal(format!("Database error: {}", err))
    }
}
