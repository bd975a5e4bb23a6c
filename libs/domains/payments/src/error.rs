use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use clients::ClientError;
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment not found for order {0}")]
    NotFoundForOrder(Uuid),

    #[error("No payment for checkout session {0}")]
    UnknownSession(String),

    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidOrder(String),

    #[error("Invalid webhook: {0}")]
    InvalidWebhook(String),

    #[error("Payment provider error: {0}")]
    Gateway(GatewayError),

    #[error("Orders service error: {0}")]
    Orders(ClientError),

    #[error("Event publishing failed: {0}")]
    Events(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            e @ (PaymentError::NotFoundForOrder(_)
            | PaymentError::UnknownSession(_)
            | PaymentError::OrderNotFound(_)) => AppError::NotFound(e.to_string()),
            PaymentError::Forbidden(msg) => AppError::Forbidden(msg),
            PaymentError::InvalidOrder(msg) => AppError::BadRequest(msg),
            e @ PaymentError::InvalidWebhook(_) => AppError::BadRequest(e.to_string()),
            PaymentError::Gateway(GatewayError::Transport(msg)) => {
                AppError::ServiceUnavailable(format!("Payment provider unreachable: {}", msg))
            }
            PaymentError::Gateway(e) => AppError::BadGateway(e.to_string()),
            PaymentError::Orders(ClientError::Transport(msg)) => {
                AppError::ServiceUnavailable(format!("Orders service unreachable: {}", msg))
            }
            PaymentError::Orders(e) => {
                AppError::BadGateway(format!("Orders service error: {}", e))
            }
            PaymentError::Events(msg) | PaymentError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for PaymentError {
    fn from(err: sea_orm::DbErr) -> Self {
        PaymentError::Internal(format!("Database error: {}", err))
    }
}

impl From<GatewayError> for PaymentError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidSignature(msg) | GatewayError::InvalidPayload(msg) => {
                PaymentError::InvalidWebhook(msg)
            }
            other => PaymentError::Gateway(other),
        }
    }
}
