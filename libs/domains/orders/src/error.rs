use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use clients::ClientError;
use contracts::OrderStatus;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("{0}")]
    Forbidden(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product {0} is no longer available")]
    ProductUnavailable(String),

    #[error("Cannot change order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Only draft orders can be edited, order is {0}")]
    NotEditable(OrderStatus),

    /// A sibling service call failed; the first field names the service
    #[error("{0} service error: {1}")]
    Upstream(&'static str, ClientError),

    #[error("Event publishing failed: {0}")]
    Events(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => AppError::NotFound(format!("Order {} not found", id)),
            OrderError::Forbidden(msg) => AppError::Forbidden(msg),
            OrderError::EmptyCart => AppError::BadRequest("Cart is empty".to_string()),
            OrderError::ProductUnavailable(name) => {
                AppError::BadRequest(format!("Product {} is no longer available", name))
            }
            e @ (OrderError::InvalidTransition { .. } | OrderError::NotEditable(_)) => {
                AppError::BadRequest(e.to_string())
            }
            OrderError::Upstream(service, ClientError::Transport(msg)) => {
                AppError::ServiceUnavailable(format!("{} service unreachable: {}", service, msg))
            }
            OrderError::Upstream(service, e) => {
                AppError::BadGateway(format!("{} service error: {}", service, e))
            }
            OrderError::Events(msg) | OrderError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        OrderError::Internal(format!("Database error: {}", err))
    }
}
