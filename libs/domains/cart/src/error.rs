use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use clients::ClientError;
use database::DatabaseError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Product {0} is not available")]
    ProductUnavailable(String),

    #[error("Quantity cannot exceed {max}")]
    QuantityLimit { max: u32 },

    #[error("Product {0} is not in the cart")]
    ItemNotFound(Uuid),

    #[error("Catalog request failed: {0}")]
    Catalog(ClientError),

    #[error("Cart storage error: {0}")]
    Storage(String),
}

pub type CartResult<T> = Result<T, CartError>;

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound(id) => {
                AppError::NotFound(format!("Product {} not found", id))
            }
            CartError::ProductUnavailable(name) => {
                AppError::BadRequest(format!("Product {} is not available", name))
            }
            CartError::QuantityLimit { max } => {
                AppError::BadRequest(format!("Quantity cannot exceed {}", max))
            }
            CartError::ItemNotFound(id) => {
                AppError::NotFound(format!("Product {} is not in the cart", id))
            }
            CartError::Catalog(ClientError::Transport(msg)) => {
                AppError::ServiceUnavailable(format!("Catalog service unreachable: {}", msg))
            }
            CartError::Catalog(e) => AppError::BadGateway(format!("Catalog service error: {}", e)),
            CartError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<DatabaseError> for CartError {
    fn from(err: DatabaseError) -> Self {
        CartError::Storage(err.to_string())
    }
}
