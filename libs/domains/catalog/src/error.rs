use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Category with name '{0}' already exists")]
    DuplicateCategory(String),

    #[error("Category {0} still has products")]
    CategoryInUse(Uuid),

    #[error("Category {0} does not exist")]
    UnknownCategory(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CategoryNotFound(id) => {
                AppError::NotFound(format!("Category {} not found", id))
            }
            CatalogError::ProductNotFound(id) => {
                AppError::NotFound(format!("Product {} not found", id))
            }
            CatalogError::DuplicateCategory(name) => {
                AppError::Conflict(format!("Category with name '{}' already exists", name))
            }
            CatalogError::CategoryInUse(id) => AppError::Conflict(format!(
                "Category {} still has products and cannot be deleted",
                id
            )),
            CatalogError::UnknownCategory(id) => {
                AppError::BadRequest(format!("Category {} does not exist", id))
            }
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        CatalogError::Internal(format!("Database error: {}", err))
    }
}
