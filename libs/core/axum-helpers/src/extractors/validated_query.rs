//! Query-string extractor with the same validation contract as [`ValidatedJson`](super::ValidatedJson).

use super::validated_json::validation_rejection;
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes and validates the query string.
///
/// Unparseable parameters are a 400 `BAD_REQUEST`; rule violations a 400
/// `VALIDATION_ERROR` with field details.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()).into_response())?;

        data.validate().map_err(|e| validation_rejection(&e))?;

        Ok(ValidatedQuery(data))
    }
}
