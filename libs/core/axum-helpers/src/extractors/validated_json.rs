//! JSON extractor that runs `validator` rules before the handler sees the body.

use crate::errors::{AppError, ErrorCode, ErrorResponse};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Deserializes and validates a JSON body.
///
/// Malformed JSON is rejected with `INVALID_JSON`. Rule violations return 400
/// `VALIDATION_ERROR` with a `details` map of field name to the failed rules.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::JsonExtractorRejection(e).into_response())?;

        data.validate().map_err(|e| validation_rejection(&e))?;

        Ok(ValidatedJson(data))
    }
}

/// 400 `VALIDATION_ERROR` with a `details` map of field name to the failed rules.
pub(crate) fn validation_rejection(errors: &ValidationErrors) -> Response {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::json!(messages))
        })
        .collect::<serde_json::Map<_, _>>();

    let body = ErrorResponse {
        code: ErrorCode::ValidationError.code(),
        error: ErrorCode::ValidationError.as_str().to_string(),
        message: ErrorCode::ValidationError.default_message().to_string(),
        details: Some(serde_json::Value::Object(details)),
    };

    (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
}
