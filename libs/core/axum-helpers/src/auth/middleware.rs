use super::current_user::BearerToken;
use super::jwt::JwtAuth;
use crate::errors::{ErrorCode, error_response};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};

/// Reads the token from `Authorization: Bearer <token>`, falling back to the
/// `access_token` cookie.
pub fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == "access_token").then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// Rejects the request with 401 unless it carries a valid token.
///
/// On success the claims and the raw token are placed in the request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token_from_request(&headers) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return unauthorized("No token provided");
    };

    match auth.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            request.extensions_mut().insert(BearerToken(token));
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "JWT verification failed");
            unauthorized("Invalid or expired token")
        }
    }
}

/// Like [`jwt_auth_middleware`] but lets anonymous requests through.
///
/// Handlers that need a user extract [`CurrentUser`](super::CurrentUser),
/// which answers 401 when nothing was attached here.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_request(&headers) {
        match auth.verify(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
                request.extensions_mut().insert(BearerToken(token));
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid JWT"),
        }
    }

    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        message.to_string(),
        ErrorCode::Unauthorized,
    )
}
