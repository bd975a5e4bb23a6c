use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, CurrentUser, Role, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use contracts::UserPublicProfile;
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{
    AuthResponse, ChangePassword, ChangeRole, ForgotPasswordRequest, LoginRequest,
    RegisterRequest, ResetPasswordRequest, UpdateProfile, UserFilter, UserList, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        get_me,
        update_me,
        change_password,
        public_profile,
        list_users,
        change_role,
        delete_user,
        forgot_password,
        reset_password,
    ),
    components(
        schemas(
            AuthResponse, ChangePassword, ChangeRole, ForgotPasswordRequest, LoginRequest,
            RegisterRequest, ResetPasswordRequest, UpdateProfile, UserList, UserResponse,
            UserPublicProfile, Role
        ),
        responses(
            BadRequestResponse,
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            ForbiddenResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags(
        (name = "users", description = "Accounts, authentication and roles")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/me", get(get_me).put(update_me))
        .route("/me/password", post(change_password))
        .route("/{id}", axum::routing::delete(delete_user))
        .route("/{id}/public", get(public_profile))
        .route("/{id}/role", put(change_role))
        .with_state(Arc::new(service))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, token issued", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let auth = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(auth)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<AuthResponse>> {
    match service.login(input).await {
        Ok(auth) => {
            AuditEvent::new(
                Some(auth.user.id),
                "user.login",
                Some(format!("user:{}", auth.user.id)),
                AuditOutcome::Success,
            )
            .with_request(&headers)
            .log();
            Ok(Json(auth))
        }
        Err(e) => {
            if matches!(e, UserError::InvalidCredentials | UserError::Inactive) {
                AuditEvent::new(None, "user.login", None, AuditOutcome::Failure)
                    .with_request(&headers)
                    .with_details(json!({ "reason": e.to_string() }))
                    .log();
            }
            Err(e)
        }
    }
}

/// The signed-in user
#[utoipa::path(
    get,
    path = "/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_me<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.get_user(user.id).await?))
}

/// Update name and/or email of the signed-in user
#[utoipa::path(
    put,
    path = "/me",
    tag = "users",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_me<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.update_profile(user.id, input).await?))
}

/// Change the password of the signed-in user
#[utoipa::path(
    post,
    path = "/me/password",
    tag = "users",
    request_body = ChangePassword,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn change_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<ChangePassword>,
) -> UserResult<StatusCode> {
    service.change_password(user.id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public profile of a user, used by the orders service
#[utoipa::path(
    get,
    path = "/{id}/public",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = UserPublicProfile),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn public_profile<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    _user: CurrentUser,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserPublicProfile>> {
    Ok(Json(service.public_profile(id).await?))
}

/// List users (staff only)
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    params(UserFilter),
    responses(
        (status = 200, description = "Page of users", body = UserList),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
    ValidatedQuery(filter): ValidatedQuery<UserFilter>,
) -> Result<Json<UserList>, AppError> {
    user.require_staff()?;
    Ok(Json(service.list_users(filter).await?))
}

/// Change the role of a user (admin only)
#[utoipa::path(
    put,
    path = "/{id}/role",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ChangeRole,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn change_role<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<ChangeRole>,
) -> Result<Json<UserResponse>, AppError> {
    user.require_any(&[Role::Admin])?;
    let updated = service.change_role(user.id, id, input.role).await?;

    AuditEvent::new(
        Some(user.id),
        "user.role_change",
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .with_details(json!({ "role": input.role }))
    .log();

    Ok(Json(updated))
}

/// Delete a user (admin only)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    user.require_any(&[Role::Admin])?;
    service.delete_user(id).await?;

    AuditEvent::new(
        Some(user.id),
        "user.delete",
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_request(&headers)
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Request a password reset email. Always answers 202.
#[utoipa::path(
    post,
    path = "/forgot-password",
    tag = "users",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 202, description = "Reset email sent if the account exists"),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn forgot_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<ForgotPasswordRequest>,
) -> UserResult<StatusCode> {
    service.forgot_password(&input.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Set a new password using a reset token
#[utoipa::path(
    post,
    path = "/reset-password",
    tag = "users",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password reset"),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn reset_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> UserResult<StatusCode> {
    service.reset_password(input).await?;
    Ok(StatusCode::NO_CONTENT)
}
