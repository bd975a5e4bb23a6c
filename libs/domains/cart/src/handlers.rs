use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use axum_helpers::{
    CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadGatewayResponse, BadRequestResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use contracts::{CartLine, CartSnapshot};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CartResult;
use crate::models::{AddCartItem, UpdateCartItem};
use crate::service::CartService;
use crate::store::CartStore;

/// OpenAPI documentation for the Cart API
#[derive(OpenApi)]
#[openapi(
    paths(get_cart, clear_cart, add_item, update_item, remove_item),
    components(
        schemas(CartSnapshot, CartLine, AddCartItem, UpdateCartItem),
        responses(
            BadGatewayResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse,
            NotFoundResponse,
            UnauthorizedResponse
        )
    ),
    tags(
        (name = "cart", description = "The signed-in user's cart")
    )
)]
pub struct ApiDoc;

/// Create the cart router; every route acts on the caller's own cart
pub fn router<S: CartStore + 'static>(service: CartService<S>) -> Router {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/{id}", put(update_item).delete(remove_item))
        .with_state(Arc::new(service))
}

/// The caller's cart; empty when none is stored
#[utoipa::path(
    get,
    path = "",
    tag = "cart",
    responses(
        (status = 200, description = "Current cart", body = CartSnapshot),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn get_cart<S: CartStore>(
    State(service): State<Arc<CartService<S>>>,
    user: CurrentUser,
) -> CartResult<Json<CartSnapshot>> {
    Ok(Json(service.get_cart(user.id).await?))
}

/// Empty the cart. Idempotent.
#[utoipa::path(
    delete,
    path = "",
    tag = "cart",
    responses(
        (status = 204, description = "Cart cleared"),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn clear_cart<S: CartStore>(
    State(service): State<Arc<CartService<S>>>,
    user: CurrentUser,
) -> CartResult<StatusCode> {
    service.clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a product to the cart
#[utoipa::path(
    post,
    path = "/items",
    tag = "cart",
    request_body = AddCartItem,
    responses(
        (status = 200, description = "Updated cart", body = CartSnapshot),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn add_item<S: CartStore>(
    State(service): State<Arc<CartService<S>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<AddCartItem>,
) -> CartResult<Json<CartSnapshot>> {
    Ok(Json(service.add_item(user.id, input).await?))
}

/// Set the quantity of a line; 0 removes it
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "cart",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateCartItem,
    responses(
        (status = 200, description = "Updated cart", body = CartSnapshot),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_item<S: CartStore>(
    State(service): State<Arc<CartService<S>>>,
    user: CurrentUser,
    UuidPath(product_id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCartItem>,
) -> CartResult<Json<CartSnapshot>> {
    Ok(Json(service.update_item(user.id, product_id, input).await?))
}

/// Remove a line from the cart
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "cart",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Updated cart", body = CartSnapshot),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_item<S: CartStore>(
    State(service): State<Arc<CartService<S>>>,
    user: CurrentUser,
    UuidPath(product_id): UuidPath,
) -> CartResult<Json<CartSnapshot>> {
    Ok(Json(service.remove_item(user.id, product_id).await?))
}
