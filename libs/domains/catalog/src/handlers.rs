use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    AppError, CurrentUser, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{
    Category, CreateCategory, CreateProduct, Product, ProductFilter, SetAvailability,
    UpdateCategory, UpdateProduct,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the Catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        create_category,
        update_category,
        delete_category,
        list_products,
        get_product,
        create_product,
        update_product,
        set_availability,
        delete_product,
    ),
    components(
        schemas(
            Category, CreateCategory, UpdateCategory, Product, CreateProduct, UpdateProduct,
            SetAvailability
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
        (name = "categories", description = "Menu sections"),
        (name = "products", description = "Dishes and drinks")
    )
)]
pub struct ApiDoc;

/// Create the catalog router; owns both `/categories` and `/products`
pub fn router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            axum::routing::put(update_category).delete(delete_category),
        )
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/availability", patch(set_availability))
        .with_state(Arc::new(service))
}

/// List categories in menu order
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<Vec<Category>>> {
    Ok(Json(service.list_categories().await?))
}

/// Create a category (staff only)
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn create_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> Result<impl IntoResponse, AppError> {
    user.require_staff()?;
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category (staff only)
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> Result<Json<Category>, AppError> {
    user.require_staff()?;
    Ok(Json(service.update_category(id, input).await?))
}

/// Delete an empty category (staff only)
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, description = "Category still has products", response = ConflictResponse)
    )
)]
async fn delete_category<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    user.require_staff()?;
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List products with optional filters
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    params(ProductFilter),
    responses(
        (status = 200, description = "Matching products", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedQuery(filter): ValidatedQuery<ProductFilter>,
) -> CatalogResult<Json<Vec<Product>>> {
    Ok(Json(service.list_products(filter).await?))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<Product>> {
    Ok(Json(service.get_product(id).await?))
}

/// Create a product (staff only)
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn create_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> Result<impl IntoResponse, AppError> {
    user.require_staff()?;
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (staff only)
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    user.require_staff()?;
    Ok(Json(service.update_product(id, input).await?))
}

/// Mark a product available or sold out (staff only)
#[utoipa::path(
    patch,
    path = "/products/{id}/availability",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = SetAvailability,
    responses(
        (status = 200, description = "Availability changed", body = Product),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn set_availability<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<SetAvailability>,
) -> Result<Json<Product>, AppError> {
    user.require_staff()?;
    Ok(Json(service.set_availability(id, input.is_available).await?))
}

/// Delete a product (staff only)
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<StatusCode, AppError> {
    user.require_staff()?;
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
