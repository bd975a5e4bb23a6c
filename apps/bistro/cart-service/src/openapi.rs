use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Bistro Cart API",
        version = "0.1.0",
        description = "Per-user shopping cart, kept for 30 minutes of inactivity"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/cart", api = domain_cart::ApiDoc))
)]
pub struct ApiDoc;
