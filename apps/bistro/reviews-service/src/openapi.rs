use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Bistro Reviews API",
        version = "0.1.0",
        description = "Ratings and comments on products and completed orders"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/reviews", api = domain_reviews::ApiDoc))
)]
pub struct ApiDoc;
