use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Bistro Orders API",
        version = "0.1.0",
        description = "Order lifecycle from cart checkout to completion"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/orders", api = domain_orders::ApiDoc))
)]
pub struct ApiDoc;
