use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Bistro Bookings API",
        version = "0.1.0",
        description = "Table bookings by zone with hookah pre-orders"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/bookings", api = domain_bookings::ApiDoc))
)]
pub struct ApiDoc;
