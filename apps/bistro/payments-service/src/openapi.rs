use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Bistro Payments API",
        version = "0.1.0",
        description = "Checkout sessions and payment provider webhooks"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/payments", api = domain_payments::ApiDoc))
)]
pub struct ApiDoc;
