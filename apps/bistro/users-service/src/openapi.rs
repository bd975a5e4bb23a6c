use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Bistro Users API",
        version = "0.1.0",
        description = "Registration, login, profiles, roles and password reset"
    ),
    servers((url = "/api", description = "API base path")),
    nest((path = "/users", api = domain_users::ApiDoc))
)]
pub struct ApiDoc;
