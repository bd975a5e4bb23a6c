use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(schemas(axum_helpers::ErrorResponse)),
    info(
        title = "Bistro Catalog API",
        version = "0.1.0",
        description = "Menu categories and products"
    ),
    servers((url = "/api", description = "API base path"))
)]
struct BaseDoc;

/// The catalog paths already start with `/categories` and `/products`, so they
/// are merged at the root instead of nested.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseDoc::openapi();
        doc.merge(domain_catalog::ApiDoc::openapi());
        doc
    }
}
