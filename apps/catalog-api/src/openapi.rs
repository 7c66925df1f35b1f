//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the Catalog API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Product catalog with brands, visit counting, and admin notifications"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/products", api = domain_catalog::ProductsApiDoc),
        (path = "/api/brands", api = domain_catalog::BrandsApiDoc),
        (path = "/api", api = domain_users::AuthApiDoc)
    )
)]
pub struct ApiDoc;
