use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    auth::AuthUser,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers, extract_user_agent, AuditEvent, AuditOutcome, ValidatedJson,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{
    BrandFilter, BrandResponse, CreateBrand, CreateProduct, ProductFilter, ProductResponse,
    UpdateBrand, UpdateProduct,
};
use crate::service::{BrandService, ProductService};

const PRODUCTS_TAG: &str = "products";
const BRANDS_TAG: &str = "brands";

/// OpenAPI documentation for the products endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        patch_product,
        delete_product,
    ),
    components(
        schemas(ProductResponse, CreateProduct, UpdateProduct),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = PRODUCTS_TAG, description = "Product catalog endpoints")
    )
)]
pub struct ProductsApiDoc;

/// OpenAPI documentation for the brands endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_brands,
        create_brand,
        get_brand,
        update_brand,
        patch_brand,
        delete_brand,
    ),
    components(
        schemas(BrandResponse, CreateBrand, UpdateBrand),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = BRANDS_TAG, description = "Brand management endpoints")
    )
)]
pub struct BrandsApiDoc;

/// Create the product router with all HTTP endpoints
pub fn products_router(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{sku}",
            get(get_product)
                .put(update_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .with_state(service)
}

/// Create the brand router with all HTTP endpoints
pub fn brands_router(service: Arc<BrandService>) -> Router {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route(
            "/{id}",
            get(get_brand)
                .put(update_brand)
                .patch(patch_brand)
                .delete(delete_brand),
        )
        .with_state(service)
}

fn actor_ref(actor: &Option<Extension<AuthUser>>) -> Option<&AuthUser> {
    actor.as_ref().map(|Extension(user)| user)
}

/// List products
#[utoipa::path(
    get,
    path = "",
    tag = PRODUCTS_TAG,
    params(ProductFilter),
    responses(
        (status = 200, description = "List of products", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products(
    State(service): State<Arc<ProductService>>,
    Query(filter): Query<ProductFilter>,
) -> CatalogResult<Json<Vec<ProductResponse>>> {
    let products = service.list_products(filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = PRODUCTS_TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product(
    State(service): State<Arc<ProductService>>,
    actor: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> CatalogResult<impl IntoResponse> {
    let actor = actor_ref(&actor);
    let product = service.create_product(input, actor).await?;

    AuditEvent::new(
        actor.map(|u| u.id.to_string()),
        "product.create",
        Some(format!("product:{}", product.sku)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "product_name": product.name }))
    .log();

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// Get a product by sku.
///
/// An unauthenticated request counts as a visit and bumps the product's
/// visit counter. Authenticated requests do not.
#[utoipa::path(
    get,
    path = "/{sku}",
    tag = PRODUCTS_TAG,
    params(
        ("sku" = String, Path, description = "Product sku")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product(
    State(service): State<Arc<ProductService>>,
    actor: Option<Extension<AuthUser>>,
    Path(sku): Path<String>,
) -> CatalogResult<Json<ProductResponse>> {
    let product = service.retrieve_product(&sku, actor_ref(&actor)).await?;
    Ok(Json(product.into()))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{sku}",
    tag = PRODUCTS_TAG,
    params(
        ("sku" = String, Path, description = "Product sku")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product(
    State(service): State<Arc<ProductService>>,
    actor: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    Path(sku): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<ProductResponse>> {
    apply_product_update(service, actor, headers, sku, input).await
}

/// Partially update a product
#[utoipa::path(
    patch,
    path = "/{sku}",
    tag = PRODUCTS_TAG,
    params(
        ("sku" = String, Path, description = "Product sku")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn patch_product(
    State(service): State<Arc<ProductService>>,
    actor: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    Path(sku): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> CatalogResult<Json<ProductResponse>> {
    apply_product_update(service, actor, headers, sku, input).await
}

// PUT and PATCH share semantics: absent fields keep their stored values.
async fn apply_product_update(
    service: Arc<ProductService>,
    actor: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    sku: String,
    input: UpdateProduct,
) -> CatalogResult<Json<ProductResponse>> {
    let actor = actor_ref(&actor);
    let result = service.update_product(&sku, input, actor).await;

    let outcome = match &result {
        Ok(_) => AuditOutcome::Success,
        Err(crate::error::CatalogError::Forbidden(_)) => AuditOutcome::Denied,
        Err(_) => AuditOutcome::Failure,
    };
    AuditEvent::new(
        actor.map(|u| u.id.to_string()),
        "product.update",
        Some(format!("product:{}", sku)),
        outcome,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    result.map(|product| Json(product.into()))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{sku}",
    tag = PRODUCTS_TAG,
    params(
        ("sku" = String, Path, description = "Product sku")
    ),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product(
    State(service): State<Arc<ProductService>>,
    actor: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    Path(sku): Path<String>,
) -> CatalogResult<impl IntoResponse> {
    let actor = actor_ref(&actor);
    service.delete_product(&sku, actor).await?;

    AuditEvent::new(
        actor.map(|u| u.id.to_string()),
        "product.delete",
        Some(format!("product:{}", sku)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// List brands
#[utoipa::path(
    get,
    path = "",
    tag = BRANDS_TAG,
    params(BrandFilter),
    responses(
        (status = 200, description = "List of brands", body = Vec<BrandResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_brands(
    State(service): State<Arc<BrandService>>,
    Query(filter): Query<BrandFilter>,
) -> CatalogResult<Json<Vec<BrandResponse>>> {
    let brands = service.list_brands(filter).await?;
    Ok(Json(brands.into_iter().map(Into::into).collect()))
}

/// Create a new brand
#[utoipa::path(
    post,
    path = "",
    tag = BRANDS_TAG,
    request_body = CreateBrand,
    responses(
        (status = 201, description = "Brand created successfully", body = BrandResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_brand(
    State(service): State<Arc<BrandService>>,
    actor: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateBrand>,
) -> CatalogResult<impl IntoResponse> {
    let actor = actor_ref(&actor);
    let brand = service.create_brand(input, actor).await?;

    AuditEvent::new(
        actor.map(|u| u.id.to_string()),
        "brand.create",
        Some(format!("brand:{}", brand.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "brand_name": brand.name }))
    .log();

    Ok((StatusCode::CREATED, Json(BrandResponse::from(brand))))
}

/// Get a brand by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = BRANDS_TAG,
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand found", body = BrandResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_brand(
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
) -> CatalogResult<Json<BrandResponse>> {
    let brand = service.get_brand(id).await?;
    Ok(Json(brand.into()))
}

/// Update a brand
#[utoipa::path(
    put,
    path = "/{id}",
    tag = BRANDS_TAG,
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body = UpdateBrand,
    responses(
        (status = 200, description = "Brand updated successfully", body = BrandResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_brand(
    State(service): State<Arc<BrandService>>,
    actor: Option<Extension<AuthUser>>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UpdateBrand>,
) -> CatalogResult<Json<BrandResponse>> {
    let brand = service.update_brand(id, input, actor_ref(&actor)).await?;
    Ok(Json(brand.into()))
}

/// Partially update a brand
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = BRANDS_TAG,
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body = UpdateBrand,
    responses(
        (status = 200, description = "Brand updated successfully", body = BrandResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn patch_brand(
    State(service): State<Arc<BrandService>>,
    actor: Option<Extension<AuthUser>>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UpdateBrand>,
) -> CatalogResult<Json<BrandResponse>> {
    let brand = service.update_brand(id, input, actor_ref(&actor)).await?;
    Ok(Json(brand.into()))
}

/// Delete a brand.
///
/// Fails with 409 while any product still references the brand.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = BRANDS_TAG,
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 204, description = "Brand deleted successfully"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_brand(
    State(service): State<Arc<BrandService>>,
    actor: Option<Extension<AuthUser>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> CatalogResult<impl IntoResponse> {
    let actor = actor_ref(&actor);
    service.delete_brand(id, actor).await?;

    AuditEvent::new(
        actor.map(|u| u.id.to_string()),
        "brand.delete",
        Some(format!("brand:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(StatusCode::NO_CONTENT)
}
