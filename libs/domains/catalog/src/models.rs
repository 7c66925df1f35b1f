use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::CatalogError;

/// Brand entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
}

impl Brand {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
        }
    }
}

/// Product entity
///
/// The `visits` counter only moves through the anonymous-retrieve side
/// effect; it is never writable through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Stock keeping unit, the primary key
    pub sku: String,
    pub name: String,
    #[schema(value_type = String, example = "20.00")]
    pub price: Decimal,
    pub brand_id: Uuid,
    pub visits: i32,
}

/// Hyperlinked brand representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandResponse {
    /// Self link
    pub url: String,
    pub id: Uuid,
    pub name: String,
}

impl From<Brand> for BrandResponse {
    fn from(brand: Brand) -> Self {
        Self {
            url: brand_url(brand.id),
            id: brand.id,
            name: brand.name,
        }
    }
}

/// Hyperlinked product representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    /// Self link
    pub url: String,
    pub sku: String,
    pub name: String,
    #[schema(value_type = String, example = "20.00")]
    pub price: Decimal,
    /// Link to the product's brand
    pub brand: String,
    /// Times this product was retrieved anonymously (read only)
    pub visits: i32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            url: product_url(&product.sku),
            sku: product.sku,
            name: product.name,
            price: product.price,
            brand: brand_url(product.brand_id),
            visits: product.visits,
        }
    }
}

pub fn brand_url(id: Uuid) -> String {
    format!("/api/brands/{}", id)
}

pub fn product_url(sku: &str) -> String {
    format!("/api/products/{}", sku)
}

/// Parse a brand reference from a write payload.
///
/// Accepts either a hyperlink (`/api/brands/{id}`, with or without a
/// trailing slash) or a bare UUID.
pub fn parse_brand_ref(reference: &str) -> Result<Uuid, CatalogError> {
    let segment = reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(reference);

    Uuid::parse_str(segment)
        .map_err(|_| CatalogError::Validation(format!("Invalid brand reference: {}", reference)))
}

/// Price must fit NUMERIC(14,2): at most 2 decimal places, at most 12
/// integer digits, not negative.
fn validate_price(price: &Decimal) -> Result<(), validator::ValidationError> {
    if price.is_sign_negative() {
        return Err(validator::ValidationError::new("price_negative"));
    }
    if price.scale() > 2 {
        return Err(validator::ValidationError::new("price_scale"));
    }
    if price.trunc().mantissa().abs() >= 1_000_000_000_000 {
        return Err(validator::ValidationError::new("price_too_large"));
    }
    Ok(())
}

/// DTO for creating a brand
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBrand {
    #[validate(length(min = 1, max = 12))]
    pub name: String,
}

/// DTO for updating a brand
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBrand {
    #[validate(length(min = 1, max = 12))]
    pub name: Option<String>,
}

/// DTO for creating a product. `visits` is not accepted.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 8))]
    pub sku: String,
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "20.00")]
    pub price: Decimal,
    /// Brand hyperlink or bare UUID
    pub brand: String,
}

/// DTO for updating a product. `visits` is not accepted.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 32))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>, example = "20.00")]
    pub price: Option<Decimal>,
    /// Brand hyperlink or bare UUID
    pub brand: Option<String>,
}

/// Query filters for listing products
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

/// Query filters for listing brands
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct BrandFilter {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Default for BrandFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}
