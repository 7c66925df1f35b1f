//! Product catalog domain.
//!
//! Products and brands with hyperlinked representations, anonymous visit
//! counting, group-gated writes, and admin peer notification on product
//! updates.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use handlers::{brands_router, products_router, BrandsApiDoc, ProductsApiDoc};
pub use models::{
    brand_url, parse_brand_ref, product_url, Brand, BrandFilter, BrandResponse, CreateBrand,
    CreateProduct, Product, ProductFilter, ProductResponse, UpdateBrand, UpdateProduct,
};
pub use postgres::{PgBrandRepository, PgProductRepository};
pub use repository::{
    BrandRepository, InMemoryBrandRepository, InMemoryProductRepository, InMemoryStore,
    ProductRepository,
};
pub use service::{
    permissions, BrandService, ChangeNotifier, NoopNotifier, ProductService, ADMIN_GROUP,
};
