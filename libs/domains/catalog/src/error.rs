use axum::response::{IntoResponse, Response};
use axum_helpers::errors::AppError;
use thiserror::Error;
use uuid::Uuid;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Brand not found: {0}")]
    BrandNotFound(Uuid),

    #[error("Product with sku '{0}' already exists")]
    DuplicateSku(String),

    #[error("Brand {0} is referenced by existing products")]
    BrandInUse(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(sku) => {
                AppError::NotFound(format!("Product {} not found", sku))
            }
            CatalogError::BrandNotFound(id) => {
                AppError::NotFound(format!("Brand {} not found", id))
            }
            CatalogError::DuplicateSku(sku) => {
                AppError::Conflict(format!("Product with sku '{}' already exists", sku))
            }
            CatalogError::BrandInUse(id) => AppError::Conflict(format!(
                "Brand {} is referenced by existing products and cannot be deleted",
                id
            )),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Forbidden(msg) => AppError::Forbidden(msg),
            CatalogError::Notification(msg) => AppError::NotificationFailure(msg),
            CatalogError::Database(e) => AppError::Database(e),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
