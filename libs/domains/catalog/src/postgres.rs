//! PostgreSQL implementations of the catalog repositories.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Brand, BrandFilter, Product, ProductFilter};
use crate::repository::{BrandRepository, ProductRepository};

pub struct PgBrandRepository {
    db: DatabaseConnection,
}

impl PgBrandRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BrandRepository for PgBrandRepository {
    async fn create(&self, brand: Brand) -> CatalogResult<Brand> {
        let active_model: entity::brand::ActiveModel = brand.into();
        let model = entity::brand::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await?;

        tracing::info!(brand_id = %model.id, "Created brand");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>> {
        let model = entity::brand::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, filter: BrandFilter) -> CatalogResult<Vec<Brand>> {
        let models = entity::brand::Entity::find()
            .order_by_asc(entity::brand::Column::Name)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, brand: Brand) -> CatalogResult<Brand> {
        let id = brand.id;
        let active_model: entity::brand::ActiveModel = brand.into();
        let model = entity::brand::Entity::update(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotFound(_) => CatalogError::BrandNotFound(id),
                other => CatalogError::Database(other),
            })?;

        tracing::info!(brand_id = %id, "Updated brand");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        // Explicit check; the FK's ON DELETE RESTRICT is the backstop
        let referencing = entity::product::Entity::find()
            .filter(entity::product::Column::BrandId.eq(id))
            .count(&self.db)
            .await?;

        if referencing > 0 {
            return Err(CatalogError::BrandInUse(id));
        }

        let result = entity::brand::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                if e.to_string().contains("foreign key") {
                    CatalogError::BrandInUse(id)
                } else {
                    CatalogError::Database(e)
                }
            })?;

        if result.rows_affected > 0 {
            tracing::info!(brand_id = %id, "Deleted brand");
        }
        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, id: Uuid) -> CatalogResult<bool> {
        let count = entity::brand::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }
}

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: Product) -> CatalogResult<Product> {
        let sku = product.sku.clone();
        let active_model: entity::product::ActiveModel = product.into();

        let model = entity::product::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("duplicate key") || err_str.contains("unique constraint") {
                    CatalogError::DuplicateSku(sku.clone())
                } else {
                    CatalogError::Database(e)
                }
            })?;

        tracing::info!(sku = %model.sku, "Created product");
        Ok(model.into())
    }

    async fn get_by_sku(&self, sku: &str) -> CatalogResult<Option<Product>> {
        let model = entity::product::Entity::find_by_id(sku.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let models = entity::product::Entity::find()
            .order_by_asc(entity::product::Column::Sku)
            .limit(filter.limit as u64)
            .offset(filter.offset as u64)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let sku = product.sku.clone();

        // visits stays out of the SET list so the counter is never
        // clobbered by a concurrent anonymous retrieve
        let active_model = entity::product::ActiveModel {
            sku: Set(product.sku),
            name: Set(product.name),
            price: Set(product.price),
            brand_id: Set(product.brand_id),
            ..Default::default()
        };

        let model = entity::product::Entity::update(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotFound(_) => CatalogError::ProductNotFound(sku.clone()),
                other => CatalogError::Database(other),
            })?;

        tracing::info!(sku = %model.sku, "Updated product");
        Ok(model.into())
    }

    async fn delete(&self, sku: &str) -> CatalogResult<bool> {
        let result = entity::product::Entity::delete_by_id(sku.to_string())
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(sku = %sku, "Deleted product");
        }
        Ok(result.rows_affected > 0)
    }

    async fn increment_visits(&self, sku: &str) -> CatalogResult<bool> {
        // Single atomic UPDATE, immune to lost updates under concurrency
        let result = entity::product::Entity::update_many()
            .col_expr(
                entity::product::Column::Visits,
                Expr::col(entity::product::Column::Visits).add(1),
            )
            .filter(entity::product::Column::Sku.eq(sku))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
