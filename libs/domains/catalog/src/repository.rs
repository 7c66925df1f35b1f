use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Brand, BrandFilter, Product, ProductFilter};

/// Repository trait for Brand persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    /// Create a new brand
    async fn create(&self, brand: Brand) -> CatalogResult<Brand>;

    /// Get a brand by ID
    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>>;

    /// List brands ordered by name
    async fn list(&self, filter: BrandFilter) -> CatalogResult<Vec<Brand>>;

    /// Update an existing brand
    async fn update(&self, brand: Brand) -> CatalogResult<Brand>;

    /// Delete a brand by ID.
    ///
    /// Fails with [`CatalogError::BrandInUse`] while any product still
    /// references the brand. Returns false if the brand does not exist.
    async fn delete(&self, id: Uuid) -> CatalogResult<bool>;

    /// Check whether a brand exists
    async fn exists(&self, id: Uuid) -> CatalogResult<bool>;
}

/// Repository trait for Product persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product
    async fn create(&self, product: Product) -> CatalogResult<Product>;

    /// Get a product by sku
    async fn get_by_sku(&self, sku: &str) -> CatalogResult<Option<Product>>;

    /// List products ordered by sku
    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    /// Update an existing product
    async fn update(&self, product: Product) -> CatalogResult<Product>;

    /// Delete a product by sku. Returns false if it does not exist.
    async fn delete(&self, sku: &str) -> CatalogResult<bool>;

    /// Atomically add 1 to the product's visit counter.
    ///
    /// Single UPDATE statement, no read-modify-write. Returns false if
    /// the product does not exist.
    async fn increment_visits(&self, sku: &str) -> CatalogResult<bool>;
}

#[derive(Debug, Default)]
struct StoreInner {
    brands: HashMap<Uuid, Brand>,
    products: HashMap<String, Product>,
}

/// Shared in-memory catalog store (for development/testing).
///
/// Brands and products live in one store so the brand foreign key and
/// protect-on-delete semantics hold without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brands(&self) -> InMemoryBrandRepository {
        InMemoryBrandRepository {
            store: self.clone(),
        }
    }

    pub fn products(&self) -> InMemoryProductRepository {
        InMemoryProductRepository {
            store: self.clone(),
        }
    }
}

/// In-memory implementation of BrandRepository
#[derive(Debug, Clone)]
pub struct InMemoryBrandRepository {
    store: InMemoryStore,
}

#[async_trait]
impl BrandRepository for InMemoryBrandRepository {
    async fn create(&self, brand: Brand) -> CatalogResult<Brand> {
        let mut inner = self.store.inner.write().await;
        inner.brands.insert(brand.id, brand.clone());
        tracing::info!(brand_id = %brand.id, name = %brand.name, "Created brand");
        Ok(brand)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Brand>> {
        let inner = self.store.inner.read().await;
        Ok(inner.brands.get(&id).cloned())
    }

    async fn list(&self, filter: BrandFilter) -> CatalogResult<Vec<Brand>> {
        let inner = self.store.inner.read().await;
        let mut brands: Vec<Brand> = inner.brands.values().cloned().collect();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn update(&self, brand: Brand) -> CatalogResult<Brand> {
        let mut inner = self.store.inner.write().await;
        if !inner.brands.contains_key(&brand.id) {
            return Err(CatalogError::BrandNotFound(brand.id));
        }
        inner.brands.insert(brand.id, brand.clone());
        tracing::info!(brand_id = %brand.id, "Updated brand");
        Ok(brand)
    }

    async fn delete(&self, id: Uuid) -> CatalogResult<bool> {
        let mut inner = self.store.inner.write().await;

        if inner.products.values().any(|p| p.brand_id == id) {
            return Err(CatalogError::BrandInUse(id));
        }

        let removed = inner.brands.remove(&id).is_some();
        if removed {
            tracing::info!(brand_id = %id, "Deleted brand");
        }
        Ok(removed)
    }

    async fn exists(&self, id: Uuid) -> CatalogResult<bool> {
        let inner = self.store.inner.read().await;
        Ok(inner.brands.contains_key(&id))
    }
}

/// In-memory implementation of ProductRepository
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    store: InMemoryStore,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> CatalogResult<Product> {
        let mut inner = self.store.inner.write().await;

        if inner.products.contains_key(&product.sku) {
            return Err(CatalogError::DuplicateSku(product.sku));
        }

        inner.products.insert(product.sku.clone(), product.clone());
        tracing::info!(sku = %product.sku, name = %product.name, "Created product");
        Ok(product)
    }

    async fn get_by_sku(&self, sku: &str) -> CatalogResult<Option<Product>> {
        let inner = self.store.inner.read().await;
        Ok(inner.products.get(sku).cloned())
    }

    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let inner = self.store.inner.read().await;
        let mut products: Vec<Product> = inner.products.values().cloned().collect();
        products.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(products
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    async fn update(&self, product: Product) -> CatalogResult<Product> {
        let mut inner = self.store.inner.write().await;
        if !inner.products.contains_key(&product.sku) {
            return Err(CatalogError::ProductNotFound(product.sku));
        }
        inner.products.insert(product.sku.clone(), product.clone());
        tracing::info!(sku = %product.sku, "Updated product");
        Ok(product)
    }

    async fn delete(&self, sku: &str) -> CatalogResult<bool> {
        let mut inner = self.store.inner.write().await;
        let removed = inner.products.remove(sku).is_some();
        if removed {
            tracing::info!(sku = %sku, "Deleted product");
        }
        Ok(removed)
    }

    async fn increment_visits(&self, sku: &str) -> CatalogResult<bool> {
        let mut inner = self.store.inner.write().await;
        match inner.products.get_mut(sku) {
            Some(product) => {
                product.visits += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn sample_brand(name: &str) -> Brand {
        Brand::new(name.to_string())
    }

    fn sample_product(sku: &str, brand_id: Uuid) -> Product {
        Product {
            sku: sku.to_string(),
            name: format!("Product {}", sku),
            price: Decimal::from_str("20.00").unwrap(),
            brand_id,
            visits: 0,
        }
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let store = InMemoryStore::new();
        let brands = store.brands();
        let products = store.products();

        let brand = brands.create(sample_brand("Acme")).await.unwrap();
        products
            .create(sample_product("AB123", brand.id))
            .await
            .unwrap();

        let result = products.create(sample_product("AB123", brand.id)).await;
        assert!(matches!(result, Err(CatalogError::DuplicateSku(_))));
    }

    #[tokio::test]
    async fn test_brand_with_products_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let brands = store.brands();
        let products = store.products();

        let brand = brands.create(sample_brand("Acme")).await.unwrap();
        products
            .create(sample_product("AB123", brand.id))
            .await
            .unwrap();

        let result = brands.delete(brand.id).await;
        assert!(matches!(result, Err(CatalogError::BrandInUse(_))));

        // Remove the referencing product, then deletion succeeds
        products.delete("AB123").await.unwrap();
        assert!(brands.delete(brand.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_increment_visits() {
        let store = InMemoryStore::new();
        let brands = store.brands();
        let products = store.products();

        let brand = brands.create(sample_brand("Acme")).await.unwrap();
        products
            .create(sample_product("AB123", brand.id))
            .await
            .unwrap();

        assert!(products.increment_visits("AB123").await.unwrap());
        assert!(products.increment_visits("AB123").await.unwrap());

        let product = products.get_by_sku("AB123").await.unwrap().unwrap();
        assert_eq!(product.visits, 2);

        assert!(!products.increment_visits("MISSING").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_products_ordered_by_sku() {
        let store = InMemoryStore::new();
        let brands = store.brands();
        let products = store.products();

        let brand = brands.create(sample_brand("Acme")).await.unwrap();
        for sku in ["CC3", "AA1", "BB2"] {
            products.create(sample_product(sku, brand.id)).await.unwrap();
        }

        let listed = products.list(ProductFilter::default()).await.unwrap();
        let skus: Vec<_> = listed.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["AA1", "BB2", "CC3"]);
    }
}
