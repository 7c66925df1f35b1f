use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use axum_helpers::auth::{AccessPolicy, AuthUser};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    parse_brand_ref, Brand, BrandFilter, CreateBrand, CreateProduct, Product, ProductFilter,
    UpdateBrand, UpdateProduct,
};
use crate::repository::{BrandRepository, ProductRepository};

/// Group whose membership triggers peer notifications on product updates
pub const ADMIN_GROUP: &str = "admin";

/// Permission codenames, `<resource>.<action>`
pub mod permissions {
    pub const PRODUCTS_VIEW: &str = "products.view";
    pub const PRODUCTS_ADD: &str = "products.add";
    pub const PRODUCTS_CHANGE: &str = "products.change";
    pub const PRODUCTS_DELETE: &str = "products.delete";
    pub const BRANDS_VIEW: &str = "brands.view";
    pub const BRANDS_ADD: &str = "brands.add";
    pub const BRANDS_CHANGE: &str = "brands.change";
    pub const BRANDS_DELETE: &str = "brands.delete";

    /// All catalog permissions, in provisioning order
    pub const ALL: [&str; 8] = [
        PRODUCTS_VIEW,
        PRODUCTS_ADD,
        PRODUCTS_CHANGE,
        PRODUCTS_DELETE,
        BRANDS_VIEW,
        BRANDS_ADD,
        BRANDS_CHANGE,
        BRANDS_DELETE,
    ];
}

/// Outbound notification seam.
///
/// The service only knows that a product was modified by someone; what
/// an implementation does with that (SMTP, log, nothing) is wired up by
/// the application.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn product_modified(&self, product_name: &str, actor: &AuthUser) -> eyre::Result<()>;
}

/// Notifier that drops every event. Used where notifications are not
/// configured.
pub struct NoopNotifier;

#[async_trait]
impl ChangeNotifier for NoopNotifier {
    async fn product_modified(&self, _product_name: &str, _actor: &AuthUser) -> eyre::Result<()> {
        Ok(())
    }
}

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    brands: Arc<dyn BrandRepository>,
    policy: Arc<dyn AccessPolicy>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl ProductService {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        brands: Arc<dyn BrandRepository>,
        policy: Arc<dyn AccessPolicy>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            repository,
            brands,
            policy,
            notifier,
        }
    }

    async fn check(&self, actor: Option<&AuthUser>, permission: &str) -> CatalogResult<()> {
        let allowed = self
            .policy
            .allows(actor, permission)
            .await
            .map_err(|e| CatalogError::Internal(format!("Policy evaluation failed: {}", e)))?;

        if allowed {
            Ok(())
        } else {
            Err(CatalogError::Forbidden(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }

    /// Resolve a brand reference (URL or UUID) to an existing brand id.
    async fn resolve_brand(&self, reference: &str) -> CatalogResult<Uuid> {
        let id = parse_brand_ref(reference)?;

        if !self.brands.exists(id).await? {
            return Err(CatalogError::Validation(format!("Unknown brand: {}", id)));
        }

        Ok(id)
    }

    /// List products, public
    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        self.repository.list(filter).await
    }

    /// Retrieve a single product.
    ///
    /// Anonymous retrieval counts as a visit: the counter is bumped
    /// atomically before the representation is read, so the response
    /// already reflects this request. Authenticated callers, admin or
    /// not, never move the counter.
    pub async fn retrieve_product(
        &self,
        sku: &str,
        actor: Option<&AuthUser>,
    ) -> CatalogResult<Product> {
        if actor.is_none() {
            let bumped = self.repository.increment_visits(sku).await?;
            if !bumped {
                return Err(CatalogError::ProductNotFound(sku.to_string()));
            }
        }

        self.repository
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(sku.to_string()))
    }

    /// Create a product (requires products.add)
    pub async fn create_product(
        &self,
        input: CreateProduct,
        actor: Option<&AuthUser>,
    ) -> CatalogResult<Product> {
        self.check(actor, permissions::PRODUCTS_ADD).await?;

        let brand_id = self.resolve_brand(&input.brand).await?;

        let product = Product {
            sku: input.sku,
            name: input.name,
            price: input.price,
            brand_id,
            visits: 0,
        };

        self.repository.create(product).await
    }

    /// Update a product (requires products.change).
    ///
    /// When the actor belongs to the admin group, the other admins are
    /// notified before the update is applied; a delivery failure aborts
    /// the update.
    pub async fn update_product(
        &self,
        sku: &str,
        input: UpdateProduct,
        actor: Option<&AuthUser>,
    ) -> CatalogResult<Product> {
        self.check(actor, permissions::PRODUCTS_CHANGE).await?;

        let mut product = self
            .repository
            .get_by_sku(sku)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(sku.to_string()))?;

        if let Some(actor) = actor {
            if actor.in_group(ADMIN_GROUP) {
                self.notifier
                    .product_modified(&product.name, actor)
                    .await
                    .map_err(|e| CatalogError::Notification(e.to_string()))?;
            }
        }

        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(ref brand) = input.brand {
            product.brand_id = self.resolve_brand(brand).await?;
        }

        self.repository.update(product).await
    }

    /// Delete a product (requires products.delete)
    pub async fn delete_product(&self, sku: &str, actor: Option<&AuthUser>) -> CatalogResult<()> {
        self.check(actor, permissions::PRODUCTS_DELETE).await?;

        let deleted = self.repository.delete(sku).await?;
        if !deleted {
            return Err(CatalogError::ProductNotFound(sku.to_string()));
        }

        Ok(())
    }
}

/// Service layer for Brand business logic
#[derive(Clone)]
pub struct BrandService {
    repository: Arc<dyn BrandRepository>,
    policy: Arc<dyn AccessPolicy>,
}

impl BrandService {
    pub fn new(repository: Arc<dyn BrandRepository>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { repository, policy }
    }

    async fn check(&self, actor: Option<&AuthUser>, permission: &str) -> CatalogResult<()> {
        let allowed = self
            .policy
            .allows(actor, permission)
            .await
            .map_err(|e| CatalogError::Internal(format!("Policy evaluation failed: {}", e)))?;

        if allowed {
            Ok(())
        } else {
            Err(CatalogError::Forbidden(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }

    /// List brands, public
    pub async fn list_brands(&self, filter: BrandFilter) -> CatalogResult<Vec<Brand>> {
        self.repository.list(filter).await
    }

    /// Get a brand by ID, public
    pub async fn get_brand(&self, id: Uuid) -> CatalogResult<Brand> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::BrandNotFound(id))
    }

    /// Create a brand (requires brands.add)
    pub async fn create_brand(
        &self,
        input: CreateBrand,
        actor: Option<&AuthUser>,
    ) -> CatalogResult<Brand> {
        self.check(actor, permissions::BRANDS_ADD).await?;
        self.repository.create(Brand::new(input.name)).await
    }

    /// Update a brand (requires brands.change)
    pub async fn update_brand(
        &self,
        id: Uuid,
        input: UpdateBrand,
        actor: Option<&AuthUser>,
    ) -> CatalogResult<Brand> {
        self.check(actor, permissions::BRANDS_CHANGE).await?;

        let mut brand = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::BrandNotFound(id))?;

        if let Some(name) = input.name {
            brand.name = name;
        }

        self.repository.update(brand).await
    }

    /// Delete a brand (requires brands.delete, protected while referenced)
    pub async fn delete_brand(&self, id: Uuid, actor: Option<&AuthUser>) -> CatalogResult<()> {
        self.check(actor, permissions::BRANDS_DELETE).await?;

        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(CatalogError::BrandNotFound(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryStore, MockProductRepository};
    use axum_helpers::auth::StaticPolicy;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingNotifier {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChangeNotifier for CountingNotifier {
        async fn product_modified(
            &self,
            _product_name: &str,
            _actor: &AuthUser,
        ) -> eyre::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(eyre::eyre!("SMTP send failed"))
            } else {
                Ok(())
            }
        }
    }

    fn admin() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            groups: vec![ADMIN_GROUP.to_string()],
        }
    }

    fn plain_user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "grace@example.com".to_string(),
            name: "Grace".to_string(),
            groups: vec![],
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn service_with_notifier(
        notifier: Arc<CountingNotifier>,
    ) -> (ProductService, Uuid) {
        let store = InMemoryStore::new();
        let brands = Arc::new(store.brands());
        let products = Arc::new(store.products());
        let policy = Arc::new(StaticPolicy::new(ADMIN_GROUP));

        let brand = brands.create(Brand::new("Acme".to_string())).await.unwrap();

        let service = ProductService::new(products, brands, policy, notifier);
        (service, brand.id)
    }

    async fn seeded_service(notifier: Arc<CountingNotifier>) -> ProductService {
        let (service, brand_id) = service_with_notifier(notifier).await;
        service
            .create_product(
                CreateProduct {
                    sku: "AB123".to_string(),
                    name: "Widget".to_string(),
                    price: dec("20.00"),
                    brand: brand_id.to_string(),
                },
                Some(&admin()),
            )
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_anonymous_retrieve_increments_visits() {
        let service = seeded_service(Arc::new(CountingNotifier::new(false))).await;

        let first = service.retrieve_product("AB123", None).await.unwrap();
        assert_eq!(first.visits, 1);

        let second = service.retrieve_product("AB123", None).await.unwrap();
        assert_eq!(second.visits, 2);
    }

    #[tokio::test]
    async fn test_authenticated_retrieve_leaves_visits_alone() {
        let service = seeded_service(Arc::new(CountingNotifier::new(false))).await;

        let as_admin = service
            .retrieve_product("AB123", Some(&admin()))
            .await
            .unwrap();
        assert_eq!(as_admin.visits, 0);

        let as_user = service
            .retrieve_product("AB123", Some(&plain_user()))
            .await
            .unwrap();
        assert_eq!(as_user.visits, 0);
    }

    #[tokio::test]
    async fn test_anonymous_retrieve_unknown_sku_is_not_found() {
        let service = seeded_service(Arc::new(CountingNotifier::new(false))).await;
        let result = service.retrieve_product("MISSING", None).await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_writes_forbidden_for_anonymous_and_non_admin() {
        let service = seeded_service(Arc::new(CountingNotifier::new(false))).await;

        let update = UpdateProduct {
            name: Some("Gadget".to_string()),
            ..Default::default()
        };

        let anon = service.update_product("AB123", update.clone(), None).await;
        assert!(matches!(anon, Err(CatalogError::Forbidden(_))));

        let non_admin = service
            .update_product("AB123", update, Some(&plain_user()))
            .await;
        assert!(matches!(non_admin, Err(CatalogError::Forbidden(_))));

        let delete = service.delete_product("AB123", Some(&plain_user())).await;
        assert!(matches!(delete, Err(CatalogError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_update_notifies_once() {
        let notifier = Arc::new(CountingNotifier::new(false));
        let service = seeded_service(notifier.clone()).await;

        let updated = service
            .update_product(
                "AB123",
                UpdateProduct {
                    name: Some("Gadget".to_string()),
                    ..Default::default()
                },
                Some(&admin()),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Gadget");
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_notifier_failure_aborts_update() {
        let notifier = Arc::new(CountingNotifier::new(true));
        let service = seeded_service(notifier.clone()).await;

        let result = service
            .update_product(
                "AB123",
                UpdateProduct {
                    name: Some("Gadget".to_string()),
                    ..Default::default()
                },
                Some(&admin()),
            )
            .await;

        assert!(matches!(result, Err(CatalogError::Notification(_))));

        // Update was not applied
        let product = service
            .retrieve_product("AB123", Some(&admin()))
            .await
            .unwrap();
        assert_eq!(product.name, "Widget");
    }

    #[tokio::test]
    async fn test_create_with_unknown_brand_is_validation_error() {
        let (service, _) = service_with_notifier(Arc::new(CountingNotifier::new(false))).await;

        let result = service
            .create_product(
                CreateProduct {
                    sku: "XY9".to_string(),
                    name: "Orphan".to_string(),
                    price: dec("5.00"),
                    brand: Uuid::new_v4().to_string(),
                },
                Some(&admin()),
            )
            .await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_accepts_brand_hyperlink() {
        let (service, brand_id) =
            service_with_notifier(Arc::new(CountingNotifier::new(false))).await;
        service
            .create_product(
                CreateProduct {
                    sku: "AB123".to_string(),
                    name: "Widget".to_string(),
                    price: dec("20.00"),
                    brand: format!("/api/brands/{}", brand_id),
                },
                Some(&admin()),
            )
            .await
            .unwrap();

        let updated = service
            .update_product(
                "AB123",
                UpdateProduct {
                    brand: Some(format!("/api/brands/{}", brand_id)),
                    ..Default::default()
                },
                Some(&admin()),
            )
            .await
            .unwrap();

        assert_eq!(updated.brand_id, brand_id);
    }

    #[tokio::test]
    async fn test_policy_error_maps_to_internal() {
        struct FailingPolicy;

        #[async_trait]
        impl AccessPolicy for FailingPolicy {
            async fn allows(
                &self,
                _user: Option<&AuthUser>,
                _permission: &str,
            ) -> eyre::Result<bool> {
                Err(eyre::eyre!("group store down"))
            }
        }

        let mut products = MockProductRepository::new();
        products.expect_get_by_sku().never();

        let store = InMemoryStore::new();
        let service = ProductService::new(
            Arc::new(products),
            Arc::new(store.brands()),
            Arc::new(FailingPolicy),
            Arc::new(NoopNotifier),
        );

        let result = service
            .update_product("AB123", UpdateProduct::default(), Some(&admin()))
            .await;
        assert!(matches!(result, Err(CatalogError::Internal(_))));
    }

    #[tokio::test]
    async fn test_brand_delete_protected() {
        let notifier = Arc::new(CountingNotifier::new(false));
        let store = InMemoryStore::new();
        let brands: Arc<dyn BrandRepository> = Arc::new(store.brands());
        let products: Arc<dyn ProductRepository> = Arc::new(store.products());
        let policy = Arc::new(StaticPolicy::new(ADMIN_GROUP));

        let brand_service = BrandService::new(brands.clone(), policy.clone());
        let product_service =
            ProductService::new(products, brands, policy, notifier);

        let brand = brand_service
            .create_brand(
                CreateBrand {
                    name: "Acme".to_string(),
                },
                Some(&admin()),
            )
            .await
            .unwrap();

        product_service
            .create_product(
                CreateProduct {
                    sku: "AB123".to_string(),
                    name: "Widget".to_string(),
                    price: dec("20.00"),
                    brand: brand.id.to_string(),
                },
                Some(&admin()),
            )
            .await
            .unwrap();

        let result = brand_service.delete_brand(brand.id, Some(&admin())).await;
        assert!(matches!(result, Err(CatalogError::BrandInUse(_))));

        product_service
            .delete_product("AB123", Some(&admin()))
            .await
            .unwrap();
        brand_service
            .delete_brand(brand.id, Some(&admin()))
            .await
            .unwrap();
    }
}
