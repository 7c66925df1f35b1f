//! API routes module

pub mod health;

use axum::{middleware, Router};
use axum_helpers::auth::{optional_jwt_auth_middleware, AccessPolicy, JwtAuth};
use domain_catalog::{
    brands_router, products_router, BrandRepository, BrandService, PgBrandRepository,
    PgProductRepository, ProductRepository, ProductService,
};
use domain_notifications::AdminNotifier;
use domain_users::{
    auth_router, GroupPolicy, GroupRepository, PostgresGroupRepository, PostgresUserRepository,
    UserRepository, UserService,
};
use std::sync::Arc;

use crate::notify::AdminChangeNotifier;
use crate::state::AppState;

/// Create all API routes.
///
/// The auth middleware is optional: requests without a valid token go
/// through anonymously, and each handler decides what anonymity means
/// (reads count visits, writes are rejected by the access policy).
pub fn routes(state: &AppState, notifier: Arc<AdminNotifier>) -> Router {
    let brands: Arc<dyn BrandRepository> = Arc::new(PgBrandRepository::new(state.db.clone()));
    let products: Arc<dyn ProductRepository> =
        Arc::new(PgProductRepository::new(state.db.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(state.db.clone()));
    let groups: Arc<dyn GroupRepository> =
        Arc::new(PostgresGroupRepository::new(state.db.clone()));

    let policy: Arc<dyn AccessPolicy> = Arc::new(GroupPolicy::new(groups));
    let change_notifier = Arc::new(AdminChangeNotifier::new(notifier));

    let product_service = Arc::new(ProductService::new(
        products,
        brands.clone(),
        policy.clone(),
        change_notifier,
    ));
    let brand_service = Arc::new(BrandService::new(brands, policy));
    let user_service = UserService::new(users);

    let jwt = JwtAuth::new(&state.config.jwt);

    Router::new()
        .nest("/products", products_router(product_service))
        .nest("/brands", brands_router(brand_service))
        .merge(auth_router(user_service, jwt.clone()))
        .layer(middleware::from_fn_with_state(
            jwt,
            optional_jwt_auth_middleware,
        ))
}
