//! Handler tests for the catalog domain.
//!
//! These drive the routers through tower's oneshot with the auth
//! middleware layered on, so visit counting, write gating, and the
//! admin notification path are exercised exactly as over HTTP.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{middleware, Router};
use axum_helpers::auth::{
    optional_jwt_auth_middleware, AuthUser, JwtAuth, JwtConfig, StaticPolicy,
};
use domain_catalog::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

const TEST_SECRET: &str = "test-secret-value-at-least-32-chars-long";

struct RecordingNotifier {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn product_modified(&self, _product_name: &str, _actor: &AuthUser) -> eyre::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(eyre::eyre!("relay refused the message"))
        } else {
            Ok(())
        }
    }
}

struct TestApp {
    router: Router,
    jwt: JwtAuth,
    notifier: Arc<RecordingNotifier>,
    brand_id: Uuid,
}

impl TestApp {
    /// In-memory app with one brand and one product (sku AB123, visits 0).
    async fn seeded(notifier_fails: bool) -> Self {
        let store = InMemoryStore::new();
        let brands: Arc<dyn BrandRepository> = Arc::new(store.brands());
        let products: Arc<dyn ProductRepository> = Arc::new(store.products());
        let policy = Arc::new(StaticPolicy::new(ADMIN_GROUP));
        let notifier = Arc::new(RecordingNotifier::new(notifier_fails));

        let brand = brands
            .create(Brand::new("Acme".to_string()))
            .await
            .unwrap();
        products
            .create(Product {
                sku: "AB123".to_string(),
                name: "Widget".to_string(),
                price: "20.00".parse().unwrap(),
                brand_id: brand.id,
                visits: 0,
            })
            .await
            .unwrap();

        let product_service = Arc::new(ProductService::new(
            products,
            brands.clone(),
            policy.clone(),
            notifier.clone(),
        ));
        let brand_service = Arc::new(BrandService::new(brands, policy));

        let jwt = JwtAuth::new(&JwtConfig::new(TEST_SECRET.to_string()));

        let router = Router::new()
            .nest("/products", products_router(product_service))
            .nest("/brands", brands_router(brand_service))
            .layer(middleware::from_fn_with_state(
                jwt.clone(),
                optional_jwt_auth_middleware,
            ));

        Self {
            router,
            jwt,
            notifier,
            brand_id: brand.id,
        }
    }

    fn token(&self, groups: &[&str]) -> String {
        let groups: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
        self.jwt
            .create_access_token(
                &Uuid::new_v4().to_string(),
                "tester@example.com",
                "Tester",
                &groups,
            )
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn write(
        &self,
        method: &str,
        uri: &str,
        payload: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(
            builder
                .body(Body::from(serde_json::to_string(&payload).unwrap()))
                .unwrap(),
        )
        .await
    }

    async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

#[tokio::test]
async fn test_anonymous_get_counts_visits() {
    let app = TestApp::seeded(false).await;

    let (status, body) = app.get("/products/AB123", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visits"], 1);

    let (_, body) = app.get("/products/AB123", None).await;
    assert_eq!(body["visits"], 2);
}

#[tokio::test]
async fn test_authenticated_get_does_not_count_visits() {
    let app = TestApp::seeded(false).await;

    let admin = app.token(&[ADMIN_GROUP]);
    let (status, body) = app.get("/products/AB123", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visits"], 0);

    let user = app.token(&[]);
    let (_, body) = app.get("/products/AB123", Some(&user)).await;
    assert_eq!(body["visits"], 0);
}

#[tokio::test]
async fn test_product_response_is_hyperlinked() {
    let app = TestApp::seeded(false).await;

    let (_, body) = app.get("/products/AB123", None).await;
    assert_eq!(body["url"], "/api/products/AB123");
    assert_eq!(body["brand"], format!("/api/brands/{}", app.brand_id));
    assert_eq!(body["price"], "20.00");

    let (_, body) = app
        .get(&format!("/brands/{}", app.brand_id), None)
        .await;
    assert_eq!(body["url"], format!("/api/brands/{}", app.brand_id));
    assert_eq!(body["name"], "Acme");
}

#[tokio::test]
async fn test_anonymous_writes_are_forbidden() {
    let app = TestApp::seeded(false).await;

    let (status, _) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "XY9",
                "name": "Gadget",
                "price": "5.00",
                "brand": app.brand_id.to_string()
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .write("PUT", "/products/AB123", json!({ "name": "Gadget" }), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete("/products/AB123", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .write("POST", "/brands", json!({ "name": "Globex" }), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_admin_writes_are_forbidden() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&["staff"]);

    let (status, _) = app
        .write(
            "PATCH",
            "/products/AB123",
            json!({ "name": "Gadget" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads still work for the same token
    let (status, _) = app.get("/products/AB123", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_full_crud_on_products() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&[ADMIN_GROUP]);

    let (status, body) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "XY9",
                "name": "Gadget",
                "price": "5.00",
                "brand": format!("/api/brands/{}", app.brand_id)
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sku"], "XY9");
    assert_eq!(body["visits"], 0);

    let (status, body) = app
        .write(
            "PUT",
            "/products/XY9",
            json!({ "price": "6.50" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], "6.50");
    // Fields absent from the payload keep their stored values
    assert_eq!(body["name"], "Gadget");

    let (status, _) = app.delete("/products/XY9", Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/products/XY9", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_update_sends_one_notification() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&[ADMIN_GROUP]);

    let (status, _) = app
        .write(
            "PUT",
            "/products/AB123",
            json!({ "name": "Gadget" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.notifier.calls.load(Ordering::SeqCst), 1);

    // Create and delete do not notify
    let (_, _) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "XY9",
                "name": "Gadget",
                "price": "5.00",
                "brand": app.brand_id.to_string()
            }),
            Some(&token),
        )
        .await;
    let (_, _) = app.delete("/products/XY9", Some(&token)).await;
    assert_eq!(app.notifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_notification_failure_aborts_update_with_500() {
    let app = TestApp::seeded(true).await;
    let token = app.token(&[ADMIN_GROUP]);

    let (status, body) = app
        .write(
            "PUT",
            "/products/AB123",
            json!({ "name": "Gadget" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Notification delivery failed"));

    // The update was not applied
    let (_, body) = app.get("/products/AB123", Some(&token)).await;
    assert_eq!(body["name"], "Widget");
}

#[tokio::test]
async fn test_visits_cannot_be_set_through_payloads() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&[ADMIN_GROUP]);

    // An anonymous visit, then an admin update smuggling a visits field
    let (_, _) = app.get("/products/AB123", None).await;
    let (status, body) = app
        .write(
            "PUT",
            "/products/AB123",
            json!({ "name": "Gadget", "visits": 999 }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visits"], 1);

    let (status, body) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "XY9",
                "name": "Gadget",
                "price": "5.00",
                "brand": app.brand_id.to_string(),
                "visits": 999
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["visits"], 0);
}

#[tokio::test]
async fn test_brand_delete_protected_while_referenced() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&[ADMIN_GROUP]);

    let (status, _) = app
        .delete(&format!("/brands/{}", app.brand_id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.delete("/products/AB123", Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .delete(&format!("/brands/{}", app.brand_id), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_create_product_with_unknown_brand_is_400() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&[ADMIN_GROUP]);

    let (status, _) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "XY9",
                "name": "Orphan",
                "price": "5.00",
                "brand": Uuid::new_v4().to_string()
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_product_validation_errors() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&[ADMIN_GROUP]);

    // Sku too long (max 8)
    let (status, _) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "WAY-TOO-LONG-SKU",
                "name": "Gadget",
                "price": "5.00",
                "brand": app.brand_id.to_string()
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Negative price
    let (status, _) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "XY9",
                "name": "Gadget",
                "price": "-1.00",
                "brand": app.brand_id.to_string()
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // More than two decimal places
    let (status, _) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "XY9",
                "name": "Gadget",
                "price": "5.001",
                "brand": app.brand_id.to_string()
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_sku_is_conflict() {
    let app = TestApp::seeded(false).await;
    let token = app.token(&[ADMIN_GROUP]);

    let (status, _) = app
        .write(
            "POST",
            "/products",
            json!({
                "sku": "AB123",
                "name": "Impostor",
                "price": "1.00",
                "brand": app.brand_id.to_string()
            }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_products_and_brands() {
    let app = TestApp::seeded(false).await;

    let (status, body) = app.get("/products/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["sku"], "AB123");

    let (status, body) = app.get("/brands/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Acme");
}

#[tokio::test]
async fn test_invalid_token_is_treated_as_anonymous() {
    let app = TestApp::seeded(false).await;

    // Garbage token: the request goes through unauthenticated, so the
    // read counts a visit and writes are forbidden.
    let (status, body) = app.get("/products/AB123", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visits"], 1);

    let (status, _) = app
        .write(
            "PUT",
            "/products/AB123",
            json!({ "name": "Gadget" }),
            Some("not-a-jwt"),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
