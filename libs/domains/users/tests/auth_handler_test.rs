//! Handler tests for the auth endpoints.
//!
//! These drive the auth router through tower's oneshot with the
//! optional JWT middleware layered on, matching production wiring.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{middleware, Router};
use axum_helpers::auth::{optional_jwt_auth_middleware, JwtAuth, JwtConfig};
use domain_users::{auth_router, CreateUser, InMemoryUserRepository, UserService};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const TEST_SECRET: &str = "test-secret-value-at-least-32-chars-long";

struct TestApp {
    router: Router,
}

impl TestApp {
    /// App with one registered user (ada@example.com, in the admin group).
    async fn seeded() -> Self {
        let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
        service
            .create_user(CreateUser {
                email: "ada@example.com".to_string(),
                name: "Ada Lovelace".to_string(),
                password: "correct horse battery".to_string(),
                groups: vec!["admin".to_string()],
            })
            .await
            .unwrap();

        let jwt = JwtAuth::new(&JwtConfig::new(TEST_SECRET));
        let router = auth_router(service, jwt.clone()).layer(middleware::from_fn_with_state(
            jwt,
            optional_jwt_auth_middleware,
        ));

        Self { router }
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
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

    async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap();
        self.request(request).await
    }
}

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let app = TestApp::seeded().await;

    let (status, body) = app.login("ada@example.com", "correct horse battery").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].as_str().unwrap().contains('.'));
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["groups"][0], "admin");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = TestApp::seeded().await;

    let (status, _) = app.login("ada@example.com", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_unknown_email_is_unauthorized() {
    let app = TestApp::seeded().await;

    let (status, _) = app.login("nobody@example.com", "whatever").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_the_authenticated_caller() {
    let app = TestApp::seeded().await;

    let (_, login_body) = app.login("ada@example.com", "correct horse battery").await;
    let token = login_body["access_token"].as_str().unwrap();

    let request = Request::builder()
        .uri("/auth/me")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.request(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let app = TestApp::seeded().await;

    let request = Request::builder()
        .uri("/auth/me")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.request(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_garbage_token_is_unauthorized() {
    let app = TestApp::seeded().await;

    let request = Request::builder()
        .uri("/auth/me")
        .header("authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.request(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
