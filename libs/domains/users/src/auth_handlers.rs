//! Login and current-user endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::audit::{extract_ip_from_headers, extract_user_agent, AuditEvent, AuditOutcome};
use axum_helpers::auth::{JwtAuth, ACCESS_TOKEN_TTL};
use axum_helpers::errors::AppError;
use axum_helpers::extractors::{CurrentUser, ValidatedJson};
use utoipa::OpenApi;

use crate::models::{LoginRequest, LoginResponse, UserResponse};
use crate::service::UserService;

#[derive(Clone)]
pub struct AuthState {
    pub service: UserService,
    pub jwt: JwtAuth,
}

/// OpenAPI documentation for the auth endpoints
#[derive(OpenApi)]
#[openapi(
    paths(login, me),
    components(schemas(LoginRequest, LoginResponse, UserResponse)),
    tags(
        (name = "auth", description = "Authentication endpoints")
    )
)]
pub struct AuthApiDoc;

/// Creates the auth router with state applied.
pub fn auth_router(service: UserService, jwt: JwtAuth) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .with_state(AuthState { service, jwt })
}

/// Authenticate with email and password.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 400, description = "Validation error")
    )
)]
async fn login(
    State(state): State<AuthState>,
    headers: axum::http::HeaderMap,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = match state
        .service
        .verify_credentials(&payload.email, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            AuditEvent::new(None, "user.login", None, AuditOutcome::Failure)
                .with_ip(extract_ip_from_headers(&headers))
                .with_user_agent(extract_user_agent(&headers))
                .with_details(serde_json::json!({ "email": payload.email }))
                .log();
            return Err(e.into());
        }
    };

    let access_token = state
        .jwt
        .create_access_token(&user.id.to_string(), &user.email, &user.name, &user.groups)
        .map_err(|e| AppError::InternalServerError(format!("Failed to mint token: {}", e)))?;

    AuditEvent::new(
        Some(user.id.to_string()),
        "user.login",
        None,
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_TTL,
        user: user.into(),
    }))
}

/// Account of the authenticated caller.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Authentication required")
    )
)]
async fn me(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let response = state.service.get_user(user.id).await?;
    Ok(Json(response))
}
