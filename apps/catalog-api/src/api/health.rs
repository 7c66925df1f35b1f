//! Readiness endpoint

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_helpers::server::{run_health_checks, HealthCheckFuture};
use domain_notifications::AdminNotifier;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
struct ReadyState {
    db: DatabaseConnection,
    notifier: Arc<AdminNotifier>,
}

/// Router for `/ready`, checking the database and the email provider.
pub fn ready_router(db: DatabaseConnection, notifier: Arc<AdminNotifier>) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(ReadyState { db, notifier })
}

async fn ready(State(state): State<ReadyState>) -> Response {
    let db = state.db.clone();
    let notifier = state.notifier.clone();

    let checks = vec![
        (
            "database",
            Box::pin(async move {
                database::postgres::check_health(&db)
                    .await
                    .map_err(|e| e.to_string())
            }) as HealthCheckFuture,
        ),
        (
            "email",
            Box::pin(async move {
                match notifier.health_check().await {
                    Ok(true) => Ok(()),
                    Ok(false) => Err("provider reports unhealthy".to_string()),
                    Err(e) => Err(e.to_string()),
                }
            }) as HealthCheckFuture,
        ),
    ];

    match run_health_checks(checks).await {
        Ok(response) => response.into_response(),
        Err(response) => response.into_response(),
    }
}
