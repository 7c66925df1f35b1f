use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{retry_with_backoff, DatabaseError, RetryConfig};

/// Connect to PostgreSQL with default pool settings
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect_from_config(PostgresConfig::new(database_url)).await
}

/// Connect using a [`PostgresConfig`]
pub async fn connect_from_config(config: PostgresConfig) -> Result<DatabaseConnection, DbErr> {
    let options: ConnectOptions = config.into_connect_options();
    let db = Database::connect(options).await?;

    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Connect to PostgreSQL with automatic retry on failure.
///
/// Uses exponential backoff, which covers the window during startup where
/// the database is still coming up. Pass `None` for the default retry
/// policy.
pub async fn connect_from_config_with_retry(
    config: &PostgresConfig,
    retry: Option<RetryConfig>,
) -> Result<DatabaseConnection, DatabaseError> {
    let retry = retry.unwrap_or_default();

    retry_with_backoff(|| connect_from_config(config.clone()), retry)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Apply all pending migrations for the given migrator
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    info!("Database migrations complete");
    Ok(())
}
