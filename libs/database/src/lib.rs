//! PostgreSQL connectivity for the catalog service.
//!
//! Thin layer over SeaORM: configuration from the environment, connection
//! with retry for flaky startup ordering, migrations, and a health check
//! for readiness probes.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(&config, None).await?;
//! postgres::run_migrations::<migration::Migrator>(&db).await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
