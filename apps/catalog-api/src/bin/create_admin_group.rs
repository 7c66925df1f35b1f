//! Provision the admin group with full catalog permissions.
//!
//! Idempotent: running it again re-applies the same permission set.
//!
//! ```sh
//! DATABASE_URL=postgres://... cargo run --bin create_admin_group
//! ```

use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use database::postgres::PostgresConfig;
use domain_catalog::{permissions, ADMIN_GROUP};
use domain_users::{Group, GroupRepository, PostgresGroupRepository};
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let config = PostgresConfig::from_env()?;
    let db = database::postgres::connect_from_config_with_retry(&config, None).await?;
    database::postgres::run_migrations::<migration::Migrator>(&db).await?;

    let groups = PostgresGroupRepository::new(db.clone());

    let group = groups
        .upsert(Group {
            name: ADMIN_GROUP.to_string(),
            permissions: permissions::ALL.iter().map(|p| p.to_string()).collect(),
        })
        .await?;

    info!(
        group = %group.name,
        permissions = ?group.permissions,
        "Admin group provisioned"
    );

    db.close().await.ok();
    Ok(())
}
