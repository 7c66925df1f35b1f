//! Create a user account from the command line.
//!
//! ```sh
//! DATABASE_URL=postgres://... cargo run --bin create_user -- \
//!     --email ada@example.com --name Ada --password hunter2secret --group admin
//! ```

use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use database::postgres::PostgresConfig;
use domain_users::{CreateUser, PostgresUserRepository, UserService};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Create a user account")]
struct Args {
    #[arg(long)]
    email: String,

    #[arg(long)]
    name: String,

    /// Plaintext password, hashed with argon2 before storage
    #[arg(long)]
    password: String,

    /// Group memberships, repeatable
    #[arg(long = "group")]
    groups: Vec<String>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let args = Args::parse();

    let config = PostgresConfig::from_env()?;
    let db = database::postgres::connect_from_config_with_retry(&config, None).await?;
    database::postgres::run_migrations::<migration::Migrator>(&db).await?;

    let service = UserService::new(Arc::new(PostgresUserRepository::new(db.clone())));

    let user = service
        .create_user(CreateUser {
            email: args.email,
            name: args.name,
            password: args.password,
            groups: args.groups,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, groups = ?user.groups, "User created");

    db.close().await.ok();
    Ok(())
}
