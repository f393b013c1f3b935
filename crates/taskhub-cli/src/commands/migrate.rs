//! Database migration command.

use anyhow::{Context, bail};

use taskhub_core::config::StoreProvider;
use taskhub_database::DatabasePool;
use taskhub_database::migration::run_migrations;

use crate::output;

pub async fn execute(env: &str) -> anyhow::Result<()> {
    let config = super::load_config(env)?;
    if config.database.provider != StoreProvider::Postgres {
        bail!("Migrations require database.provider = \"postgres\"");
    }

    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(pool.pool()).await.context("Migration failed")?;
    pool.close().await;

    output::print_success("Migrations applied");
    Ok(())
}
