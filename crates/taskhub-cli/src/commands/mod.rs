//! CLI command definitions and dispatch.

pub mod migrate;
pub mod seed;
pub mod serve;
pub mod user;

use anyhow::Context;
use clap::{Parser, Subcommand};

use taskhub_api::AppState;
use taskhub_core::config::{AppConfig, StoreProvider};
use taskhub_database::store::Stores;

use crate::output::{self, OutputFormat};

/// TaskHub: project and task management backend
#[derive(Debug, Parser)]
#[command(name = "taskhub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/<env>.toml`)
    #[arg(short, long, env = "TASKHUB_ENV", default_value = "development")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the TaskHub server
    Serve(serve::ServeArgs),
    /// Apply pending database migrations
    Migrate,
    /// Insert the permission catalog, built-in roles and default admin
    Seed,
    /// User management
    User(user::UserArgs),
}

impl Cli {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Seed => seed::execute(&self.config, self.format).await,
            Commands::User(args) => user::execute(args, &self.config, self.format).await,
        }
    }
}

/// Load configuration for the named environment.
pub fn load_config(env: &str) -> anyhow::Result<AppConfig> {
    AppConfig::load(env).with_context(|| format!("Failed to load configuration for '{env}'"))
}

/// Connect to the configured stores and wire application state.
pub async fn open_state(env: &str) -> anyhow::Result<AppState> {
    let config = load_config(env)?;
    if config.database.provider == StoreProvider::Memory {
        output::print_warning("database.provider is 'memory'; changes are discarded on exit");
    }
    let stores = Stores::connect(&config.database)
        .await
        .context("Failed to open stores")?;
    Ok(AppState::new(config, stores))
}
