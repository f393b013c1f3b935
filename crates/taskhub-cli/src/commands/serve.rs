//! Start the TaskHub server.

use anyhow::Context;
use clap::Args;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

pub async fn execute(args: &ServeArgs, env: &str) -> anyhow::Result<()> {
    let mut config = super::load_config(env)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }

    println!("Starting TaskHub server...");
    println!("  Address: {}", config.server.bind_address());
    println!("  Store:   {:?}", config.database.provider);

    taskhub_api::run_server(config).await.context("Server exited with an error")
}
