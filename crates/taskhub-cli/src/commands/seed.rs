//! Seed command.

use anyhow::Context;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct SeedRow {
    permissions_created: usize,
    roles_created: usize,
    admin_created: bool,
}

pub async fn execute(env: &str, format: OutputFormat) -> anyhow::Result<()> {
    let state = super::open_state(env).await?;
    let report = taskhub_api::seed(&state).await.context("Seeding failed")?;

    output::print_record(
        &SeedRow {
            permissions_created: report.permissions_created,
            roles_created: report.roles_created,
            admin_created: report.admin_created,
        },
        format,
    );
    Ok(())
}
