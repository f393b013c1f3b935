//! User management CLI commands.

use anyhow::{Context, anyhow};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use taskhub_api::AppState;
use taskhub_entity::user::{CreateUser, User};

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        nickname: Option<String>,
        /// Primary role name
        #[arg(short, long)]
        role: Option<String>,
        /// Mark the account as an administrator
        #[arg(long)]
        admin: bool,
    },
    /// Show a user's effective permission codes
    Permissions { username: String },
    /// Re-enable a user
    Activate { username: String },
    /// Disable a user; their tokens stop working immediately
    Deactivate { username: String },
}

#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: i64,
    username: String,
    nickname: String,
    role_id: String,
    active: bool,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            nickname: u.nickname.clone().unwrap_or_default(),
            role_id: u.role_id.map(|id| id.to_string()).unwrap_or_default(),
            active: u.is_active,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct PermissionRow {
    code: String,
}

pub async fn execute(args: &UserArgs, env: &str, format: OutputFormat) -> anyhow::Result<()> {
    let state = super::open_state(env).await?;

    match &args.command {
        UserCommand::Create {
            username,
            password,
            nickname,
            role,
            admin,
        } => {
            state.password_validator.validate(password)?;
            let role_id = match role {
                Some(name) => Some(
                    state
                        .stores
                        .roles
                        .find_role_by_name(name)
                        .await?
                        .ok_or_else(|| anyhow!("Role '{name}' not found"))?
                        .id,
                ),
                None => None,
            };
            let user = state
                .stores
                .users
                .create(&CreateUser {
                    username: username.clone(),
                    nickname: nickname.clone(),
                    email: None,
                    phone: None,
                    password_hash: state.password_hasher.hash_password(password)?,
                    is_admin: *admin,
                    role_id,
                })
                .await
                .with_context(|| format!("Failed to create user '{username}'"))?;
            output::print_record(&UserRow::from(&user), format);
        }
        UserCommand::Permissions { username } => {
            let user = find_user(&state, username).await?;
            let codes = state.permission_resolver.resolve(&user).await?;
            let rows: Vec<PermissionRow> =
                codes.into_iter().map(|code| PermissionRow { code }).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Activate { username } => set_active(&state, username, true).await?,
        UserCommand::Deactivate { username } => set_active(&state, username, false).await?,
    }

    Ok(())
}

async fn find_user(state: &AppState, username: &str) -> anyhow::Result<User> {
    state
        .stores
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| anyhow!("User '{username}' not found"))
}

async fn set_active(state: &AppState, username: &str, active: bool) -> anyhow::Result<()> {
    let user = find_user(state, username).await?;
    state.stores.users.set_active(user.id, active).await?;
    let verb = if active { "activated" } else { "deactivated" };
    output::print_success(&format!("User '{username}' {verb}"));
    Ok(())
}
