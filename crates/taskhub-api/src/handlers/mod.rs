//! Route handlers organized by domain.

pub mod auth;
pub mod health;
pub mod notification;
pub mod permission;
pub mod role;
pub mod user;
pub mod ws;
