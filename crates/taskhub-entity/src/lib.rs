//! # taskhub-entity
//!
//! Domain entity models for TaskHub. Database entities derive
//! `sqlx::FromRow`; value objects such as [`role::RoleAuthority`] live next
//! to the rows they are derived from.

pub mod notification;
pub mod permission;
pub mod role;
pub mod user;
