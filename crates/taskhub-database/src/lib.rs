//! # taskhub-database
//!
//! Persistence for TaskHub. Callers depend on the store traits in
//! [`store`]; [`Stores::connect`] picks the PostgreSQL repositories or the
//! in-memory store according to `database.provider`.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod seed;
pub mod store;

pub use connection::DatabasePool;
pub use store::{NotificationPage, NotificationStore, RoleStore, Stores, UserStore};
