//! Connection handles and the per-user registry.

pub mod handle;
pub mod registry;
