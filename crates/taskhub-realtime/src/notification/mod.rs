//! Notification creation, live push and event rules.

pub mod dispatcher;
pub mod rules;
