//! End-to-end tests against the full router on the in-memory store.

mod helpers;

mod auth_test;
mod notification_test;
mod rbac_test;
mod ws_test;
