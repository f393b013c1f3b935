//! User online state.

pub mod tracker;
