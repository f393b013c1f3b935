//! User entities.

pub mod login_log;
pub mod model;

pub use login_log::{LoginLog, NewLoginLog};
pub use model::{CreateUser, UpdateProfile, User};
