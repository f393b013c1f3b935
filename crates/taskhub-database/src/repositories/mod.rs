//! PostgreSQL implementations of the store traits.

pub mod notification;
pub mod role;
pub mod user;

pub use notification::NotificationRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

use taskhub_core::error::{AppError, ErrorKind};

/// Map an insert/update failure, turning unique violations into `Conflict`.
pub(crate) fn map_write_error(err: sqlx::Error, conflict_message: &str, message: &str) -> AppError {
    let unique_violation = matches!(
        &err,
        sqlx::Error::Database(db) if db.is_unique_violation()
    );
    if unique_violation {
        AppError::with_source(ErrorKind::Conflict, conflict_message, err)
    } else {
        AppError::with_source(ErrorKind::Database, message, err)
    }
}
