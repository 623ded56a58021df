//! Translation of pool and Diesel failures into user persistence errors.

use tracing::debug;

use crate::domain::ports::UserPersistenceError;

use super::pool::PoolError;

/// Map pool failures to connection errors.
pub(super) fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

/// Map a Diesel error raised while running `operation`.
///
/// Unique violations become conflicts and closed connections become
/// connection errors. Everything else is a query failure carrying the
/// driver message.
pub(super) fn map_diesel_error(
    error: diesel::result::Error,
    operation: &'static str,
) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            operation,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query(operation, "record not found"),
        DieselError::QueryBuilderError(err) => UserPersistenceError::query(operation, err.to_string()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserPersistenceError::conflict(operation, info.message())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            UserPersistenceError::connection(info.message())
        }
        DieselError::DatabaseError(_, info) => UserPersistenceError::query(operation, info.message()),
        other => UserPersistenceError::query(operation, other.to_string()),
    }
}
