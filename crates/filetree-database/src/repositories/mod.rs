//! Repository implementations for the entity tree and its side tables.
//!
//! Every method takes the executor it runs on, so the same query can be
//! issued against the pool or inside a transaction (`&mut *tx`). Methods
//! that issue several statements take a `&mut SqliteConnection`.

pub mod edit;
pub mod entity;
pub mod marker;

pub use edit::EditRepository;
pub use entity::EntityRepository;
pub use marker::MarkerRepository;

use filetree_core::error::{AppError, ErrorKind};

/// Largest number of ids bound into a single `IN (...)` list.
pub const IN_CHUNK_SIZE: usize = 500;

/// Map a sqlx error, turning unique-index violations into conflicts.
pub(crate) fn map_write_error(context: &str, err: sqlx::Error) -> AppError {
    let unique = matches!(&err, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
    if unique {
        AppError::with_source(
            ErrorKind::Conflict,
            format!("{context}: path already in use"),
            err,
        )
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), err)
    }
}

/// Wrap a sqlx error as a database failure.
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}
