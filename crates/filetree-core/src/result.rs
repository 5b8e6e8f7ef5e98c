//! Convenience result type alias for Filetree.

use crate::error::AppError;

/// A specialized `Result` type for Filetree operations.
pub type AppResult<T> = Result<T, AppError>;
