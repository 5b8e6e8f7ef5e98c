//! # filetree-core
//!
//! Core crate for Filetree. Contains the unified error system, configuration
//! schemas, the byte-storage trait, and the path rules that encode the
//! tree namespace (trash marker, parent directory, restore naming).
//!
//! This crate has **no** internal dependencies on other Filetree crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
