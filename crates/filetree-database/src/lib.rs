//! # filetree-database
//!
//! SQLite connection management, embedded migrations and concrete
//! repository implementations for the entity tree, its edit history and
//! the per-entity side tables.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
