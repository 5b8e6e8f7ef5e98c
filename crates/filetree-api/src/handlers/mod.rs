//! HTTP request handlers, one module per endpoint group.

pub mod files;
pub mod health;
pub mod trash;
pub mod version;
