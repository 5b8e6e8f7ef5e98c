//! Soft delete: trash, restore and purge.

pub mod service;

pub use service::TrashService;
