//! # filetree-storage
//!
//! Content blob storage for Filetree. Entities only carry an opaque content
//! key; the bytes behind it live in a [`StorageProvider`] implementation.
//!
//! [`StorageProvider`]: filetree_core::traits::StorageProvider

pub mod providers;

pub use providers::local::LocalStorageProvider;
