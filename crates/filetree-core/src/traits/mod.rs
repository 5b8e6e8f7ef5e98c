//! Core trait definitions shared across crates.

pub mod storage;

pub use storage::{ByteStream, StorageProvider};
