//! Content collaborator: entity lookup, creation, listing and content writes.

pub mod service;

pub use service::DriveService;
