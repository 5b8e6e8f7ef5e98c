//! # filetree-service
//!
//! Business logic service layer for Filetree. Each service orchestrates
//! repositories and the content storage provider to implement one
//! subsystem: content writes ([`DriveService`]), soft delete
//! ([`TrashService`]) and version history ([`VersionService`]).
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod drive;
pub mod trash;
pub mod version;

pub use context::RequestContext;
pub use drive::DriveService;
pub use trash::TrashService;
pub use version::{EditRecorder, VersionService};
