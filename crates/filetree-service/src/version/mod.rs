//! Version history: recording edits, listing, diffing and reverting.

pub mod diff;
pub mod recorder;
pub mod service;

pub use diff::{DiffOp, DiffSpan};
pub use recorder::EditRecorder;
pub use service::{VersionService, VersionView};
