//! Custom Axum extractors.

pub mod context;
pub mod validated;

pub use context::CurrentContext;
pub use validated::{ValidForm, ValidQuery};
