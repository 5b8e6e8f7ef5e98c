//! Append-only edit history.

pub mod model;

pub use model::{EntityEdit, NewEntityEdit};
