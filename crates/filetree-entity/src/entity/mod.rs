//! Tree entity domain: files, folders and their client-facing info.

pub mod info;
pub mod kind;
pub mod model;

pub use info::{EntityInfo, file_type};
pub use kind::EntityKind;
pub use model::{CreateEntity, Entity};
