//! Core type definitions used across the Filetree workspace.

pub mod path;

pub use path::{
    MARKER, ROOT_PARENT, ROOT_PATH, TRASH_SENTINEL, base_name, is_trashed, join, mark,
    parent_dir, subtree_prefix, unmark, validate_name,
};
