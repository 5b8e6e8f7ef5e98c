//! Tree path helpers and the trash marker.
//!
//! Paths are absolute, `/`-separated and never end with a slash (except the
//! tree root `/`). A trashed entity keeps its path with [`MARKER`] prepended,
//! so `/docs/old` becomes `./docs/old` and everything underneath it moves
//! along (`/docs/old/a.txt` becomes `./docs/old/a.txt`). Active paths always
//! start with `/`, which keeps the two namespaces disjoint.

use crate::error::AppError;

/// Character prepended to the path of every trashed entity.
pub const MARKER: char = '.';

/// Parent id stored on the root of a trashed subtree.
pub const TRASH_SENTINEL: i64 = -1;

/// Parent id stored on the tree root row.
pub const ROOT_PARENT: i64 = 0;

/// Path of the tree root.
pub const ROOT_PATH: &str = "/";

/// Whether a stored path lives in the trash namespace.
pub fn is_trashed(path: &str) -> bool {
    path.starts_with("./")
}

/// Move an active path into the trash namespace.
pub fn mark(path: &str) -> String {
    format!("{MARKER}{path}")
}

/// Strip the trash marker, returning the original active path.
///
/// Returns `None` when the path is not trashed.
pub fn unmark(path: &str) -> Option<&str> {
    if is_trashed(path) {
        Some(&path[MARKER.len_utf8()..])
    } else {
        None
    }
}

/// Directory part of an active path. The parent of a top-level entry is `/`.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => ROOT_PATH,
        Some(idx) => &path[..idx],
    }
}

/// Last path segment.
pub fn base_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Join a directory path and a child name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT_PATH || dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Prefix shared by every descendant path of `path`.
pub fn subtree_prefix(path: &str) -> String {
    format!("{path}/")
}

/// Validate a single path segment supplied by a client.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if name.contains('/') {
        return Err(AppError::validation("Name must not contain '/'"));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("Reserved name '{name}'")));
    }
    Ok(())
}
