//! Client-facing entity summary.

use serde::{Deserialize, Serialize};

use super::model::Entity;

/// The summary returned to clients for every entity: `{id, value, size, date, type}`.
///
/// Active entities are addressed by path; trashed ones by numeric id, since
/// several trashed rows may share a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Path for active entities, numeric id for trashed ones.
    pub id: String,
    /// Display name.
    pub value: String,
    /// Size in bytes.
    pub size: i64,
    /// Last modification as unix seconds.
    pub date: i64,
    /// `folder` or a coarse file class.
    #[serde(rename = "type")]
    pub kind: String,
}

impl EntityInfo {
    /// Summary of an active entity, addressed by its path.
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.path.clone(),
            value: entity.name.clone(),
            size: entity.size,
            date: entity.modified.timestamp(),
            kind: file_type(&entity.name, entity.is_folder()).to_string(),
        }
    }

    /// Summary of a trashed entity, addressed by its numeric id.
    pub fn from_trashed(entity: &Entity) -> Self {
        Self {
            id: entity.id.to_string(),
            ..Self::from_entity(entity)
        }
    }
}

/// Classify an entity for display: `folder`, or a class derived from the
/// file extension.
pub fn file_type(name: &str, is_folder: bool) -> &'static str {
    if is_folder {
        return "folder";
    }
    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => return "file",
    };
    match ext.as_str() {
        "txt" | "md" | "log" | "csv" | "ini" | "cfg" | "conf" => "text",
        "rs" | "go" | "js" | "ts" | "jsx" | "tsx" | "py" | "c" | "h" | "cpp" | "hpp" | "java"
        | "rb" | "php" | "sh" | "html" | "htm" | "css" | "json" | "xml" | "yml" | "yaml"
        | "toml" | "sql" => "code",
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "svg" | "webp" | "ico" | "tiff" => "image",
        "mp4" | "avi" | "mkv" | "mov" | "webm" | "wmv" | "flv" => "video",
        "mp3" | "wav" | "ogg" | "flac" | "aac" | "m4a" => "audio",
        "zip" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "7z" | "rar" => "archive",
        "pdf" => "pdf",
        "doc" | "docx" | "odt" | "rtf" => "doc",
        "xls" | "xlsx" | "ods" => "excel",
        "ppt" | "pptx" | "odp" => "pp",
        _ => "file",
    }
}
