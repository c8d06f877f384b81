/// Library entities owned by the database service
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Watched music folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier
    pub id: i64,

    /// Folder path on disk
    pub path: PathBuf,

    /// Display name (defaults to the directory name)
    pub name: Option<String>,

    /// When the folder was added
    pub added_at: DateTime<Utc>,
}

/// Playlist, either hand-curated or driven by tag filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: i64,

    /// Playlist name
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Whether membership is computed from `filter_tags`
    pub is_dynamic: bool,

    /// Tag names used by dynamic playlists
    pub filter_tags: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// User-defined tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag identifier
    pub id: i64,

    /// Tag name
    pub name: String,

    /// Display color (`#rrggbb`)
    pub color: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
