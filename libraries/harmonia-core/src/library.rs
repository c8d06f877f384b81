//! Library service seam
//!
//! Folder/playlist/tag persistence lives in a separate database service.
//! The player only reads from it, so this trait is the whole contract.

use crate::error::Result;
use crate::types::{Folder, Playlist, Tag, Track};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read access to the music library database
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait LibraryService: Send + Sync {
    /// Get all watched folders
    async fn folders(&self) -> Result<Vec<Folder>>;

    /// Get all playlists
    async fn playlists(&self) -> Result<Vec<Playlist>>;

    /// Get all tags
    async fn tags(&self) -> Result<Vec<Tag>>;

    /// Songs found under a folder, in library order
    async fn songs_by_folder(&self, folder_id: i64) -> Result<Vec<Track>>;

    /// Songs of a playlist, in playlist order
    async fn songs_by_playlist(&self, playlist_id: i64) -> Result<Vec<Track>>;

    /// Size of a file on disk in bytes
    async fn file_size(&self, path: &Path) -> Result<u64>;
}

/// Which library collection to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibrarySelection {
    /// All songs under a folder
    Folder(i64),
    /// All songs of a playlist
    Playlist(i64),
}

/// Fetch the songs of a selection
pub async fn songs_for(
    library: &dyn LibraryService,
    selection: LibrarySelection,
) -> Result<Vec<Track>> {
    match selection {
        LibrarySelection::Folder(id) => library.songs_by_folder(id).await,
        LibrarySelection::Playlist(id) => library.songs_by_playlist(id).await,
    }
}
