/// Track reference as handed out by the library
use crate::types::Fingerprint;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Audio track (read-only copy of a library song)
///
/// Identity is the file reference (see [`Fingerprint`]); two records with
/// different database ids but the same file are the same track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Library row identifier
    pub id: i64,

    /// File path on disk
    pub path: PathBuf,

    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Nominal duration in seconds, if the library knows it
    pub duration: Option<f64>,

    /// Pre-computed waveform payload (JSON array of amplitudes)
    pub waveform: Option<String>,
}

impl Track {
    /// Create a track with no metadata
    pub fn new(id: i64, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            title: None,
            artist: None,
            album: None,
            duration: None,
            waveform: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the artist
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the album
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the nominal duration in seconds
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Attach a pre-computed waveform payload
    pub fn with_waveform(mut self, payload: impl Into<String>) -> Self {
        self.waveform = Some(payload.into());
        self
    }

    /// Stable identity of this track
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_path(&self.path)
    }

    /// Whether both records point at the same file
    pub fn same_identity(&self, other: &Track) -> bool {
        self.fingerprint() == other.fingerprint()
    }

    /// Whether this track is the one identified by `fingerprint`
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        &self.fingerprint() == fingerprint
    }

    /// Nominal duration in seconds, 0.0 when unknown
    pub fn duration_secs(&self) -> f64 {
        match self.duration {
            Some(secs) if secs.is_finite() && secs > 0.0 => secs,
            _ => 0.0,
        }
    }

    /// Title for display: tag title, then file stem, then raw path
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}
