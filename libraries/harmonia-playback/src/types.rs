//! Core types for playback coordination

use harmonia_core::Track;
use serde::{Deserialize, Serialize};

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the toggle cycle `Off -> All -> One -> Off`
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Point-in-time copy of the transport state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    pub is_playing: bool,
    pub current_track: Option<Track>,
    /// Locally estimated position in seconds
    pub current_time: f64,
    /// Duration in seconds, 0.0 when unknown
    pub duration: f64,
    pub volume: u8,
    pub is_muted: bool,
    /// Volume restored by unmute
    pub previous_volume: u8,
    /// UI shuffle toggle
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

/// Point-in-time copy of the play queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub tracks: Vec<Track>,
    pub current_index: Option<usize>,
    /// Whether an original-order snapshot is held
    pub is_shuffled: bool,
}

/// Point-in-time copy of the waveform reveal state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformSnapshot {
    /// Samples loaded so far, in order
    pub samples: Vec<f32>,
    /// Bars the reveal animation has uncovered
    pub revealed: usize,
    /// Full sequence length once known
    pub total: usize,
    pub loading: bool,
}
