//! Error types for playback coordination

use harmonia_core::CoreError;
use std::time::Duration;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio engine rejected a command
    #[error("Audio engine error: {0}")]
    Engine(String),

    /// The audio engine did not answer within the configured bound
    #[error("Audio engine did not respond to `{command}` within {timeout:?}")]
    EngineUnresponsive {
        /// Engine command that stalled
        command: &'static str,
        /// Configured bound
        timeout: Duration,
    },

    /// Pre-computed waveform payload could not be parsed
    #[error("Invalid waveform payload: {0}")]
    InvalidWaveform(String),

    /// Library collaborator failure
    #[error("Library error: {0}")]
    Library(#[from] CoreError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlaybackError {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
