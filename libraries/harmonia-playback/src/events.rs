//! Player Events
//!
//! Event-based communication for UI synchronization. Events are emitted at
//! key points:
//! - Track changes (as soon as `initialize` begins)
//! - Play/pause state changes
//! - Volume and mute changes
//! - Queue mutations
//! - Waveform chunk loading and reveal completion

use harmonia_core::Fingerprint;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default number of buffered events per subscriber
const EVENT_CAPACITY: usize = 256;

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The current track changed
    TrackChanged {
        /// Identity of the new current track
        fingerprint: Fingerprint,
    },

    /// Playback started or stopped
    StateChanged {
        /// Whether audio is now playing
        is_playing: bool,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Queue changed (tracks added/removed/reordered/shuffled)
    QueueChanged {
        /// New queue length
        length: usize,
        /// Current position, if any
        current_index: Option<usize>,
    },

    /// A waveform chunk was appended
    WaveformProgress {
        /// Samples loaded so far
        loaded: usize,
        /// Full sequence length
        total: usize,
    },

    /// The reveal animation reached the end of the sequence
    WaveformRevealed {
        /// Track whose waveform finished revealing
        fingerprint: Fingerprint,
    },

    /// A background operation failed
    Error {
        /// Error message
        message: String,
    },
}

/// Broadcast channel shared by all player components
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with the default capacity
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; having no subscribers is fine
    pub fn emit(&self, event: PlayerEvent) {
        let _ = self.sender.send(event);
    }
}
