//! Harmonia - Playback Coordination
//!
//! Engine-agnostic playback core for the Harmonia desktop player.
//!
//! This crate provides:
//! - Play queue (insert, remove, reorder, shuffle with restorable order)
//! - Transport state (play/pause, local position clock, volume and mute)
//! - Repeat modes (Off, All, One) and advance-on-finish
//! - Progressive waveform loading with a reveal animation
//! - Waveform pre-fetch cache for upcoming tracks
//!
//! # Architecture
//!
//! `harmonia-playback` never decodes audio. The native engine sits behind
//! the [`AudioEngine`] trait and is driven through async commands; it
//! reports back through [`EngineEvent`]s. UI layers observe state through
//! snapshots and the [`PlayerEvent`] broadcast.
//!
//! Every track change advances a generation counter. Work started for an
//! older track (waveform chunks, reveal ticks, late engine results) checks
//! its generation before touching state and silently stops when stale.
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use harmonia_core::Track;
//! use harmonia_playback::{AudioEngine, EngineEvent, PlaybackConfig, Player, Result};
//! use std::path::Path;
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! struct SilentEngine;
//!
//! #[async_trait]
//! impl AudioEngine for SilentEngine {
//!     async fn initialize_playback(&self, _: &Path, _: f32, _: Option<f64>) -> Result<()> { Ok(()) }
//!     async fn resume(&self) -> Result<()> { Ok(()) }
//!     async fn pause(&self) -> Result<()> { Ok(()) }
//!     async fn stop(&self) -> Result<()> { Ok(()) }
//!     async fn seek(&self, _: f64) -> Result<()> { Ok(()) }
//!     async fn set_volume(&self, _: f32) -> Result<()> { Ok(()) }
//!     async fn get_duration(&self, _: &Path) -> Result<f64> { Ok(0.0) }
//!     async fn extract_waveform(&self, _: &Path, n: usize) -> Result<Vec<f32>> { Ok(vec![0.5; n]) }
//!     async fn get_saved_volume(&self) -> Result<f32> { Ok(0.8) }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let (finished_tx, finished_rx) = mpsc::channel::<EngineEvent>(16);
//! let player = Player::start(Arc::new(SilentEngine), PlaybackConfig::default(), finished_rx).await?;
//!
//! player.queue().enqueue(Track::new(1, "/music/a.flac"), None);
//! player.queue().enqueue(Track::new(2, "/music/b.flac"), None);
//! player.queue().play_at_index(0).await?;
//!
//! // The engine reports the end of a stream; the coordinator moves on to b.flac
//! finished_tx.send(EngineEvent::finished("/music/a.flac")).await.ok();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod events;
pub mod generation;
pub mod manager;
pub mod player;
pub mod queue;
pub mod shuffle;
pub mod transport;
pub mod types;
pub mod volume;
pub mod waveform;

// Re-exports
pub use config::PlaybackConfig;
pub use coordinator::{FinishAction, FinishCoordinator};
pub use engine::{AudioEngine, EngineEvent};
pub use error::{PlaybackError, Result};
pub use events::{EventBus, PlayerEvent};
pub use generation::{GenerationCounter, GenerationToken};
pub use manager::QueueManager;
pub use player::Player;
pub use queue::Queue;
pub use transport::Transport;
pub use types::{QueueSnapshot, RepeatMode, TransportSnapshot, WaveformSnapshot};
pub use volume::Volume;
pub use waveform::WaveformDriver;
