//! Native audio engine seam
//!
//! Decoding, mixing and device output happen in a separate engine that is
//! driven through asynchronous commands. This module defines that command
//! surface and the one notification the engine sends back.

use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use harmonia_core::Fingerprint;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Command surface of the native audio engine
///
/// All commands address tracks by file path. Volumes are linear in `[0, 1]`.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Open `path` and start playing it from `seek_time` (or the start)
    async fn initialize_playback(
        &self,
        path: &Path,
        volume: f32,
        seek_time: Option<f64>,
    ) -> Result<()>;

    /// Resume the paused stream
    async fn resume(&self) -> Result<()>;

    /// Pause the current stream
    async fn pause(&self) -> Result<()>;

    /// Stop and release the current stream
    async fn stop(&self) -> Result<()>;

    /// Seek the current stream to `time` seconds
    async fn seek(&self, time: f64) -> Result<()>;

    /// Set output volume
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Probe the duration of a file in seconds
    async fn get_duration(&self, path: &Path) -> Result<f64>;

    /// Compute `sample_count` normalized amplitudes for a file
    async fn extract_waveform(&self, path: &Path, sample_count: usize) -> Result<Vec<f32>>;

    /// Volume persisted by the engine's settings store
    async fn get_saved_volume(&self) -> Result<f32>;
}

/// Notifications pushed by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A stream reached its natural end
    Finished {
        /// Identity of the track that finished
        fingerprint: Fingerprint,
    },
}

impl EngineEvent {
    /// Finished notification for a path as reported by the engine
    pub fn finished(path: impl AsRef<str>) -> Self {
        Self::Finished {
            fingerprint: Fingerprint::new(path),
        }
    }
}

/// Shared engine handle that bounds every command by the configured timeout
#[derive(Clone)]
pub(crate) struct EngineClient {
    engine: Arc<dyn AudioEngine>,
    timeout: Option<Duration>,
}

impl EngineClient {
    pub(crate) fn new(engine: Arc<dyn AudioEngine>, timeout: Option<Duration>) -> Self {
        Self { engine, timeout }
    }

    async fn bounded<T>(
        &self,
        command: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| PlaybackError::EngineUnresponsive {
                    command,
                    timeout: limit,
                })?,
            None => call.await,
        }
    }

    pub(crate) async fn initialize_playback(&self, path: PathBuf, volume: f32) -> Result<()> {
        self.bounded(
            "initialize_playback",
            self.engine.initialize_playback(&path, volume, None),
        )
        .await
    }

    pub(crate) async fn resume(&self) -> Result<()> {
        self.bounded("resume", self.engine.resume()).await
    }

    pub(crate) async fn pause(&self) -> Result<()> {
        self.bounded("pause", self.engine.pause()).await
    }

    pub(crate) async fn stop(&self) -> Result<()> {
        self.bounded("stop", self.engine.stop()).await
    }

    pub(crate) async fn seek(&self, time: f64) -> Result<()> {
        self.bounded("seek", self.engine.seek(time)).await
    }

    pub(crate) async fn set_volume(&self, volume: f32) -> Result<()> {
        self.bounded("set_volume", self.engine.set_volume(volume)).await
    }

    pub(crate) async fn get_duration(&self, path: PathBuf) -> Result<f64> {
        self.bounded("get_duration", self.engine.get_duration(&path))
            .await
    }

    pub(crate) async fn extract_waveform(
        &self,
        path: PathBuf,
        sample_count: usize,
    ) -> Result<Vec<f32>> {
        self.bounded(
            "extract_waveform",
            self.engine.extract_waveform(&path, sample_count),
        )
        .await
    }

    pub(crate) async fn get_saved_volume(&self) -> Result<f32> {
        self.bounded("get_saved_volume", self.engine.get_saved_volume())
            .await
    }
}
