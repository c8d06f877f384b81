//! Shared helpers for playback integration tests
//!
//! `RecordingEngine` stands in for the native audio engine: it records every
//! command in order and can be told to fail or stall specific commands.

#![allow(dead_code)]

use async_trait::async_trait;
use harmonia_core::Track;
use harmonia_playback::{
    AudioEngine, EngineEvent, PlaybackConfig, PlaybackError, Player, Result,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// One engine command as observed by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Initialize { path: PathBuf, volume: f32 },
    Resume,
    Pause,
    Stop,
    Seek(f64),
    SetVolume(f32),
    GetDuration(PathBuf),
    ExtractWaveform(PathBuf),
    GetSavedVolume,
}

#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<Call>>,
    pub fail_initialize: AtomicBool,
    pub fail_resume: AtomicBool,
    pub fail_pause: AtomicBool,
    pub fail_seek: AtomicBool,
    pub fail_set_volume: AtomicBool,
    pub fail_waveform: AtomicBool,
    pub fail_saved_volume: AtomicBool,
    waveforms: Mutex<HashMap<PathBuf, Vec<f32>>>,
    durations: Mutex<HashMap<PathBuf, f64>>,
    saved_volume: Mutex<Option<f32>>,
    initialize_delay: Mutex<Duration>,
    waveform_delay: Mutex<Duration>,
    stop_delay: Mutex<Duration>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Paths passed to `initialize_playback`, in order
    pub fn started(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Initialize { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn extracted(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ExtractWaveform(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn set_waveform(&self, path: impl Into<PathBuf>, samples: Vec<f32>) {
        self.waveforms.lock().unwrap().insert(path.into(), samples);
    }

    pub fn set_duration(&self, path: impl Into<PathBuf>, seconds: f64) {
        self.durations.lock().unwrap().insert(path.into(), seconds);
    }

    pub fn set_saved_volume(&self, volume: f32) {
        *self.saved_volume.lock().unwrap() = Some(volume);
    }

    pub fn set_initialize_delay(&self, delay: Duration) {
        *self.initialize_delay.lock().unwrap() = delay;
    }

    pub fn set_waveform_delay(&self, delay: Duration) {
        *self.waveform_delay.lock().unwrap() = delay;
    }

    pub fn set_stop_delay(&self, delay: Duration) {
        *self.stop_delay.lock().unwrap() = delay;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(flag: &AtomicBool, command: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(PlaybackError::engine(format!("{} rejected", command)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AudioEngine for RecordingEngine {
    async fn initialize_playback(
        &self,
        path: &Path,
        volume: f32,
        _seek_time: Option<f64>,
    ) -> Result<()> {
        let delay = *self.initialize_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.record(Call::Initialize {
            path: path.to_path_buf(),
            volume,
        });
        Self::check(&self.fail_initialize, "initialize_playback")
    }

    async fn resume(&self) -> Result<()> {
        self.record(Call::Resume);
        Self::check(&self.fail_resume, "resume")
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause);
        Self::check(&self.fail_pause, "pause")
    }

    async fn stop(&self) -> Result<()> {
        let delay = *self.stop_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.record(Call::Stop);
        Ok(())
    }

    async fn seek(&self, time: f64) -> Result<()> {
        self.record(Call::Seek(time));
        Self::check(&self.fail_seek, "seek")
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        self.record(Call::SetVolume(volume));
        Self::check(&self.fail_set_volume, "set_volume")
    }

    async fn get_duration(&self, path: &Path) -> Result<f64> {
        self.record(Call::GetDuration(path.to_path_buf()));
        Ok(self.durations.lock().unwrap().get(path).copied().unwrap_or(0.0))
    }

    async fn extract_waveform(&self, path: &Path, sample_count: usize) -> Result<Vec<f32>> {
        let delay = *self.waveform_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.record(Call::ExtractWaveform(path.to_path_buf()));
        Self::check(&self.fail_waveform, "extract_waveform")?;
        let samples = self.waveforms.lock().unwrap().get(path).cloned();
        Ok(samples.unwrap_or_else(|| vec![0.5; sample_count]))
    }

    async fn get_saved_volume(&self) -> Result<f32> {
        self.record(Call::GetSavedVolume);
        Self::check(&self.fail_saved_volume, "get_saved_volume")?;
        Ok(self.saved_volume.lock().unwrap().unwrap_or(0.5))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn track(id: i64, name: &str) -> Track {
    Track::new(id, format!("/music/{}.mp3", name))
        .with_title(name.to_uppercase())
        .with_duration(180.0)
}

pub fn path(name: &str) -> PathBuf {
    PathBuf::from(format!("/music/{}.mp3", name))
}

/// Player without a finished-event listener
pub fn player(engine: &Arc<RecordingEngine>) -> Player {
    init_tracing();
    Player::new(engine.clone(), PlaybackConfig::default())
}

/// Started player plus the sender the engine would push notifications into
pub async fn started_player(
    engine: &Arc<RecordingEngine>,
) -> (Player, mpsc::Sender<EngineEvent>) {
    init_tracing();
    let (tx, rx) = mpsc::channel(16);
    let player = Player::start(engine.clone(), PlaybackConfig::default(), rx)
        .await
        .expect("default config is valid");
    (player, tx)
}

/// Let background tasks (reveal, clock, pre-fetch) run for a while
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
}
