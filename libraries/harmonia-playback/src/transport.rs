//! Transport state and engine commands
//!
//! Owns the current track, play/pause flag, locally estimated position,
//! volume/mute, and the shuffle/repeat toggles. Every state change that
//! corresponds to an engine command is committed only after the engine
//! accepted it, with one exception: `seek` updates the position first.

use crate::config::PlaybackConfig;
use crate::engine::EngineClient;
use crate::error::Result;
use crate::events::{EventBus, PlayerEvent};
use crate::generation::{GenerationCounter, GenerationToken};
use crate::types::{RepeatMode, TransportSnapshot};
use crate::volume::Volume;
use crate::waveform::WaveformDriver;
use harmonia_core::{Fingerprint, Track};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
struct TransportState {
    is_playing: bool,
    current_track: Option<Track>,
    current_time: f64,
    duration: f64,
    volume: Volume,
    shuffle: bool,
    repeat: RepeatMode,
    /// An `initialize` owns the current track but has not started it yet
    starting: bool,
}

struct TransportInner {
    engine: EngineClient,
    waveform: WaveformDriver,
    generation: GenerationCounter,
    events: EventBus,
    state: Mutex<TransportState>,
    clock: Mutex<Option<JoinHandle<()>>>,
    clock_tick: Duration,
    clock_quantum: f64,
}

impl Drop for TransportInner {
    fn drop(&mut self) {
        let clock = self.clock.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = clock.take() {
            handle.abort();
        }
    }
}

/// Transport controller
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

impl Transport {
    pub(crate) fn new(
        engine: EngineClient,
        waveform: WaveformDriver,
        generation: GenerationCounter,
        events: EventBus,
        config: &PlaybackConfig,
    ) -> Self {
        Self {
            inner: Arc::new(TransportInner {
                engine,
                waveform,
                generation,
                events,
                state: Mutex::new(TransportState {
                    is_playing: false,
                    current_track: None,
                    current_time: 0.0,
                    duration: 0.0,
                    volume: Volume::new(config.default_volume),
                    shuffle: false,
                    repeat: RepeatMode::Off,
                    starting: false,
                }),
                clock: Mutex::new(None),
                clock_tick: config.clock_tick(),
                clock_quantum: config.clock_quantum_secs,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TransportState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Track lifecycle =====

    /// Make `track` current and start playing it
    ///
    /// Sequence: take over the current track, stop the engine, rebuild the
    /// waveform, then ask the engine to start. Playback is never requested
    /// before the waveform load has returned.
    ///
    /// A newer `initialize` supersedes this one at every await point. A
    /// superseded call returns `Ok(())` without starting the engine, and
    /// late engine results are discarded. Finished notifications are
    /// ignored until the engine has accepted the start.
    pub async fn initialize(&self, track: Track) -> Result<()> {
        let fingerprint = track.fingerprint();
        let token = {
            let mut state = self.state();
            let token = self.inner.generation.advance();
            state.current_track = Some(track.clone());
            state.current_time = 0.0;
            state.duration = track.duration_secs();
            state.is_playing = false;
            state.starting = true;
            token
        };
        self.inner.events.emit(PlayerEvent::TrackChanged {
            fingerprint: fingerprint.clone(),
        });
        self.inner
            .events
            .emit(PlayerEvent::StateChanged { is_playing: false });

        if let Err(e) = self.inner.engine.stop().await {
            debug!("Stop before initialize failed: {}", e);
        }
        if !token.is_current() {
            debug!("Initialize superseded while stopping: {}", fingerprint);
            return Ok(());
        }

        self.inner.waveform.load(&track, &token).await;
        if !token.is_current() {
            debug!("Initialize superseded during waveform load: {}", fingerprint);
            return Ok(());
        }

        let gain = self.state().volume.engine_gain();
        match self
            .inner
            .engine
            .initialize_playback(track.path.clone(), gain)
            .await
        {
            Ok(()) => {
                {
                    let mut state = self.state();
                    if !token.is_current() {
                        debug!("Discarding late start for {}", fingerprint);
                        return Ok(());
                    }
                    state.is_playing = true;
                    state.starting = false;
                }
                info!("Playing {}", fingerprint);
                self.inner
                    .events
                    .emit(PlayerEvent::StateChanged { is_playing: true });
                self.ensure_clock();

                if track.duration_secs() <= 0.0 {
                    self.probe_duration(track, token);
                }
                Ok(())
            }
            Err(e) => {
                error!("Failed to start {}: {}", fingerprint, e);
                {
                    let mut state = self.state();
                    if token.is_current() {
                        state.is_playing = false;
                        state.starting = false;
                    }
                }
                Err(e)
            }
        }
    }

    /// Stop the engine and forget the current track
    pub async fn cleanup(&self) {
        self.inner.generation.advance();
        self.inner.waveform.reset();
        self.stop_clock();

        if let Err(e) = self.inner.engine.stop().await {
            warn!("Stop during cleanup failed: {}", e);
        }

        {
            let mut state = self.state();
            state.current_track = None;
            state.is_playing = false;
            state.starting = false;
            state.current_time = 0.0;
            state.duration = 0.0;
        }
        self.inner
            .events
            .emit(PlayerEvent::StateChanged { is_playing: false });
    }

    /// Adopt the engine's persisted volume
    ///
    /// Failures keep the configured default.
    pub async fn hydrate_volume(&self) {
        match self.inner.engine.get_saved_volume().await {
            Ok(saved) => {
                let level = Volume::from_engine(saved);
                let is_muted = {
                    let mut state = self.state();
                    state.volume.hydrate(level);
                    state.volume.is_muted()
                };
                debug!("Restored saved volume {}", level);
                self.inner
                    .events
                    .emit(PlayerEvent::VolumeChanged { level, is_muted });
            }
            Err(e) => warn!("Could not read saved volume: {}", e),
        }
    }

    // ===== Playback control =====

    /// Resume playback
    pub async fn play(&self) -> Result<()> {
        match self.inner.engine.resume().await {
            Ok(()) => {
                self.state().is_playing = true;
                self.inner
                    .events
                    .emit(PlayerEvent::StateChanged { is_playing: true });
                self.ensure_clock();
                Ok(())
            }
            Err(e) => {
                error!("Failed to resume playback: {}", e);
                self.state().is_playing = false;
                self.inner
                    .events
                    .emit(PlayerEvent::StateChanged { is_playing: false });
                Err(e)
            }
        }
    }

    /// Pause playback
    ///
    /// On failure the play flag is left as it was.
    pub async fn pause(&self) -> Result<()> {
        match self.inner.engine.pause().await {
            Ok(()) => {
                self.state().is_playing = false;
                self.inner
                    .events
                    .emit(PlayerEvent::StateChanged { is_playing: false });
                Ok(())
            }
            Err(e) => {
                error!("Failed to pause playback: {}", e);
                Err(e)
            }
        }
    }

    /// Pause when playing, resume otherwise
    pub async fn toggle_play_pause(&self) -> Result<()> {
        let is_playing = self.state().is_playing;
        if is_playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Jump to `time` seconds
    ///
    /// The position is updated immediately and the engine command runs in
    /// the background; a failed engine seek is only logged. The target is
    /// clamped to `[0, duration]` when the duration is known.
    pub fn seek(&self, time: f64) {
        let target = {
            let mut state = self.state();
            let mut target = if time.is_finite() { time.max(0.0) } else { 0.0 };
            if state.duration > 0.0 {
                target = target.min(state.duration);
            }
            state.current_time = target;
            target
        };

        let engine = self.inner.engine.clone();
        tokio::spawn(async move {
            if let Err(e) = engine.seek(target).await {
                warn!("Seek to {:.2}s failed: {}", target, e);
            }
        });
    }

    // ===== Volume =====

    /// Set volume level, clamped to 0-100
    ///
    /// A nonzero level also unmutes. Nothing changes if the engine rejects
    /// the command.
    pub async fn set_volume(&self, requested: i32) -> Result<()> {
        let level = Volume::clamp_level(requested);
        if let Err(e) = self.inner.engine.set_volume(Volume::to_engine(level)).await {
            error!("Failed to set volume {}: {}", level, e);
            return Err(e);
        }

        let is_muted = {
            let mut state = self.state();
            state.volume.commit_level(level);
            state.volume.is_muted()
        };
        self.inner
            .events
            .emit(PlayerEvent::VolumeChanged { level, is_muted });
        Ok(())
    }

    /// Mute, or restore the remembered level
    pub async fn toggle_mute(&self) -> Result<()> {
        let (muted, restore) = {
            let state = self.state();
            (state.volume.is_muted(), state.volume.unmute_level())
        };

        let (target, gain) = if muted {
            (restore, Volume::to_engine(restore))
        } else {
            (0, 0.0)
        };

        if let Err(e) = self.inner.engine.set_volume(gain).await {
            error!("Failed to toggle mute: {}", e);
            return Err(e);
        }

        let (level, is_muted) = {
            let mut state = self.state();
            if muted {
                state.volume.commit_unmute(target);
            } else {
                state.volume.commit_mute();
            }
            (state.volume.level(), state.volume.is_muted())
        };
        self.inner
            .events
            .emit(PlayerEvent::VolumeChanged { level, is_muted });
        Ok(())
    }

    // ===== Modes =====

    /// Flip the shuffle flag; returns the new value
    ///
    /// Queue order is not touched here.
    pub fn toggle_shuffle(&self) -> bool {
        let mut state = self.state();
        state.shuffle = !state.shuffle;
        state.shuffle
    }

    pub(crate) fn set_shuffle_flag(&self, enabled: bool) {
        self.state().shuffle = enabled;
    }

    /// Advance repeat mode `Off -> All -> One -> Off`; returns the new mode
    pub fn toggle_repeat(&self) -> RepeatMode {
        let mut state = self.state();
        state.repeat = state.repeat.next();
        state.repeat
    }

    pub fn set_repeat(&self, mode: RepeatMode) {
        self.state().repeat = mode;
    }

    // ===== State queries =====

    pub fn repeat(&self) -> RepeatMode {
        self.state().repeat
    }

    pub fn shuffle(&self) -> bool {
        self.state().shuffle
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state().current_track.clone()
    }

    /// Locally estimated position in seconds
    pub fn current_time(&self) -> f64 {
        self.state().current_time
    }

    pub fn duration(&self) -> f64 {
        self.state().duration
    }

    pub fn volume(&self) -> u8 {
        self.state().volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.state().volume.is_muted()
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        let state = self.state();
        TransportSnapshot {
            is_playing: state.is_playing,
            current_track: state.current_track.clone(),
            current_time: state.current_time,
            duration: state.duration,
            volume: state.volume.level(),
            is_muted: state.volume.is_muted(),
            previous_volume: state.volume.previous(),
            shuffle: state.shuffle,
            repeat: state.repeat,
        }
    }

    // ===== Clock =====

    /// Advance the position estimate by one clock quantum
    ///
    /// No-op unless playing with a current track. Never passes a known
    /// duration.
    pub fn tick(&self) {
        let mut state = self.state();
        if !state.is_playing || state.current_track.is_none() {
            return;
        }
        let mut next = state.current_time + self.inner.clock_quantum;
        if state.duration > 0.0 {
            next = next.min(state.duration);
        }
        state.current_time = next;
    }

    fn ensure_clock(&self) {
        let mut clock = self.inner.clock.lock().unwrap_or_else(PoisonError::into_inner);
        if clock.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.clock_tick;
        *clock = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                Transport { inner }.tick();
            }
        }));
    }

    fn stop_clock(&self) {
        let mut clock = self.inner.clock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = clock.take() {
            handle.abort();
        }
    }

    // ===== Coordinator hooks =====

    /// Record a natural end for `fingerprint`
    ///
    /// Returns the current track when the notification refers to it, after
    /// marking playback stopped and snapping the position to the end.
    /// Returns `None` for stale notifications, leaving state untouched:
    /// another track, no track, or a track change still starting up (the
    /// event then belongs to the stream being replaced, even when it is
    /// the same file).
    pub(crate) fn settle_finished(&self, fingerprint: &Fingerprint) -> Option<Track> {
        let track = {
            let mut state = self.state();
            if state.starting {
                return None;
            }
            let track = state.current_track.clone()?;
            if !track.matches(fingerprint) {
                return None;
            }
            state.is_playing = false;
            if state.duration > 0.0 {
                state.current_time = state.duration;
            }
            track
        };
        self.inner
            .events
            .emit(PlayerEvent::StateChanged { is_playing: false });
        Some(track)
    }

    fn probe_duration(&self, track: Track, token: GenerationToken) {
        let transport = self.clone();
        tokio::spawn(async move {
            match transport.inner.engine.get_duration(track.path.clone()).await {
                Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
                    let mut state = transport.state();
                    if token.is_current() && state.duration <= 0.0 {
                        state.duration = seconds;
                    }
                }
                Ok(_) => debug!("Engine reported no duration for {}", track.fingerprint()),
                Err(e) => warn!("Duration probe failed for {}: {}", track.fingerprint(), e),
            }
        });
    }
}
