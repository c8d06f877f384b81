//! Waveform reveal driver
//!
//! On every track change the amplitude sequence is rebuilt from scratch:
//!
//! 1. Resolve the full sequence: pre-computed payload on the track, then the
//!    pre-fetch cache, then engine extraction at the configured length.
//! 2. Append it in fixed-size chunks with a short delay between chunks, so
//!    the UI sees it grow.
//! 3. Independently, a reveal timer uncovers one more bar per period.
//!    Loading is complete when the reveal reaches the sequence length.
//!
//! Both the chunk loop and the reveal timer carry a generation token and
//! stop touching state as soon as a newer track change happens.

use crate::config::PlaybackConfig;
use crate::engine::EngineClient;
use crate::error::{PlaybackError, Result};
use crate::events::{EventBus, PlayerEvent};
use crate::generation::GenerationToken;
use crate::types::WaveformSnapshot;
use harmonia_core::{Fingerprint, Track};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Parse a pre-computed waveform payload (JSON array of amplitudes)
pub fn parse_payload(payload: &str) -> Result<Vec<f32>> {
    let samples: Vec<f32> = serde_json::from_str(payload)
        .map_err(|e| PlaybackError::InvalidWaveform(e.to_string()))?;
    if samples.is_empty() {
        return Err(PlaybackError::InvalidWaveform("empty sequence".into()));
    }
    Ok(sanitize(samples))
}

/// Clamp amplitudes into `[0, 1]`; non-finite values become silence
fn sanitize(mut samples: Vec<f32>) -> Vec<f32> {
    for sample in &mut samples {
        *sample = if sample.is_finite() {
            sample.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
    samples
}

#[derive(Debug, Default)]
struct WaveformState {
    samples: Vec<f32>,
    /// Invariant: `revealed <= samples.len()`
    revealed: usize,
    total: usize,
    loading: bool,
}

struct WaveformInner {
    engine: EngineClient,
    events: EventBus,
    state: Mutex<WaveformState>,
    cache: Mutex<LruCache<Fingerprint, Vec<f32>>>,
    reveal: Mutex<Option<JoinHandle<()>>>,
    sample_count: usize,
    chunk_size: usize,
    chunk_delay: Duration,
    reveal_interval: Duration,
}

/// Loads and progressively reveals the current track's waveform
#[derive(Clone)]
pub struct WaveformDriver {
    inner: Arc<WaveformInner>,
}

impl WaveformDriver {
    pub(crate) fn new(
        engine: EngineClient,
        events: EventBus,
        config: &PlaybackConfig,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.waveform_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(WaveformInner {
                engine,
                events,
                state: Mutex::new(WaveformState::default()),
                cache: Mutex::new(LruCache::new(capacity)),
                reveal: Mutex::new(None),
                sample_count: config.waveform_samples.max(1),
                chunk_size: config.waveform_chunk_size.max(1),
                chunk_delay: config.chunk_delay(),
                reveal_interval: config.reveal_interval(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, WaveformState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache(&self) -> MutexGuard<'_, LruCache<Fingerprint, Vec<f32>>> {
        self.inner.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuild the waveform for `track`
    ///
    /// Returns once every chunk has been appended, or early when `token`
    /// is superseded. The reveal timer keeps running after this returns.
    /// Resolution failures leave an empty, completed waveform.
    pub async fn load(&self, track: &Track, token: &GenerationToken) {
        self.cancel_reveal();
        {
            let mut state = self.state();
            if !token.is_current() {
                return;
            }
            *state = WaveformState {
                loading: true,
                ..WaveformState::default()
            };
        }

        let fingerprint = track.fingerprint();
        let samples = self.resolve(track).await;

        let total = samples.len();
        {
            let mut state = self.state();
            if !token.is_current() {
                debug!("Dropping waveform for superseded track {}", fingerprint);
                return;
            }
            state.total = total;
            if total == 0 {
                state.loading = false;
                return;
            }
        }

        self.spawn_reveal(token.clone(), fingerprint);

        for (i, chunk) in samples.chunks(self.inner.chunk_size).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.inner.chunk_delay).await;
            }

            let loaded = {
                let mut state = self.state();
                if !token.is_current() {
                    return;
                }
                state.samples.extend_from_slice(chunk);
                state.samples.len()
            };
            self.inner
                .events
                .emit(PlayerEvent::WaveformProgress { loaded, total });
        }
    }

    /// Stop the reveal and clear the waveform (no current track)
    pub fn reset(&self) {
        self.cancel_reveal();
        *self.state() = WaveformState::default();
    }

    pub fn snapshot(&self) -> WaveformSnapshot {
        let state = self.state();
        WaveformSnapshot {
            samples: state.samples.clone(),
            revealed: state.revealed,
            total: state.total,
            loading: state.loading,
        }
    }

    /// Warm the cache for upcoming tracks in the background
    ///
    /// Best effort: failures are logged and never reach the caller. The
    /// track list is a copy, so the queue is never touched.
    pub fn prefetch(&self, tracks: Vec<Track>) {
        let capacity = self.cache().cap().get();
        let pending: Vec<Track> = tracks
            .into_iter()
            .filter(|track| !self.has_waveform(track))
            .take(capacity)
            .collect();
        if pending.is_empty() {
            return;
        }

        let driver = self.clone();
        tokio::spawn(async move {
            for track in pending {
                let fingerprint = track.fingerprint();
                if driver.is_cached(&fingerprint) {
                    continue;
                }
                match driver
                    .inner
                    .engine
                    .extract_waveform(track.path.clone(), driver.inner.sample_count)
                    .await
                {
                    Ok(samples) if !samples.is_empty() => {
                        driver.cache().put(fingerprint, sanitize(samples));
                    }
                    Ok(_) => debug!("Engine returned no waveform for {}", fingerprint),
                    Err(e) => warn!("Waveform pre-fetch failed for {}: {}", fingerprint, e),
                }
            }
        });
    }

    /// Whether a cached waveform exists for `fingerprint`
    pub fn is_cached(&self, fingerprint: &Fingerprint) -> bool {
        self.cache().contains(fingerprint)
    }

    fn has_waveform(&self, track: &Track) -> bool {
        let payload_ok = track
            .waveform
            .as_deref()
            .is_some_and(|payload| parse_payload(payload).is_ok());
        payload_ok || self.is_cached(&track.fingerprint())
    }

    async fn resolve(&self, track: &Track) -> Vec<f32> {
        let fingerprint = track.fingerprint();

        if let Some(payload) = track.waveform.as_deref() {
            match parse_payload(payload) {
                Ok(samples) => return samples,
                Err(e) => warn!("{} for {}, extracting instead", e, fingerprint),
            }
        }

        let cached = self.cache().get(&fingerprint).cloned();
        if let Some(samples) = cached {
            return samples;
        }

        match self
            .inner
            .engine
            .extract_waveform(track.path.clone(), self.inner.sample_count)
            .await
        {
            Ok(samples) => {
                let samples = sanitize(samples);
                if !samples.is_empty() {
                    self.cache().put(fingerprint, samples.clone());
                }
                samples
            }
            Err(e) => {
                warn!("Waveform extraction failed for {}: {}", fingerprint, e);
                self.inner.events.emit(PlayerEvent::Error {
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    fn cancel_reveal(&self) {
        let mut reveal = self.inner.reveal.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = reveal.take() {
            handle.abort();
        }
    }

    fn spawn_reveal(&self, token: GenerationToken, fingerprint: Fingerprint) {
        let mut reveal = self.inner.reveal.lock().unwrap_or_else(PoisonError::into_inner);
        if !token.is_current() {
            return;
        }
        if let Some(previous) = reveal.take() {
            previous.abort();
        }

        let driver = self.clone();
        let period = self.inner.reveal_interval;
        *reveal = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let finished = {
                    let mut state = driver.state();
                    if !token.is_current() {
                        return;
                    }
                    if state.revealed < state.samples.len() {
                        state.revealed += 1;
                    }
                    let done = state.total > 0 && state.revealed >= state.total;
                    if done {
                        state.loading = false;
                    }
                    done
                };
                if finished {
                    driver
                        .inner
                        .events
                        .emit(PlayerEvent::WaveformRevealed { fingerprint });
                    return;
                }
            }
        }));
    }
}
