//! Queue manager
//!
//! Couples the play queue with the transport: selecting a queue position
//! makes it current and initializes playback. Every mutation is published
//! as `QueueChanged` and, where it changes what comes next, triggers a
//! background waveform pre-fetch for the upcoming tracks.

use crate::error::Result;
use crate::events::{EventBus, PlayerEvent};
use crate::queue::Queue;
use crate::transport::Transport;
use crate::types::{QueueSnapshot, RepeatMode};
use crate::waveform::WaveformDriver;
use harmonia_core::{songs_for, Fingerprint, LibrarySelection, LibraryService, Track};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Where a finished notification landed in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FinishedPosition {
    pub index: usize,
    pub is_last: bool,
}

struct QueueInner {
    queue: Mutex<Queue>,
    transport: Transport,
    waveform: WaveformDriver,
    events: EventBus,
}

/// Play queue plus the operations that start playback from it
#[derive(Clone)]
pub struct QueueManager {
    inner: Arc<QueueInner>,
}

impl QueueManager {
    pub(crate) fn new(transport: Transport, waveform: WaveformDriver, events: EventBus) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                queue: Mutex::new(Queue::default()),
                transport,
                waveform,
                events,
            }),
        }
    }

    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.inner.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, queue: &Queue) {
        self.inner.events.emit(PlayerEvent::QueueChanged {
            length: queue.len(),
            current_index: queue.current_index(),
        });
    }

    /// Run `f` against the queue and publish the result
    fn mutate<T>(&self, f: impl FnOnce(&mut Queue) -> T) -> T {
        let mut queue = self.queue();
        let result = f(&mut queue);
        self.publish(&queue);
        result
    }

    // ===== Queue Management =====

    /// Insert `track` at `position` (append when `None` or past the end)
    ///
    /// Returns the index the track landed at. Upcoming waveforms are
    /// pre-fetched in the background.
    pub fn enqueue(&self, track: Track, position: Option<usize>) -> usize {
        let (index, upcoming) = self.mutate(|queue| {
            let index = queue.enqueue(track, position);
            (index, queue.upcoming().to_vec())
        });
        self.inner.waveform.prefetch(upcoming);
        index
    }

    /// Remove the track at `index`
    ///
    /// Removing the current track leaves the queue without a current
    /// position; playback is not affected.
    pub fn dequeue(&self, index: usize) -> Option<Track> {
        self.mutate(|queue| queue.dequeue(index))
    }

    /// Move a track; out-of-range indices are ignored
    pub fn reorder(&self, from: usize, to: usize) -> bool {
        self.mutate(|queue| queue.reorder(from, to))
    }

    pub fn clear(&self) {
        self.mutate(Queue::clear);
    }

    /// Shuffle everything except the current track, which moves to the front
    pub fn shuffle(&self) {
        self.mutate(|queue| queue.shuffle());
    }

    /// Restore the order from before the first shuffle
    pub fn unshuffle(&self) {
        self.mutate(Queue::unshuffle);
    }

    /// Set the shuffle flag and reorder the queue in one step
    pub fn set_shuffle(&self, enabled: bool) {
        self.inner.transport.set_shuffle_flag(enabled);
        if enabled {
            self.shuffle();
        } else {
            self.unshuffle();
        }
    }

    /// Replace the whole queue; nothing starts playing
    pub fn replace(&self, tracks: Vec<Track>) {
        self.mutate(|queue| queue.replace(tracks));
    }

    /// Replace the queue with the songs of a folder or playlist
    ///
    /// Returns the new queue length. Playback is not started.
    pub async fn load_from_library(
        &self,
        library: &dyn LibraryService,
        selection: LibrarySelection,
    ) -> Result<usize> {
        let tracks = songs_for(library, selection).await?;
        let count = tracks.len();
        info!("Loaded {} tracks from {:?}", count, selection);
        self.replace(tracks);
        Ok(count)
    }

    // ===== Playback Control =====

    /// Play `track`, selecting it in the queue or appending it first
    pub async fn play_track(&self, track: Track) -> Result<()> {
        self.mutate(|queue| queue.select_or_append(&track));
        self.inner.transport.initialize(track).await
    }

    /// Play the track at `index`; out of range is a no-op
    pub async fn play_at_index(&self, index: usize) -> Result<()> {
        let selected = self.mutate(|queue| {
            if !queue.set_current(index) {
                return None;
            }
            queue
                .current()
                .cloned()
                .map(|track| (track, queue.upcoming().to_vec()))
        });

        let Some((track, upcoming)) = selected else {
            debug!("Ignoring play_at_index({}) outside the queue", index);
            return Ok(());
        };

        self.inner.waveform.prefetch(upcoming);
        self.inner.transport.initialize(track).await
    }

    /// Play the next track, wrapping to the start under repeat All
    pub async fn play_next(&self) -> Result<()> {
        let repeat = self.inner.transport.repeat();
        let target = {
            let queue = self.queue();
            match queue.current_index() {
                Some(current) if current + 1 < queue.len() => Some(current + 1),
                Some(_) if repeat == RepeatMode::All => Some(0),
                _ => None,
            }
        };

        match target {
            Some(index) => self.play_at_index(index).await,
            None => Ok(()),
        }
    }

    /// Play the previous track, wrapping to the end under repeat All
    pub async fn play_previous(&self) -> Result<()> {
        let repeat = self.inner.transport.repeat();
        let target = {
            let queue = self.queue();
            match queue.current_index() {
                Some(current) if current > 0 => Some(current - 1),
                Some(_) if repeat == RepeatMode::All => queue.len().checked_sub(1),
                _ => None,
            }
        };

        match target {
            Some(index) => self.play_at_index(index).await,
            None => Ok(()),
        }
    }

    // ===== State Queries =====

    /// Set the current index without starting playback
    pub fn set_current_index(&self, index: usize) -> bool {
        self.mutate(|queue| queue.set_current(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.queue().current_index()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.queue().current().cloned()
    }

    /// First queue position holding `fingerprint`
    pub fn position_of(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.queue().position_of(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.queue().snapshot()
    }

    /// Resolve and adopt the queue position of a finished track
    ///
    /// Prefers the current index when it holds `fingerprint`, then the first
    /// position holding it, then the current index as-is.
    pub(crate) fn reconcile_finished(&self, fingerprint: &Fingerprint) -> Option<FinishedPosition> {
        let mut queue = self.queue();
        let current = queue.current_index();
        let current_matches = current
            .and_then(|index| queue.get(index))
            .is_some_and(|track| track.matches(fingerprint));

        let index = if current_matches {
            current?
        } else {
            queue.position_of(fingerprint).or(current)?
        };

        if current != Some(index) {
            debug!("Adopting queue index {} for finished {}", index, fingerprint);
            queue.set_current(index);
            self.publish(&queue);
        }

        Some(FinishedPosition {
            index,
            is_last: index + 1 == queue.len(),
        })
    }
}
