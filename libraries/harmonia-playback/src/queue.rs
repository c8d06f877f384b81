//! Play queue
//!
//! An ordered list of tracks with a single current-position pointer.
//! Duplicates are allowed: position, not identity, is authoritative.
//!
//! ```text
//! tracks:        [A, B, C, B]
//! current_index:        ^ 2  (C is playing)
//! original:      []           (empty unless shuffled)
//! ```
//!
//! Out-of-range indices are silent no-ops. UI actions racing with queue
//! mutation are expected and must never crash playback.

use crate::shuffle::shuffle_around_current;
use crate::types::QueueSnapshot;
use harmonia_core::{Fingerprint, Track};
use rand::Rng;

/// Ordered play queue with shuffle snapshot
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,

    /// Invariant: `None` or `< tracks.len()`
    current_index: Option<usize>,

    /// Order captured before the first shuffle of the session
    original: Vec<Track>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at `position` (appending when absent or past the end)
    ///
    /// The current index is left alone, so inserting at or before it makes
    /// the pointer address a different track than the one playing. The
    /// finish coordinator repairs that drift when the playing track ends.
    pub fn enqueue(&mut self, track: Track, position: Option<usize>) -> usize {
        let index = position
            .filter(|&p| p <= self.tracks.len())
            .unwrap_or(self.tracks.len());
        self.tracks.insert(index, track);
        index
    }

    /// Remove the track at `index`
    ///
    /// Removing the current track leaves the pointer null; it does not stop
    /// audio.
    pub fn dequeue(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);

        if let Some(current) = self.current_index {
            if index < current {
                self.current_index = Some(current - 1);
            } else if index == current {
                self.current_index = None;
            }
        }
        Some(removed)
    }

    /// Move one track, keeping the pointer on the same logical track
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }

        let moved = self.tracks.remove(from);
        self.tracks.insert(to, moved);

        if let Some(current) = self.current_index {
            self.current_index = Some(if from == current {
                to
            } else if from < current && to >= current {
                current - 1
            } else if from > current && to <= current {
                current + 1
            } else {
                current
            });
        }
        true
    }

    /// Remove everything, including the shuffle snapshot
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = None;
        self.original.clear();
    }

    /// Replace the whole queue; nothing is current afterwards
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.current_index = None;
        self.original.clear();
    }

    /// Shuffle with the thread-local RNG
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Shuffle everything but the current track, which moves to index 0
    ///
    /// The first shuffle of a session snapshots the order for `unshuffle`;
    /// later calls reshuffle without re-snapshotting.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.tracks.is_empty() {
            return;
        }
        if self.original.is_empty() {
            self.original = self.tracks.clone();
        }

        self.tracks = shuffle_around_current(&self.tracks, self.current_index, rng);
        self.current_index = self.current_index.map(|_| 0);
    }

    /// Restore the pre-shuffle order and re-locate the current track
    pub fn unshuffle(&mut self) {
        if self.original.is_empty() {
            return;
        }

        let current = self.current().map(Track::fingerprint);
        self.tracks = std::mem::take(&mut self.original);
        self.current_index = current.and_then(|fp| self.position_of(&fp));
    }

    /// Point at `index`; out-of-range requests are ignored
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.current_index = Some(index);
            true
        } else {
            false
        }
    }

    /// First position holding the track identified by `fingerprint`
    pub fn position_of(&self, fingerprint: &Fingerprint) -> Option<usize> {
        self.tracks.iter().position(|track| track.matches(fingerprint))
    }

    /// Move to the first copy of `track`, appending it when absent
    pub fn select_or_append(&mut self, track: &Track) -> usize {
        let index = match self.position_of(&track.fingerprint()) {
            Some(index) => index,
            None => {
                self.tracks.push(track.clone());
                self.tracks.len() - 1
            }
        };
        self.current_index = Some(index);
        index
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<&Track> {
        self.current_index.and_then(|index| self.tracks.get(index))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Tracks after the current position (all tracks when nothing is current)
    pub fn upcoming(&self) -> &[Track] {
        match self.current_index {
            Some(index) => &self.tracks[(index + 1).min(self.tracks.len())..],
            None => &self.tracks,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether a shuffle snapshot is held
    pub fn is_shuffled(&self) -> bool {
        !self.original.is_empty()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            tracks: self.tracks.clone(),
            current_index: self.current_index,
            is_shuffled: self.is_shuffled(),
        }
    }
}
