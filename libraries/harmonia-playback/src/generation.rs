//! Track-change generations
//!
//! Every track change bumps a shared counter. Async continuations capture a
//! token when they start and turn into no-ops once a newer generation exists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic track-change counter shared by transport and waveform driver
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating every earlier token
    pub fn advance(&self) -> GenerationToken {
        let value = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        GenerationToken {
            counter: Arc::clone(&self.current),
            value,
        }
    }

    /// Token for the generation that is live right now
    pub fn token(&self) -> GenerationToken {
        GenerationToken {
            counter: Arc::clone(&self.current),
            value: self.current.load(Ordering::SeqCst),
        }
    }
}

/// Liveness token captured by an async continuation
#[derive(Debug, Clone)]
pub struct GenerationToken {
    counter: Arc<AtomicU64>,
    value: u64,
}

impl GenerationToken {
    /// Whether no newer generation has started since this token was taken
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.value
    }

    #[cfg(test)]
    pub(crate) fn value(&self) -> u64 {
        self.value
    }
}
