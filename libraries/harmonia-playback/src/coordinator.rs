//! Advance-on-finish
//!
//! Reacts to the engine's "track finished" notification by deciding what
//! plays next: the same track (repeat One), the following queue entry, the
//! first entry (repeat All at the end), or nothing.

use crate::engine::EngineEvent;
use crate::manager::QueueManager;
use crate::transport::Transport;
use crate::types::RepeatMode;
use harmonia_core::Fingerprint;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Decision taken for a finished notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishAction {
    /// Notification did not refer to the current track
    Ignored,
    /// Nothing left to play
    Stopped,
    /// Repeat One restarted the same track
    Replayed,
    /// Moved on to the given queue index
    Advanced(usize),
    /// Repeat All wrapped to the start of the queue
    Wrapped,
}

/// Drives queue advancement from engine notifications
#[derive(Clone)]
pub struct FinishCoordinator {
    queue: QueueManager,
    transport: Transport,
}

impl FinishCoordinator {
    pub fn new(queue: QueueManager, transport: Transport) -> Self {
        Self { queue, transport }
    }

    /// Handle one "track finished" notification
    ///
    /// Playback failures of the follow-up track are logged, not returned;
    /// the decision itself is still reported.
    pub async fn handle_finished(&self, fingerprint: &Fingerprint) -> FinishAction {
        let Some(track) = self.transport.settle_finished(fingerprint) else {
            debug!("Ignoring stale finished event for {}", fingerprint);
            return FinishAction::Ignored;
        };

        let Some(position) = self.queue.reconcile_finished(fingerprint) else {
            debug!("Finished track {} has no queue position", fingerprint);
            return FinishAction::Stopped;
        };

        let (action, result) = match self.transport.repeat() {
            RepeatMode::One => (FinishAction::Replayed, self.queue.play_track(track).await),
            _ if !position.is_last => {
                let next = position.index + 1;
                (
                    FinishAction::Advanced(next),
                    self.queue.play_at_index(next).await,
                )
            }
            RepeatMode::All => (FinishAction::Wrapped, self.queue.play_at_index(0).await),
            RepeatMode::Off => {
                info!("Reached end of queue");
                return FinishAction::Stopped;
            }
        };

        if let Err(e) = result {
            error!("Failed to continue after {}: {}", fingerprint, e);
        }
        action
    }

    /// Consume engine notifications until the sender is dropped
    pub async fn run(self, mut events: mpsc::Receiver<EngineEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                EngineEvent::Finished { fingerprint } => {
                    self.handle_finished(&fingerprint).await;
                }
            }
        }
        debug!("Engine event channel closed");
    }

    /// Run the listener as a background task
    pub fn spawn(self, events: mpsc::Receiver<EngineEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
