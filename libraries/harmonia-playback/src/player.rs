//! Composition root
//!
//! Wires the transport, queue manager, waveform driver and finish
//! coordinator around one engine handle, one event bus and one generation
//! counter.

use crate::config::PlaybackConfig;
use crate::coordinator::FinishCoordinator;
use crate::engine::{AudioEngine, EngineClient, EngineEvent};
use crate::error::Result;
use crate::events::{EventBus, PlayerEvent};
use crate::generation::GenerationCounter;
use crate::manager::QueueManager;
use crate::transport::Transport;
use crate::waveform::WaveformDriver;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

/// Playback core for one output device
pub struct Player {
    config: PlaybackConfig,
    events: EventBus,
    transport: Transport,
    queue: QueueManager,
    waveform: WaveformDriver,
    coordinator: FinishCoordinator,
    listener: Option<JoinHandle<()>>,
}

impl Player {
    /// Build the components without touching the engine
    pub fn new(engine: Arc<dyn AudioEngine>, config: PlaybackConfig) -> Self {
        let events = EventBus::new();
        let generation = GenerationCounter::new();
        let client = EngineClient::new(engine, config.engine_timeout());

        let waveform = WaveformDriver::new(client.clone(), events.clone(), &config);
        let transport = Transport::new(
            client,
            waveform.clone(),
            generation,
            events.clone(),
            &config,
        );
        let queue = QueueManager::new(transport.clone(), waveform.clone(), events.clone());
        let coordinator = FinishCoordinator::new(queue.clone(), transport.clone());

        Self {
            config,
            events,
            transport,
            queue,
            waveform,
            coordinator,
            listener: None,
        }
    }

    /// Validate `config`, restore the saved volume and start listening
    /// for engine notifications on `finished`
    pub async fn start(
        engine: Arc<dyn AudioEngine>,
        config: PlaybackConfig,
        finished: mpsc::Receiver<EngineEvent>,
    ) -> Result<Self> {
        config.validate()?;

        let mut player = Self::new(engine, config);
        player.transport.hydrate_volume().await;
        player.listener = Some(player.coordinator.clone().spawn(finished));

        info!("Player started (volume {})", player.transport.volume());
        Ok(player)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn queue(&self) -> &QueueManager {
        &self.queue
    }

    pub fn waveform(&self) -> &WaveformDriver {
        &self.waveform
    }

    pub fn coordinator(&self) -> &FinishCoordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Subscribe to player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Set the shuffle flag and queue order together
    pub fn set_shuffle(&self, enabled: bool) {
        self.queue.set_shuffle(enabled);
    }

    /// Stop listening and release the engine stream
    pub async fn shutdown(mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        self.transport.cleanup().await;
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
