//! Service layer for Morsecast
//!
//! One entry point shared by every interface (CLI tools and the terminal
//! UI) so none of them wire storage, audio and the transmitter by hand.
//!
//! # Architecture
//!
//! `MorsecastService` owns:
//!
//! - the [`KvStore`] (when one could be opened) and the [`HistoryStore`] over it
//! - a [`ToneGate`] around the configured audio driver
//! - the [`Transmitter`] task and the [`EventBus`] it publishes on
//!
//! # Example
//!
//! ```no_run
//! use libmorsecast::service::MorsecastService;
//!
//! # async fn example() -> libmorsecast::Result<()> {
//! let service = MorsecastService::new().await?;
//! let mut events = service.subscribe();
//!
//! let request = service.request("CQ CQ");
//! if let Ok(id) = service.transmit(request).await {
//!     println!("Keying {}", id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod events;

use std::sync::Arc;
use tokio::task::JoinHandle;

use self::events::{EventBus, EventReceiver};
use crate::audio::{driver_from_name, ToneDriver, ToneGate};
use crate::history::{HistoryStore, KvHistoryStore, MemoryHistoryStore};
use crate::sequencer::Snapshot;
use crate::store::KvStore;
use crate::symbols;
use crate::transmitter::{Frequencies, TransmitError, TransmitRequest, Transmitter};
use crate::types::HistoryEntry;
use crate::{Config, Result};

/// Main service facade
pub struct MorsecastService {
    config: Arc<Config>,
    store: Option<KvStore>,
    history: Arc<dyn HistoryStore>,
    audio: ToneGate,
    transmitter: Transmitter,
    task: JoinHandle<()>,
    event_bus: EventBus,
}

impl MorsecastService {
    /// Create a service from the configuration at the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed. An unusable database is not an error; see [`Self::from_config`].
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Create a service with a specific configuration
    ///
    /// If the store cannot be opened the service keeps running on an
    /// in-memory log and says so once at warn level.
    pub async fn from_config(config: Config) -> Result<Self> {
        let path = config.store_path();
        let (store, history): (Option<KvStore>, Arc<dyn HistoryStore>) =
            match KvStore::open(&path).await {
                Ok(store) => (
                    Some(store.clone()),
                    Arc::new(KvHistoryStore::new(store)),
                ),
                Err(e) => {
                    tracing::warn!("Transmission log unavailable ({}), history will not persist", e);
                    (None, Arc::new(MemoryHistoryStore::new()))
                }
            };

        let driver = driver_from_name(&config.audio.driver);
        let mut service = Self::with_components(config, history, driver);
        service.store = store;
        Ok(service)
    }

    /// Assemble a service from explicit parts
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_components(
        config: Config,
        history: Arc<dyn HistoryStore>,
        driver: Arc<dyn ToneDriver>,
    ) -> Self {
        let audio = ToneGate::new(driver, config.audio.enabled);
        let event_bus = EventBus::default();
        let frequencies = Frequencies {
            normal_hz: config.audio.normal_hz,
            priority_hz: config.audio.priority_hz,
        };

        let (transmitter, task) = Transmitter::spawn(
            config.timing.to_timing(),
            frequencies,
            Arc::new(audio.clone()),
            Arc::clone(&history),
            event_bus.clone(),
        );

        Self {
            config: Arc::new(config),
            store: None,
            history,
            audio,
            transmitter,
            task,
            event_bus,
        }
    }

    /// A request for `text` using the configured defaults
    pub fn request(&self, text: impl Into<String>) -> TransmitRequest {
        let defaults = &self.config.defaults;
        TransmitRequest {
            text: text.into(),
            mode: defaults.mode,
            params: defaults.transform_params(),
            priority: defaults.priority,
        }
    }

    /// Start a transmission; returns its id once keying has begun
    pub async fn transmit(&self, request: TransmitRequest) -> std::result::Result<String, TransmitError> {
        self.transmitter.transmit(request).await
    }

    /// Start a transmission without waiting for the verdict
    pub fn submit(&self, request: TransmitRequest) {
        self.transmitter.submit(request);
    }

    pub fn history(&self) -> Arc<dyn HistoryStore> {
        Arc::clone(&self.history)
    }

    /// The entries UIs should show, capped by `defaults.history_display`
    pub async fn recent_history(&self) -> Vec<HistoryEntry> {
        self.history.recent(self.config.defaults.history_display).await
    }

    /// Subscribe to transmission events
    ///
    /// Multiple subscribers are supported; each sees events emitted after
    /// it subscribed.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.transmitter.snapshot()
    }

    pub fn is_transmitting(&self) -> bool {
        self.transmitter.is_active()
    }

    pub fn set_audio_enabled(&self, enabled: bool) {
        self.audio.set_enabled(enabled);
        tracing::debug!(enabled, "Audio toggled");
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio.is_enabled()
    }

    /// Decode whitespace-delimited pulse strings; unknown tokens become `?`
    pub fn decode(&self, input: &str) -> String {
        symbols::decode_message(input)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether history is backed by the database
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Stop the transmitter and close the store
    pub async fn close(self) {
        self.transmitter.shutdown();
        if let Err(e) = self.task.await {
            tracing::warn!("Transmitter task ended abnormally: {}", e);
        }
        if let Some(store) = self.store {
            store.close().await;
        }
    }
}
