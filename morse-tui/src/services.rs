//! Service layer adapter for TUI
//!
//! Bridges the async [`MorsecastService`] to the synchronous event loop.
//!
//! # Architecture
//!
//! - `ServiceHandle`: Wraps MorsecastService and owns the tokio runtime
//! - Transmitting: spawns the request on the runtime; rejections come back
//!   over a crossbeam channel
//! - Events: bridges the tokio broadcast channel to crossbeam
//!
//! # Example
//!
//! ```no_run
//! use libmorsecast::Config;
//! use morse_tui::services::ServiceHandle;
//!
//! # fn example() -> morse_tui::error::Result<()> {
//! let services = ServiceHandle::new(Config::default())?;
//! let events = services.subscribe();
//!
//! services.transmit(services.request("CQ CQ"));
//! if let Ok(event) = events.try_recv() {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use libmorsecast::service::events::Event;
use libmorsecast::service::MorsecastService;
use libmorsecast::transmitter::TransmitRequest;
use libmorsecast::{Config, HistoryEntry};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Service handle for TUI operations
pub struct ServiceHandle {
    service: Arc<MorsecastService>,
    runtime: tokio::runtime::Runtime,
    rejections_tx: Sender<String>,
    rejections_rx: Receiver<String>,
}

impl ServiceHandle {
    /// Start the runtime and the service on it
    ///
    /// # Errors
    ///
    /// Returns an error if the tokio runtime cannot be created. An
    /// unusable database is not an error: history then lives in memory.
    pub fn new(config: Config) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let service = runtime.block_on(MorsecastService::from_config(config))?;

        if !service.is_persistent() {
            tracing::warn!("Running without a transmission log");
        }

        let (rejections_tx, rejections_rx) = unbounded();
        Ok(Self {
            service: Arc::new(service),
            runtime,
            rejections_tx,
            rejections_rx,
        })
    }

    /// Subscribe to service events
    ///
    /// Bridges the tokio broadcast channel to a crossbeam channel the event
    /// loop can drain with `try_recv`.
    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = unbounded();

        let mut event_rx = self.service.subscribe();
        self.runtime.spawn(async move {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Event receiver lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        rx
    }

    /// Messages for transmissions the transmitter refused
    pub fn rejections(&self) -> Receiver<String> {
        self.rejections_rx.clone()
    }

    /// A request for `text` using the configured defaults
    pub fn request(&self, text: impl Into<String>) -> TransmitRequest {
        self.service.request(text)
    }

    /// Hand a request to the transmitter without blocking the UI
    pub fn transmit(&self, request: TransmitRequest) {
        let service = Arc::clone(&self.service);
        let rejections = self.rejections_tx.clone();

        self.runtime.spawn(async move {
            let result = service.transmit(request).await;
            drop(service);
            match result {
                Ok(id) => tracing::debug!("Transmission {} accepted", id),
                Err(e) => {
                    let _ = rejections.send(e.to_string());
                }
            }
        });
    }

    /// Recent history, most recent last
    pub fn recent_history(&self) -> Vec<HistoryEntry> {
        self.runtime.block_on(self.service.recent_history())
    }

    pub fn set_audio_enabled(&self, enabled: bool) {
        self.service.set_audio_enabled(enabled);
    }

    /// Whether transmissions are written to the database
    pub fn is_persistent(&self) -> bool {
        self.service.is_persistent()
    }

    pub fn config(&self) -> &Config {
        self.service.config()
    }

    /// Stop the transmitter and close the store
    ///
    /// If a transmit call is still in flight the runtime is dropped instead,
    /// which cancels it along with the transmitter task.
    pub fn shutdown(self) {
        let Self { service, runtime, .. } = self;
        match Arc::try_unwrap(service) {
            Ok(service) => runtime.block_on(service.close()),
            Err(_) => tracing::warn!("Service still in use at shutdown, dropping runtime"),
        }
    }
}
