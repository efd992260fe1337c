//! Transmitter task
//!
//! Owns a [`Sequencer`] on a tokio task and turns its delays into timers.
//! Callers talk to it through a cheap, cloneable [`Transmitter`] handle:
//! commands go in over an mpsc channel, progress comes out on the
//! [`EventBus`] and as a [`watch`] snapshot for polling UIs.
//!
//! Deadlines are chained from the previous deadline rather than from "now",
//! so scheduling jitter never accumulates across a long message.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::audio::{ToneDriver, NORMAL_FREQUENCY_HZ, PRIORITY_FREQUENCY_HZ};
use crate::history::HistoryStore;
use crate::sequencer::{Next, Rejected, Sequencer, Snapshot, Step, Timing, TransmissionPlan};
use crate::service::events::{Event, EventBus};
use crate::transform::TransformParams;
use crate::types::TransformMode;

/// One message to key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    pub text: String,
    pub mode: TransformMode,
    pub params: TransformParams,
    /// Key at the priority frequency
    pub priority: bool,
}

impl TransmitRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: TransformMode::None,
            params: TransformParams::default(),
            priority: false,
        }
    }
}

/// Tone frequencies for the two priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequencies {
    pub normal_hz: u32,
    pub priority_hz: u32,
}

impl Default for Frequencies {
    fn default() -> Self {
        Self {
            normal_hz: NORMAL_FREQUENCY_HZ,
            priority_hz: PRIORITY_FREQUENCY_HZ,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransmitError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A transmission is already running")]
    Busy,

    #[error("Transmitter has shut down")]
    Closed,
}

impl From<Rejected> for TransmitError {
    fn from(rejected: Rejected) -> Self {
        match rejected {
            Rejected::EmptyMessage => TransmitError::EmptyMessage,
            Rejected::Busy => TransmitError::Busy,
        }
    }
}

type Reply = oneshot::Sender<Result<String, TransmitError>>;

enum Command {
    Transmit {
        request: TransmitRequest,
        reply: Option<Reply>,
    },
    Shutdown,
}

/// Handle to the transmitter task
#[derive(Clone)]
pub struct Transmitter {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Snapshot>,
}

impl Transmitter {
    /// Spawn the task on the current tokio runtime
    ///
    /// `audio` is called from the task for every pulse and must not block.
    pub fn spawn(
        timing: Timing,
        frequencies: Frequencies,
        audio: Arc<dyn ToneDriver>,
        history: Arc<dyn HistoryStore>,
        bus: EventBus,
    ) -> (Self, JoinHandle<()>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(Snapshot::default());

        let task = TransmitterTask {
            sequencer: Sequencer::new(timing),
            frequencies,
            audio,
            history,
            bus,
            snapshot: snapshot_tx,
            deadline: None,
        };
        let handle = tokio::spawn(task.run(receiver));

        (Self { commands, snapshot }, handle)
    }

    /// Start a transmission and wait for the verdict
    ///
    /// Returns the transmission id once keying has begun. Completion is
    /// reported on the event bus.
    pub async fn transmit(&self, request: TransmitRequest) -> Result<String, TransmitError> {
        let (reply, verdict) = oneshot::channel();
        self.commands
            .send(Command::Transmit {
                request,
                reply: Some(reply),
            })
            .map_err(|_| TransmitError::Closed)?;
        verdict.await.map_err(|_| TransmitError::Closed)?
    }

    /// Queue a transmission without waiting; rejections are only logged
    pub fn submit(&self, request: TransmitRequest) {
        let command = Command::Transmit {
            request,
            reply: None,
        };
        if self.commands.send(command).is_err() {
            tracing::debug!("Transmit submitted after shutdown");
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.snapshot.borrow().active
    }

    /// Stop the task; a running transmission is abandoned unlogged
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

struct TransmitterTask {
    sequencer: Sequencer,
    frequencies: Frequencies,
    audio: Arc<dyn ToneDriver>,
    history: Arc<dyn HistoryStore>,
    bus: EventBus,
    snapshot: watch::Sender<Snapshot>,
    deadline: Option<Instant>,
}

impl TransmitterTask {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Transmit { request, reply }) => {
                        let outcome = self.start(request).await;
                        if let Some(reply) = reply {
                            let _ = reply.send(outcome);
                        }
                    }
                    Some(Command::Shutdown) | None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    let base = self.deadline.take().unwrap_or_else(Instant::now);
                    if let Some(step) = self.sequencer.advance() {
                        self.apply(step, base).await;
                    }
                }
            }
        }

        if self.sequencer.is_active() {
            tracing::warn!("Transmitter stopped mid-transmission");
        }
        tracing::debug!("Transmitter task finished");
    }

    async fn start(&mut self, request: TransmitRequest) -> Result<String, TransmitError> {
        let frequency_hz = if request.priority {
            self.frequencies.priority_hz
        } else {
            self.frequencies.normal_hz
        };
        let plan =
            TransmissionPlan::prepare(&request.text, request.mode, &request.params, frequency_hz);
        let id = plan.id.clone();

        match self.sequencer.start(plan) {
            Ok(step) => {
                tracing::info!(
                    transmission_id = %id,
                    mode = %request.mode,
                    priority = request.priority,
                    "Transmission started"
                );
                self.apply(step, Instant::now()).await;
                Ok(id)
            }
            Err(rejected) => {
                tracing::debug!(?rejected, "Transmit request ignored");
                Err(rejected.into())
            }
        }
    }

    /// Log, sound, publish, then arm the next deadline
    async fn apply(&mut self, step: Step, base: Instant) {
        // The entry is logged before anyone hears about completion
        if let Next::Complete(entry) = &step.next {
            self.history.append(entry.clone()).await;
        }

        for event in step.events {
            if let Event::FlashBegin {
                frequency_hz,
                duration_ms,
                ..
            } = &event
            {
                self.audio
                    .tone(*frequency_hz, Duration::from_millis(*duration_ms));
            }
            self.bus.emit(event);
        }

        self.snapshot.send_replace(self.sequencer.snapshot());

        self.deadline = match step.next {
            Next::Wait(delay) => Some(base + delay),
            Next::Complete(_) => {
                tracing::info!("Transmission completed");
                None
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingDriver;
    use crate::history::MemoryHistoryStore;
    use crate::service::events::EventReceiver;

    struct Harness {
        transmitter: Transmitter,
        handle: JoinHandle<()>,
        audio: RecordingDriver,
        history: Arc<MemoryHistoryStore>,
        events: EventReceiver,
    }

    fn harness() -> Harness {
        let audio = RecordingDriver::new();
        let history = Arc::new(MemoryHistoryStore::new());
        let bus = EventBus::default();
        let events = bus.subscribe();
        let (transmitter, handle) = Transmitter::spawn(
            Timing::default(),
            Frequencies::default(),
            Arc::new(audio.clone()),
            history.clone(),
            bus,
        );
        Harness {
            transmitter,
            handle,
            audio,
            history,
            events,
        }
    }

    async fn wait_for_completion(events: &mut EventReceiver, id: &str) -> Vec<Event> {
        let mut seen = Vec::new();
        loop {
            let event = events.recv().await.unwrap();
            let done = matches!(
                &event,
                Event::TransmissionCompleted { transmission_id, .. } if transmission_id == id
            );
            seen.push(event);
            if done {
                return seen;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sos_keys_nine_tones_and_logs_once() {
        let mut h = harness();
        let started = Instant::now();

        let id = h.transmitter.transmit(TransmitRequest::new("SOS")).await.unwrap();
        let events = wait_for_completion(&mut h.events, &id).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(6300), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(6400), "{:?}", elapsed);

        let tones = h.audio.tones();
        assert_eq!(tones.len(), 9);
        assert!(tones.iter().all(|t| t.frequency_hz == NORMAL_FREQUENCY_HZ));
        assert_eq!(tones[3].duration, Duration::from_millis(600));

        let history = h.history.all().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].plaintext, "SOS");

        assert!(matches!(events[0], Event::TransmissionStarted { .. }));
        assert!(!h.transmitter.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_while_busy_is_rejected() {
        let mut h = harness();

        let id = h.transmitter.transmit(TransmitRequest::new("A")).await.unwrap();
        assert!(h.transmitter.is_active());
        assert_eq!(
            h.transmitter.transmit(TransmitRequest::new("B")).await,
            Err(TransmitError::Busy)
        );

        wait_for_completion(&mut h.events, &id).await;
        let history = h.history.all().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].plaintext, "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_request_does_nothing() {
        let h = harness();

        assert_eq!(
            h.transmitter.transmit(TransmitRequest::new("   ")).await,
            Err(TransmitError::EmptyMessage)
        );
        assert!(h.history.all().await.is_empty());
        assert!(h.audio.tones().is_empty());
        assert!(!h.transmitter.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_priority_uses_priority_frequency() {
        let mut h = harness();
        let mut request = TransmitRequest::new("ET");
        request.priority = true;

        let id = h.transmitter.transmit(request).await.unwrap();
        wait_for_completion(&mut h.events, &id).await;

        let tones = h.audio.tones();
        assert_eq!(tones.len(), 2);
        assert!(tones.iter().all(|t| t.frequency_hz == PRIORITY_FREQUENCY_HZ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_only_message_is_logged_without_tones() {
        let mut h = harness();

        let id = h.transmitter.transmit(TransmitRequest::new("###")).await.unwrap();
        wait_for_completion(&mut h.events, &id).await;

        assert!(h.audio.tones().is_empty());
        assert_eq!(h.history.all().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_tracks_lamp() {
        let h = harness();

        h.transmitter.transmit(TransmitRequest::new("T")).await.unwrap();
        let snapshot = h.transmitter.snapshot();
        assert!(snapshot.active);
        assert!(snapshot.flashing);
        assert_eq!(snapshot.character, Some('T'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_task() {
        let h = harness();
        h.transmitter.shutdown();
        h.handle.await.unwrap();

        assert_eq!(
            h.transmitter.transmit(TransmitRequest::new("E")).await,
            Err(TransmitError::Closed)
        );
    }
}
