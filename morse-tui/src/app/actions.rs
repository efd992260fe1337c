//! Actions for the reducer pattern
//!
//! All state transitions are triggered by actions. Key presses arrive as
//! [`Action::Key`] and are resolved to the higher-level actions below by
//! [`crate::app::key_action`].

use crossterm::event::KeyEvent;
use libmorsecast::sequencer::Snapshot;
use libmorsecast::service::events::Event;
use libmorsecast::{HistoryEntry, TransformMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // === UI Events ===
    /// Keyboard input event
    Key(KeyEvent),

    /// One tick of the configured tick rate
    Tick,

    /// Terminal resize event
    Resize(u16, u16),

    // === Navigation ===
    NavigateTo(Screen),
    Quit,
    ShowHelp,
    HideHelp,

    // === Composer ===
    ComposerInputChanged(String),

    /// Ctrl+T on a non-blank message while idle
    TransmitRequested,

    // === Transmission (from service events) ===
    TransmissionStarted {
        transmission_id: String,
        display_text: String,
        mode: TransformMode,
    },
    LampChanged(Snapshot),
    TransmissionCompleted(HistoryEntry),

    /// The transmitter refused the request
    TransmissionRejected(String),

    // === Settings ===
    CycleMode,
    TogglePriority,
    ToggleAudio,
    ShiftDown,
    ShiftUp,

    // === History ===
    HistoryLoaded(Vec<HistoryEntry>),

    // === Decoder ===
    DecoderInputChanged(String),

    // === Error Handling ===
    DismissError,

    // === Status Bar ===
    SetStatus(String),
    ClearStatus,
}

/// Screen/View identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Composer, signal lamp and glyph
    Terminal,

    /// Recent transmissions
    History,

    /// Manual pulse-string decoder
    Decoder,
}

impl From<Event> for Action {
    fn from(event: Event) -> Self {
        match event {
            Event::TransmissionStarted {
                transmission_id,
                display_text,
                mode,
                ..
            } => Action::TransmissionStarted {
                transmission_id,
                display_text,
                mode,
            },
            Event::FlashBegin { snapshot, .. }
            | Event::FlashEnd { snapshot, .. }
            | Event::WordGap { snapshot, .. }
            | Event::CharacterAdvanced { snapshot, .. } => Action::LampChanged(snapshot),
            Event::TransmissionCompleted { entry, .. } => Action::TransmissionCompleted(entry),
        }
    }
}
