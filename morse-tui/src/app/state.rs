//! Application state
//!
//! One root struct made of independent slices. Each slice is only touched
//! by its own actions in the reducer (see `reducer.rs`).

use super::actions::Screen;
use libmorsecast::config::Config;
use libmorsecast::sequencer::Snapshot;
use libmorsecast::transform::TransformParams;
use libmorsecast::{HistoryEntry, TransformMode};

/// Root application state
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub should_quit: bool,
    pub current_screen: Screen,
    pub help_visible: bool,
    pub composer: ComposerState,
    pub lamp: LampState,
    pub settings: SettingsState,
    pub history: HistoryState,
    pub decoder: DecoderState,
    pub sanity: SanityState,
    pub possession: PossessionState,
    pub konami: KonamiState,
    pub theme: Theme,
    pub status: StatusBarState,
    pub error: Option<String>,
    pub config: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerState {
    pub content: String,
    /// A transmission is in flight; input is locked
    pub transmitting: bool,
}

/// Signal lamp, fed by transmitter events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LampState {
    pub transmission_id: Option<String>,
    pub display_text: String,
    pub mode: TransformMode,
    pub snapshot: Snapshot,
    /// Pulses keyed in the current transmission
    pub flashes: usize,
    pub last_completed: Option<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    pub mode: TransformMode,
    pub shift: u8,
    pub xor_key: String,
    pub priority: bool,
    pub audio: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryState {
    /// Most recent last
    pub entries: Vec<HistoryEntry>,
    pub cap: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderState {
    pub input: String,
    pub output: String,
}

/// Operator sanity, drained by time and restored by transmitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityState {
    pub value: u32,
    pub max: u32,
    pub decay_ms: u64,
    pub restore: u32,
    /// Time accumulated towards the next decay point
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossessionState {
    pub active: bool,
    pub remaining_ms: u64,
    pub duration_ms: u64,
}

/// Progress through the Konami sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KonamiState {
    pub progress: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Amber,
    Phosphor,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Amber => Theme::Phosphor,
            Theme::Phosphor => Theme::Amber,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Amber => "amber",
            Theme::Phosphor => "phosphor",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBarState {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub colors_enabled: bool,
    pub tick_rate_ms: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Default for SettingsState {
    fn default() -> Self {
        let params = TransformParams::default();
        Self {
            mode: TransformMode::None,
            shift: params.shift,
            xor_key: params.xor_key,
            priority: false,
            audio: true,
        }
    }
}

impl SanityState {
    pub fn new(max: u32, decay_ms: u64, restore: u32) -> Self {
        Self {
            value: max,
            max,
            decay_ms,
            restore,
            elapsed_ms: 0,
        }
    }
}

impl PossessionState {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            active: false,
            remaining_ms: 0,
            duration_ms,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let colors_enabled = std::env::var_os("NO_COLOR").is_none()
            && std::env::var_os("MORSECAST_TUI_NO_COLOR").is_none();

        Self {
            should_quit: false,
            current_screen: Screen::Terminal,
            help_visible: false,
            composer: ComposerState::default(),
            lamp: LampState::default(),
            settings: SettingsState {
                mode: config.defaults.mode,
                shift: config.defaults.shift % 26,
                xor_key: config.defaults.xor_key.clone(),
                priority: config.defaults.priority,
                audio: config.audio.enabled,
            },
            history: HistoryState {
                entries: Vec::new(),
                cap: config.defaults.history_display,
            },
            decoder: DecoderState::default(),
            sanity: SanityState::new(
                config.ui.sanity_start,
                config.ui.sanity_decay_ms,
                config.ui.sanity_restore,
            ),
            possession: PossessionState::new(config.ui.possession_ms),
            konami: KonamiState::default(),
            theme: Theme::default(),
            status: StatusBarState::default(),
            error: None,
            config: UiConfig {
                colors_enabled,
                tick_rate_ms: config.ui.tick_rate_ms.max(1),
            },
        }
    }

    /// Ctrl+T is live: there is something to send and nothing in flight
    pub fn can_transmit(&self) -> bool {
        !self.composer.transmitting && !self.composer.content.trim().is_empty()
    }

    /// Typed characters go to a text area rather than the keymap
    pub fn in_text_entry(&self) -> bool {
        let overlay = self.help_visible || self.error.is_some();
        !overlay && matches!(self.current_screen, Screen::Terminal | Screen::Decoder)
    }

    pub fn transform_params(&self) -> TransformParams {
        TransformParams {
            shift: self.settings.shift,
            xor_key: self.settings.xor_key.clone(),
        }
    }
}
