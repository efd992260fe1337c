//! Application module
//!
//! - Actions: What can happen
//! - State: What is true right now
//! - Reducer: Pure function (State, Action) -> State
//!
//! Timers (sanity decay, possession) advance on [`Action::Tick`], so the
//! whole application clock can be driven from tests.

pub mod actions;
pub mod event;
pub mod konami;
pub mod reducer;
pub mod state;

pub use actions::{Action, Screen};
pub use reducer::{is_global_key, key_action, reduce};
pub use state::{
    AppState, ComposerState, DecoderState, HistoryState, KonamiState, LampState,
    PossessionState, SanityState, SettingsState, StatusBarState, Theme, UiConfig,
};
