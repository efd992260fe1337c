//! Test keybinding mappings to actions
//!
//! Verifies that keyboard input is mapped to actions through the reducer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use libmorsecast::TransformMode;
use morse_tui::app::{key_action, reduce, Action, AppState, Screen};

fn key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn press(state: AppState, code: KeyCode) -> AppState {
    reduce(state, Action::Key(key_event(code, KeyModifiers::NONE)))
}

#[test]
fn test_ctrl_c_always_quits() {
    let mut state = AppState::new();
    state.composer.transmitting = true;

    let key = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(reduce(state, Action::Key(key)).should_quit);
}

#[test]
fn test_q_quits_outside_text_entry() {
    let state = press(AppState::new(), KeyCode::F(2));
    assert_eq!(state.current_screen, Screen::History);

    let state = press(state, KeyCode::Char('q'));
    assert!(state.should_quit);
}

#[test]
fn test_q_is_text_on_terminal_screen() {
    let state = press(AppState::new(), KeyCode::Char('q'));
    assert!(!state.should_quit);
}

#[test]
fn test_q_does_not_quit_while_transmitting() {
    let mut state = press(AppState::new(), KeyCode::F(2));
    state.composer.transmitting = true;

    let state = press(state, KeyCode::Char('q'));
    assert!(!state.should_quit);
}

#[test]
fn test_f1_toggles_help() {
    let state = AppState::new();
    assert!(!state.help_visible);

    let state = press(state, KeyCode::F(1));
    assert!(state.help_visible);

    let state = press(state, KeyCode::F(1));
    assert!(!state.help_visible);
}

#[test]
fn test_function_keys_navigate() {
    let state = press(AppState::new(), KeyCode::F(3));
    assert_eq!(state.current_screen, Screen::Decoder);

    let state = press(state, KeyCode::F(2));
    assert_eq!(state.current_screen, Screen::History);

    let state = press(state, KeyCode::F(4));
    assert_eq!(state.current_screen, Screen::Terminal);
}

#[test]
fn test_settings_keys() {
    let state = press(AppState::new(), KeyCode::F(5));
    assert_eq!(state.settings.mode, TransformMode::Shift);

    let state = press(state, KeyCode::F(6));
    assert!(state.settings.priority);

    let audio = state.settings.audio;
    let state = press(state, KeyCode::F(7));
    assert_eq!(state.settings.audio, !audio);

    let shift = state.settings.shift;
    let state = press(state, KeyCode::F(9));
    assert_eq!(state.settings.shift, (shift + 1) % 26);
    let state = press(state, KeyCode::F(8));
    assert_eq!(state.settings.shift, shift);
}

#[test]
fn test_ctrl_t_needs_a_message() {
    let state = AppState::new();
    let ctrl_t = key_event(KeyCode::Char('t'), KeyModifiers::CONTROL);
    assert_eq!(key_action(&state, ctrl_t), None);

    let state = reduce(state, Action::ComposerInputChanged("CQ".to_string()));
    assert_eq!(key_action(&state, ctrl_t), Some(Action::TransmitRequested));

    let state = reduce(state, Action::Key(ctrl_t));
    assert!(state.composer.transmitting);
    assert_eq!(key_action(&state, ctrl_t), None);
}

#[test]
fn test_esc_dismisses_error_before_help() {
    let mut state = AppState::new();
    state.help_visible = true;
    state.error = Some("boom".to_string());

    let state = press(state, KeyCode::Esc);
    assert!(state.error.is_none());
    assert!(state.help_visible);

    let state = press(state, KeyCode::Esc);
    assert!(!state.help_visible);
}

#[test]
fn test_esc_clears_status() {
    let state = reduce(AppState::new(), Action::SetStatus("hello".to_string()));
    let state = press(state, KeyCode::Esc);
    assert!(state.status.message.is_none());
}
