//! morse-tui - Terminal UI for Morsecast
//!
//! Interactive Morse terminal: compose a message, watch the signal lamp key
//! it out, browse the transmission log and decode pulse strings by hand.

use crossterm::event::KeyEvent;
use libmorsecast::transmitter::TransmitRequest;
use libmorsecast::{logging, Config};
use morse_tui::{
    app::{event::EventHandler, event::TuiEvent, is_global_key, key_action, reduce, Action, AppState, Screen},
    error::Result,
    services::ServiceHandle,
    terminal::{install_panic_hook, restore_terminal, setup_terminal, Tui},
    ui,
};
use ratatui::{
    style::Style,
    widgets::{Block, Borders},
};
use tui_textarea::TextArea;

const COMPOSER_PLACEHOLDER: &str = "Type a message... (Ctrl+T to transmit, F1 for help)";
const DECODER_PLACEHOLDER: &str = "Pulse strings, e.g. ... --- ...";

fn main() -> Result<()> {
    // stderr belongs to the terminal UI, so logs only go to a file when asked
    if let Some(path) = std::env::var_os("MORSECAST_TUI_LOG") {
        logging::from_env(false).init_to_file(std::path::Path::new(&path))?;
    }

    let config = Config::load()?;
    let services = ServiceHandle::new(config)?;

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let result = run_app(&mut terminal, &services);

    restore_terminal(&mut terminal)?;
    services.shutdown();

    result
}

fn run_app(terminal: &mut Tui, services: &ServiceHandle) -> Result<()> {
    let mut state = AppState::from_config(services.config());
    let events = services.subscribe();
    let rejections = services.rejections();

    services.set_audio_enabled(state.settings.audio);
    state = reduce(state, Action::HistoryLoaded(services.recent_history()));
    if !services.is_persistent() {
        state = reduce(state, Action::SetStatus("History is not being saved".to_string()));
    }

    let mut composer = new_text_area(COMPOSER_PLACEHOLDER);
    let mut decoder = new_text_area(DECODER_PLACEHOLDER);
    let mut event_handler = EventHandler::new(state.config.tick_rate_ms);

    loop {
        style_text_areas(&state, &mut composer, &mut decoder);
        terminal.draw(|frame| ui::render(frame, &state, &composer, &decoder))?;

        state = match event_handler.next()? {
            TuiEvent::Key(key) => handle_key(state, key, &mut composer, &mut decoder, services),
            other => dispatch(state, other.into(), services),
        };

        while let Ok(event) = events.try_recv() {
            state = dispatch(state, event.into(), services);
        }
        while let Ok(reason) = rejections.try_recv() {
            state = dispatch(state, Action::TransmissionRejected(reason), services);
        }

        // The reducer clears the composer after a transmission completes
        if state.composer.content.is_empty() && !composer.is_empty() {
            composer = new_text_area(COMPOSER_PLACEHOLDER);
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Route a key to the focused text area or to the keymap
///
/// Keys typed into a text area still go through the reducer as
/// [`Action::Key`] so the Konami sequence can be tracked.
fn handle_key(
    state: AppState,
    key: KeyEvent,
    composer: &mut TextArea,
    decoder: &mut TextArea,
    services: &ServiceHandle,
) -> AppState {
    if !state.in_text_entry() || is_global_key(&key) {
        return dispatch(state, Action::Key(key), services);
    }

    match state.current_screen {
        Screen::Terminal if !state.composer.transmitting => {
            composer.input(key);
            let state = dispatch(state, Action::Key(key), services);
            let content = composer.lines().join("\n");
            dispatch(state, Action::ComposerInputChanged(content), services)
        }
        Screen::Decoder => {
            decoder.input(key);
            let state = dispatch(state, Action::Key(key), services);
            let input = decoder.lines().join("\n");
            dispatch(state, Action::DecoderInputChanged(input), services)
        }
        _ => dispatch(state, Action::Key(key), services),
    }
}

/// Reduce, then perform the side effect the action calls for
fn dispatch(state: AppState, action: Action, services: &ServiceHandle) -> AppState {
    let effect = match &action {
        Action::Key(key) => key_action(&state, *key),
        Action::TransmitRequested
        | Action::ToggleAudio
        | Action::TransmissionCompleted(_)
        | Action::NavigateTo(_) => Some(action.clone()),
        _ => None,
    };
    let could_transmit = state.can_transmit();

    let state = reduce(state, action);

    match effect {
        Some(Action::TransmitRequested) if could_transmit => {
            services.transmit(TransmitRequest {
                text: state.composer.content.clone(),
                mode: state.settings.mode,
                params: state.transform_params(),
                priority: state.settings.priority,
            });
            state
        }
        Some(Action::ToggleAudio) => {
            services.set_audio_enabled(state.settings.audio);
            state
        }
        Some(Action::TransmissionCompleted(_)) | Some(Action::NavigateTo(Screen::History)) => {
            reduce(state, Action::HistoryLoaded(services.recent_history()))
        }
        _ => state,
    }
}

fn new_text_area(placeholder: &str) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(placeholder);
    textarea.set_cursor_line_style(Style::default());
    textarea
}

fn style_text_areas(state: &AppState, composer: &mut TextArea, decoder: &mut TextArea) {
    let composer_color = if state.composer.transmitting {
        ui::dim(state)
    } else {
        ui::accent(state)
    };
    composer.set_block(
        Block::default()
            .title(" Composer ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(composer_color)),
    );
    decoder.set_block(
        Block::default()
            .title(" Pulses ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ui::accent(state))),
    );
}
