//! Pure reducer function for state transitions
//!
//! `(State, Action) -> State`, with no I/O. Service calls happen in the
//! main loop after the reducer has run.

use super::actions::{Action, Screen};
use super::konami;
use super::state::{AppState, ComposerState, LampState, SanityState, StatusBarState};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use libmorsecast::sequencer::Snapshot;
use libmorsecast::symbols;

/// Pure reducer function
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        // === UI Events ===
        Action::Key(key) => {
            let mapped = key_action(&state, key);
            let state = track_konami(state, &key);
            match mapped {
                Some(action) => reduce(state, action),
                None => state,
            }
        }
        Action::Tick => tick(state),
        Action::Resize(_, _) => state,

        // === Navigation ===
        Action::NavigateTo(screen) => AppState {
            current_screen: screen,
            ..state
        },
        Action::Quit => AppState {
            should_quit: true,
            ..state
        },
        Action::ShowHelp => AppState {
            help_visible: true,
            ..state
        },
        Action::HideHelp => AppState {
            help_visible: false,
            ..state
        },

        // === Composer ===
        Action::ComposerInputChanged(content) => AppState {
            composer: ComposerState {
                content,
                ..state.composer
            },
            ..state
        },
        Action::TransmitRequested => {
            if !state.can_transmit() {
                return state;
            }
            let state = with_status(state, "Transmitting...");
            AppState {
                composer: ComposerState {
                    transmitting: true,
                    ..state.composer
                },
                ..state
            }
        }

        // === Transmission ===
        Action::TransmissionStarted {
            transmission_id,
            display_text,
            mode,
        } => AppState {
            composer: ComposerState {
                transmitting: true,
                ..state.composer
            },
            lamp: LampState {
                transmission_id: Some(transmission_id),
                display_text,
                mode,
                snapshot: Snapshot::default(),
                flashes: 0,
                ..state.lamp
            },
            ..state
        },
        Action::LampChanged(snapshot) => {
            let flashes = state.lamp.flashes + usize::from(snapshot.flashing);
            AppState {
                lamp: LampState {
                    snapshot,
                    flashes,
                    ..state.lamp
                },
                ..state
            }
        }
        Action::TransmissionCompleted(entry) => {
            let sanity = SanityState {
                value: (state.sanity.value + state.sanity.restore).min(state.sanity.max),
                ..state.sanity
            };

            let mut entries = state.history.entries.clone();
            entries.push(entry.clone());
            let entries = last_n(entries, state.history.cap);

            let message = format!("Sent: {}", entry.plaintext);
            let state = with_status(state, &message);
            AppState {
                composer: ComposerState::default(),
                lamp: LampState {
                    transmission_id: None,
                    snapshot: Snapshot::default(),
                    last_completed: Some(entry),
                    ..state.lamp
                },
                history: super::state::HistoryState {
                    entries,
                    ..state.history
                },
                sanity,
                ..state
            }
        }

        Action::TransmissionRejected(reason) => AppState {
            composer: ComposerState {
                transmitting: false,
                ..state.composer
            },
            error: Some(format!("Transmission refused: {}", reason)),
            ..state
        },

        // === Settings ===
        Action::CycleMode => {
            let mut settings = state.settings.clone();
            settings.mode = settings.mode.next();
            let message = format!("Mode: {}", settings.mode);
            AppState {
                settings,
                ..with_status(state, &message)
            }
        }
        Action::TogglePriority => {
            let mut settings = state.settings.clone();
            settings.priority = !settings.priority;
            let message = if settings.priority {
                "Priority broadcast: ON"
            } else {
                "Priority broadcast: OFF"
            };
            AppState {
                settings,
                ..with_status(state, message)
            }
        }
        Action::ToggleAudio => {
            let mut settings = state.settings.clone();
            settings.audio = !settings.audio;
            let message = if settings.audio { "Audio: ON" } else { "Audio: OFF" };
            AppState {
                settings,
                ..with_status(state, message)
            }
        }
        Action::ShiftDown => shift_by(state, 25),
        Action::ShiftUp => shift_by(state, 1),

        // === History ===
        Action::HistoryLoaded(entries) => {
            let entries = last_n(entries, state.history.cap);
            AppState {
                history: super::state::HistoryState {
                    entries,
                    ..state.history
                },
                ..state
            }
        }

        // === Decoder ===
        Action::DecoderInputChanged(input) => {
            let output = input
                .lines()
                .map(symbols::decode_message)
                .collect::<Vec<_>>()
                .join("\n");
            AppState {
                decoder: super::state::DecoderState { input, output },
                ..state
            }
        }

        // === Error Handling ===
        Action::DismissError => AppState { error: None, ..state },

        // === Status Bar ===
        Action::SetStatus(message) => with_status(state, &message),
        Action::ClearStatus => AppState {
            status: StatusBarState { message: None },
            ..state
        },
    }
}

/// Keymap: the action a key press stands for in this state, if any
///
/// This is where keybindings are defined. The main loop calls it too, to
/// know which side effect (if any) follows a key.
pub fn key_action(state: &AppState, key: KeyEvent) -> Option<Action> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),
        (KeyCode::Char('t'), KeyModifiers::CONTROL) => {
            state.can_transmit().then_some(Action::TransmitRequested)
        }

        (KeyCode::F(1), _) => Some(if state.help_visible {
            Action::HideHelp
        } else {
            Action::ShowHelp
        }),
        (KeyCode::F(2), _) => Some(Action::NavigateTo(Screen::History)),
        (KeyCode::F(3), _) => Some(Action::NavigateTo(Screen::Decoder)),
        (KeyCode::F(4), _) => Some(Action::NavigateTo(Screen::Terminal)),
        (KeyCode::F(5), _) => Some(Action::CycleMode),
        (KeyCode::F(6), _) => Some(Action::TogglePriority),
        (KeyCode::F(7), _) => Some(Action::ToggleAudio),
        (KeyCode::F(8), _) => Some(Action::ShiftDown),
        (KeyCode::F(9), _) => Some(Action::ShiftUp),

        (KeyCode::Esc, _) if state.error.is_some() => Some(Action::DismissError),
        (KeyCode::Esc, _) if state.help_visible => Some(Action::HideHelp),
        (KeyCode::Esc, _) if state.status.message.is_some() => Some(Action::ClearStatus),

        (KeyCode::Char('q'), KeyModifiers::NONE)
            if !state.in_text_entry() && !state.composer.transmitting =>
        {
            Some(Action::Quit)
        }

        _ => None,
    }
}

/// Whether the main loop should keep `key` away from the text areas
pub fn is_global_key(key: &KeyEvent) -> bool {
    matches!(
        (key.code, key.modifiers),
        (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('t'), KeyModifiers::CONTROL)
            | (KeyCode::F(_), _)
            | (KeyCode::Esc, _)
    )
}

fn track_konami(state: AppState, key: &KeyEvent) -> AppState {
    let (progress, completed) = konami::advance(state.konami.progress, key);
    let konami = super::state::KonamiState { progress };

    if !completed {
        return AppState { konami, ..state };
    }

    let theme = state.theme.toggled();
    let message = format!("Theme: {}", theme.name());
    AppState {
        konami,
        theme,
        ..with_status(state, &message)
    }
}

/// Advance sanity and possession by one tick
fn tick(state: AppState) -> AppState {
    let dt = state.config.tick_rate_ms;

    if state.possession.active {
        let remaining_ms = state.possession.remaining_ms.saturating_sub(dt);
        if remaining_ms > 0 {
            return AppState {
                possession: super::state::PossessionState {
                    remaining_ms,
                    ..state.possession
                },
                ..state
            };
        }

        let sanity = SanityState {
            value: state.sanity.max,
            elapsed_ms: 0,
            ..state.sanity
        };
        return AppState {
            possession: super::state::PossessionState {
                active: false,
                remaining_ms: 0,
                ..state.possession
            },
            sanity,
            ..with_status(state, "The static clears. You are alone at the key again.")
        };
    }

    let mut sanity = state.sanity.clone();
    if sanity.decay_ms > 0 {
        sanity.elapsed_ms += dt;
        while sanity.elapsed_ms >= sanity.decay_ms && sanity.value > 0 {
            sanity.value -= 1;
            sanity.elapsed_ms -= sanity.decay_ms;
        }
    }

    if sanity.value > 0 {
        return AppState { sanity, ..state };
    }

    let possession = super::state::PossessionState {
        active: true,
        remaining_ms: state.possession.duration_ms,
        ..state.possession
    };
    AppState {
        sanity: SanityState {
            elapsed_ms: 0,
            ..sanity
        },
        possession,
        ..with_status(state, "Something else has taken the key.")
    }
}

fn shift_by(state: AppState, step: u8) -> AppState {
    let mut settings = state.settings.clone();
    settings.shift = (settings.shift % 26 + step) % 26;
    let message = format!("Shift: {}", settings.shift);
    AppState {
        settings,
        ..with_status(state, &message)
    }
}

fn with_status(state: AppState, message: &str) -> AppState {
    AppState {
        status: StatusBarState {
            message: Some(message.to_string()),
        },
        ..state
    }
}

fn last_n<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let excess = items.len().saturating_sub(n);
    items.drain(..excess);
    items
}
