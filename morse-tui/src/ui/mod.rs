//! UI rendering
//!
//! Pure rendering functions that transform state into terminal frames.
//! The two text areas are owned by the main loop and passed in.

mod lamp;
mod screens;

use crate::app::{AppState, Screen, Theme};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_textarea::TextArea;

/// Render the application UI
pub fn render(frame: &mut Frame, state: &AppState, composer: &TextArea, decoder: &TextArea) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(area);

    match state.current_screen {
        Screen::Terminal => render_terminal(frame, chunks[0], state, composer),
        Screen::History => screens::render_history(frame, chunks[0], state),
        Screen::Decoder => screens::render_decoder(frame, chunks[0], state, decoder),
    }

    render_status_bar(frame, chunks[1], state);

    if state.possession.active {
        render_possession_overlay(frame, area, state);
    }

    if state.help_visible {
        render_help_overlay(frame, area, state);
    }

    if let Some(ref error) = state.error {
        render_error_overlay(frame, area, error);
    }
}

/// Main colour of the current theme
pub fn accent(state: &AppState) -> Color {
    if !state.config.colors_enabled {
        return Color::Reset;
    }
    match state.theme {
        Theme::Amber => Color::Rgb(255, 176, 0),
        Theme::Phosphor => Color::Rgb(51, 255, 102),
    }
}

/// Colour for de-emphasised text
pub fn dim(state: &AppState) -> Color {
    if state.config.colors_enabled {
        Color::DarkGray
    } else {
        Color::Reset
    }
}

/// Lamp, glyph and composer
fn render_terminal(frame: &mut Frame, area: Rect, state: &AppState, composer: &TextArea) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(5)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(22)])
        .split(rows[0]);

    lamp::render_lamp(frame, top[0], state);
    lamp::render_glyph(frame, top[1], state);
    frame.render_widget(composer, rows[1]);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let settings = &state.settings;
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    let sanity_style = if state.sanity.value * 4 <= state.sanity.max && state.config.colors_enabled {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(accent(state))
    };

    let mut spans = vec![
        Span::raw(format!(" mode: {} ", settings.mode)),
        Span::raw(format!("| shift: {} ", settings.shift)),
        Span::raw(format!("| priority: {} ", on_off(settings.priority))),
        Span::raw(format!("| audio: {} ", on_off(settings.audio))),
        Span::raw("| sanity: "),
        Span::styled(
            format!("{}/{}", state.sanity.value, state.sanity.max),
            sanity_style,
        ),
        Span::raw(format!(" | {} ", state.theme.name())),
    ];

    if let Some(ref message) = state.status.message {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(
            message.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(dim(state))),
    );
    frame.render_widget(status, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Ctrl+T   - Transmit the composed message"),
        Line::from("  F1       - Toggle help"),
        Line::from("  F2       - History"),
        Line::from("  F3       - Decoder"),
        Line::from("  F4       - Terminal"),
        Line::from("  F5       - Cycle transform mode"),
        Line::from("  F6       - Toggle priority broadcast"),
        Line::from("  F7       - Toggle audio"),
        Line::from("  F8 / F9  - Shift amount down / up"),
        Line::from("  Esc      - Dismiss overlays"),
        Line::from("  q        - Quit (History screen)"),
        Line::from("  Ctrl+C   - Quit"),
        Line::from(""),
        Line::from("Press Esc or F1 to close"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent(state))),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help, popup_area);
}

fn render_error_overlay(frame: &mut Frame, area: Rect, error: &str) {
    let popup_area = centered_rect(70, 30, area);

    let error_text = vec![
        Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(error),
        Line::from(""),
        Line::from("Press Esc to dismiss"),
    ];

    let error_widget = Paragraph::new(error_text)
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(error_widget, popup_area);
}

fn render_possession_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(60, 40, area);
    let seconds = state.possession.remaining_ms.div_ceil(1000);

    let color = if state.config.colors_enabled {
        Color::Red
    } else {
        Color::Reset
    };

    let text = vec![
        Line::from(Span::styled(
            "- .... . / -.- . -.-- / .. ... / -. --- - / -.-- --- ..- .-. ...",
            Style::default().fg(color),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "SOMETHING ELSE IS KEYING",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("it lets go in {}s", seconds)),
    ];

    let widget = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(widget, popup_area);
}

/// Helper to create centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
