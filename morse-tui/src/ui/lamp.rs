//! Signal lamp and message glyph

use super::{accent, dim};
use crate::app::AppState;
use libmorsecast::glyph::Glyph;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const LAMP_LIT: &str = "( ### )";
const LAMP_DARK: &str = "(     )";

pub fn render_lamp(frame: &mut Frame, area: Rect, state: &AppState) {
    let lamp = &state.lamp;
    let snapshot = &lamp.snapshot;
    let lit = snapshot.active && snapshot.flashing;

    let lamp_style = if lit {
        Style::default().fg(accent(state)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(dim(state))
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(if lit { LAMP_LIT } else { LAMP_DARK }, lamp_style)),
        Line::from(""),
    ];

    if lamp.transmission_id.is_some() {
        let character = snapshot
            .character
            .map(|c| if c == ' ' { "/".to_string() } else { c.to_string() })
            .unwrap_or_default();

        lines.push(Line::from(format!("Sending: {} [{}]", lamp.display_text, lamp.mode)));
        lines.push(Line::from(vec![
            Span::raw("Char: "),
            Span::styled(character, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "  ({}/{})  ",
                (snapshot.char_index + 1).min(snapshot.char_total),
                snapshot.char_total
            )),
        ]));
        lines.push(pattern_line(state));
        lines.push(Line::from(format!("Pulses keyed: {}", lamp.flashes)));
    } else if let Some(ref entry) = lamp.last_completed {
        lines.push(Line::from(Span::styled(
            format!("Last sent: {}", entry.display_text),
            Style::default().fg(dim(state)),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Idle. Compose below and press Ctrl+T.",
            Style::default().fg(dim(state)),
        )));
    }

    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(" Signal Lamp ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent(state))),
    );
    frame.render_widget(widget, area);
}

/// Pattern of the current character with the current pulse highlighted
fn pattern_line(state: &AppState) -> Line<'static> {
    let snapshot = &state.lamp.snapshot;
    let spans = snapshot
        .pattern
        .chars()
        .enumerate()
        .map(|(i, pulse)| {
            let style = if i == snapshot.pulse_index && snapshot.flashing {
                Style::default()
                    .fg(accent(state))
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if i < snapshot.pulse_index {
                Style::default().fg(dim(state))
            } else {
                Style::default()
            };
            Span::styled(format!("{} ", pulse), style)
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

pub fn render_glyph(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.lamp.transmission_id.is_some() {
        Some(state.lamp.display_text.as_str())
    } else {
        state
            .lamp
            .last_completed
            .as_ref()
            .map(|entry| entry.display_text.as_str())
    };

    let lines: Vec<Line> = match text {
        Some(text) => Glyph::from_text(text)
            .render('#', ' ')
            .into_iter()
            .map(|row| {
                // Double each cell so the glyph reads square
                let wide: String = row.chars().flat_map(|c| [c, c]).collect();
                Line::from(Span::styled(wide, Style::default().fg(accent(state))))
            })
            .collect(),
        None => vec![Line::from(Span::styled("no glyph", Style::default().fg(dim(state))))],
    };

    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(" Glyph ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(dim(state))),
    );
    frame.render_widget(widget, area);
}
