//! History and decoder screens

use super::{accent, dim};
use crate::app::AppState;
use libmorsecast::TransformMode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use tui_textarea::TextArea;

/// Recent transmissions, newest at the top
pub fn render_history(frame: &mut Frame, area: Rect, state: &AppState) {
    let items: Vec<ListItem> = state
        .history
        .entries
        .iter()
        .rev()
        .map(|entry| {
            let mut spans = vec![
                Span::styled(
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S ").to_string(),
                    Style::default().fg(dim(state)),
                ),
                Span::styled(
                    format!("[{}] ", entry.mode),
                    Style::default().fg(accent(state)),
                ),
                Span::raw(entry.plaintext.clone()),
            ];
            if entry.mode != TransformMode::None {
                spans.push(Span::styled(
                    format!("  => {}", entry.display_text),
                    Style::default().fg(dim(state)),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" History ({}) ", state.history.entries.len());
    let widget = if items.is_empty() {
        List::new(vec![ListItem::new("No transmissions yet")])
    } else {
        List::new(items)
    }
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent(state))),
    );

    frame.render_widget(widget, area);
}

/// Pulse-string input on the left, decoded text on the right
pub fn render_decoder(frame: &mut Frame, area: Rect, state: &AppState, input: &TextArea) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    frame.render_widget(input, columns[0]);

    let output = Paragraph::new(state.decoder.output.as_str())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Decoded ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent(state))),
        );
    frame.render_widget(output, columns[1]);
}
