//! Sequence entry and play button

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const PLAY_BUTTON_WIDTH: u16 = 17;

/// Draw the entry and button. Returns (entry rect, button rect).
pub fn render_sequence(
    frame: &mut Frame,
    area: Rect,
    sequence: &str,
    max_len: usize,
    focused: bool,
    enabled: bool,
) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(PLAY_BUTTON_WIDTH)])
        .split(area);

    let border = match (enabled, focused) {
        (false, _) => Color::DarkGray,
        (true, true) => Color::Cyan,
        (true, false) => Color::Gray,
    };
    let block = Block::default()
        .title(format!(" Play a Sequence ({}/{}) ", sequence.chars().count(), max_len))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let text = if sequence.is_empty() && !focused {
        Paragraph::new("Type your sequence (e.g., ASDFGHJ)")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        let cursor = if focused && enabled { "_" } else { "" };
        Paragraph::new(format!("{sequence}{cursor}")).style(Style::default().fg(if enabled {
            Color::White
        } else {
            Color::DarkGray
        }))
    };
    frame.render_widget(text.block(block), chunks[0]);

    let button = Paragraph::new(" Play Sequence ")
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(if enabled { Color::Green } else { Color::DarkGray }));
    frame.render_widget(button, chunks[1]);

    (chunks[0], chunks[1])
}
