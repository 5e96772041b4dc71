//! Key row widget - one cell per note, lit while active

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use piano_kit::{Piano, ToneSink};

/// Draw the key row. Returns the rectangle of each key and of each key's
/// edit marker, indexed by note.
pub fn render_keys<S: ToneSink>(
    frame: &mut Frame,
    area: Rect,
    piano: &Piano<S>,
    focused: bool,
) -> (Vec<Rect>, Vec<Rect>) {
    let notes = piano.keymap().notes();
    if notes.is_empty() || area.height < 5 {
        return (Vec::new(), Vec::new());
    }

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, notes.len() as u32); notes.len()])
        .split(area);

    let mut markers = Vec::with_capacity(notes.len());
    let editable = piano.inputs_enabled();

    for (index, (note, &cell)) in notes.iter().zip(cells.iter()).enumerate() {
        let active = piano.is_active(index);
        let (fg, bg) = if active {
            (Color::Black, Color::Yellow)
        } else {
            (Color::Black, Color::White)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
            .style(Style::default().fg(fg).bg(bg));
        let inner = block.inner(cell);
        frame.render_widget(block, cell);

        let lines = vec![
            Line::from(note.label.as_str()).style(Style::default().fg(Color::DarkGray)),
            Line::from(""),
            Line::from(note.key.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);

        // Edit marker on the bottom row of the key
        let marker = Rect {
            y: inner.bottom().saturating_sub(1),
            height: 1.min(inner.height),
            ..inner
        };
        let marker_style = if editable {
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        frame.render_widget(
            Paragraph::new(format!("{} edit", index + 1))
                .style(marker_style)
                .alignment(Alignment::Center),
            marker,
        );
        markers.push(marker);
    }

    (cells.to_vec(), markers)
}
