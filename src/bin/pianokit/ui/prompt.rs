//! Edit prompt and blocking notice popups

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use piano_kit::KeyMap;

use super::EditPrompt;

/// Centered rect of at most `width` x `height` inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render_prompt(frame: &mut Frame, area: Rect, prompt: &EditPrompt, keymap: &KeyMap) {
    let popup = centered(area, 40, 6);
    frame.render_widget(Clear, popup);

    let label = keymap
        .get(prompt.index)
        .map(|n| n.label.as_str())
        .unwrap_or("?");
    let input_style = if prompt.selected {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let lines = vec![
        Line::from("Enter a new key and press Enter"),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("{label}: [")),
            Span::styled(format!("{:1}", prompt.input), input_style),
            Span::raw("]"),
        ]),
    ];
    let block = Block::default()
        .title(" Edit key ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        popup,
    );
}

pub fn render_notice(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered(area, 48, 5);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Notice ")
        .title_bottom(Line::from(" [Enter] OK ").alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        popup,
    );
}
