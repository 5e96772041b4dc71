//! TUI module for pianokit
//!
//! Draws the key row, the sequence entry and the scope, and turns keyboard
//! and mouse events into calls on the [`Piano`].

mod keys;
mod prompt;
mod sequence;
mod waveform;

use std::collections::HashMap;
use std::io::stdout;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};

use piano_kit::{Piano, ToneSink};

use crate::audio::AudioView;
use keys::render_keys;
use prompt::{render_notice, render_prompt};
use sequence::render_sequence;
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// Without release events, a key counts as released this long after its
/// last press (or auto-repeat). Longer than the usual ~500ms repeat delay
/// so a held key does not sound again at its first repeat.
const AUTO_RELEASE: Duration = Duration::from_millis(600);

/// Which surface receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Keys,
    Sequence,
}

/// The single edit prompt
#[derive(Debug, Clone)]
pub struct EditPrompt {
    /// Note being rebound
    pub index: usize,
    /// At most one character
    pub input: String,
    /// Pre-filled text is selected: the next character replaces it
    pub selected: bool,
}

/// Screen regions recorded at draw time, for mouse hit testing.
///
/// `keys[i]` is the display handle of note `i`.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegions {
    pub keys: Vec<Rect>,
    pub edit_markers: Vec<Rect>,
    pub sequence: Rect,
    pub play_button: Rect,
}

/// UI application state
pub struct UiApp<S: ToneSink> {
    piano: Piano<S>,
    audio: Option<AudioView>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    focus: Focus,
    sequence: String,
    prompt: Option<EditPrompt>,
    /// Blocking notice; swallows input until dismissed
    notice: Option<String>,
    regions: LayoutRegions,
    /// Note held down by the mouse
    pointer_note: Option<usize>,
    /// Whether the terminal reports key releases
    key_releases: bool,
    /// Auto-release deadlines when it does not
    release_at: HashMap<char, Instant>,
    should_quit: bool,
}

/// Turn on mouse capture and, where supported, key release reporting.
///
/// Returns whether key releases will be reported.
pub fn enable_input_reporting() -> EyreResult<bool> {
    execute!(stdout(), EnableMouseCapture)?;
    let releases = supports_keyboard_enhancement().unwrap_or(false);
    if releases {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    log::debug!("key release reporting: {}", releases);
    Ok(releases)
}

/// Undo [`enable_input_reporting`]. Best effort, runs during teardown.
pub fn disable_input_reporting() {
    let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    let _ = execute!(stdout(), DisableMouseCapture);
}

impl<S: ToneSink> UiApp<S> {
    pub fn new(piano: Piano<S>, audio: Option<AudioView>, sequence: &str) -> Self {
        let sequence = piano.filter_sequence(sequence);
        Self {
            piano,
            audio,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            focus: Focus::Keys,
            sequence,
            prompt: None,
            notice: None,
            regions: LayoutRegions::default(),
            pointer_note: None,
            key_releases: false,
            release_at: HashMap::new(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal, key_releases: bool) -> EyreResult<()> {
        self.key_releases = key_releases;
        let mut last = Instant::now();

        while !self.should_quit {
            let now = Instant::now();
            self.piano.tick(now - last);
            last = now;

            self.expire_releases(now);
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };

        // Read as many samples as available, keeping last VIS_BUFFER_SIZE
        while let Ok(sample) = audio.scope_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn expire_releases(&mut self, now: Instant) {
        if self.key_releases {
            return;
        }
        let expired: Vec<char> = self
            .release_at
            .iter()
            .filter(|(_, &deadline)| now >= deadline)
            .map(|(&c, _)| c)
            .collect();
        for c in expired {
            self.release_at.remove(&c);
            self.piano.release_key(c);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if key.kind == KeyEventKind::Release {
            if let KeyCode::Char(c) = key.code {
                self.piano.release_key(c);
            }
            return;
        }

        if self.notice.is_some() {
            if key.kind == KeyEventKind::Press
                && matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' '))
            {
                self.notice = None;
            }
            return;
        }

        if self.prompt.is_some() {
            if key.kind == KeyEventKind::Press {
                self.handle_prompt_key(key.code);
            }
            return;
        }

        match self.focus {
            Focus::Keys => self.handle_play_key(key),
            Focus::Sequence => {
                if key.kind == KeyEventKind::Press {
                    self.handle_sequence_key(key.code);
                }
            }
        }
    }

    /// Keys focus: letters play notes, digits open the edit prompt
    fn handle_play_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                // Held keys stay lit and never retrigger
                if key.kind == KeyEventKind::Repeat {
                    return;
                }
                if !self.key_releases {
                    self.release_at
                        .insert(c.to_ascii_uppercase(), Instant::now() + AUTO_RELEASE);
                }
                self.piano.press_key(c);
            }
            KeyCode::Char(d @ '1'..='9') if key.kind == KeyEventKind::Press => {
                let index = d as usize - '1' as usize;
                self.open_prompt(index);
            }
            KeyCode::Char(' ') if key.kind == KeyEventKind::Press => self.play(),
            KeyCode::Tab if key.kind == KeyEventKind::Press => self.focus = Focus::Sequence,
            KeyCode::Esc if key.kind == KeyEventKind::Press => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_sequence_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Keys,
            _ if !self.piano.inputs_enabled() => {}
            KeyCode::Char(c) => {
                let mut raw = self.sequence.clone();
                raw.push(c);
                self.sequence = self.piano.filter_sequence(&raw);
            }
            KeyCode::Backspace => {
                self.sequence.pop();
            }
            KeyCode::Enter => self.play(),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => self.commit_prompt(),
            KeyCode::Backspace => {
                prompt.input.clear();
                prompt.selected = false;
            }
            KeyCode::Char(c) => {
                if prompt.selected || prompt.input.is_empty() {
                    prompt.input = c.to_string();
                    prompt.selected = false;
                }
            }
            _ => {}
        }
    }

    fn open_prompt(&mut self, index: usize) {
        if !self.piano.inputs_enabled() {
            return;
        }
        let Some(note) = self.piano.keymap().get(index) else {
            return;
        };
        self.prompt = Some(EditPrompt {
            index,
            input: note.key.to_string(),
            selected: true,
        });
    }

    fn commit_prompt(&mut self) {
        let Some(prompt) = self.prompt.as_ref() else {
            return;
        };
        match self.piano.rebind(prompt.index, &prompt.input) {
            Ok(()) => self.prompt = None,
            Err(err) if err.is_user_facing() => self.notice = Some(err.to_string()),
            // Malformed input: leave the prompt open, say nothing
            Err(_) => {}
        }
    }

    fn play(&mut self) {
        if self.prompt.is_some() {
            return;
        }
        self.release_at.clear();
        self.pointer_note = None;
        self.piano.play(&self.sequence);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.notice.is_some() {
            return;
        }
        let pos = Position::new(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.prompt.is_some() {
                    return;
                }
                if let Some(index) = hit(&self.regions.edit_markers, pos) {
                    self.open_prompt(index);
                } else if let Some(index) = hit(&self.regions.keys, pos) {
                    if self.piano.press_note(index) {
                        self.pointer_note = Some(index);
                    }
                } else if self.regions.play_button.contains(pos) {
                    self.play();
                } else if self.regions.sequence.contains(pos) {
                    self.focus = Focus::Sequence;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                // Dragging off a key releases it
                if let Some(index) = self.pointer_note {
                    let inside = self
                        .regions
                        .keys
                        .get(index)
                        .is_some_and(|r| r.contains(pos));
                    if !inside {
                        self.piano.release_note(index);
                        self.pointer_note = None;
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(index) = self.pointer_note.take() {
                    self.piano.release_note(index);
                }
            }
            _ => {}
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: title, keys, sequence, waveform, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title / status
                Constraint::Min(7),    // Key row
                Constraint::Length(3), // Sequence entry
                Constraint::Length(8), // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        self.render_title(frame, chunks[0]);

        let (keys, markers) = render_keys(frame, chunks[1], &self.piano, self.focus == Focus::Keys);
        self.regions.keys = keys;
        self.regions.edit_markers = markers;

        let (input, button) = render_sequence(
            frame,
            chunks[2],
            &self.sequence,
            self.piano.max_sequence_len(),
            self.focus == Focus::Sequence,
            self.piano.inputs_enabled(),
        );
        self.regions.sequence = input;
        self.regions.play_button = button;

        render_waveform(frame, chunks[3], &self.audio_buffer);

        let help = match (self.prompt.is_some(), self.focus) {
            (true, _) => " [Enter] Save key  [Esc] Cancel",
            (false, Focus::Keys) => {
                " [A-Z] Play  [1-8] Edit key  [Space] Play sequence  [Tab] Sequence  [Esc] Quit"
            }
            (false, Focus::Sequence) => " [Enter] Play sequence  [Backspace] Delete  [Tab] Keys",
        };
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[4],
        );

        if let Some(prompt) = &self.prompt {
            render_prompt(frame, area, prompt, self.piano.keymap());
        }
        if let Some(notice) = &self.notice {
            render_notice(frame, area, notice);
        }
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" pianokit ").borders(Borders::ALL);

        let status = match self.piano.player().progress() {
            Some((step, total)) => format!("▶ Playing {}/{}", step + 1, total),
            None => "Ready".to_string(),
        };
        let audio = match &self.audio {
            Some(audio) => format!("{:.1}kHz", audio.sample_rate / 1000.0),
            None => "muted".to_string(),
        };

        let line = Line::from(vec![
            Span::styled(
                " Virtual Piano Kit  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{status}  "),
                Style::default().fg(if self.piano.is_playing() {
                    Color::Green
                } else {
                    Color::White
                }),
            ),
            Span::styled(audio, Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}

fn hit(regions: &[Rect], pos: Position) -> Option<usize> {
    regions.iter().position(|r| r.contains(pos))
}
