//! PianoKit - application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult};

use piano_kit::{KeyMap, Piano, SilentSink, ToneSink};

use super::audio;
use super::ui::{self, UiApp};

/// Main application builder
pub struct PianoKit {
    muted: bool,
    volume: f32,
    voices: usize,
    sequence: String,
}

impl PianoKit {
    pub fn new() -> Self {
        Self {
            muted: false,
            volume: 1.0,
            voices: 16,
            sequence: String::new(),
        }
    }

    /// Skip the audio device entirely
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    /// Master volume, 0.0-1.0
    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Maximum overlapping tones
    pub fn voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    /// Pre-filled sequence text
    pub fn sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = sequence.into();
        self
    }

    /// Run the application (takes over the terminal until quit)
    pub fn run(self) -> EyreResult<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(eyre!("volume must be between 0.0 and 1.0, got {}", self.volume));
        }
        if self.voices == 0 {
            return Err(eyre!("need at least one voice"));
        }

        // Audio first, so device errors show before the terminal is taken
        let (sink, audio_view): (Box<dyn ToneSink>, _) = if self.muted {
            log::info!("audio muted");
            (Box::new(SilentSink), None)
        } else {
            let (handle, view) = audio::start(self.voices, self.volume)?;
            (Box::new(handle), Some(view))
        };

        let piano = Piano::new(KeyMap::default(), sink);
        let mut app = UiApp::new(piano, audio_view, &self.sequence);

        let mut terminal = ratatui::init();
        let result = ui::enable_input_reporting()
            .and_then(|releases| app.run(&mut terminal, releases));
        ui::disable_input_reporting();
        ratatui::restore();

        result
    }
}

impl Default for PianoKit {
    fn default() -> Self {
        Self::new()
    }
}
