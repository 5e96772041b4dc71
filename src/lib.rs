//! piano_kit - a small virtual piano.
//!
//! The library holds everything that is not terminal glue: the rebindable
//! key-to-note registry, the sequence playback state machine, the owned
//! [`piano::Piano`] state object that ties them together, and the tone
//! synthesizer that makes each key press audible.

pub mod dsp; // Oscillator and decay envelope primitives
pub mod keymap; // Note registry and rebinding
pub mod piano; // Owned piano state: registry + playback + active keys
pub mod playback; // Timed sequence playback
pub mod tone; // Tone emission interface and synthesizer

pub use keymap::{KeyMap, Note, RebindError};
pub use piano::Piano;
pub use playback::{PlaybackEvent, Player, PlayerState};
pub use tone::{SilentSink, ToneSink};

pub const MAX_BLOCK_SIZE: usize = 2048;
