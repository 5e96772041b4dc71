//! Low-level DSP primitives used by the tone synthesizer.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside voice structs and run in the audio callback.

/// Exponential decay envelope.
pub mod envelope;
/// Sine oscillator.
pub mod oscillator;

pub use envelope::{DecayEnvelope, EnvelopeState};
pub use oscillator::SineOscillator;
