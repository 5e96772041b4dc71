use crate::dsp::{DecayEnvelope, SineOscillator};

use super::{TONE_DURATION, TONE_FLOOR_GAIN, TONE_START_GAIN};

/// One sounding tone: a sine shaped by a one-shot decay.
pub struct ToneVoice {
    osc: SineOscillator,
    env: DecayEnvelope,
    age: u64,
}

impl ToneVoice {
    pub fn new() -> Self {
        Self {
            osc: SineOscillator::new(440.0),
            env: DecayEnvelope::new(TONE_START_GAIN, TONE_FLOOR_GAIN, TONE_DURATION),
            age: 0,
        }
    }

    pub fn start(&mut self, frequency: f32, age: u64, sample_rate: f32) {
        self.osc.reset(frequency);
        self.env.trigger(sample_rate);
        self.age = age;
    }

    /// Add this voice's output into `out`. The voice frees itself once its
    /// envelope has run out.
    pub fn render_add(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            if !self.env.is_active() {
                break;
            }
            let gain = self.env.next_sample();
            *sample += self.osc.next_sample(sample_rate) * gain;
        }
    }

    pub fn stop(&mut self) {
        self.env.reset();
    }

    pub fn is_free(&self) -> bool {
        !self.env.is_active()
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }
}

impl Default for ToneVoice {
    fn default() -> Self {
        Self::new()
    }
}
