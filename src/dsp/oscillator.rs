use std::f32::consts::TAU;

/// Phase-accumulating sine oscillator.
///
/// Phase is kept in cycles (0.0..1.0) so it never grows without bound.
#[derive(Debug, Clone, Copy)]
pub struct SineOscillator {
    frequency: f32,
    phase: f32,
}

impl SineOscillator {
    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            phase: 0.0,
        }
    }

    /// Restart at phase zero with a new pitch.
    pub fn reset(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.phase = 0.0;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Produce one sample and step the phase.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let out = (TAU * self.phase).sin();
        self.phase += self.frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        out
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let mut osc = SineOscillator::new(440.0);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn phase_stays_wrapped() {
        let mut osc = SineOscillator::new(20_000.0);
        for _ in 0..10_000 {
            let s = osc.next_sample(44_100.0);
            assert!((-1.0..=1.0).contains(&s));
        }
        assert!(osc.phase < 1.0);
    }
}
