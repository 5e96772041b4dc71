/*
Decay Envelope
==============

A one-shot envelope for struck sounds: the level jumps to `start` on
trigger, falls exponentially to `floor` over `duration`, then the envelope
goes idle and outputs silence.

  Level
  start ┐╲
        │ ╲
        │  ╲_
        │    ╲__
  floor │       ╲____
      0 └────────────┴──→ Time
        trigger   duration

Why exponential: loudness is perceived on a log scale, so a constant ratio
per sample sounds like an even fade. The per-sample ratio is

    ratio = (floor / start) ^ (1 / (duration * sample_rate))

so after `duration * sample_rate` samples, level = start * ratio^n = floor.

The state machine has two stages:

    ┌──────┐  trigger   ┌──────────┐
    │ Idle │ ─────────→ │ Decaying │
    └──────┘            └──────────┘
        ↑     elapsed ≥ duration │
        └────────────────────────┘

Triggering while already decaying restarts from `start`.
*/

/// Stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,     // Silent, output 0
    Decaying, // Falling from start towards floor
}

#[derive(Debug, Clone)]
pub struct DecayEnvelope {
    start: f32,
    floor: f32,
    duration: f32, // seconds

    stage: EnvelopeState,
    level: f32,
    ratio: f32,
    total_samples: u32,
    elapsed_samples: u32,
}

impl DecayEnvelope {
    pub fn new(start: f32, floor: f32, duration: f32) -> Self {
        Self {
            start: start.max(f32::MIN_POSITIVE),
            floor: floor.clamp(f32::MIN_POSITIVE, start.max(f32::MIN_POSITIVE)),
            duration: duration.max(0.0),

            stage: EnvelopeState::Idle,
            level: 0.0,
            ratio: 1.0,
            total_samples: 0,
            elapsed_samples: 0,
        }
    }

    /// Start (or restart) the decay from the initial level.
    pub fn trigger(&mut self, sample_rate: f32) {
        self.total_samples = (self.duration * sample_rate).round().max(1.0) as u32;
        self.ratio = (self.floor / self.start).powf(1.0 / self.total_samples as f32);
        self.elapsed_samples = 0;
        self.level = self.start;
        self.stage = EnvelopeState::Decaying;
    }

    /// Current level, then advance by one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => 0.0,
            EnvelopeState::Decaying => {
                let out = self.level;
                self.level *= self.ratio;
                self.elapsed_samples += 1;
                if self.elapsed_samples >= self.total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
                out
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage == EnvelopeState::Decaying
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.elapsed_samples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    #[test]
    fn idle_until_triggered() {
        let mut env = DecayEnvelope::new(0.3, 0.01, 0.5);
        assert_eq!(env.next_sample(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn starts_at_initial_level() {
        let mut env = DecayEnvelope::new(0.3, 0.01, 0.5);
        env.trigger(SAMPLE_RATE);
        assert!((env.next_sample() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn reaches_floor_then_goes_idle() {
        let mut env = DecayEnvelope::new(0.3, 0.01, 0.5);
        env.trigger(SAMPLE_RATE);

        let mut last = 0.0;
        for _ in 0..499 {
            last = env.next_sample();
        }
        // One sample before the end we are just above the floor
        assert!(last > 0.01 && last < 0.0105, "got {last}");
        assert!(env.is_active());

        env.next_sample();
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn decay_is_monotonic() {
        let mut env = DecayEnvelope::new(0.3, 0.01, 0.5);
        env.trigger(SAMPLE_RATE);
        let mut prev = f32::MAX;
        while env.is_active() {
            let s = env.next_sample();
            assert!(s < prev);
            prev = s;
        }
    }

    #[test]
    fn retrigger_restarts() {
        let mut env = DecayEnvelope::new(0.3, 0.01, 0.5);
        env.trigger(SAMPLE_RATE);
        for _ in 0..200 {
            env.next_sample();
        }
        env.trigger(SAMPLE_RATE);
        assert!((env.next_sample() - 0.3).abs() < 1e-6);
    }
}
