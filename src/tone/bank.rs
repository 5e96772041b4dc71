use super::message::{MessageReceiver, ToneMessage};
use super::voice::ToneVoice;
use crate::MAX_BLOCK_SIZE;

/// Fixed pool of tone voices, driven by messages and rendered in blocks.
///
/// Runs on the audio thread: nothing here allocates after construction.
pub struct ToneBank<R: MessageReceiver> {
    voices: Vec<ToneVoice>,
    rx: R,
    sample_rate: f32,
    volume: f32,
    temp_buffer: Vec<f32>,
    trigger_counter: u64,
}

impl<R: MessageReceiver> ToneBank<R> {
    pub fn new(sample_rate: f32, max_voices: usize, rx: R) -> Self {
        let voices = (0..max_voices.max(1)).map(|_| ToneVoice::new()).collect();

        Self {
            voices,
            rx,
            sample_rate,
            volume: 1.0,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            trigger_counter: 0,
        }
    }

    /// Drain pending messages, then mix all sounding voices into `out`.
    ///
    /// `out` is overwritten. Blocks longer than `MAX_BLOCK_SIZE` are rendered
    /// in chunks.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                ToneMessage::Trigger { frequency } => self.trigger(frequency),
                ToneMessage::SetVolume(volume) => self.volume = volume.clamp(0.0, 1.0),
                ToneMessage::AllOff => {
                    for voice in &mut self.voices {
                        voice.stop();
                    }
                }
            }
        }

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let mix = &mut self.temp_buffer[..chunk.len()];
            mix.fill(0.0);
            for voice in self.voices.iter_mut().filter(|v| !v.is_free()) {
                voice.render_add(mix, self.sample_rate);
            }
            for (o, m) in chunk.iter_mut().zip(mix.iter()) {
                *o = m * self.volume;
            }
        }
    }

    fn trigger(&mut self, frequency: f32) {
        let age = self.trigger_counter;
        self.trigger_counter += 1;
        let sample_rate = self.sample_rate;
        self.allocate_voice().start(frequency, age, sample_rate);
    }

    /// A free voice if there is one, otherwise the oldest sounding voice.
    fn allocate_voice(&mut self) -> &mut ToneVoice {
        let idx = self
            .voices
            .iter()
            .position(|v| v.is_free())
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, v)| v.age())
                    .map(|(idx, _)| idx)
            })
            .unwrap_or(0);
        &mut self.voices[idx]
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| !v.is_free()).count()
    }
}
