//! Tone emission.
//!
//! [`ToneSink`] is the only thing the piano knows about sound: fire a pitch
//! and forget it. The synthesizer behind the default sink is a small pool of
//! sine voices with a fixed decay, fed through a lock-free queue so the UI
//! thread never waits on the audio thread.
//!
//! ```ignore
//! let (mut handle, mut bank) = tone::synth(48_000.0, 16, 256);
//! handle.emit(440.0);
//! // audio callback:
//! bank.render_block(&mut buffer);
//! ```

/// Voice pool rendered on the audio thread.
pub mod bank;
/// Messages from the control side to the bank.
pub mod message;
/// A single decaying sine tone.
pub mod voice;

pub use bank::ToneBank;
pub use message::{MessageReceiver, ToneMessage};
pub use voice::ToneVoice;

/// Gain at the moment a tone starts
pub const TONE_START_GAIN: f32 = 0.3;
/// Gain the decay reaches when the tone stops
pub const TONE_FLOOR_GAIN: f32 = 0.01;
/// Length of every tone, in seconds
pub const TONE_DURATION: f32 = 0.5;

/// Something that can make a note audible.
///
/// `emit` must not block and cannot fail: overlapping calls are independent
/// tones.
pub trait ToneSink {
    fn emit(&mut self, frequency: f32);
}

/// Discards every tone (muted runs, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ToneSink for SilentSink {
    fn emit(&mut self, _frequency: f32) {}
}

impl<T: ToneSink + ?Sized> ToneSink for Box<T> {
    fn emit(&mut self, frequency: f32) {
        (**self).emit(frequency)
    }
}

#[cfg(feature = "rtrb")]
pub use handle::{synth, ToneHandle};

#[cfg(feature = "rtrb")]
mod handle {
    use rtrb::{Consumer, Producer, RingBuffer};

    use super::{ToneBank, ToneMessage, ToneSink};

    /// Control-side end of the synthesizer queue.
    pub struct ToneHandle {
        tx: Producer<ToneMessage>,
    }

    impl ToneHandle {
        pub fn set_volume(&mut self, volume: f32) {
            self.send(ToneMessage::SetVolume(volume));
        }

        pub fn all_off(&mut self) {
            self.send(ToneMessage::AllOff);
        }

        fn send(&mut self, msg: ToneMessage) {
            if self.tx.push(msg).is_err() {
                log::warn!("tone queue full, dropped {:?}", msg);
            }
        }
    }

    impl ToneSink for ToneHandle {
        fn emit(&mut self, frequency: f32) {
            self.send(ToneMessage::Trigger { frequency });
        }
    }

    /// Build a connected handle/bank pair.
    pub fn synth(
        sample_rate: f32,
        max_voices: usize,
        queue_size: usize,
    ) -> (ToneHandle, ToneBank<Consumer<ToneMessage>>) {
        let (tx, rx) = RingBuffer::<ToneMessage>::new(queue_size);
        (ToneHandle { tx }, ToneBank::new(sample_rate, max_voices, rx))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn handle_drives_bank() {
            let (mut handle, mut bank) = synth(48_000.0, 4, 16);
            handle.emit(440.0);
            handle.emit(523.25);

            let mut out = vec![0.0f32; 128];
            bank.render_block(&mut out);
            assert_eq!(bank.active_voices(), 2);

            handle.all_off();
            bank.render_block(&mut out);
            assert_eq!(bank.active_voices(), 0);
        }

        #[test]
        fn full_queue_drops_instead_of_blocking() {
            let (mut handle, mut bank) = synth(48_000.0, 4, 2);
            for _ in 0..10 {
                handle.emit(440.0);
            }
            let mut out = vec![0.0f32; 64];
            bank.render_block(&mut out);
            assert_eq!(bank.active_voices(), 2);
        }
    }
}
