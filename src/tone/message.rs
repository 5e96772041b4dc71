#[cfg(feature = "rtrb")]
use rtrb::Consumer;
use std::collections::VecDeque;

/// Control messages from the UI side to the tone bank
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ToneMessage {
    /// Start a new decaying tone at this pitch
    Trigger { frequency: f32 },
    /// Master gain, 0.0-1.0
    SetVolume(f32),
    /// Silence every voice at once
    AllOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ToneMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ToneMessage> {
    fn pop(&mut self) -> Option<ToneMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for VecDeque<ToneMessage> {
    fn pop(&mut self) -> Option<ToneMessage> {
        self.pop_front()
    }
}
