//! Piano - the owned state behind the key row
//!
//! Holds the note registry, the playback controller, which keys are lit and
//! the tone sink. Every input surface (keyboard, pointer, edit prompt,
//! sequence entry) goes through here, and playback locks out the ones that
//! would mutate shared state mid-sequence.

use std::collections::HashSet;
use std::time::Duration;

use crate::keymap::{KeyMap, RebindError};
use crate::playback::{PlaybackEvent, Player};
use crate::tone::ToneSink;

pub struct Piano<S: ToneSink> {
    keymap: KeyMap,
    player: Player,
    /// Lit state per note index
    active: Vec<bool>,
    /// Physical keys currently held down (uppercased)
    held: HashSet<char>,
    sink: S,
}

impl<S: ToneSink> Piano<S> {
    pub fn new(keymap: KeyMap, sink: S) -> Self {
        Self {
            active: vec![false; keymap.len()],
            keymap,
            player: Player::new(),
            held: HashSet::new(),
            sink,
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Whether sequence entry, the play trigger, rebinding and manual play
    /// are available.
    pub fn inputs_enabled(&self) -> bool {
        !self.is_playing()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Physical key down. Returns the note index it lit, if any.
    ///
    /// A key that is already held does not retrigger.
    pub fn press_key(&mut self, key: char) -> Option<usize> {
        if self.is_playing() {
            return None;
        }
        let key = key.to_ascii_uppercase();
        if self.held.contains(&key) {
            return None;
        }
        let index = self.keymap.index_of(key)?;
        self.held.insert(key);
        self.activate(index);
        Some(index)
    }

    /// Physical key up.
    pub fn release_key(&mut self, key: char) -> Option<usize> {
        let key = key.to_ascii_uppercase();
        self.held.remove(&key);
        if self.is_playing() {
            return None;
        }
        let index = self.keymap.index_of(key)?;
        self.deactivate(index);
        Some(index)
    }

    /// Pointer down on a key.
    pub fn press_note(&mut self, index: usize) -> bool {
        if self.is_playing() || index >= self.active.len() {
            return false;
        }
        self.activate(index);
        true
    }

    /// Pointer up on, or pointer leaving, a key.
    pub fn release_note(&mut self, index: usize) {
        if !self.is_playing() {
            self.deactivate(index);
        }
    }

    /// Change the trigger key of the note at `index`.
    pub fn rebind(&mut self, index: usize, input: &str) -> Result<(), RebindError> {
        if self.is_playing() {
            return Err(RebindError::Busy);
        }
        let old_key = self.keymap.get(index).map(|n| n.key);
        let result = self.keymap.rebind(index, input);
        match &result {
            Ok(()) => {
                let new_key = self.keymap.get(index).map(|n| n.key);
                if let Some(old) = old_key.filter(|&old| Some(old) != new_key) {
                    // The old key can no longer release this note
                    self.held.remove(&old);
                    self.deactivate(index);
                }
            }
            Err(err) if err.is_user_facing() => log::warn!("rebind of note {index} refused: {err}"),
            Err(err) => log::debug!("rebind of note {index} ignored: {err}"),
        }
        result
    }

    /// Start playing `sequence`. The first note sounds immediately.
    pub fn play(&mut self, sequence: &str) -> bool {
        if !self.player.play(sequence, &self.keymap) {
            return false;
        }
        // Nothing mapped: finished already, leave held keys alone
        if !self.player.is_playing() {
            return true;
        }
        log::info!("playing sequence {:?}", sequence);
        // Manual presses may still be lit
        self.active.fill(false);
        self.held.clear();
        self.tick(Duration::ZERO);
        true
    }

    /// Advance playback by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let Self {
            player,
            active,
            sink,
            ..
        } = self;

        player.advance(dt, |event| match event {
            PlaybackEvent::NoteOn { index, frequency } => {
                active[index] = true;
                sink.emit(frequency);
            }
            PlaybackEvent::NoteOff { index } => active[index] = false,
            PlaybackEvent::Finished => log::info!("sequence finished"),
        });
    }

    /// Longest sequence the entry accepts
    pub fn max_sequence_len(&self) -> usize {
        self.keymap.len() * 2
    }

    /// Clean up raw sequence text: uppercase, mapped characters only, capped
    /// at [`Piano::max_sequence_len`].
    pub fn filter_sequence(&self, input: &str) -> String {
        input
            .chars()
            .map(|c| c.to_ascii_uppercase())
            .filter(|&c| self.keymap.is_mapped(c))
            .take(self.max_sequence_len())
            .collect()
    }

    fn activate(&mut self, index: usize) {
        if !self.active[index] {
            self.active[index] = true;
            if let Some(note) = self.keymap.get(index) {
                self.sink.emit(note.frequency);
            }
        }
    }

    fn deactivate(&mut self, index: usize) {
        if let Some(lit) = self.active.get_mut(index) {
            *lit = false;
        }
    }
}

impl<S: ToneSink + Default> Default for Piano<S> {
    fn default() -> Self {
        Self::new(KeyMap::default(), S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<f32>);

    impl ToneSink for Recorder {
        fn emit(&mut self, frequency: f32) {
            self.0.push(frequency);
        }
    }

    #[test]
    fn key_press_lights_and_sounds_once() {
        let mut piano = Piano::<Recorder>::default();
        assert_eq!(piano.press_key('d'), Some(2));
        assert!(piano.is_active(2));
        // Auto-repeat while held
        assert_eq!(piano.press_key('D'), None);
        assert_eq!(piano.sink_mut().0, vec![329.63]);

        assert_eq!(piano.release_key('d'), Some(2));
        assert!(!piano.is_active(2));
        assert_eq!(piano.press_key('d'), Some(2));
        assert_eq!(piano.sink_mut().0.len(), 2);
    }

    #[test]
    fn unmapped_key_does_nothing() {
        let mut piano = Piano::<Recorder>::default();
        assert_eq!(piano.press_key('z'), None);
        assert_eq!(piano.press_key('1'), None);
        assert!(piano.sink_mut().0.is_empty());
    }

    #[test]
    fn pointer_and_keyboard_share_lit_state() {
        let mut piano = Piano::<Recorder>::default();
        assert!(piano.press_note(0));
        // Already lit, so the key press does not sound it again
        piano.press_key('a');
        assert_eq!(piano.sink_mut().0.len(), 1);
        piano.release_note(0);
        assert!(!piano.is_active(0));
        assert!(!piano.press_note(42));
    }

    #[test]
    fn playback_locks_out_input() {
        let mut piano = Piano::<Recorder>::default();
        assert!(piano.play("AS"));
        assert!(piano.is_playing());
        assert!(!piano.inputs_enabled());
        assert!(piano.is_active(0));

        assert_eq!(piano.press_key('k'), None);
        assert!(!piano.press_note(7));
        assert_eq!(piano.rebind(0, "Z"), Err(RebindError::Busy));
        assert_eq!(piano.keymap().get(0).map(|n| n.key), Some('A'));

        piano.tick(Duration::from_millis(1000));
        assert!(!piano.is_playing());
        assert!(piano.inputs_enabled());
        assert_eq!(piano.sink_mut().0, vec![261.63, 293.66]);
        assert!((0..8).all(|i| !piano.is_active(i)));
    }

    #[test]
    fn playback_highlights_follow_timeline() {
        let mut piano = Piano::<Recorder>::default();
        piano.play("AS");
        piano.tick(Duration::from_millis(399));
        assert!(piano.is_active(0));
        piano.tick(Duration::from_millis(1));
        assert!(!piano.is_active(0));
        piano.tick(Duration::from_millis(100));
        assert!(piano.is_active(1));
    }

    #[test]
    fn play_clears_manual_presses() {
        let mut piano = Piano::<Recorder>::default();
        piano.press_key('k');
        piano.play("A");
        assert!(!piano.is_active(7));
        assert!(piano.is_active(0));
    }

    #[test]
    fn unmapped_only_sequence_keeps_held_keys() {
        let mut piano = Piano::<Recorder>::default();
        assert_eq!(piano.press_key('d'), Some(2));

        assert!(piano.play("XYZ"));
        assert!(!piano.is_playing());
        assert!(piano.is_active(2));
        // Still held, so no second tone
        assert_eq!(piano.press_key('d'), None);
        assert_eq!(piano.sink_mut().0, vec![329.63]);
    }

    #[test]
    fn rebind_while_held_unlights_the_note() {
        let mut piano = Piano::<Recorder>::default();
        piano.press_key('a');
        piano.rebind(0, "q").unwrap();

        assert!(!piano.is_active(0));
        assert_eq!(piano.release_key('a'), None);
        assert_eq!(piano.press_key('q'), Some(0));
        assert_eq!(piano.sink_mut().0.len(), 2);
    }

    #[test]
    fn rebind_to_same_key_keeps_it_held() {
        let mut piano = Piano::<Recorder>::default();
        piano.press_key('a');
        piano.rebind(0, "A").unwrap();

        assert!(piano.is_active(0));
        assert_eq!(piano.press_key('a'), None);
    }

    #[test]
    fn second_play_is_ignored() {
        let mut piano = Piano::<Recorder>::default();
        assert!(piano.play("A"));
        piano.tick(Duration::from_millis(200));
        assert!(!piano.play("K"));
        assert_eq!(piano.player().elapsed(), Duration::from_millis(200));
        assert_eq!(piano.sink_mut().0.len(), 1);
    }

    #[test]
    fn sequence_filter_uses_current_bindings() {
        let mut piano = Piano::<Recorder>::default();
        assert_eq!(piano.filter_sequence("as-d x!k"), "ASDK");

        piano.rebind(0, "q").unwrap();
        assert_eq!(piano.filter_sequence("aqs"), "QS");

        let long = "a".repeat(40);
        assert_eq!(piano.filter_sequence(&long).len(), 0);
        let long = "s".repeat(40);
        assert_eq!(piano.filter_sequence(&long).len(), 16);
    }

    #[test]
    fn rebind_conflict_leaves_state() {
        let mut piano = Piano::<Recorder>::default();
        let err = piano.rebind(2, "A").unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(piano.press_key('a'), Some(0));
    }
}
