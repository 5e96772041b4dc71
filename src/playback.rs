//! Player - timed, forward-only sequence playback
//!
//! The player turns a typed sequence into a timeline of note-on/note-off
//! events. It never sleeps: the owner calls [`Player::advance`] with the time
//! that has passed and the player reports every event that fell inside it.

use std::time::Duration;

use crate::keymap::KeyMap;

/// How long each note stays down
pub const NOTE_HOLD: Duration = Duration::from_millis(400);
/// Silence after each note before the next one
pub const NOTE_GAP: Duration = Duration::from_millis(100);

/*
Timeline
--------

Every mapped character becomes one step. Unmapped characters are dropped
when the session is built, so they cost no time at all.

    A           S           D
    ████████░░  ████████░░  ████████░░
    |  hold  |gap

    NoteOn(A) ... NoteOff(A) ... NoteOn(S) ... NoteOff(S) ... Finished

Per step the phases run Pending → Holding → Gap. Pending emits NoteOn with
no time cost; the end of Holding emits NoteOff; the end of the last Gap
emits Finished and the player goes back to Idle.
*/

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
}

/// Events produced while a sequence plays
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// Mark the note active and sound it
    NoteOn { index: usize, frequency: f32 },
    /// Mark the note inactive
    NoteOff { index: usize },
    /// Last gap elapsed, input can be re-enabled
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Holding,
    Gap,
}

/// A resolved step: which note, at what pitch
#[derive(Debug, Clone, Copy)]
struct Step {
    index: usize,
    frequency: f32,
}

/// Transient state of one playback pass
#[derive(Debug)]
struct Session {
    steps: Vec<Step>,
    position: usize,
    phase: Phase,
    /// Time left in the current phase
    remaining: Duration,
    elapsed: Duration,
}

/// Sequence playback controller
#[derive(Debug, Default)]
pub struct Player {
    session: Option<Session>,
}

impl Player {
    pub fn new() -> Self {
        Self { session: None }
    }

    pub fn state(&self) -> PlayerState {
        if self.session.is_some() {
            PlayerState::Playing
        } else {
            PlayerState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    /// Start playing `sequence` against the current key map.
    ///
    /// Returns `false` (and changes nothing) if a sequence is already
    /// playing or `sequence` is empty. A sequence with no mapped characters
    /// is accepted and completes at once, leaving the player idle.
    pub fn play(&mut self, sequence: &str, keymap: &KeyMap) -> bool {
        if self.is_playing() || sequence.is_empty() {
            return false;
        }

        let steps: Vec<Step> = sequence
            .chars()
            .filter_map(|c| {
                let index = keymap.index_of(c)?;
                let frequency = keymap.get(index)?.frequency;
                Some(Step { index, frequency })
            })
            .collect();

        log::debug!(
            "playing {:?}: {} of {} characters mapped",
            sequence,
            steps.len(),
            sequence.chars().count()
        );

        if steps.is_empty() {
            return true;
        }

        self.session = Some(Session {
            steps,
            position: 0,
            phase: Phase::Pending,
            remaining: Duration::ZERO,
            elapsed: Duration::ZERO,
        });
        true
    }

    /// Advance playback by `dt`, reporting events in order through `emit`.
    ///
    /// `advance(Duration::ZERO, ..)` right after [`Player::play`] emits the
    /// first note-on.
    pub fn advance(&mut self, dt: Duration, mut emit: impl FnMut(PlaybackEvent)) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let mut budget = dt;
        loop {
            let step = session.steps[session.position];
            match session.phase {
                Phase::Pending => {
                    emit(PlaybackEvent::NoteOn {
                        index: step.index,
                        frequency: step.frequency,
                    });
                    session.phase = Phase::Holding;
                    session.remaining = NOTE_HOLD;
                }
                Phase::Holding | Phase::Gap => {
                    if budget < session.remaining {
                        session.remaining -= budget;
                        session.elapsed += budget;
                        return;
                    }
                    budget -= session.remaining;
                    session.elapsed += session.remaining;

                    if session.phase == Phase::Holding {
                        emit(PlaybackEvent::NoteOff { index: step.index });
                        session.phase = Phase::Gap;
                        session.remaining = NOTE_GAP;
                    } else {
                        session.position += 1;
                        if session.position == session.steps.len() {
                            log::debug!("sequence finished after {:?}", session.elapsed);
                            self.session = None;
                            emit(PlaybackEvent::Finished);
                            return;
                        }
                        session.phase = Phase::Pending;
                    }
                }
            }
        }
    }

    /// (current step, total steps) while playing
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.session
            .as_ref()
            .map(|s| (s.position, s.steps.len()))
    }

    /// Time since the first note-on of the current pass
    pub fn elapsed(&self) -> Duration {
        self.session
            .as_ref()
            .map(|s| s.elapsed)
            .unwrap_or(Duration::ZERO)
    }

    /// Length of a full pass over `steps` mapped notes
    pub fn duration_for(steps: usize) -> Duration {
        (NOTE_HOLD + NOTE_GAP) * steps as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Run to completion in `step` increments, returning (time, event) pairs
    fn run(player: &mut Player, step: Duration) -> Vec<(Duration, PlaybackEvent)> {
        let mut now = Duration::ZERO;
        let mut events = Vec::new();
        player.advance(Duration::ZERO, |e| events.push((now, e)));
        while player.is_playing() {
            now += step;
            player.advance(step, |e| events.push((now, e)));
        }
        events
    }

    #[test]
    fn plays_full_scale_in_order() {
        let map = KeyMap::default();
        let mut player = Player::new();
        assert!(player.play("ASDFGHJK", &map));
        assert_eq!(player.state(), PlayerState::Playing);

        let events = run(&mut player, ms(10));

        let ons: Vec<(Duration, usize)> = events
            .iter()
            .filter_map(|&(t, e)| match e {
                PlaybackEvent::NoteOn { index, .. } => Some((t, index)),
                _ => None,
            })
            .collect();
        let expected: Vec<(Duration, usize)> =
            (0..8).map(|i| (ms(500 * i as u64), i)).collect();
        assert_eq!(ons, expected);

        let offs: Vec<Duration> = events
            .iter()
            .filter(|(_, e)| matches!(e, PlaybackEvent::NoteOff { .. }))
            .map(|&(t, _)| t)
            .collect();
        assert_eq!(offs[0], ms(400));
        assert_eq!(offs[7], ms(3900));

        assert_eq!(events.last(), Some(&(ms(4000), PlaybackEvent::Finished)));
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn unmapped_characters_cost_nothing() {
        let map = KeyMap::default();
        let mut player = Player::new();
        assert!(player.play("AXSX", &map));

        let events = run(&mut player, ms(50));
        let played: Vec<usize> = events
            .iter()
            .filter_map(|(_, e)| match e {
                PlaybackEvent::NoteOn { index, .. } => Some(*index),
                _ => None,
            })
            .collect();

        assert_eq!(played, vec![0, 1]);
        assert_eq!(events.last(), Some(&(ms(1000), PlaybackEvent::Finished)));
        assert_eq!(Player::duration_for(2), ms(1000));
    }

    #[test]
    fn large_step_emits_everything_in_order() {
        let map = KeyMap::default();
        let mut player = Player::new();
        player.play("AS", &map);

        let mut events = Vec::new();
        player.advance(ms(10_000), |e| events.push(e));

        assert_eq!(
            events,
            vec![
                PlaybackEvent::NoteOn { index: 0, frequency: 261.63 },
                PlaybackEvent::NoteOff { index: 0 },
                PlaybackEvent::NoteOn { index: 1, frequency: 293.66 },
                PlaybackEvent::NoteOff { index: 1 },
                PlaybackEvent::Finished,
            ]
        );
        assert!(!player.is_playing());
    }

    #[test]
    fn play_while_playing_is_ignored() {
        let map = KeyMap::default();
        let mut player = Player::new();
        player.play("AS", &map);
        player.advance(ms(150), |_| {});

        assert!(!player.play("K", &map));
        assert_eq!(player.progress(), Some((0, 2)));
        assert_eq!(player.elapsed(), ms(150));
    }

    #[test]
    fn empty_sequence_is_ignored() {
        let map = KeyMap::default();
        let mut player = Player::new();
        assert!(!player.play("", &map));
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn only_unmapped_completes_immediately() {
        let map = KeyMap::default();
        let mut player = Player::new();
        assert!(player.play("XYZ", &map));
        assert_eq!(player.state(), PlayerState::Idle);

        let mut events = Vec::new();
        player.advance(ms(100), |e| events.push(e));
        assert!(events.is_empty());
    }

    #[test]
    fn lowercase_sequence_resolves() {
        let map = KeyMap::default();
        let mut player = Player::new();
        player.play("k", &map);

        let mut first = None;
        player.advance(Duration::ZERO, |e| {
            first.get_or_insert(e);
        });
        assert_eq!(
            first,
            Some(PlaybackEvent::NoteOn { index: 7, frequency: 523.25 })
        );
    }
}
