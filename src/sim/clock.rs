//! World clock and spawn scheduler
//!
//! Turns game time into discrete, exactly-once happenings: minute
//! transitions, per-second ticks, era changes and spawn waves. The clock
//! only decides; the director carries the actions out.

use rand::Rng;
use rand_pcg::Pcg32;

use super::roster::Era;
use crate::tuning::Tuning;

/// Run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    /// Minute 12 reached: boss countdown fight
    Ending,
    Victory,
    GameOver,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Victory | Phase::GameOver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAction {
    /// `canonical_game_minute` just advanced to `minute`
    MinuteReached { minute: u32, era_changed: bool, era: Era },
    /// Era window changed on a tick: swap music, announce
    EraBegan { previous: Option<Era>, era: Era },
    SpawnWave { era: Era, count: u32 },
    SetPiece { era: Era },
}

#[derive(Debug, Clone)]
pub struct WorldClock {
    minute: u32,
    tick: i64,
    music_era: Option<usize>,
    frames: u32,
    shown_second: Option<u32>,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldClock {
    pub fn new() -> Self {
        Self {
            minute: 0,
            tick: -1,
            music_era: None,
            frames: 0,
            shown_second: None,
        }
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Last processed whole second
    pub fn tick(&self) -> i64 {
        self.tick
    }

    /// Era window index for a game time
    pub fn era_index(dt: f64, tuning: &Tuning) -> usize {
        let index = (dt.max(0.0) / tuning.era_ms).floor() as usize;
        index.min(tuning.era_order.len().saturating_sub(1))
    }

    pub fn era_at(dt: f64, tuning: &Tuning) -> Era {
        tuning
            .era_order
            .get(Self::era_index(dt, tuning))
            .copied()
            .unwrap_or(Era::StoneAge)
    }

    /// Advance to game time `dt`.
    ///
    /// A minute transition consumes the frame; the pending second tick is
    /// picked up on the next call. At most one tick fires per call.
    pub fn advance(&mut self, dt: f64, tuning: &Tuning, rng: &mut Pcg32) -> Vec<ClockAction> {
        let mut actions = Vec::new();

        let this_minute = (dt / tuning.minute_ms).floor() as i64;
        if this_minute > self.minute as i64 {
            let previous_era = Self::era_index((self.minute as f64) * tuning.minute_ms, tuning);
            self.minute += 1;
            let era_index = Self::era_index((self.minute as f64) * tuning.minute_ms, tuning);
            actions.push(ClockAction::MinuteReached {
                minute: self.minute,
                era_changed: era_index != previous_era,
                era: Self::era_at((self.minute as f64) * tuning.minute_ms, tuning),
            });
            return actions;
        }

        let second = (dt / 1000.0).floor() as i64;
        if second > self.tick {
            self.tick = second;

            let era_index = Self::era_index(dt, tuning);
            let era = Self::era_at(dt, tuning);
            if self.music_era != Some(era_index) {
                let previous = self
                    .music_era
                    .and_then(|i| tuning.era_order.get(i).copied());
                self.music_era = Some(era_index);
                actions.push(ClockAction::EraBegan { previous, era });
            }

            if self.tick % tuning.spawn_every_seconds.max(1) == 0 {
                if rng.random_bool(tuning.set_piece_chance.clamp(0.0, 1.0)) {
                    actions.push(ClockAction::SetPiece { era });
                } else {
                    actions.push(ClockAction::SpawnWave {
                        era,
                        count: tuning.spawn_count(self.tick),
                    });
                }
            }
        }

        actions
    }

    /// HUD timer pacing: refresh every Nth frame, and at once when the
    /// whole second changes. Returns the seconds to show, if any.
    pub fn pace_timer(&mut self, dt: f64, tuning: &Tuning) -> Option<u32> {
        self.frames = self.frames.wrapping_add(1);
        let second = (dt.max(0.0) / 1000.0).floor() as u32;
        let second_changed = self.shown_second != Some(second);
        if second_changed || self.frames % tuning.timer_refresh_frames.max(1) == 0 {
            self.shown_second = Some(second);
            Some(second)
        } else {
            None
        }
    }
}
