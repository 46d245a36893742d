//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Game time: a frame clock that excludes pauses and long stalls
//! - The render/pause driver that feeds the director
//! - The collaborators director events are dispatched to (scene, UI,
//!   audio, leaderboard)

use crate::audio::Cue;
use crate::consts::FRAME_MS;
use crate::error::LeaderboardError;
use crate::sim::{Channel, Director, GameEvent};

/// Converts absolute host timestamps into game time.
///
/// Game time stops while paused. A single frame gap above `stall_ms` is
/// treated like a pause: it counts as one nominal frame and the excess is
/// dropped, so a hitch never turns into a burst of hits or clock ticks.
#[derive(Debug, Clone)]
pub struct FrameClock {
    stall_ms: f64,
    start: f64,
    /// Host time excluded from game time so far
    excluded: f64,
    last: Option<f64>,
    paused_since: Option<f64>,
}

impl FrameClock {
    pub fn new(stall_ms: f64) -> Self {
        Self {
            stall_ms,
            start: 0.0,
            excluded: 0.0,
            last: None,
            paused_since: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Host time dropped so far (pauses and stalls)
    pub fn excluded(&self) -> f64 {
        self.excluded
    }

    /// Advance to host time `now`. Returns `(dt, elapsed)`: game time since
    /// the first frame and the length of this frame, both in ms.
    pub fn tick(&mut self, now: f64) -> (f64, f64) {
        let Some(last) = self.last else {
            self.start = now;
            self.last = Some(now);
            return (0.0, 0.0);
        };

        let mut elapsed = (now - last).max(0.0);
        if elapsed > self.stall_ms {
            log::debug!("frame stall of {elapsed:.0} ms excluded");
            self.excluded += elapsed - FRAME_MS;
            elapsed = FRAME_MS;
        }
        self.last = Some(now);
        (now - self.start - self.excluded, elapsed)
    }

    pub fn pause(&mut self, now: f64) {
        if self.paused_since.is_none() {
            self.paused_since = Some(now);
        }
    }

    /// Resume after a pause; the paused span is excluded from game time.
    pub fn resume(&mut self, now: f64) {
        let Some(since) = self.paused_since.take() else {
            return;
        };
        let paused = (now - since).max(0.0);
        self.excluded += paused;
        if let Some(last) = self.last.as_mut() {
            *last += paused;
        }
    }
}

/// Drives the director from host animation frames.
///
/// While rendering is paused the host keeps calling [`RenderLoop::frame`];
/// the director then only gets [`Director::paused_frame`] with real time,
/// and game time stands still.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    clock: FrameClock,
    last_real: Option<f64>,
}

impl RenderLoop {
    pub fn new(stall_ms: f64) -> Self {
        Self {
            clock: FrameClock::new(stall_ms),
            last_real: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn pause_rendering(&mut self, now: f64) {
        self.clock.pause(now);
    }

    pub fn resume_rendering(&mut self, now: f64) {
        self.clock.resume(now);
    }

    /// One host frame at absolute time `now`. Returns every event the
    /// director produced since the last frame, driver events already applied.
    pub fn frame(&mut self, now: f64, director: &mut Director) -> Vec<GameEvent> {
        // Events queued by input handlers between frames
        let mut events = director.drain_events();
        self.apply_driver_events(&events, now);

        let real = now - self.last_real.unwrap_or(now);
        self.last_real = Some(now);
        if self.is_paused() {
            director.paused_frame(real);
        } else {
            let (dt, elapsed) = self.clock.tick(now);
            director.update(dt, elapsed);
        }

        let fresh = director.drain_events();
        self.apply_driver_events(&fresh, now);
        events.extend(fresh);
        events
    }

    fn apply_driver_events(&mut self, events: &[GameEvent], now: f64) {
        for event in events {
            match event {
                GameEvent::PauseRendering => self.pause_rendering(now),
                GameEvent::ResumeRendering => self.resume_rendering(now),
                _ => {}
            }
        }
    }
}

/// Scene graph: meshes, sprites and screen effects
pub trait SceneSink {
    fn apply(&mut self, event: &GameEvent);
}

/// HUD and menus
pub trait UiSink {
    fn apply(&mut self, event: &GameEvent);
}

/// Fire-and-forget audio
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
    fn pause(&mut self, cue: Cue);
}

/// Score table; returns the 1-based rank achieved
pub trait Leaderboard {
    fn submit(&mut self, score: u64, metadata: &str) -> Result<usize, LeaderboardError>;
}

/// Sink for hosts without a scene or speakers (headless runs, tests)
#[derive(Debug, Clone, Default)]
pub struct NullSink {
    pub scene_events: usize,
    pub cues_played: usize,
}

impl SceneSink for NullSink {
    fn apply(&mut self, event: &GameEvent) {
        self.scene_events += 1;
        log::trace!("scene: {event:?}");
    }
}

impl AudioSink for NullSink {
    fn play(&mut self, cue: Cue) {
        self.cues_played += 1;
        log::trace!("play {cue:?}");
    }

    fn pause(&mut self, cue: Cue) {
        log::trace!("pause {cue:?}");
    }
}

/// The collaborators one host provides
pub struct Sinks<'a> {
    pub scene: &'a mut dyn SceneSink,
    pub ui: &'a mut dyn UiSink,
    pub audio: &'a mut dyn AudioSink,
    pub leaderboard: &'a mut dyn Leaderboard,
}

/// Route director events to their collaborators, in order.
///
/// Leaderboard failures never reach the simulation; they are logged and the
/// rank is simply missing. Returns the rank of a submitted score, if any.
pub fn dispatch(events: &[GameEvent], sinks: &mut Sinks<'_>) -> Option<usize> {
    let mut rank = None;
    for event in events {
        match event.channel() {
            Channel::Scene => sinks.scene.apply(event),
            Channel::Ui => sinks.ui.apply(event),
            Channel::Audio => match event {
                GameEvent::Play(cue) => sinks.audio.play(*cue),
                GameEvent::Pause(cue) => sinks.audio.pause(*cue),
                _ => {}
            },
            Channel::Leaderboard => {
                if let GameEvent::SubmitScore { score, metadata } = event {
                    match sinks.leaderboard.submit(*score, metadata) {
                        Ok(place) => rank = Some(place),
                        Err(err) => log::warn!("score submission failed: {err}"),
                    }
                }
            }
            Channel::Driver => {}
        }
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    #[test]
    fn test_first_frame_starts_at_zero() {
        let mut clock = FrameClock::new(500.0);
        assert_eq!(clock.tick(1234.0), (0.0, 0.0));
        assert_eq!(clock.tick(1250.0), (16.0, 16.0));
    }

    #[test]
    fn test_stall_counts_as_one_frame() {
        let mut clock = FrameClock::new(500.0);
        clock.tick(0.0);
        clock.tick(16.0);
        let (dt, elapsed) = clock.tick(3016.0);
        assert_eq!(elapsed, FRAME_MS);
        assert!((dt - (16.0 + FRAME_MS)).abs() < 1e-9);
        assert!((clock.excluded() - (3000.0 - FRAME_MS)).abs() < 1e-9);
        // Back to normal afterwards
        let (next, elapsed) = clock.tick(3032.0);
        assert_eq!(elapsed, 16.0);
        assert!((next - dt - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_freezes_game_time() {
        let mut clock = FrameClock::new(500.0);
        clock.tick(0.0);
        clock.tick(100.0);
        clock.pause(100.0);
        assert!(clock.is_paused());
        clock.resume(10_100.0);
        let (dt, elapsed) = clock.tick(10_116.0);
        assert_eq!(dt, 116.0);
        assert_eq!(elapsed, 16.0);
    }

    #[test]
    fn test_render_loop_pauses_on_bag() {
        let mut director = Director::new(Tuning::default(), 3);
        let mut driver = RenderLoop::new(500.0);
        driver.frame(0.0, &mut director);
        assert!(!driver.is_paused());

        director.toggle_pause_menu();
        let events = driver.frame(16.0, &mut director);
        assert!(events.contains(&GameEvent::ShowPauseMenu));
        assert!(driver.is_paused());

        // Time passes without advancing the run
        driver.frame(5_000.0, &mut director);
        director.toggle_pause_menu();
        driver.frame(5_016.0, &mut director);
        assert!(!driver.is_paused());
        driver.frame(5_032.0, &mut director);
        assert!(driver.clock().excluded() >= 4_984.0 - 1e-9);
    }

    struct Recorder {
        ui: Vec<GameEvent>,
        played: Vec<Cue>,
        paused: Vec<Cue>,
        fail: bool,
    }

    impl UiSink for Recorder {
        fn apply(&mut self, event: &GameEvent) {
            self.ui.push(event.clone());
        }
    }

    impl AudioSink for Recorder {
        fn play(&mut self, cue: Cue) {
            self.played.push(cue);
        }

        fn pause(&mut self, cue: Cue) {
            self.paused.push(cue);
        }
    }

    impl Leaderboard for Recorder {
        fn submit(&mut self, _score: u64, _metadata: &str) -> Result<usize, LeaderboardError> {
            if self.fail {
                Err(LeaderboardError::Storage("offline".into()))
            } else {
                Ok(4)
            }
        }
    }

    #[test]
    fn test_dispatch_routes_by_channel() {
        let events = vec![
            GameEvent::HurtFlash,
            GameEvent::Play(Cue::FelixHurt),
            GameEvent::Pause(Cue::FinalLoop),
            GameEvent::SetHp { hp: 3, max: 4 },
            GameEvent::PauseRendering,
            GameEvent::SubmitScore { score: 9, metadata: "I".into() },
        ];
        let mut scene = NullSink::default();
        let mut audio = Recorder { ui: vec![], played: vec![], paused: vec![], fail: false };
        let mut ui = Recorder { ui: vec![], played: vec![], paused: vec![], fail: false };
        let mut board = Recorder { ui: vec![], played: vec![], paused: vec![], fail: false };
        let rank = dispatch(
            &events,
            &mut Sinks {
                scene: &mut scene,
                ui: &mut ui,
                audio: &mut audio,
                leaderboard: &mut board,
            },
        );
        assert_eq!(rank, Some(4));
        assert_eq!(scene.scene_events, 1);
        assert_eq!(ui.ui, vec![GameEvent::SetHp { hp: 3, max: 4 }]);
        assert_eq!(audio.played, vec![Cue::FelixHurt]);
        assert_eq!(audio.paused, vec![Cue::FinalLoop]);
    }

    #[test]
    fn test_leaderboard_failure_is_swallowed() {
        let events = vec![GameEvent::SubmitScore { score: 9, metadata: String::new() }];
        let mut scene = NullSink::default();
        let mut audio = NullSink::default();
        let mut ui = Recorder { ui: vec![], played: vec![], paused: vec![], fail: false };
        let mut board = Recorder { ui: vec![], played: vec![], paused: vec![], fail: true };
        let rank = dispatch(
            &events,
            &mut Sinks {
                scene: &mut scene,
                ui: &mut ui,
                audio: &mut audio,
                leaderboard: &mut board,
            },
        );
        assert_eq!(rank, None);
    }

    proptest! {
        #[test]
        fn prop_pause_shifts_game_time_exactly(
            frames in proptest::collection::vec(1.0f64..40.0, 2..60),
            pause_at in 1usize..59,
            pause_len in 0.0f64..100_000.0,
        ) {
            let pause_at = pause_at.min(frames.len() - 1);
            let mut plain = FrameClock::new(500.0);
            let mut paused = FrameClock::new(500.0);
            plain.tick(0.0);
            paused.tick(0.0);

            let mut t = 0.0;
            let mut last = (0.0, 0.0);
            for (i, gap) in frames.iter().enumerate() {
                if i == pause_at {
                    paused.pause(t);
                    paused.resume(t + pause_len);
                }
                t += gap;
                let shifted = if i >= pause_at { t + pause_len } else { t };
                let a = plain.tick(t);
                let b = paused.tick(shifted);
                prop_assert!((a.0 - b.0).abs() < 1e-6);
                prop_assert!((a.1 - b.1).abs() < 1e-6);
                last = b;
            }
            prop_assert!(last.0 <= t + 1e-6);
        }
    }
}
