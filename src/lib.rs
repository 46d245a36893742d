//! Felix vs. Father Time - clock-face arena survival core
//!
//! Core modules:
//! - `sim`: Director, enemies, weapons, loot and the upgrade flow
//! - `platform`: Frame clock, render loop and host collaborator traits
//! - `ui`: HUD state model fed by director events
//! - `audio`: Cue catalogue (and the Web Audio synth on wasm)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Local leaderboard
//! - `settings`: Player preferences

pub mod audio;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use audio::Cue;
pub use error::{Fault, LeaderboardError, TuningError};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame length in ms; movement is expressed in steps of this size
    pub const FRAME_MS: f64 = 16.667;
    /// Length of one game minute in ms
    pub const MINUTE_MS: f64 = 60_000.0;
    /// Minute at which the ending sequence begins
    pub const ENDING_MINUTE: u32 = 12;

    /// Felix cannot walk off the clock face
    pub const ARENA_RADIUS: f32 = 170.0;
    /// Radius of the ring the clock numerals sit on
    pub const NUMERAL_RADIUS: f32 = 140.0;
    /// Height a clock-number enemy climbs to when rising out of the face
    pub const NUMERAL_RISE_HEIGHT: f32 = 30.0;
    /// Clock-number enemies only start walking above this height
    pub const NUMERAL_WALK_HEIGHT: f32 = 15.0;

    /// Ring on which ordinary enemies appear, relative to the arena centre
    pub const SPAWN_MIN_OFFSET: f32 = 100.0;
    pub const SPAWN_MAX_OFFSET: f32 = 200.0;

    /// Felix starting ground position
    pub const FELIX_START: (f32, f32) = (0.0, 80.0);
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Ground position of a numeral on the clock face (12 at the top, i.e. -z)
#[inline]
pub fn numeral_position(index: u32) -> Vec2 {
    let theta = index as f32 * std::f32::consts::TAU / 12.0;
    Vec2::new(
        consts::NUMERAL_RADIUS * theta.sin(),
        -consts::NUMERAL_RADIUS * theta.cos(),
    )
}

/// Roman numeral for a clock position (1..=12)
pub fn roman(n: u32) -> &'static str {
    match n {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        6 => "VI",
        7 => "VII",
        8 => "VIII",
        9 => "IX",
        10 => "X",
        11 => "XI",
        12 => "XII",
        _ => "?",
    }
}
