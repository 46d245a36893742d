//! Data-driven game balance
//!
//! Every number the director schedules against lives here so a run can be
//! rebalanced from JSON without touching the simulation.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::Era;

/// Spawn-count step: from `from_second` onward, `count` enemies per wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnStep {
    pub from_second: i64,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Clock ===
    /// Length of one game minute (ms)
    pub minute_ms: f64,
    /// Length of one era window (ms)
    pub era_ms: f64,
    /// Eras in play order; the last one holds once the list runs out
    pub era_order: Vec<Era>,
    /// Ordinary spawn waves fire on every Nth second
    pub spawn_every_seconds: i64,
    /// Chance a spawn wave is replaced by a set piece
    pub set_piece_chance: f64,
    /// Escalating wave sizes; the first step covers everything before it
    pub spawn_steps: Vec<SpawnStep>,
    /// HUD timer refresh cadence in frames
    pub timer_refresh_frames: u32,

    // === Ending ===
    /// Countdown fight length after the final bag (ms)
    pub ending_countdown_ms: f64,
    /// Random enemies spawned per countdown second
    pub ending_spawns_per_second: u32,

    // === Loot ===
    /// Starting gem pickup range
    pub pickup_range: f32,
    /// Bag pickup range
    pub bag_pickup_range: f32,
    /// Gem proximity checks run every Nth frame
    pub gem_check_every: u32,
    /// Expected XP per minute, minutes 1..=12
    pub expected_xp: Vec<u32>,

    // === Felix ===
    pub felix_max_hp: u32,
    /// Minimum gap between two hits on Felix (ms)
    pub felix_hurt_cooldown_ms: f64,
    /// Walk speed in units per nominal frame
    pub felix_speed: f32,

    // === Upgrades ===
    /// Modal fade-out before the simulation resumes (real ms)
    pub fade_ms: f64,
    /// Stun applied by FREEZE at scalar 1.0 (ms)
    pub freeze_ms: f64,

    // === Driver ===
    /// A frame gap above this is treated as a pause (ms)
    pub stall_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            minute_ms: crate::consts::MINUTE_MS,
            era_ms: 3.0 * crate::consts::MINUTE_MS,
            era_order: Era::ALL.to_vec(),
            spawn_every_seconds: 5,
            set_piece_chance: 0.3,
            spawn_steps: vec![
                SpawnStep { from_second: 0, count: 1 },
                SpawnStep { from_second: 20, count: 2 },
                SpawnStep { from_second: 180, count: 3 },
                SpawnStep { from_second: 300, count: 4 },
                SpawnStep { from_second: 480, count: 5 },
                SpawnStep { from_second: 600, count: 6 },
                SpawnStep { from_second: 645, count: 7 },
            ],
            timer_refresh_frames: 10,

            ending_countdown_ms: 60_000.0,
            ending_spawns_per_second: 3,

            pickup_range: 15.0,
            bag_pickup_range: 20.0,
            gem_check_every: 5,
            expected_xp: vec![10, 20, 35, 50, 80, 110, 150, 190, 240, 300, 360, 450],

            felix_max_hp: 4,
            felix_hurt_cooldown_ms: 2000.0,
            felix_speed: 2.0,

            fade_ms: 500.0,
            freeze_ms: 15_000.0,

            stall_ms: 500.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning file. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.era_order.is_empty() {
            return Err(TuningError::EmptyEraOrder);
        }
        if self.expected_xp.len() != 12 {
            return Err(TuningError::ExpectedXpLength {
                found: self.expected_xp.len(),
            });
        }
        let positive = [
            ("minute_ms", self.minute_ms > 0.0),
            ("era_ms", self.era_ms > 0.0),
            ("spawn_every_seconds", self.spawn_every_seconds > 0),
            ("gem_check_every", self.gem_check_every > 0),
            ("timer_refresh_frames", self.timer_refresh_frames > 0),
            ("felix_max_hp", self.felix_max_hp > 0),
            ("expected_xp", self.expected_xp.iter().all(|&xp| xp > 0)),
        ];
        for (field, ok) in positive {
            if !ok {
                return Err(TuningError::NonPositive { field });
            }
        }
        Ok(())
    }

    /// Expected XP target for a minute (1..=12)
    pub fn expected_xp_for(&self, minute: u32) -> Option<u32> {
        let index = (minute as usize).checked_sub(1)?;
        self.expected_xp.get(index).copied()
    }

    /// Wave size at a given elapsed second
    pub fn spawn_count(&self, second: i64) -> u32 {
        self.spawn_steps
            .iter()
            .take_while(|step| second >= step.from_second)
            .last()
            .or(self.spawn_steps.first())
            .map(|step| step.count)
            .unwrap_or(1)
    }
}
