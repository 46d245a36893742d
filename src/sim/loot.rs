//! XP gems dropped by ordinary enemies
//!
//! Lifecycle: idle on the ground, homing once Felix comes within pickup
//! range, collected when it reaches him. Range checks are amortized over
//! frames; homing flight runs every frame.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::event::EntityId;
use super::spatial::{EveryNthFrame, within};
use crate::consts::FRAME_MS;

/// Roll above this is at least uncommon
pub const UNCOMMON_ROLL: f32 = 0.75;
/// Roll above this is rare
pub const RARE_ROLL: f32 = 0.95;
/// Homing speed in units per nominal frame
const HOMING_SPEED: f32 = 4.0;
/// Gems this close to Felix are collected
const COLLECT_REACH: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

impl Rarity {
    /// Weighted roll; `boost` shifts the roll toward rarer tiers
    pub fn roll(boost: f32, rng: &mut Pcg32) -> Self {
        let roll = rng.random::<f32>() + boost.max(0.0);
        if roll > RARE_ROLL {
            Rarity::Rare
        } else if roll > UNCOMMON_ROLL {
            Rarity::Uncommon
        } else {
            Rarity::Common
        }
    }

    pub fn xp(&self) -> u32 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 3,
            Rarity::Rare => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemPhase {
    Idle,
    Homing,
    Collected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gem {
    pub id: EntityId,
    pub pos: Vec2,
    pub rarity: Rarity,
    pub phase: GemPhase,
}

/// What changed during one gem pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GemPass {
    pub started_homing: Vec<EntityId>,
    pub collected: Vec<Gem>,
}

#[derive(Debug, Clone)]
pub struct GemManager {
    gems: Vec<Gem>,
    range_gate: EveryNthFrame,
}

impl GemManager {
    pub fn new(check_every: u32) -> Self {
        Self {
            gems: Vec::new(),
            range_gate: EveryNthFrame::new(check_every),
        }
    }

    /// Drop a gem at a death position
    pub fn place(&mut self, id: EntityId, pos: Vec2, boost: f32, rng: &mut Pcg32) -> &Gem {
        self.gems.push(Gem {
            id,
            pos,
            rarity: Rarity::roll(boost, rng),
            phase: GemPhase::Idle,
        });
        &self.gems[self.gems.len() - 1]
    }

    pub fn gems(&self) -> &[Gem] {
        &self.gems
    }

    pub fn len(&self) -> usize {
        self.gems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gems.is_empty()
    }

    /// Advance every gem one frame; collected gems leave the manager.
    pub fn update(&mut self, felix: Vec2, pickup_range: f32, elapsed: f64) -> GemPass {
        let mut pass = GemPass::default();

        let gems = &mut self.gems;
        self.range_gate.call(|| {
            for gem in gems.iter_mut().filter(|g| g.phase == GemPhase::Idle) {
                if within(pickup_range, felix, gem.pos) {
                    gem.phase = GemPhase::Homing;
                    pass.started_homing.push(gem.id);
                }
            }
        });

        let step = HOMING_SPEED * (elapsed / FRAME_MS) as f32;
        for gem in self.gems.iter_mut().filter(|g| g.phase == GemPhase::Homing) {
            let to_felix = felix - gem.pos;
            if to_felix.length() <= step.max(COLLECT_REACH) {
                gem.pos = felix;
                gem.phase = GemPhase::Collected;
            } else {
                gem.pos += to_felix.normalize_or_zero() * step;
            }
        }

        let (collected, kept): (Vec<Gem>, Vec<Gem>) = std::mem::take(&mut self.gems)
            .into_iter()
            .partition(|g| g.phase == GemPhase::Collected);
        self.gems = kept;
        pass.collected = collected;
        pass
    }
}
