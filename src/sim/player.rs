//! Felix, the player avatar

use glam::Vec2;

use crate::consts::{ARENA_RADIUS, FELIX_START, FRAME_MS};
use crate::tuning::Tuning;

/// Result of contact damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hurt {
    /// Still inside the post-hit cooldown
    Ignored,
    Wounded { hp: u32 },
    Died,
}

#[derive(Debug, Clone)]
pub struct Felix {
    pub pos: Vec2,
    pub hp: u32,
    pub max_hp: u32,
    /// Units per nominal frame
    pub speed: f32,
    hurt_cooldown: f64,
    last_hurt: Option<f64>,
}

impl Felix {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(FELIX_START.0, FELIX_START.1),
            hp: tuning.felix_max_hp,
            max_hp: tuning.felix_max_hp,
            speed: tuning.felix_speed,
            hurt_cooldown: tuning.felix_hurt_cooldown_ms,
            last_hurt: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Contact damage, one HP at a time, throttled by the hurt cooldown.
    pub fn take_damage(&mut self, now: f64) -> Hurt {
        if self.is_dead() {
            return Hurt::Ignored;
        }
        if let Some(last) = self.last_hurt {
            if now - last < self.hurt_cooldown {
                return Hurt::Ignored;
            }
        }
        self.last_hurt = Some(now);
        self.hp -= 1;
        if self.hp == 0 {
            Hurt::Died
        } else {
            Hurt::Wounded { hp: self.hp }
        }
    }

    /// Heal, clamped to max; returns the new HP
    pub fn heal(&mut self, amount: u32) -> u32 {
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp
    }

    /// Raise max HP and fill the new slots
    pub fn grant_max_hp(&mut self, amount: u32) {
        self.max_hp += amount;
        self.hp += amount;
    }

    /// Walk along `dir` (not necessarily normalized), staying on the clock face
    pub fn walk(&mut self, dir: Vec2, elapsed: f64) {
        let frames = (elapsed / FRAME_MS) as f32;
        self.pos += dir.normalize_or_zero() * self.speed * frames;
        if self.pos.length() > ARENA_RADIUS {
            self.pos = self.pos.normalize() * ARENA_RADIUS;
        }
    }
}
