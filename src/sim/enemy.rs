//! Enemies: drawn era enemies and the clock-number bosses
//!
//! Both kinds share one capability set (movement, damage intake, contact
//! test). Damage intake is throttled per attacking weapon through a hit
//! cache keyed by weapon slot, and the death signal fires exactly once.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::event::EntityId;
use super::roster::Archetype;
use super::spatial::within;
use super::weapon::WeaponSlot;
use crate::consts::{FRAME_MS, NUMERAL_RISE_HEIGHT, NUMERAL_WALK_HEIGHT};

/// Health of every clock-number boss
pub const CLOCK_NUMBER_HEALTH: i32 = 20;
/// Approach divisor for clock-number bosses
pub const CLOCK_NUMBER_SPEED: f32 = 4.5;
/// Side length of a clock-number hitbox
pub const CLOCK_NUMBER_SIZE: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyKind {
    Drawn(&'static Archetype),
    ClockNumber { minute: u32 },
}

/// Last accepted hit from one weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub last_hit: f64,
    pub hit_delay: f64,
}

/// One weapon's attempt to damage an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub slot: WeaponSlot,
    pub damage: u32,
    pub hit_delay: f64,
    pub stun: f64,
}

/// Result of [`Enemy::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Same weapon hit too recently (or the enemy is already dead)
    Throttled,
    /// Hit landed, enemy still standing
    Survived,
    /// Hit landed and this call killed the enemy
    Killed,
}

impl HitOutcome {
    pub fn landed(&self) -> bool {
        !matches!(self, HitOutcome::Throttled)
    }
}

/// Result of one movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Walked,
    /// Still rising out of the clock face
    Rising,
    /// Stunned: shook in place
    Jittered,
    /// Stun just ran out; visuals reset, walking resumes next frame
    Recovered,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    /// Ground position (x, z)
    pub pos: Vec2,
    /// Height above the clock face
    pub height: f32,
    pub health: i32,
    /// Remaining stun (ms)
    pub stun: f64,
    pub speed: f32,
    pub half_extents: Vec2,
    pub padding: f32,
    pub rarity_boost: f32,
    pub visible: bool,
    dead: bool,
    hit_cache: BTreeMap<WeaponSlot, HitRecord>,
}

impl Enemy {
    pub fn drawn(id: EntityId, archetype: &'static Archetype, pos: Vec2) -> Self {
        Self {
            id,
            kind: EnemyKind::Drawn(archetype),
            pos,
            height: 0.0,
            health: archetype.health,
            stun: 0.0,
            speed: archetype.speed,
            half_extents: Vec2::new(archetype.width, archetype.height) / 2.0,
            padding: 0.0,
            rarity_boost: archetype.rarity_boost,
            visible: true,
            dead: false,
            hit_cache: BTreeMap::new(),
        }
    }

    /// Boss for `minute`, rising from its numeral on the clock face
    pub fn clock_number(id: EntityId, minute: u32) -> Self {
        Self {
            id,
            kind: EnemyKind::ClockNumber { minute },
            pos: crate::numeral_position(minute % 12),
            height: 0.0,
            health: CLOCK_NUMBER_HEALTH,
            stun: 0.0,
            speed: CLOCK_NUMBER_SPEED,
            half_extents: Vec2::splat(CLOCK_NUMBER_SIZE / 2.0),
            padding: 0.0,
            rarity_boost: 0.0,
            visible: true,
            dead: false,
            hit_cache: BTreeMap::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_stunned(&self) -> bool {
        self.stun > 0.0
    }

    /// Minute represented by a clock-number boss
    pub fn minute(&self) -> Option<u32> {
        match self.kind {
            EnemyKind::ClockNumber { minute } => Some(minute),
            EnemyKind::Drawn(_) => None,
        }
    }

    /// Numeral mesh index; minute 12 shares the 0 numeral
    pub fn numeral_index(&self) -> Option<u32> {
        self.minute().map(|m| m % 12)
    }

    /// Square contact reach around the enemy centre
    pub fn reach(&self) -> f32 {
        self.half_extents.max_element() + self.padding
    }

    /// Does the hitbox overlap a ground point?
    pub fn collides_with(&self, point: Vec2) -> bool {
        within(self.reach(), self.pos, point)
    }

    /// Apply a strike unless the same weapon landed one within its hit delay.
    pub fn take_damage(&mut self, strike: Strike, now: f64) -> HitOutcome {
        if self.dead {
            return HitOutcome::Throttled;
        }
        if let Some(record) = self.hit_cache.get(&strike.slot) {
            if now - record.last_hit < record.hit_delay {
                return HitOutcome::Throttled;
            }
        }
        self.hit_cache.insert(
            strike.slot,
            HitRecord {
                last_hit: now,
                hit_delay: strike.hit_delay,
            },
        );

        self.health -= strike.damage as i32;
        self.stun = self.stun.max(0.0) + strike.stun;

        if self.health <= 0 {
            self.dead = true;
            HitOutcome::Killed
        } else {
            HitOutcome::Survived
        }
    }

    /// Take one movement step toward `target`.
    ///
    /// Displacement is `unit / speed * speed_multiplier * elapsed / FRAME_MS`,
    /// i.e. measured in nominal 60 fps frames.
    pub fn move_towards(
        &mut self,
        target: Vec2,
        elapsed: f64,
        speed_multiplier: f32,
        rng: &mut Pcg32,
    ) -> Step {
        if self.stun > 0.0 {
            self.pos += Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
            self.stun -= elapsed;
            return Step::Jittered;
        }
        if self.stun != 0.0 {
            self.stun = 0.0;
            return Step::Recovered;
        }

        let frames = (elapsed / FRAME_MS) as f32;
        if matches!(self.kind, EnemyKind::ClockNumber { .. }) {
            if self.height < NUMERAL_RISE_HEIGHT {
                self.height = (self.height + frames / 4.0).min(NUMERAL_RISE_HEIGHT);
            }
            if self.height <= NUMERAL_WALK_HEIGHT {
                return Step::Rising;
            }
        }

        let dir = (target - self.pos).normalize_or_zero();
        self.pos += dir / self.speed * speed_multiplier * frames;
        Step::Walked
    }

    /// Add stun to a live enemy (FREEZE)
    pub fn add_stun(&mut self, ms: f64) {
        if !self.dead {
            self.stun = self.stun.max(0.0) + ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::roster::archetype;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn strike(damage: u32, hit_delay: f64) -> Strike {
        Strike {
            slot: 0,
            damage,
            hit_delay,
            stun: 0.0,
        }
    }

    fn soldier() -> Enemy {
        Enemy::drawn(1, archetype("Roman Soldier").unwrap(), Vec2::new(100.0, 0.0))
    }

    #[test]
    fn test_hit_throttling_scenario() {
        let mut enemy = Enemy::clock_number(1, 3);
        assert_eq!(enemy.health, 20);

        let hit = strike(10, 1000.0);
        let outcomes = [
            enemy.take_damage(hit, 0.0),
            enemy.take_damage(hit, 500.0),
            enemy.take_damage(hit, 1000.0),
        ];
        assert_eq!(
            outcomes,
            [HitOutcome::Survived, HitOutcome::Throttled, HitOutcome::Killed]
        );
        assert_eq!(outcomes.iter().filter(|o| o.landed()).count(), 2);
        assert_eq!(outcomes.iter().filter(|o| **o == HitOutcome::Killed).count(), 1);
        assert_eq!(enemy.health, 0);
    }

    #[test]
    fn test_throttled_hit_leaves_health() {
        let mut enemy = soldier();
        enemy.take_damage(strike(4, 1000.0), 0.0);
        assert_eq!(enemy.take_damage(strike(4, 1000.0), 999.0), HitOutcome::Throttled);
        assert_eq!(enemy.health, 11);
        assert_eq!(enemy.take_damage(strike(4, 1000.0), 1000.0), HitOutcome::Survived);
        assert_eq!(enemy.health, 7);
    }

    #[test]
    fn test_death_edge_trigger() {
        let mut enemy = Enemy::drawn(1, archetype("Chimney Sweep").unwrap(), Vec2::ZERO);
        assert_eq!(enemy.health, 10);
        assert_eq!(enemy.take_damage(strike(6, 0.0), 0.0), HitOutcome::Survived);
        assert_eq!(enemy.take_damage(strike(5, 0.0), 1.0), HitOutcome::Killed);
        // Dead enemies never report death again
        assert_eq!(enemy.take_damage(strike(5, 0.0), 2.0), HitOutcome::Throttled);
        assert!(enemy.is_dead());
    }

    #[test]
    fn test_hit_cache_is_per_weapon() {
        let mut enemy = soldier();
        let a = Strike { slot: 0, ..strike(1, 1000.0) };
        let b = Strike { slot: 1, ..strike(1, 1000.0) };
        assert!(enemy.take_damage(a, 0.0).landed());
        assert!(enemy.take_damage(b, 10.0).landed());
        assert!(!enemy.take_damage(a, 20.0).landed());
        assert_eq!(enemy.hit_cache[&1].last_hit, 10.0);
    }

    #[test]
    fn test_stun_stacks() {
        let mut enemy = soldier();
        enemy.take_damage(Strike { stun: 300.0, ..strike(1, 0.0) }, 0.0);
        enemy.take_damage(Strike { stun: 200.0, ..strike(1, 0.0) }, 1.0);
        assert_eq!(enemy.stun, 500.0);
    }

    #[test]
    fn test_stunned_enemy_jitters_then_recovers() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut enemy = soldier();
        enemy.stun = 20.0;

        assert_eq!(enemy.move_towards(Vec2::ZERO, 16.667, 1.0, &mut rng), Step::Jittered);
        assert!(enemy.stun > 0.0);
        assert_eq!(enemy.move_towards(Vec2::ZERO, 16.667, 1.0, &mut rng), Step::Jittered);
        assert!(enemy.stun < 0.0);

        let before = enemy.pos;
        assert_eq!(enemy.move_towards(Vec2::ZERO, 16.667, 1.0, &mut rng), Step::Recovered);
        assert_eq!(enemy.stun, 0.0);
        assert_eq!(enemy.pos, before);

        assert_eq!(enemy.move_towards(Vec2::ZERO, 16.667, 1.0, &mut rng), Step::Walked);
        assert!(enemy.pos.x < before.x);
    }

    #[test]
    fn test_clock_number_rises_before_walking() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut enemy = Enemy::clock_number(1, 6);
        let start = enemy.pos;
        let mut steps = 0;
        while enemy.move_towards(Vec2::ZERO, FRAME_MS, 1.0, &mut rng) == Step::Rising {
            steps += 1;
        }
        // 15 / 0.25 per frame
        assert_eq!(steps, 60);
        assert_ne!(enemy.pos, start);
    }

    #[test]
    fn test_minute_twelve_reuses_numeral_zero() {
        let twelve = Enemy::clock_number(1, 12);
        assert_eq!(twelve.minute(), Some(12));
        assert_eq!(twelve.numeral_index(), Some(0));
        assert_eq!(twelve.pos, crate::numeral_position(0));
    }

    #[test]
    fn test_collides_with_uses_reach() {
        let enemy = Enemy::clock_number(1, 3);
        assert!(enemy.collides_with(enemy.pos + Vec2::new(15.0, -15.0)));
        assert!(!enemy.collides_with(enemy.pos + Vec2::new(15.5, 0.0)));
    }

    proptest! {
        #[test]
        fn prop_movement_scales_with_elapsed(x in -300.0f32..300.0, z in 50.0f32..300.0, mult in 0.1f32..2.0) {
            let mut rng = Pcg32::seed_from_u64(1);
            let mut one = Enemy::drawn(1, archetype("T-Rex").unwrap(), Vec2::new(x, z));
            let mut two = one.clone();
            one.move_towards(Vec2::ZERO, 16.667, mult, &mut rng);
            two.move_towards(Vec2::ZERO, 33.334, mult, &mut rng);
            let d1 = (one.pos - Vec2::new(x, z)).length();
            let d2 = (two.pos - Vec2::new(x, z)).length();
            prop_assert!((d2 - 2.0 * d1).abs() < 1e-3);
        }

        #[test]
        fn prop_throttle_window(delay in 1.0f64..5000.0, gap in 0.0f64..10_000.0) {
            let mut enemy = Enemy::clock_number(1, 1);
            enemy.take_damage(strike(1, delay), 0.0);
            let second = enemy.take_damage(strike(1, delay), gap);
            prop_assert_eq!(second.landed(), gap >= delay);
        }
    }
}
