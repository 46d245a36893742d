//! Weapons: the base orbiting bullet plus the twelve clock weapons
//!
//! Each clock weapon owns its transient state (projectiles, traps, coils,
//! smoke) and expires it against the simulation clock, so pausing the
//! driver freezes everything.

use std::collections::BTreeMap;
use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::enemy::{Enemy, Strike};
use super::event::EntityId;
use super::spatial::within;
use crate::consts::FRAME_MS;

/// Stable index of a weapon in the director's active list
pub type WeaponSlot = usize;

/// Default minimum gap between two hits on the same enemy (ms)
pub const DEFAULT_HIT_DELAY: f64 = 1000.0;
/// Default stun per hit (ms)
pub const DEFAULT_STUN: f64 = 500.0;

/// Box-search radius used by weapons that pick a nearby enemy
const TARGET_RANGE: f32 = 100.0;

/// Unit vector pointing at an hour on the clock face (12 is -z)
pub fn clock_direction(hour: f32) -> Vec2 {
    let theta = hour * TAU / 12.0;
    Vec2::new(theta.sin(), -theta.cos())
}

/// Short description of a clock weapon for the reward screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponInfo {
    pub minute: u32,
    pub numeral: &'static str,
    pub heading: &'static str,
}

pub fn weapon_info(minute: u32) -> Option<WeaponInfo> {
    let heading = match minute {
        1 => "Fire an arrow out from the 1:00 angle on a clock.",
        2 => "Swing a beefy hammer around you that grows near the 2:00 angle.",
        3 => "Plant spiky traps every 3 seconds at the 3:00 angle, 3 at once.",
        4 => "A deadly spear juts out from your 4:00 angle.",
        5 => "Orbiting shields and 1 extra HP.",
        6 => "A scepter at 6:00 fires orbs at nearby enemies, 6 at a time.",
        7 => "A damaging aura that also widens your pickup range.",
        8 => "Every 8 seconds a smoke stack chokes a nearby enemy.",
        9 => "Tesla coils that last 9 seconds and zap anything near them.",
        10 => "Ninja stars tossed from 10:00 and its mirrors.",
        11 => "Every 11 seconds, axes fly up and fall through your enemies.",
        12 => "Strips of light sweep around you like a ticking clock.",
        _ => return None,
    };
    Some(WeaponInfo {
        minute,
        numeral: crate::roman(minute),
        heading,
    })
}

/// What a weapon asks the presentation layer to do after a landed hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feedback {
    Shake { ms: f64 },
    Spark { at: Vec2 },
}

/// Straight-flying projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub expires_at: f64,
}

/// Homing orb locked on an enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Seeker {
    pub pos: Vec2,
    pub target: EntityId,
}

/// Area left on the ground
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub pos: Vec2,
    pub expires_at: f64,
    pub last_zap: f64,
}

/// Thrown axe; hidden until `shows_at`
#[derive(Debug, Clone, PartialEq)]
pub struct Axe {
    pub pos: Vec2,
    pub vel: Vec2,
    pub shows_at: f64,
    pub shown: bool,
    pub expires_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeaponKind {
    /// Bullet weaving around Felix
    Orbiter { pos: Vec2 },
    /// I: arrows at 1:00
    Arrows { last_throw: f64, shots: Vec<Shot> },
    /// II: hammer swinging around Felix
    Hammer { angle: f32 },
    /// III: spike traps at 3:00
    Traps { last_place: f64, traps: Vec<Zone> },
    /// IV: fixed spear at 4:00
    Spear,
    /// V: orbiting shields
    Shields { angle: f32 },
    /// VI: homing orbs
    Scepter { last_shot: f64, orbs: Vec<Seeker> },
    /// VII: aura around Felix
    Aura,
    /// VIII: periodic smoke stacks on a nearby enemy
    Smoke { last_place: f64, stacks: Vec<Zone> },
    /// IX: tesla coils
    Coils { last_place: f64, coils: Vec<Zone> },
    /// X: ninja stars from 10:00 and its mirrors
    Stars { last_throw: f64, shots: Vec<Shot> },
    /// XI: axe rain
    Axes { last_volley: f64, axes: Vec<Axe> },
    /// XII: rotating beam
    Beam { angle: f32, last_step: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub min_damage: u32,
    pub max_damage: u32,
    pub hit_delay: f64,
    pub stun: f64,
    /// Clock minute this weapon was unlocked at
    pub minute: Option<u32>,
    pub kind: WeaponKind,
    /// Felix position at the last update
    anchor: Vec2,
}

// Per-weapon constants
const ORBITER_REACH: f32 = 18.0;
const ARROW_DELAY: f64 = 1000.0;
const ARROW_SPEED: f32 = 5.0;
const ARROW_LIFE: f64 = 2500.0;
const SHOT_REACH: f32 = 15.0;
const HAMMER_RADIUS: f32 = 30.0;
const HAMMER_SPIN: f32 = 0.075;
const HAMMER_REACH: f32 = 25.0;
const TRAP_DELAY: f64 = 3000.0;
const TRAP_OFFSET: f32 = 30.0;
const MAX_TRAPS: usize = 3;
const TRAP_REACH: f32 = 25.0;
const SPEAR_OFFSET: f32 = 40.0;
const SPEAR_REACH: f32 = 10.0;
const SHIELD_COUNT: usize = 5;
const SHIELD_RADIUS: f32 = 50.0;
const SHIELD_REACH: f32 = 20.0;
const ORB_DELAY: f64 = 100.0;
const MAX_ORBS: usize = 6;
const ORB_SPEED: f32 = 1.5;
const ORB_REACH: f32 = 5.0;
const AURA_REACH: f32 = 50.0;
const SMOKE_DELAY: f64 = 8000.0;
const SMOKE_LIFE: f64 = 7500.0;
const SMOKE_REACH: f32 = 50.0;
const COIL_DELAY: f64 = 2500.0;
const COIL_LIFE: f64 = 9000.0;
const MAX_COILS: usize = 3;
const COIL_ZAP_GAP: f64 = 100.0;
const COIL_MISS_CHANCE: f64 = 0.05;
const COIL_REACH: f32 = 40.0;
const STAR_DELAY: f64 = 250.0;
const STAR_SPEED: f32 = 4.0;
const STAR_LIFE: f64 = 1500.0;
const AXE_DELAY: f64 = 11_000.0;
const AXE_COUNT: u32 = 11;
const AXE_STAGGER: f64 = 500.0;
const AXE_LIFE: f64 = 6000.0;
const AXE_GRAVITY: f32 = 0.1;
const AXE_REACH: f32 = 30.0;
const BEAM_STEP_DELAY: f64 = 1000.0 / 12.0;
const BEAM_LENGTH: f32 = 150.0;
const BEAM_HALF_WIDTH: f32 = 4.0;

impl Weapon {
    fn new(min_damage: u32, max_damage: u32, kind: WeaponKind) -> Self {
        Self {
            min_damage,
            max_damage,
            hit_delay: DEFAULT_HIT_DELAY,
            stun: DEFAULT_STUN,
            minute: None,
            kind,
            anchor: Vec2::ZERO,
        }
    }

    fn with_stun(mut self, stun: f64) -> Self {
        self.stun = stun;
        self
    }

    fn with_hit_delay(mut self, hit_delay: f64) -> Self {
        self.hit_delay = hit_delay;
        self
    }

    /// The weapon Felix starts the run with
    pub fn base() -> Self {
        Self::new(5, 10, WeaponKind::Orbiter { pos: Vec2::ZERO }).with_stun(1000.0)
    }

    /// Clock weapon unlocked by the boss of `minute`
    pub fn clock(minute: u32) -> Option<Self> {
        let weapon = match minute {
            1 => Self::new(3, 6, WeaponKind::Arrows { last_throw: 0.0, shots: Vec::new() })
                .with_stun(20.0),
            2 => Self::new(10, 20, WeaponKind::Hammer { angle: 0.0 }).with_stun(2500.0),
            3 => Self::new(3, 3, WeaponKind::Traps { last_place: 0.0, traps: Vec::new() })
                .with_stun(300.0)
                .with_hit_delay(600.0),
            4 => Self::new(15, 25, WeaponKind::Spear).with_stun(1000.0),
            5 => Self::new(15, 25, WeaponKind::Shields { angle: 0.0 })
                .with_stun(1500.0)
                .with_hit_delay(3000.0),
            6 => Self::new(1, 1, WeaponKind::Scepter { last_shot: 0.0, orbs: Vec::new() })
                .with_stun(5.0)
                .with_hit_delay(0.0),
            7 => Self::new(5, 10, WeaponKind::Aura).with_stun(150.0).with_hit_delay(750.0),
            8 => Self::new(5, 10, WeaponKind::Smoke { last_place: f64::NEG_INFINITY, stacks: Vec::new() })
                .with_stun(150.0)
                .with_hit_delay(200.0),
            9 => Self::new(10, 15, WeaponKind::Coils { last_place: -500.0, coils: Vec::new() })
                .with_stun(200.0)
                .with_hit_delay(500.0),
            10 => Self::new(3, 6, WeaponKind::Stars { last_throw: 0.0, shots: Vec::new() })
                .with_stun(250.0)
                .with_hit_delay(500.0),
            11 => Self::new(10, 20, WeaponKind::Axes { last_volley: f64::NEG_INFINITY, axes: Vec::new() })
                .with_stun(300.0),
            12 => Self::new(40, 50, WeaponKind::Beam { angle: 0.0, last_step: 0.0 })
                .with_stun(2000.0)
                .with_hit_delay(100.0),
            _ => return None,
        };
        Some(Weapon {
            minute: Some(minute),
            ..weapon
        })
    }

    /// All twelve clock weapons keyed by minute
    pub fn arsenal() -> BTreeMap<u32, Weapon> {
        (1..=12)
            .filter_map(|minute| Self::clock(minute).map(|w| (minute, w)))
            .collect()
    }

    pub fn info(&self) -> Option<WeaponInfo> {
        self.minute.and_then(weapon_info)
    }

    /// Uniform integer roll in `[min_damage, max_damage]`
    pub fn roll_damage(&self, rng: &mut Pcg32) -> u32 {
        rng.random_range(self.min_damage..=self.max_damage.max(self.min_damage))
    }

    pub fn strike(&self, slot: WeaponSlot, damage: u32) -> Strike {
        Strike {
            slot,
            damage,
            hit_delay: self.hit_delay,
            stun: self.stun,
        }
    }

    /// Advance transient state one frame.
    pub fn update(&mut self, now: f64, elapsed: f64, felix: Vec2, enemies: &[Enemy], rng: &mut Pcg32) {
        self.anchor = felix;
        let frames = (elapsed / FRAME_MS) as f32;

        match &mut self.kind {
            WeaponKind::Orbiter { pos } => {
                let t = now as f32;
                *pos = felix + Vec2::new((t / 1000.0).sin() * 100.0, (t / 700.0).sin() * 50.0);
            }
            WeaponKind::Arrows { last_throw, shots } => {
                if now - *last_throw > ARROW_DELAY {
                    shots.push(Shot {
                        pos: felix,
                        vel: clock_direction(1.0) * ARROW_SPEED,
                        expires_at: now + ARROW_LIFE,
                    });
                    *last_throw = now;
                }
                fly(shots, now, frames);
            }
            WeaponKind::Hammer { angle } => {
                *angle += HAMMER_SPIN * frames;
                if *angle > TAU {
                    *angle -= TAU;
                }
            }
            WeaponKind::Traps { last_place, traps } => {
                if now - *last_place > TRAP_DELAY {
                    traps.push(Zone {
                        pos: felix + Vec2::new(TRAP_OFFSET, 0.0),
                        expires_at: f64::INFINITY,
                        last_zap: now,
                    });
                    *last_place = now;
                    if traps.len() > MAX_TRAPS {
                        traps.remove(0);
                    }
                }
            }
            WeaponKind::Spear | WeaponKind::Aura => {}
            WeaponKind::Shields { angle } => {
                *angle = -(now as f32) / 300.0;
            }
            WeaponKind::Scepter { last_shot, orbs } => {
                if orbs.len() < MAX_ORBS && now - *last_shot > ORB_DELAY {
                    if let Some(target) = random_target(felix, enemies, rng) {
                        orbs.push(Seeker {
                            pos: felix + Vec2::new(0.0, 15.0),
                            target,
                        });
                        *last_shot = now;
                    }
                }
                orbs.retain_mut(|orb| {
                    let target = enemies.iter().find(|e| e.id == orb.target && !e.is_dead());
                    let Some(target) = target else {
                        // Retarget or fizzle
                        return match random_target(felix, enemies, rng) {
                            Some(id) => {
                                orb.target = id;
                                true
                            }
                            None => false,
                        };
                    };
                    orb.pos += (target.pos - orb.pos).normalize_or_zero() * ORB_SPEED * frames;
                    !within(1.0, orb.pos, target.pos)
                });
            }
            WeaponKind::Smoke { last_place, stacks } => {
                if now - *last_place > SMOKE_DELAY {
                    if let Some(target) = random_target(felix, enemies, rng)
                        .and_then(|id| enemies.iter().find(|e| e.id == id))
                    {
                        stacks.push(Zone {
                            pos: target.pos,
                            expires_at: now + SMOKE_LIFE,
                            last_zap: now,
                        });
                        *last_place = now;
                    }
                }
                stacks.retain(|s| now <= s.expires_at);
            }
            WeaponKind::Coils { last_place, coils } => {
                if now - *last_place > COIL_DELAY && coils.len() < MAX_COILS {
                    if let Some(target) = random_target(felix, enemies, rng)
                        .and_then(|id| enemies.iter().find(|e| e.id == id))
                    {
                        coils.push(Zone {
                            pos: target.pos,
                            expires_at: now + COIL_LIFE,
                            last_zap: now,
                        });
                        *last_place = now;
                    }
                }
                coils.retain(|c| now <= c.expires_at);
            }
            WeaponKind::Stars { last_throw, shots } => {
                if now - *last_throw > STAR_DELAY {
                    let mut dir = clock_direction(10.0);
                    if rng.random_bool(0.5) {
                        dir.x = -dir.x;
                    }
                    if rng.random_bool(0.5) {
                        dir.y = -dir.y;
                    }
                    shots.push(Shot {
                        pos: felix,
                        vel: dir * STAR_SPEED,
                        expires_at: now + STAR_LIFE,
                    });
                    *last_throw = now;
                }
                fly(shots, now, frames);
            }
            WeaponKind::Axes { last_volley, axes } => {
                if now - *last_volley > AXE_DELAY {
                    for n in 0..AXE_COUNT {
                        let shows_at = now + n as f64 * AXE_STAGGER;
                        axes.push(Axe {
                            pos: felix,
                            vel: Vec2::new(rng.random_range(-3.0..=3.0), -5.0),
                            shows_at,
                            shown: false,
                            expires_at: shows_at + AXE_LIFE,
                        });
                    }
                    *last_volley = now;
                }
                for axe in axes.iter_mut() {
                    if !axe.shown {
                        if now <= axe.shows_at {
                            continue;
                        }
                        axe.shown = true;
                        axe.pos = felix;
                    }
                    axe.pos += axe.vel * frames;
                    axe.vel.y += AXE_GRAVITY * frames;
                }
                axes.retain(|a| now <= a.expires_at);
            }
            WeaponKind::Beam { angle, last_step } => {
                if now - *last_step > BEAM_STEP_DELAY {
                    *angle = (*angle + PI / 6.0) % TAU;
                    *last_step = now;
                }
            }
        }
    }

    /// Does any part of this weapon overlap `enemy` right now?
    pub fn detect_collision(&mut self, enemy: &Enemy, now: f64, rng: &mut Pcg32) -> bool {
        let felix = self.anchor;
        let target = enemy.pos;
        match &mut self.kind {
            WeaponKind::Orbiter { pos } => within(ORBITER_REACH, *pos, target),
            WeaponKind::Arrows { shots, .. } | WeaponKind::Stars { shots, .. } => {
                shots.iter().any(|s| within(SHOT_REACH, s.pos, target))
            }
            WeaponKind::Hammer { angle } => {
                let head = felix + clock_direction(*angle * 12.0 / TAU) * HAMMER_RADIUS;
                within(HAMMER_REACH, head, target)
            }
            WeaponKind::Traps { traps, .. } => traps.iter().any(|t| within(TRAP_REACH, t.pos, target)),
            WeaponKind::Spear => within(SPEAR_REACH, felix + clock_direction(4.0) * SPEAR_OFFSET, target),
            WeaponKind::Shields { angle } => shield_positions(felix, *angle)
                .iter()
                .any(|p| within(SHIELD_REACH, *p, target)),
            WeaponKind::Scepter { orbs, .. } => orbs
                .iter()
                .any(|o| o.target == enemy.id && within(ORB_REACH, o.pos, target)),
            WeaponKind::Aura => within(AURA_REACH, felix, target),
            WeaponKind::Smoke { stacks, .. } => stacks.iter().any(|s| within(SMOKE_REACH, s.pos, target)),
            WeaponKind::Coils { coils, .. } => coils.iter_mut().any(|coil| {
                if now - coil.last_zap < COIL_ZAP_GAP {
                    return false;
                }
                if rng.random_bool(COIL_MISS_CHANCE) {
                    return false;
                }
                if within(COIL_REACH, coil.pos, target) {
                    coil.last_zap = now;
                    true
                } else {
                    false
                }
            }),
            WeaponKind::Axes { axes, .. } => axes
                .iter()
                .any(|a| a.shown && within(AXE_REACH, a.pos, target)),
            WeaponKind::Beam { angle, .. } => {
                let dir = clock_direction(*angle * 12.0 / TAU);
                let rel = target - felix;
                let along = rel.dot(dir);
                let across = rel.perp_dot(dir).abs();
                (0.0..=BEAM_LENGTH).contains(&along) && across <= BEAM_HALF_WIDTH + enemy.reach() / 4.0
            }
        }
    }

    /// Hit feedback for a landed (not throttled) hit.
    pub fn on_enemy_collide(&mut self, enemy: &Enemy) -> Option<Feedback> {
        match &mut self.kind {
            WeaponKind::Orbiter { .. } => Some(Feedback::Shake { ms: 200.0 }),
            WeaponKind::Hammer { .. } => Some(Feedback::Shake { ms: 500.0 }),
            WeaponKind::Arrows { .. } | WeaponKind::Stars { .. } => Some(Feedback::Spark { at: enemy.pos }),
            WeaponKind::Scepter { orbs, .. } => {
                // Orbs burst on impact
                orbs.retain(|o| !(o.target == enemy.id && within(ORB_REACH, o.pos, enemy.pos)));
                None
            }
            _ => None,
        }
    }
}

fn fly(shots: &mut Vec<Shot>, now: f64, frames: f32) {
    for shot in shots.iter_mut() {
        shot.pos += shot.vel * frames;
    }
    shots.retain(|s| now <= s.expires_at);
}

fn shield_positions(felix: Vec2, angle: f32) -> [Vec2; SHIELD_COUNT] {
    std::array::from_fn(|i| {
        let d = angle + i as f32 * TAU / SHIELD_COUNT as f32;
        felix + Vec2::new(d.sin(), d.cos()) * SHIELD_RADIUS
    })
}

/// Random live enemy inside the targeting box around Felix
fn random_target(felix: Vec2, enemies: &[Enemy], rng: &mut Pcg32) -> Option<EntityId> {
    let in_range: Vec<EntityId> = enemies
        .iter()
        .filter(|e| !e.is_dead() && e.visible && within(TARGET_RANGE, felix, e.pos))
        .map(|e| e.id)
        .collect();
    if in_range.is_empty() {
        None
    } else {
        Some(in_range[rng.random_range(0..in_range.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::roster::archetype;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn enemy_at(id: EntityId, pos: Vec2) -> Enemy {
        Enemy::drawn(id, archetype("Chimney Sweep").unwrap(), pos)
    }

    #[test]
    fn test_arsenal_covers_every_minute() {
        let arsenal = Weapon::arsenal();
        assert_eq!(arsenal.len(), 12);
        for (minute, weapon) in &arsenal {
            assert_eq!(weapon.minute, Some(*minute));
            assert!(weapon.min_damage <= weapon.max_damage);
            assert!(weapon.info().is_some());
        }
        assert!(Weapon::clock(13).is_none());
        assert_eq!(Weapon::base().minute, None);
    }

    #[test]
    fn test_clock_direction() {
        let one = clock_direction(1.0);
        assert!((one.x - 0.5).abs() < 1e-5);
        assert!((one.y + 0.866).abs() < 1e-3);
        let twelve = clock_direction(0.0);
        assert!((twelve.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_roll_damage_in_range() {
        let weapon = Weapon::clock(12).unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let d = weapon.roll_damage(&mut rng);
            assert!((40..=50).contains(&d));
        }
    }

    #[test]
    fn test_arrows_throw_fly_and_expire() {
        let mut weapon = Weapon::clock(1).unwrap();
        let mut rng = rng();
        weapon.update(1001.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        let WeaponKind::Arrows { shots, .. } = &weapon.kind else { unreachable!() };
        assert_eq!(shots.len(), 1);
        let first = shots[0].pos;
        assert!(first.x > 0.0 && first.y < 0.0);

        weapon.update(1500.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        weapon.update(3600.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        let WeaponKind::Arrows { shots, .. } = &weapon.kind else { unreachable!() };
        // The first arrow outlived its 2500 ms; the one thrown at 3600 flies on
        assert!(shots.iter().all(|s| s.expires_at >= 3600.0));
    }

    #[test]
    fn test_traps_cap_at_three() {
        let mut weapon = Weapon::clock(3).unwrap();
        let mut rng = rng();
        for i in 1..=5 {
            weapon.update(i as f64 * 3001.0, FRAME_MS, Vec2::new(i as f32 * 100.0, 0.0), &[], &mut rng);
        }
        let WeaponKind::Traps { traps, .. } = &weapon.kind else { unreachable!() };
        assert_eq!(traps.len(), 3);
        assert_eq!(traps[0].pos, Vec2::new(330.0, 0.0));
    }

    #[test]
    fn test_spear_hits_at_four_oclock() {
        let mut weapon = Weapon::clock(4).unwrap();
        let mut rng = rng();
        weapon.update(0.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        let at_four = enemy_at(1, clock_direction(4.0) * 40.0);
        let at_ten = enemy_at(2, clock_direction(10.0) * 40.0);
        assert!(weapon.detect_collision(&at_four, 0.0, &mut rng));
        assert!(!weapon.detect_collision(&at_ten, 0.0, &mut rng));
    }

    #[test]
    fn test_aura_range() {
        let mut weapon = Weapon::clock(7).unwrap();
        let mut rng = rng();
        weapon.update(0.0, FRAME_MS, Vec2::new(10.0, 10.0), &[], &mut rng);
        assert!(weapon.detect_collision(&enemy_at(1, Vec2::new(60.0, -40.0)), 0.0, &mut rng));
        assert!(!weapon.detect_collision(&enemy_at(1, Vec2::new(61.0, 10.0)), 0.0, &mut rng));
    }

    #[test]
    fn test_scepter_needs_target_in_range() {
        let mut weapon = Weapon::clock(6).unwrap();
        let mut rng = rng();
        let far = vec![enemy_at(1, Vec2::new(300.0, 0.0))];
        weapon.update(200.0, FRAME_MS, Vec2::ZERO, &far, &mut rng);
        let WeaponKind::Scepter { orbs, .. } = &weapon.kind else { unreachable!() };
        assert!(orbs.is_empty());

        let near = vec![enemy_at(7, Vec2::new(40.0, 0.0))];
        weapon.update(400.0, FRAME_MS, Vec2::ZERO, &near, &mut rng);
        let WeaponKind::Scepter { orbs, .. } = &weapon.kind else { unreachable!() };
        assert_eq!(orbs.len(), 1);
        assert_eq!(orbs[0].target, 7);
    }

    #[test]
    fn test_scepter_orb_homes_and_hits() {
        let mut weapon = Weapon::clock(6).unwrap();
        let mut rng = rng();
        let enemies = vec![enemy_at(3, Vec2::new(20.0, 15.0))];
        let mut now = 200.0;
        let mut hit = false;
        for _ in 0..40 {
            weapon.update(now, FRAME_MS, Vec2::ZERO, &enemies, &mut rng);
            if weapon.detect_collision(&enemies[0], now, &mut rng) {
                hit = true;
                weapon.on_enemy_collide(&enemies[0]);
                break;
            }
            now += FRAME_MS;
        }
        assert!(hit);
    }

    #[test]
    fn test_coils_zap_gap() {
        let mut weapon = Weapon::clock(9).unwrap();
        let mut rng = rng();
        let enemies = vec![enemy_at(1, Vec2::new(50.0, 0.0))];
        let placed = 2001.0;
        weapon.update(placed, FRAME_MS, Vec2::ZERO, &enemies, &mut rng);
        let WeaponKind::Coils { coils, .. } = &weapon.kind else { unreachable!() };
        assert_eq!(coils.len(), 1);

        // Nothing zaps inside the first 100 ms after placing
        assert!(!weapon.detect_collision(&enemies[0], placed + 50.0, &mut rng));
        let zaps = (1..=20)
            .filter(|i| weapon.detect_collision(&enemies[0], placed + 100.0 * *i as f64 + 1.0, &mut rng))
            .count();
        // Miss chance is 5%; most attempts land
        assert!(zaps >= 14);

        weapon.update(placed + 9001.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        let WeaponKind::Coils { coils, .. } = &weapon.kind else { unreachable!() };
        assert!(coils.is_empty());
    }

    #[test]
    fn test_smoke_expires() {
        let mut weapon = Weapon::clock(8).unwrap();
        let mut rng = rng();
        let enemies = vec![enemy_at(1, Vec2::new(30.0, 30.0))];
        weapon.update(1.0, FRAME_MS, Vec2::ZERO, &enemies, &mut rng);
        assert!(weapon.detect_collision(&enemies[0], 1.0, &mut rng));
        weapon.update(7502.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        assert!(!weapon.detect_collision(&enemies[0], 7502.0, &mut rng));
    }

    #[test]
    fn test_axes_stagger_and_expire() {
        let mut weapon = Weapon::clock(11).unwrap();
        let mut rng = rng();
        weapon.update(0.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        let WeaponKind::Axes { axes, .. } = &weapon.kind else { unreachable!() };
        assert_eq!(axes.len(), 11);
        assert!(axes.iter().all(|a| !a.shown));

        weapon.update(1001.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        let WeaponKind::Axes { axes, .. } = &weapon.kind else { unreachable!() };
        assert_eq!(axes.iter().filter(|a| a.shown).count(), 3);

        weapon.update(20_000.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        let WeaponKind::Axes { axes, .. } = &weapon.kind else { unreachable!() };
        // The first volley is gone; a second volley was just thrown
        assert_eq!(axes.len(), 11);
        assert!(axes.iter().all(|a| a.shows_at >= 20_000.0));
    }

    #[test]
    fn test_beam_sweeps() {
        let mut weapon = Weapon::clock(12).unwrap();
        let mut rng = rng();
        let north = enemy_at(1, Vec2::new(0.0, -100.0));
        weapon.update(0.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        assert!(weapon.detect_collision(&north, 0.0, &mut rng));
        weapon.update(100.0, FRAME_MS, Vec2::ZERO, &[], &mut rng);
        assert!(!weapon.detect_collision(&north, 100.0, &mut rng));
        let one_oclock = enemy_at(2, clock_direction(1.0) * 100.0);
        assert!(weapon.detect_collision(&one_oclock, 100.0, &mut rng));
    }

    #[test]
    fn test_feedback() {
        let enemy = enemy_at(1, Vec2::ZERO);
        assert_eq!(
            Weapon::base().on_enemy_collide(&enemy),
            Some(Feedback::Shake { ms: 200.0 })
        );
        assert_eq!(
            Weapon::clock(2).unwrap().on_enemy_collide(&enemy),
            Some(Feedback::Shake { ms: 500.0 })
        );
        assert_eq!(Weapon::clock(7).unwrap().on_enemy_collide(&enemy), None);
    }
}
