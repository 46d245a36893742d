//! Eras, enemy archetypes and set-piece spawn patterns

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::audio::Cue;
use crate::consts::{SPAWN_MAX_OFFSET, SPAWN_MIN_OFFSET};

/// Historical theme controlling the roster and music for a time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Era {
    StoneAge,
    Ancient,
    Industrial,
    Prohibition,
}

impl Era {
    pub const ALL: [Era; 4] = [Era::StoneAge, Era::Ancient, Era::Industrial, Era::Prohibition];

    pub fn as_str(&self) -> &'static str {
        match self {
            Era::StoneAge => "stoneage",
            Era::Ancient => "ancient",
            Era::Industrial => "industrial",
            Era::Prohibition => "prohibition",
        }
    }

    /// One-shot banner shown when the era takes over
    pub fn announcement(&self) -> &'static str {
        match self {
            Era::StoneAge => "The Stone Age",
            Era::Ancient => "Ancient Rome",
            Era::Industrial => "The Industrial Revolution",
            Era::Prohibition => "Prohibition",
        }
    }

    pub fn music(&self) -> Cue {
        Cue::EraMusic(*self)
    }

    pub fn spawn_stinger(&self) -> Cue {
        Cue::EraSpawn(*self)
    }

    pub fn archetypes(&self) -> impl Iterator<Item = &'static Archetype> {
        let era = *self;
        ARCHETYPES.iter().filter(move |a| a.era == era)
    }

    pub fn set_pieces(&self) -> impl Iterator<Item = &'static SetPiece> {
        let era = *self;
        SET_PIECES.iter().filter(move |s| s.era == era)
    }
}

/// Static description of a drawn enemy
#[derive(Debug, PartialEq)]
pub struct Archetype {
    pub name: &'static str,
    pub era: Era,
    pub health: i32,
    /// Divisor on approach velocity; higher is slower
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    /// Added to the gem rarity roll when this enemy dies
    pub rarity_boost: f32,
}

pub static ARCHETYPES: [Archetype; 9] = [
    // Fast and fragile
    Archetype { name: "Steggodog", era: Era::StoneAge, health: 6, speed: 1.25, width: 25.0, height: 11.25, rarity_boost: 0.0 },
    Archetype { name: "T-Rex", era: Era::StoneAge, health: 14, speed: 3.0, width: 63.0, height: 45.0, rarity_boost: 0.05 },
    // Slow, hulking, worth killing early
    Archetype { name: "Mammoth", era: Era::StoneAge, health: 30, speed: 7.0, width: 80.0, height: 74.4, rarity_boost: 0.1 },
    Archetype { name: "Roman Soldier", era: Era::Ancient, health: 15, speed: 3.0, width: 16.0, height: 32.0, rarity_boost: 0.0 },
    Archetype { name: "Chimney Sweep", era: Era::Industrial, health: 10, speed: 2.0, width: 16.0, height: 16.0, rarity_boost: 0.0 },
    Archetype { name: "Smoke Stack", era: Era::Industrial, health: 10, speed: 3.5, width: 90.0, height: 60.0, rarity_boost: 0.08 },
    Archetype { name: "Flapper", era: Era::Prohibition, health: 20, speed: 2.5, width: 21.44, height: 32.0, rarity_boost: 0.0 },
    Archetype { name: "Tuba Guy", era: Era::Prohibition, health: 20, speed: 4.0, width: 28.1, height: 32.0, rarity_boost: 0.03 },
    Archetype { name: "Wine Bottle", era: Era::Prohibition, health: 5, speed: 2.5, width: 6.25, height: 20.0, rarity_boost: 0.0 },
];

pub fn archetype(name: &str) -> Option<&'static Archetype> {
    ARCHETYPES.iter().find(|a| a.name == name)
}

/// Pick a random archetype from an era's roster
pub fn random_from_era(era: Era, rng: &mut Pcg32) -> &'static Archetype {
    let roster: Vec<&'static Archetype> = era.archetypes().collect();
    if roster.is_empty() {
        return &ARCHETYPES[0];
    }
    roster[rng.random_range(0..roster.len())]
}

/// Pick any archetype regardless of era
pub fn random_any(rng: &mut Pcg32) -> &'static Archetype {
    &ARCHETYPES[rng.random_range(0..ARCHETYPES.len())]
}

/// Random spawn point: each axis offset 100..200 from the centre, either sign
pub fn spawn_point(rng: &mut Pcg32) -> Vec2 {
    let mut axis = || {
        let magnitude = rng.random_range(SPAWN_MIN_OFFSET..=SPAWN_MAX_OFFSET);
        if rng.random_bool(0.5) { magnitude } else { -magnitude }
    };
    let x = axis();
    let z = axis();
    Vec2::new(x, z)
}

/// How a set piece lays out its enemies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formation {
    /// Around a random spawn point, each member offset by up to `jitter`
    Cluster { jitter: f32 },
    /// Evenly spaced on a circle around Felix
    Ring { radius: f32 },
}

/// Curated group spawn
#[derive(Debug, PartialEq)]
pub struct SetPiece {
    pub name: &'static str,
    pub era: Era,
    pub archetype: &'static str,
    pub count: u32,
    pub formation: Formation,
}

pub static SET_PIECES: [SetPiece; 8] = [
    SetPiece { name: "Steggodog pack", era: Era::StoneAge, archetype: "Steggodog", count: 6, formation: Formation::Cluster { jitter: 20.0 } },
    SetPiece { name: "Mammoth march", era: Era::StoneAge, archetype: "Mammoth", count: 3, formation: Formation::Cluster { jitter: 60.0 } },
    SetPiece { name: "Legion", era: Era::Ancient, archetype: "Roman Soldier", count: 8, formation: Formation::Cluster { jitter: 30.0 } },
    SetPiece { name: "Shield wall", era: Era::Ancient, archetype: "Roman Soldier", count: 10, formation: Formation::Ring { radius: 180.0 } },
    SetPiece { name: "Sweep gang", era: Era::Industrial, archetype: "Chimney Sweep", count: 6, formation: Formation::Cluster { jitter: 25.0 } },
    SetPiece { name: "Smog ring", era: Era::Industrial, archetype: "Smoke Stack", count: 4, formation: Formation::Ring { radius: 200.0 } },
    SetPiece { name: "Brass section", era: Era::Prohibition, archetype: "Tuba Guy", count: 4, formation: Formation::Cluster { jitter: 30.0 } },
    SetPiece { name: "Last call", era: Era::Prohibition, archetype: "Wine Bottle", count: 12, formation: Formation::Ring { radius: 150.0 } },
];

impl SetPiece {
    /// Ground positions for every member of the group
    pub fn positions(&self, felix: Vec2, rng: &mut Pcg32) -> Vec<Vec2> {
        match self.formation {
            Formation::Cluster { jitter } => {
                let anchor = spawn_point(rng);
                (0..self.count)
                    .map(|_| {
                        anchor
                            + Vec2::new(
                                rng.random_range(-jitter..=jitter),
                                rng.random_range(-jitter..=jitter),
                            )
                    })
                    .collect()
            }
            Formation::Ring { radius } => (0..self.count)
                .map(|i| {
                    let theta = i as f32 * std::f32::consts::TAU / self.count as f32;
                    felix + crate::polar_to_cartesian(radius, theta)
                })
                .collect(),
        }
    }
}

/// Pick one of an era's set pieces
pub fn random_set_piece(era: Era, rng: &mut Pcg32) -> Option<&'static SetPiece> {
    let pieces: Vec<&'static SetPiece> = era.set_pieces().collect();
    if pieces.is_empty() {
        return None;
    }
    Some(pieces[rng.random_range(0..pieces.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_every_era_has_roster_and_set_pieces() {
        for era in Era::ALL {
            assert!(era.archetypes().count() > 0, "{era:?} has no enemies");
            assert!(era.set_pieces().count() > 0, "{era:?} has no set pieces");
        }
    }

    #[test]
    fn test_set_pieces_name_real_archetypes() {
        for piece in &SET_PIECES {
            let archetype = archetype(piece.archetype).unwrap();
            assert_eq!(archetype.era, piece.era, "{}", piece.name);
        }
    }

    #[test]
    fn test_random_from_era_stays_in_era() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(random_from_era(Era::Prohibition, &mut rng).era, Era::Prohibition);
        }
    }

    #[test]
    fn test_spawn_point_ring() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let p = spawn_point(&mut rng);
            for axis in [p.x.abs(), p.y.abs()] {
                assert!((SPAWN_MIN_OFFSET..=SPAWN_MAX_OFFSET).contains(&axis));
            }
        }
    }

    #[test]
    fn test_cluster_jitter_bounded() {
        let mut rng = Pcg32::seed_from_u64(11);
        let piece = &SET_PIECES[0];
        let points = piece.positions(Vec2::ZERO, &mut rng);
        assert_eq!(points.len(), piece.count as usize);
        let Formation::Cluster { jitter } = piece.formation else { unreachable!() };
        for a in &points {
            for b in &points {
                assert!((a.x - b.x).abs() <= 2.0 * jitter + 1e-3);
                assert!((a.y - b.y).abs() <= 2.0 * jitter + 1e-3);
            }
        }
    }

    #[test]
    fn test_ring_surrounds_felix() {
        let mut rng = Pcg32::seed_from_u64(1);
        let felix = Vec2::new(10.0, -20.0);
        let piece = SET_PIECES.iter().find(|p| p.name == "Shield wall").unwrap();
        for p in piece.positions(felix, &mut rng) {
            assert!(((p - felix).length() - 180.0).abs() < 1e-2);
        }
    }
}
