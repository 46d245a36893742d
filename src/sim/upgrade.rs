//! Reward-bag choices: general upgrades, the offer shown to the player and
//! the bookkeeping for temporary effects.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::weapon::WeaponInfo;
use crate::audio::Cue;

/// Felix speed gain per unit of scalar
pub const SPEED_BONUS: f32 = 0.25;
/// Damage multiplier gain per unit of scalar
pub const DAMAGE_BONUS: f64 = 0.25;
/// Enemy slow-down per unit of scalar (fraction of current speed)
pub const SLOW_FACTOR: f32 = 0.3;
/// Floor on the enemy speed multiplier while slowed
pub const MIN_ENEMY_SPEED: f32 = 0.1;
/// Pickup range gain per unit of scalar
pub const RANGE_BONUS: f32 = 10.0;
/// Rarity boost gain per unit of scalar
pub const LUCK_BONUS: f32 = 0.05;
/// Upgrades offered alongside the boss weapon
pub const OFFERED_UPGRADES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeId {
    MoreSpeed,
    MoreWeaponDamage,
    HealNow,
    SlowerEnemies,
    PickUpRange,
    Lucky,
    Freeze,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 7] = [
        UpgradeId::MoreSpeed,
        UpgradeId::MoreWeaponDamage,
        UpgradeId::HealNow,
        UpgradeId::SlowerEnemies,
        UpgradeId::PickUpRange,
        UpgradeId::Lucky,
        UpgradeId::Freeze,
    ];

    /// Wire id used by the reward screen
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeId::MoreSpeed => "MORE_SPEED",
            UpgradeId::MoreWeaponDamage => "MORE_WEAPON_DAMAGE",
            UpgradeId::HealNow => "HEAL_NOW",
            UpgradeId::SlowerEnemies => "SLOWER_ENEMIES",
            UpgradeId::PickUpRange => "PICK_UP_RANGE",
            UpgradeId::Lucky => "LUCKY",
            UpgradeId::Freeze => "FREEZE",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.as_str() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeId::MoreSpeed => "More Speed",
            UpgradeId::MoreWeaponDamage => "More Damage",
            UpgradeId::HealNow => "Heal Me!",
            UpgradeId::SlowerEnemies => "Slow Enemies",
            UpgradeId::PickUpRange => "More Magnetic",
            UpgradeId::Lucky => "Lucky",
            UpgradeId::Freeze => "Stun All Enemies",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeId::MoreSpeed => "You're faster.",
            UpgradeId::MoreWeaponDamage => "Your weapons do more damage.",
            UpgradeId::HealNow => "Get a heal right now.",
            UpgradeId::SlowerEnemies => "Enemies are slower.",
            UpgradeId::PickUpRange => "Pick up XP from farther away.",
            UpgradeId::Lucky => "More likely to see rare XP gems.",
            UpgradeId::Freeze => "Every enemy on the clock becomes stunned for 15 seconds.",
        }
    }

    /// Line under the card describing how strong this pick will be
    pub fn scalar_label(&self, scalar: f64, felix_hp: u32) -> String {
        let perc = format!("{:.0}%", scalar * 100.0);
        match self {
            UpgradeId::MoreSpeed => format!("{perc} of usual speed bonus"),
            UpgradeId::MoreWeaponDamage => format!("{perc} of usual damage bonus"),
            UpgradeId::HealNow => {
                format!("+{} HP (currently at {felix_hp} HP)", heal_amount(scalar))
            }
            UpgradeId::SlowerEnemies => format!("{perc} of usual slow-down"),
            UpgradeId::PickUpRange => format!("{perc} usual range increase"),
            UpgradeId::Lucky => format!("{perc} usual chance increase"),
            UpgradeId::Freeze => format!("{perc} usual freeze duration"),
        }
    }
}

/// HP restored by HEAL_NOW; floors, never rounds
pub fn heal_amount(scalar: f64) -> u32 {
    scalar.floor().max(0.0) as u32
}

/// Father Time's reaction to how well the minute went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatherMood {
    Happy,
    Content,
    Irritated,
    Angry,
}

impl FatherMood {
    pub fn from_scalar(scalar: f64) -> Self {
        if scalar >= 2.0 {
            FatherMood::Happy
        } else if scalar >= 1.0 {
            FatherMood::Content
        } else if scalar >= 0.5 {
            FatherMood::Irritated
        } else {
            FatherMood::Angry
        }
    }

    pub fn cue(&self) -> Cue {
        match self {
            FatherMood::Happy => Cue::FatherHappy,
            FatherMood::Content => Cue::FatherContent,
            FatherMood::Irritated => Cue::FatherIrritated,
            FatherMood::Angry => Cue::FatherAngry,
        }
    }
}

/// Everything the reward screen needs to render a bag's choice
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeOffer {
    pub minute: u32,
    pub scalar: f64,
    /// Boss weapon, if it is still in the arsenal
    pub weapon: Option<WeaponInfo>,
    pub upgrades: Vec<UpgradeId>,
    pub mood: FatherMood,
}

impl UpgradeOffer {
    pub fn new(minute: u32, scalar: f64, weapon: Option<WeaponInfo>, rng: &mut Pcg32) -> Self {
        let mut upgrades = UpgradeId::ALL.to_vec();
        upgrades.shuffle(rng);
        upgrades.truncate(OFFERED_UPGRADES);
        Self {
            minute,
            scalar,
            weapon,
            upgrades,
            mood: FatherMood::from_scalar(scalar),
        }
    }
}

/// The player's answer to an [`UpgradeOffer`]
#[derive(Debug, Clone, PartialEq)]
pub enum RewardChoice {
    ClaimWeapon,
    Upgrade(UpgradeId),
}

/// A reversible upgrade still in force, with the value to restore
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TempEffect {
    SlowerEnemies { restore_speed_multiplier: f32 },
}
