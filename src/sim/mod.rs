//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Game time comes in from the driver, never from a wall clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order, weapon slot order)
//! - No rendering, audio or DOM dependencies; side effects leave as events

pub mod bags;
pub mod clock;
pub mod director;
pub mod enemy;
pub mod event;
pub mod loot;
pub mod player;
pub mod roster;
pub mod spatial;
pub mod upgrade;
pub mod weapon;

pub use bags::{BagManager, RewardBag};
pub use clock::{ClockAction, Phase, WorldClock};
pub use director::{Director, final_damage};
pub use enemy::{Enemy, EnemyKind, HitOutcome};
pub use event::{Channel, EntityId, GameEvent, Visual};
pub use loot::{Gem, GemManager, Rarity};
pub use player::Felix;
pub use roster::{Archetype, Era};
pub use spatial::within_distance_2d;
pub use upgrade::{FatherMood, RewardChoice, UpgradeId, UpgradeOffer};
pub use weapon::{Weapon, WeaponInfo};
