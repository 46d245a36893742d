//! Reward bags dropped by clock-number bosses

use std::collections::BTreeSet;

use glam::Vec2;

use super::event::EntityId;
use super::spatial::within;

#[derive(Debug, Clone, PartialEq)]
pub struct RewardBag {
    pub id: EntityId,
    pub minute: u32,
    pub pos: Vec2,
}

/// Tracks bags on the ground and which minutes have already been cashed in
#[derive(Debug, Clone, Default)]
pub struct BagManager {
    bags: Vec<RewardBag>,
    consumed: BTreeSet<u32>,
}

impl BagManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_bag(&mut self, id: EntityId, minute: u32, pos: Vec2) {
        self.bags.push(RewardBag { id, minute, pos });
    }

    pub fn bags(&self) -> &[RewardBag] {
        &self.bags
    }

    pub fn is_consumed(&self, minute: u32) -> bool {
        self.consumed.contains(&minute)
    }

    /// First uncollected bag Felix is standing on. Each minute is handed out
    /// at most once; repeats in range are dropped without complaint.
    pub fn detect_pickup(&mut self, felix: Vec2, range: f32) -> Option<RewardBag> {
        while let Some(index) = self.bags.iter().position(|b| within(range, felix, b.pos)) {
            let bag = self.bags.remove(index);
            if self.consumed.insert(bag.minute) {
                return Some(bag);
            }
            log::warn!("bag for minute {} already collected, skipping", bag.minute);
        }
        None
    }
}
