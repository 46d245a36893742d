//! HUD state model
//!
//! Folds UI events from the director into plain state a host can draw
//! (DOM on the web, a log line natively). `dirty` is raised only when
//! something visible changed, so hosts can skip redundant DOM writes.

use std::collections::BTreeMap;

use crate::platform::UiSink;
use crate::sim::{GameEvent, UpgradeOffer};

/// Elapsed seconds as `MM:SS`
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// What the timer slot shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerDisplay {
    Elapsed(u32),
    /// Ending sequence: time is no longer shown
    Unknown,
    Countdown(u32),
}

impl TimerDisplay {
    pub fn text(&self) -> String {
        match self {
            TimerDisplay::Elapsed(seconds) => format_time(*seconds),
            TimerDisplay::Unknown => "??:??".to_string(),
            TimerDisplay::Countdown(left) => format!("XII falls in {left}"),
        }
    }
}

/// Terminal screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndScreen {
    Victory { score: u64 },
    GameOver,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub timer: TimerDisplay,
    pub hp: u32,
    pub max_hp: u32,
    /// XP collected in the current minute
    pub xp: u32,
    /// Archived XP per finished minute
    pub ledger: BTreeMap<u32, u32>,
    pub era_banner: Option<&'static str>,
    pub offer: Option<UpgradeOffer>,
    pub pause_menu: bool,
    pub end: Option<EndScreen>,
    pub dirty: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            timer: TimerDisplay::Elapsed(0),
            hp: 0,
            max_hp: 0,
            xp: 0,
            ledger: BTreeMap::new(),
            era_banner: None,
            offer: None,
            pause_menu: false,
            end: None,
            dirty: true,
        }
    }

    fn set<T: PartialEq>(field: &mut T, value: T, dirty: &mut bool) {
        if *field != value {
            *field = value;
            *dirty = true;
        }
    }

    /// Clear the dirty flag, returning whether a redraw is due
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Total XP across archived minutes and the current one
    pub fn total_xp(&self) -> u32 {
        self.ledger.values().sum::<u32>() + self.xp
    }

    /// Card text for the open reward offer: weapon first, then upgrades
    pub fn offer_lines(&self) -> Vec<String> {
        let Some(offer) = &self.offer else {
            return Vec::new();
        };
        let mut lines = Vec::new();
        if let Some(weapon) = offer.weapon {
            lines.push(format!("{}: {}", weapon.numeral, weapon.heading));
        }
        for upgrade in &offer.upgrades {
            lines.push(format!(
                "{}: {} ({})",
                upgrade.name(),
                upgrade.description(),
                upgrade.scalar_label(offer.scalar, self.hp)
            ));
        }
        lines
    }
}

impl UiSink for Hud {
    fn apply(&mut self, event: &GameEvent) {
        let dirty = &mut self.dirty;
        match event {
            GameEvent::SetTime { seconds } => {
                // Ignored once the ending has taken over the timer
                if matches!(self.timer, TimerDisplay::Elapsed(_)) {
                    Self::set(&mut self.timer, TimerDisplay::Elapsed(*seconds), dirty);
                }
            }
            GameEvent::TimerUnknown => Self::set(&mut self.timer, TimerDisplay::Unknown, dirty),
            GameEvent::Countdown { seconds_left } => {
                Self::set(&mut self.timer, TimerDisplay::Countdown(*seconds_left), dirty)
            }
            GameEvent::SetHp { hp, max } => {
                Self::set(&mut self.hp, *hp, dirty);
                Self::set(&mut self.max_hp, *max, dirty);
            }
            GameEvent::AddXp(xp) => {
                let total = self.xp + xp;
                Self::set(&mut self.xp, total, dirty);
            }
            GameEvent::SetXp(xp) => Self::set(&mut self.xp, *xp, dirty),
            GameEvent::ArchiveMinuteXp { minute, xp } => {
                self.ledger.insert(*minute, *xp);
                *dirty = true;
            }
            GameEvent::EraAnnouncement(text) => Self::set(&mut self.era_banner, Some(*text), dirty),
            GameEvent::ShowUpgrade(offer) => Self::set(&mut self.offer, Some(offer.clone()), dirty),
            GameEvent::HideUpgrade => Self::set(&mut self.offer, None, dirty),
            GameEvent::ShowPauseMenu => Self::set(&mut self.pause_menu, true, dirty),
            GameEvent::HidePauseMenu => Self::set(&mut self.pause_menu, false, dirty),
            GameEvent::Victory { score } => {
                Self::set(&mut self.end, Some(EndScreen::Victory { score: *score }), dirty)
            }
            GameEvent::GameOver => Self::set(&mut self.end, Some(EndScreen::GameOver), dirty),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::UpgradeId;
    use crate::sim::upgrade::FatherMood;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(61), "01:01");
        assert_eq!(format_time(725), "12:05");
    }

    #[test]
    fn test_dirty_only_on_second_change() {
        let mut hud = Hud::new();
        hud.apply(&GameEvent::SetTime { seconds: 3 });
        assert!(hud.take_dirty());
        hud.apply(&GameEvent::SetTime { seconds: 3 });
        assert!(!hud.take_dirty());
        hud.apply(&GameEvent::SetTime { seconds: 4 });
        assert!(hud.take_dirty());
        assert_eq!(hud.timer.text(), "00:04");
    }

    #[test]
    fn test_ending_owns_the_timer() {
        let mut hud = Hud::new();
        hud.apply(&GameEvent::TimerUnknown);
        hud.apply(&GameEvent::SetTime { seconds: 721 });
        assert_eq!(hud.timer, TimerDisplay::Unknown);
        hud.apply(&GameEvent::Countdown { seconds_left: 42 });
        assert_eq!(hud.timer.text(), "XII falls in 42");
    }

    #[test]
    fn test_xp_ledger() {
        let mut hud = Hud::new();
        hud.apply(&GameEvent::AddXp(3));
        hud.apply(&GameEvent::AddXp(10));
        hud.apply(&GameEvent::ArchiveMinuteXp { minute: 1, xp: 13 });
        hud.apply(&GameEvent::SetXp(0));
        hud.apply(&GameEvent::AddXp(1));
        assert_eq!(hud.ledger.get(&1), Some(&13));
        assert_eq!(hud.xp, 1);
        assert_eq!(hud.total_xp(), 14);
    }

    #[test]
    fn test_offer_lines() {
        let mut hud = Hud::new();
        hud.apply(&GameEvent::SetHp { hp: 2, max: 4 });
        hud.apply(&GameEvent::ShowUpgrade(UpgradeOffer {
            minute: 5,
            scalar: 0.75,
            weapon: crate::sim::weapon::weapon_info(5),
            upgrades: vec![UpgradeId::HealNow, UpgradeId::Lucky],
            mood: FatherMood::Irritated,
        }));
        let lines = hud.offer_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("V: "));
        assert!(lines[1].contains("+0 HP (currently at 2 HP)"));
        assert!(lines[2].contains("75% usual chance increase"));

        hud.apply(&GameEvent::HideUpgrade);
        assert!(hud.offer_lines().is_empty());
    }
}
