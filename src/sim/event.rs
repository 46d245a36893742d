//! Side effects the director asks its collaborators to perform
//!
//! The simulation never touches the scene, UI or audio directly. Each
//! update queues `GameEvent`s; the host drains them and dispatches to its
//! sinks (see `platform::dispatch`).

use glam::Vec2;

use super::loot::Rarity;
use super::upgrade::UpgradeOffer;
use crate::audio::Cue;

/// Opaque handle tying a simulation entity to its scene object
pub type EntityId = u32;

/// What the scene should show for an attached entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    Enemy { archetype: &'static str },
    /// Clock numeral mesh (minute 12 uses index 0)
    Numeral { index: u32 },
    Gem { rarity: Rarity },
    Bag { minute: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    // === Scene ===
    Attach { id: EntityId, visual: Visual, at: Vec2 },
    /// Hide immediately (same frame as death)
    Hide { id: EntityId },
    /// Remove from the scene on the next render tick
    Detach { id: EntityId },
    /// Enemy stun wore off; restore its normal look
    Recovered { id: EntityId },
    /// Gem started flying toward Felix
    GemHoming { id: EntityId },
    DamageNumber { amount: u32, at: Vec2 },
    Shake { ms: f64 },
    Flash { rarity: Rarity },
    /// Felix took a hit
    HurtFlash,
    Spark { at: Vec2 },
    /// Session gem count flies toward a freshly spawned boss
    LootBagging { count: u32, to: Vec2 },

    // === Audio ===
    Play(Cue),
    Pause(Cue),

    // === UI ===
    SetTime { seconds: u32 },
    TimerUnknown,
    Countdown { seconds_left: u32 },
    SetHp { hp: u32, max: u32 },
    AddXp(u32),
    SetXp(u32),
    ArchiveMinuteXp { minute: u32, xp: u32 },
    EraAnnouncement(&'static str),
    ShowUpgrade(UpgradeOffer),
    HideUpgrade,
    ShowPauseMenu,
    HidePauseMenu,
    Victory { score: u64 },
    GameOver,

    // === Driver ===
    PauseRendering,
    ResumeRendering,

    // === Leaderboard ===
    SubmitScore { score: u64, metadata: String },
}

/// Which collaborator an event is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Scene,
    Audio,
    Ui,
    Driver,
    Leaderboard,
}

impl GameEvent {
    pub fn channel(&self) -> Channel {
        use GameEvent::*;
        match self {
            Attach { .. } | Hide { .. } | Detach { .. } | Recovered { .. } | GemHoming { .. }
            | DamageNumber { .. } | Shake { .. } | Flash { .. } | HurtFlash | Spark { .. }
            | LootBagging { .. } => Channel::Scene,
            Play(_) | Pause(_) => Channel::Audio,
            PauseRendering | ResumeRendering => Channel::Driver,
            SubmitScore { .. } => Channel::Leaderboard,
            _ => Channel::Ui,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(GameEvent::HurtFlash.channel(), Channel::Scene);
        assert_eq!(GameEvent::Play(Cue::BigHit).channel(), Channel::Audio);
        assert_eq!(GameEvent::SetXp(0).channel(), Channel::Ui);
        assert_eq!(GameEvent::ResumeRendering.channel(), Channel::Driver);
        assert_eq!(
            GameEvent::SubmitScore { score: 1, metadata: String::new() }.channel(),
            Channel::Leaderboard
        );
    }
}
