//! Player settings and preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Screen shake on weapon impacts and when Felix is hit
    pub screen_shake: bool,
    /// Floating damage numbers over enemies
    pub damage_numbers: bool,
    /// Gem pickup and hurt flashes
    pub flashes: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
    /// Pause the run when the tab is hidden
    pub pause_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            damage_numbers: true,
            flashes: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
            pause_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective flashes (respects reduced_motion)
    pub fn effective_flashes(&self) -> bool {
        self.flashes && !self.reduced_motion
    }

    /// Whether a cosmetic scene effect should reach the renderer
    pub fn allows(&self, event: &GameEvent) -> bool {
        match event {
            GameEvent::Shake { .. } => self.effective_screen_shake(),
            GameEvent::Flash { .. } | GameEvent::HurtFlash => self.effective_flashes(),
            GameEvent::DamageNumber { .. } => self.damage_numbers,
            _ => true,
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "felix_clock_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(err) => log::warn!("Ignoring stored settings: {err}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_overrides() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_flashes());
        assert!(settings.damage_numbers);
    }

    #[test]
    fn test_effect_filter() {
        let mut settings = Settings::default();
        let shake = GameEvent::Shake { ms: 200.0 };
        let number = GameEvent::DamageNumber { amount: 3, at: glam::Vec2::ZERO };
        assert!(settings.allows(&shake));
        assert!(settings.allows(&GameEvent::HurtFlash));

        settings.reduced_motion = true;
        assert!(!settings.allows(&shake));
        assert!(!settings.allows(&GameEvent::HurtFlash));
        assert!(settings.allows(&number));

        settings.damage_numbers = false;
        assert!(!settings.allows(&number));
        // Gameplay events always pass
        assert!(settings.allows(&GameEvent::GameOver));
        assert!(settings.allows(&GameEvent::Detach { id: 4 }));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "muted": true }"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.master_volume, 0.8);
    }
}
