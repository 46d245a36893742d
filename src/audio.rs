//! Audio cues and the Web Audio synth that plays them
//!
//! The simulation only names cues. On the web every cue is synthesized on
//! the fly, so no asset files are needed; music cues are held drones that
//! run until paused.

use crate::sim::Era;

/// Every sound the director can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    // === One-shots ===
    FelixHurt,
    FatherHappy,
    FatherContent,
    FatherIrritated,
    FatherAngry,
    /// Stinger when a clock number rises in a new era
    EraSpawn(Era),
    UpgradeShow,
    XpPickupNormal,
    XpPickupHigh,
    SmallHit,
    MediumHit,
    BigHit,
    GameOver,

    // === Music ===
    EraMusic(Era),
    UpgradeLoop,
    FinalLoop,
    VictoryMusic,
}

impl Cue {
    /// Music cues loop until paused; everything else plays once
    pub fn is_music(&self) -> bool {
        matches!(
            self,
            Cue::EraMusic(_) | Cue::UpgradeLoop | Cue::FinalLoop | Cue::VictoryMusic
        )
    }

    /// Root pitch (Hz) used by the synth for this cue
    pub fn base_freq(&self) -> f32 {
        match self {
            Cue::FelixHurt => 180.0,
            Cue::FatherHappy => 523.25,
            Cue::FatherContent => 392.0,
            Cue::FatherIrritated => 233.08,
            Cue::FatherAngry => 110.0,
            Cue::EraSpawn(era) | Cue::EraMusic(era) => match era {
                Era::StoneAge => 98.0,
                Era::Ancient => 146.83,
                Era::Industrial => 87.31,
                Era::Prohibition => 196.0,
            },
            Cue::UpgradeShow => 659.25,
            Cue::XpPickupNormal => 880.0,
            Cue::XpPickupHigh => 1318.5,
            Cue::SmallHit => 300.0,
            Cue::MediumHit => 200.0,
            Cue::BigHit => 120.0,
            Cue::GameOver => 220.0,
            Cue::UpgradeLoop => 261.63,
            Cue::FinalLoop => 73.42,
            Cue::VictoryMusic => 329.63,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::collections::HashMap;

    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::Cue;
    use crate::settings::Settings;

    /// A held music drone
    struct Voice {
        oscs: Vec<OscillatorNode>,
        gain: GainNode,
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        music_volume: f32,
        muted: bool,
        playing: HashMap<Cue, Voice>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                music_volume: 0.5,
                muted: false,
                playing: HashMap::new(),
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume.clamp(0.0, 1.0);
            self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
            self.music_volume = settings.music_volume.clamp(0.0, 1.0);
            self.muted = settings.muted;
            if self.muted {
                let held: Vec<Cue> = self.playing.keys().copied().collect();
                for cue in held {
                    self.pause(cue);
                }
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn volume_for(&self, cue: Cue) -> f32 {
            if self.muted {
                0.0
            } else if cue.is_music() {
                self.master_volume * self.music_volume
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        pub fn play(&mut self, cue: Cue) {
            let vol = self.volume_for(cue);
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.ctx.clone() else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            if cue.is_music() {
                if self.playing.contains_key(&cue) {
                    return;
                }
                if let Some(voice) = self.start_drone(&ctx, cue, vol) {
                    self.playing.insert(cue, voice);
                }
                return;
            }

            match cue {
                Cue::SmallHit | Cue::MediumHit | Cue::BigHit => self.play_hit(&ctx, cue, vol),
                Cue::XpPickupNormal | Cue::XpPickupHigh => self.play_pickup(&ctx, cue, vol),
                Cue::FelixHurt => self.play_hurt(&ctx, vol),
                Cue::GameOver => self.play_game_over(&ctx, vol),
                _ => self.play_chime(&ctx, cue, vol),
            }
        }

        /// Stop a held music cue. One-shots ignore this.
        pub fn pause(&mut self, cue: Cue) {
            let Some(voice) = self.playing.remove(&cue) else {
                return;
            };
            let t = self.ctx.as_ref().map(|c| c.current_time()).unwrap_or(0.0);
            voice.gain.gain().set_value_at_time(voice.gain.gain().value(), t).ok();
            voice.gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.1).ok();
            for osc in voice.oscs {
                osc.stop_with_when(t + 0.12).ok();
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Root plus fifth, held until paused
        fn start_drone(&self, ctx: &AudioContext, cue: Cue, vol: f32) -> Option<Voice> {
            let root = cue.base_freq();
            let gain = ctx.create_gain().ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            let t = ctx.current_time();
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().linear_ramp_to_value_at_time(vol * 0.15, t + 0.5).ok();

            let mut oscs = Vec::new();
            for (freq, kind) in [
                (root, OscillatorType::Triangle),
                (root * 1.5, OscillatorType::Sine),
            ] {
                let osc = ctx.create_oscillator().ok()?;
                osc.set_type(kind);
                osc.frequency().set_value(freq);
                osc.connect_with_audio_node(&gain).ok()?;
                osc.start().ok();
                oscs.push(osc);
            }
            Some(Voice { oscs, gain })
        }

        /// Weapon hit: a thump that gets deeper with damage
        fn play_hit(&self, ctx: &AudioContext, cue: Cue, vol: f32) {
            let freq = cue.base_freq();
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            let length = if cue == Cue::BigHit { 0.2 } else { 0.1 };

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.frequency().set_value_at_time(freq, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(freq * 0.4, t + length)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        /// Gem pickup: rising blip, two notes for rare gems
        fn play_pickup(&self, ctx: &AudioContext, cue: Cue, vol: f32) {
            let t = ctx.current_time();
            let notes: &[f32] = if cue == Cue::XpPickupHigh {
                &[1.0, 1.5]
            } else {
                &[1.0]
            };
            for (i, step) in notes.iter().enumerate() {
                let freq = cue.base_freq() * step;
                let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
                    return;
                };
                let start = t + i as f64 * 0.06;
                gain.gain().set_value_at_time(vol * 0.25, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.08)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.1).ok();
            }
        }

        /// Felix hurt: harsh buzz
        fn play_hurt(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) =
                self.create_osc(ctx, Cue::FelixHurt.base_freq(), OscillatorType::Sawtooth)
            else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency().set_value_at_time(120.0, t + 0.1).ok();
            osc.frequency().set_value_at_time(90.0, t + 0.2).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        /// Short arpeggio on the cue's root: Father's voice, stingers, modal
        fn play_chime(&self, ctx: &AudioContext, cue: Cue, vol: f32) {
            let t = ctx.current_time();
            let steps: &[f32] = match cue {
                Cue::FatherHappy => &[1.0, 1.25, 1.5, 2.0],
                Cue::FatherContent => &[1.0, 1.25, 1.5],
                Cue::FatherIrritated => &[1.0, 0.94],
                Cue::FatherAngry => &[1.0, 0.94, 0.89],
                _ => &[1.0, 1.5],
            };
            for (i, step) in steps.iter().enumerate() {
                let freq = cue.base_freq() * step;
                let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
                    return;
                };
                let start = t + i as f64 * 0.12;
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.2)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.25).ok();
            }
        }

        /// Game over - descending sad tones
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            let notes = [440.0, 392.0, 349.23, 293.66];

            for (i, &freq) in notes.iter().enumerate() {
                if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) {
                    let start = t + i as f64 * 0.25;
                    gain.gain().set_value_at_time(0.0, t).ok();
                    gain.gain().set_value_at_time(vol * 0.3, start).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, start + 0.3)
                        .ok();
                    osc.start_with_when(start).ok();
                    osc.stop_with_when(start + 0.35).ok();
                }
            }
        }
    }

    impl crate::platform::AudioSink for AudioManager {
        fn play(&mut self, cue: Cue) {
            AudioManager::play(self, cue);
        }

        fn pause(&mut self, cue: Cue) {
            AudioManager::pause(self, cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_music_cues() {
        assert!(Cue::EraMusic(Era::Ancient).is_music());
        assert!(Cue::UpgradeLoop.is_music());
        assert!(Cue::FinalLoop.is_music());
        assert!(!Cue::EraSpawn(Era::Ancient).is_music());
        assert!(!Cue::BigHit.is_music());
    }

    #[test]
    fn test_hits_get_deeper() {
        assert!(Cue::SmallHit.base_freq() > Cue::MediumHit.base_freq());
        assert!(Cue::MediumHit.base_freq() > Cue::BigHit.base_freq());
    }
}
