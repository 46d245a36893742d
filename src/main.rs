//! Felix vs. Father Time entry point
//!
//! On the web this wires the director to the DOM HUD, Web Audio and
//! LocalStorage and runs it from `requestAnimationFrame`. Natively it plays
//! a headless autopilot run and prints a JSON summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent};

    use felix_clock::audio::AudioManager;
    use felix_clock::platform::{NullSink, RenderLoop, Sinks, dispatch};
    use felix_clock::sim::{Director, RewardChoice};
    use felix_clock::ui::{EndScreen, Hud};
    use felix_clock::{HighScores, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        director: Director,
        driver: RenderLoop,
        hud: Hud,
        scene: NullSink,
        audio: AudioManager,
        highscores: HighScores,
        settings: Settings,
        held: HashSet<String>,
        rank: Option<usize>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let tuning = Tuning::default();
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                driver: RenderLoop::new(tuning.stall_ms),
                director: Director::new(tuning, seed),
                hud: Hud::new(),
                scene: NullSink::default(),
                audio,
                highscores: HighScores::load(),
                settings,
                held: HashSet::new(),
                rank: None,
            }
        }

        fn steering(&self) -> Vec2 {
            let mut dir = Vec2::ZERO;
            for key in &self.held {
                match key.as_str() {
                    "w" | "W" | "ArrowUp" => dir.y -= 1.0,
                    "s" | "S" | "ArrowDown" => dir.y += 1.0,
                    "a" | "A" | "ArrowLeft" => dir.x -= 1.0,
                    "d" | "D" | "ArrowRight" => dir.x += 1.0,
                    _ => {}
                }
            }
            dir
        }

        fn frame(&mut self, time: f64) {
            let steer = self.steering();
            self.director.steer(steer);
            let mut events = self.driver.frame(time, &mut self.director);
            events.retain(|event| self.settings.allows(event));
            let rank = dispatch(
                &events,
                &mut Sinks {
                    scene: &mut self.scene,
                    ui: &mut self.hud,
                    audio: &mut self.audio,
                    leaderboard: &mut self.highscores,
                },
            );
            if rank.is_some() {
                self.rank = rank;
            }
        }

        /// Number keys pick from the reward screen: 1 claims the weapon
        /// when one is offered, the rest map onto the upgrade cards.
        fn pick_reward(&mut self, index: usize) {
            let Some(offer) = self.director.offer().cloned() else {
                return;
            };
            let choice = match (offer.weapon, index) {
                (Some(_), 0) => RewardChoice::ClaimWeapon,
                (Some(_), n) => match offer.upgrades.get(n - 1) {
                    Some(upgrade) => RewardChoice::Upgrade(*upgrade),
                    None => return,
                },
                (None, n) => match offer.upgrades.get(n) {
                    Some(upgrade) => RewardChoice::Upgrade(*upgrade),
                    None => return,
                },
            };
            self.audio.resume();
            self.director.choose(choice, offer.scalar);
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            if !self.hud.take_dirty() {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_text(&document, "hud-time", &self.hud.timer.text());
            set_text(&document, "hud-hp", &format!("{}/{}", self.hud.hp, self.hud.max_hp));
            set_text(&document, "hud-xp", &self.hud.xp.to_string());
            set_text(&document, "era-banner", self.hud.era_banner.unwrap_or(""));

            let ledger = self
                .hud
                .ledger
                .iter()
                .map(|(minute, xp)| format!("{}: {xp}", felix_clock::roman(*minute)))
                .collect::<Vec<_>>()
                .join("  ");
            set_text(&document, "xp-ledger", &ledger);

            let lines = self.hud.offer_lines();
            set_visible(&document, "upgrade-modal", !lines.is_empty());
            let numbered = lines
                .iter()
                .enumerate()
                .map(|(i, line)| format!("[{}] {line}", i + 1))
                .collect::<Vec<_>>()
                .join("\n");
            set_text(&document, "upgrade-options", &numbered);

            set_visible(&document, "pause-menu", self.hud.pause_menu);
            match self.hud.end {
                Some(EndScreen::Victory { score }) => {
                    set_visible(&document, "victory", true);
                    let rank = self.rank.map(|r| format!(" (#{r})")).unwrap_or_default();
                    set_text(&document, "final-score", &format!("{score}{rank}"));
                }
                Some(EndScreen::GameOver) => set_visible(&document, "game-over", true),
                None => {}
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger: {err}").into());
        }

        log::info!("Felix vs. Father Time starting...");

        let Some(window) = web_sys::window() else {
            log::error!("no window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone());
        setup_auto_pause(&document, game.clone());

        request_animation_frame(game);
        log::info!("Felix vs. Father Time running!");
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                match key.as_str() {
                    "Escape" | "p" | "P" => g.director.toggle_pause_menu(),
                    "1" | "2" | "3" | "4" => {
                        let index = key.parse::<usize>().unwrap_or(1) - 1;
                        g.pick_reward(index);
                    }
                    "m" | "M" => {
                        g.settings.muted = !g.settings.muted;
                        let settings = g.settings.clone();
                        g.audio.apply_settings(&settings);
                        settings.save();
                    }
                    _ => {
                        g.held.insert(key);
                    }
                }
                g.audio.resume();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().held.remove(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() != web_sys::VisibilityState::Hidden {
                return;
            }
            let mut g = game.borrow_mut();
            g.held.clear();
            if g.settings.pause_on_blur && !g.hud.pause_menu && g.director.offer().is_none() {
                g.director.toggle_pause_menu();
                log::info!("Auto-paused (tab hidden)");
            }
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use serde::Serialize;

    use felix_clock::consts::FRAME_MS;
    use felix_clock::platform::{NullSink, RenderLoop, Sinks, dispatch};
    use felix_clock::sim::{Director, Phase, RewardChoice};
    use felix_clock::ui::Hud;
    use felix_clock::{HighScores, Tuning};

    /// Radius of the autopilot's kiting circle
    const KITE_RADIUS: f32 = 110.0;
    /// Hard stop for runs that never end (ms of host time)
    const MAX_RUN_MS: f64 = 30.0 * 60_000.0;

    #[derive(Debug, Serialize)]
    pub struct RunSummary {
        pub seed: u64,
        pub outcome: &'static str,
        pub minute: u32,
        pub total_xp: u32,
        pub weapons: String,
        pub hp: u32,
        pub max_hp: u32,
        pub rank: Option<usize>,
        pub frames: u64,
    }

    /// Walk toward the nearest bag, otherwise circle the clock face.
    fn autopilot(director: &Director) -> Vec2 {
        let felix = director.felix().pos;
        let nearest_bag = director
            .bags()
            .bags()
            .iter()
            .map(|b| b.pos)
            .min_by(|a, b| a.distance(felix).total_cmp(&b.distance(felix)));
        if let Some(bag) = nearest_bag {
            return bag - felix;
        }
        let radial = felix.try_normalize().unwrap_or(Vec2::Y);
        let tangent = radial.perp();
        let correction = (KITE_RADIUS - felix.length()) / KITE_RADIUS;
        tangent + radial * correction * 2.0
    }

    /// Claim the boss weapon when offered, otherwise the first upgrade.
    fn pick(director: &mut Director) {
        let Some(offer) = director.offer().cloned() else {
            return;
        };
        let choice = if offer.weapon.is_some() {
            RewardChoice::ClaimWeapon
        } else {
            match offer.upgrades.first() {
                Some(upgrade) => RewardChoice::Upgrade(*upgrade),
                None => RewardChoice::ClaimWeapon,
            }
        };
        director.choose(choice, offer.scalar);
    }

    pub fn run(seed: u64, tuning: Tuning) -> RunSummary {
        let mut driver = RenderLoop::new(tuning.stall_ms);
        let mut director = Director::new(tuning, seed);
        let mut hud = Hud::new();
        let mut scene = NullSink::default();
        let mut audio = NullSink::default();
        let mut board = HighScores::load();
        let mut rank = None;

        let mut now = 0.0;
        let mut frames = 0u64;
        while !director.phase().is_terminal() && now < MAX_RUN_MS {
            director.steer(autopilot(&director));
            let events = driver.frame(now, &mut director);
            let placed = dispatch(
                &events,
                &mut Sinks {
                    scene: &mut scene,
                    ui: &mut hud,
                    audio: &mut audio,
                    leaderboard: &mut board,
                },
            );
            rank = rank.or(placed);
            pick(&mut director);

            if hud.take_dirty() && frames % 600 == 0 {
                log::info!(
                    "{} hp {}/{} xp {}",
                    hud.timer.text(),
                    hud.hp,
                    hud.max_hp,
                    hud.total_xp()
                );
            }
            now += FRAME_MS;
            frames += 1;
        }

        RunSummary {
            seed,
            outcome: match director.phase() {
                Phase::Victory => "victory",
                Phase::GameOver => "game_over",
                Phase::Normal | Phase::Ending => "timeout",
            },
            minute: director.minute(),
            total_xp: director.total_xp(),
            weapons: director.score_metadata(),
            hp: director.felix().hp,
            max_hp: director.felix().max_hp,
            rank,
            frames,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Felix vs. Father Time (headless) starting...");

    // Usage: felix-clock [seed] [tuning.json]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|json| felix_clock::Tuning::from_json(&json).map_err(|err| err.to_string()))
        {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("{path}: {err}");
                std::process::exit(2);
            }
        },
        None => felix_clock::Tuning::default(),
    };

    let summary = headless::run(seed, tuning);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("summary: {err}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
