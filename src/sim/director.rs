//! The director: owns the run and ties every subsystem together
//!
//! One `update` per unpaused frame:
//! 1. Felix walks, weapons move
//! 2. per enemy: weapon collisions, then movement, then contact with Felix
//! 3. dead enemies are removed in one batch
//! 4. gems and bags are checked
//! 5. the world clock advances (spawns, minutes, eras, ending countdown)
//!
//! Everything the outside world should see is queued as [`GameEvent`]s.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bags::{BagManager, RewardBag};
use super::clock::{ClockAction, Phase, WorldClock};
use super::enemy::{Enemy, EnemyKind, HitOutcome, Step};
use super::event::{EntityId, GameEvent, Visual};
use super::loot::{GemManager, Rarity};
use super::player::{Felix, Hurt};
use super::roster::{self, Archetype, Era};
use super::upgrade::{
    DAMAGE_BONUS, LUCK_BONUS, MIN_ENEMY_SPEED, RANGE_BONUS, RewardChoice, SLOW_FACTOR,
    SPEED_BONUS, TempEffect, UpgradeId, UpgradeOffer, heal_amount,
};
use super::weapon::{Feedback, Weapon, WeaponSlot};
use crate::audio::Cue;
use crate::consts::ENDING_MINUTE;
use crate::error::{Fault, fault};
use crate::tuning::Tuning;

/// Extra HP granted with weapon V
const MINUTE_FIVE_HP: u32 = 1;
/// Extra pickup range granted with weapon VII
const MINUTE_SEVEN_RANGE: f32 = 30.0;
/// Screen shake when Felix is hit (ms)
const HURT_SHAKE_MS: f64 = 300.0;

/// Final damage of a hit: `ceil(roll * acquisition * global)`, at least 1
/// for any non-zero roll.
pub fn final_damage(roll: u32, acquisition: f64, global: f64) -> u32 {
    let scaled = (roll as f64 * acquisition * global).ceil();
    let floor = if roll >= 1 { 1.0 } else { 0.0 };
    scaled.max(floor) as u32
}

/// Hit cue by damage size
fn hit_cue(damage: u32) -> Cue {
    match damage {
        0..10 => Cue::SmallHit,
        10..25 => Cue::MediumHit,
        _ => Cue::BigHit,
    }
}

/// XP bookkeeping
#[derive(Debug, Clone, Default)]
struct XpLedger {
    /// XP collected during the current minute
    running: u32,
    /// XP collected this run
    total: u32,
    /// Gems picked up since the last boss spawn
    session_gems: u32,
    /// Archived XP keyed by the minute it was collected in
    by_minute: BTreeMap<u32, u32>,
}

/// Reward-bag modal state
#[derive(Debug, Clone, PartialEq)]
enum RewardFlow {
    Idle,
    Choosing(UpgradeOffer),
    /// Modal hidden, waiting out the fade in real time
    Fading { minute: u32, remaining: f64 },
}

/// Final countdown, started once the last bag is resolved
#[derive(Debug, Clone, Copy)]
struct Countdown {
    started_at: f64,
    seconds_done: u32,
}

pub struct Director {
    tuning: Tuning,
    seed: u64,
    rng: Pcg32,
    phase: Phase,
    clock: WorldClock,
    enemies: Vec<Enemy>,
    weapons: Vec<Weapon>,
    arsenal: BTreeMap<u32, Weapon>,
    felix: Felix,
    steering: Vec2,
    /// Power scalar per acquired clock weapon, keyed by minute
    scalars: BTreeMap<u32, f64>,
    damage_multiplier: f64,
    enemy_speed_multiplier: f32,
    pickup_range: f32,
    rarity_boost: f32,
    temp_effects: Vec<TempEffect>,
    gems: GemManager,
    bags: BagManager,
    xp: XpLedger,
    music: Option<Cue>,
    pending_detach: Vec<EntityId>,
    reward: RewardFlow,
    countdown: Option<Countdown>,
    menu_open: bool,
    last_dt: f64,
    events: Vec<GameEvent>,
    next_id: EntityId,
}

impl Director {
    /// Fresh run. Felix starts with the base weapon only.
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        if let Err(err) = tuning.validate() {
            log::warn!("running with invalid tuning: {err}");
        }
        let felix = Felix::new(&tuning);
        let mut director = Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
            phase: Phase::Normal,
            clock: WorldClock::new(),
            enemies: Vec::new(),
            weapons: vec![Weapon::base()],
            arsenal: Weapon::arsenal(),
            steering: Vec2::ZERO,
            scalars: BTreeMap::new(),
            damage_multiplier: 1.0,
            enemy_speed_multiplier: 1.0,
            pickup_range: tuning.pickup_range,
            rarity_boost: 0.0,
            temp_effects: Vec::new(),
            gems: GemManager::new(tuning.gem_check_every),
            bags: BagManager::new(),
            xp: XpLedger::default(),
            music: None,
            pending_detach: Vec::new(),
            reward: RewardFlow::Idle,
            countdown: None,
            menu_open: false,
            last_dt: 0.0,
            events: Vec::new(),
            next_id: 1,
            felix,
            tuning,
        };
        director.push_hp();
        log::info!("run started (seed {seed})");
        director
    }

    // === Accessors ===

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// The canonical game minute
    pub fn minute(&self) -> u32 {
        self.clock.minute()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn felix(&self) -> &Felix {
        &self.felix
    }

    pub fn gems(&self) -> &GemManager {
        &self.gems
    }

    pub fn bags(&self) -> &BagManager {
        &self.bags
    }

    pub fn total_xp(&self) -> u32 {
        self.xp.total
    }

    pub fn minute_xp(&self) -> u32 {
        self.xp.running
    }

    pub fn ledgered_xp(&self, minute: u32) -> Option<u32> {
        self.xp.by_minute.get(&minute).copied()
    }

    pub fn scalar(&self, minute: u32) -> Option<f64> {
        self.scalars.get(&minute).copied()
    }

    pub fn damage_multiplier(&self) -> f64 {
        self.damage_multiplier
    }

    pub fn enemy_speed_multiplier(&self) -> f32 {
        self.enemy_speed_multiplier
    }

    pub fn pickup_range(&self) -> f32 {
        self.pickup_range
    }

    pub fn rarity_boost(&self) -> f32 {
        self.rarity_boost
    }

    pub fn temp_effects(&self) -> &[TempEffect] {
        &self.temp_effects
    }

    /// Offer currently on screen, if any
    pub fn offer(&self) -> Option<&UpgradeOffer> {
        match &self.reward {
            RewardFlow::Choosing(offer) => Some(offer),
            _ => None,
        }
    }

    /// Seconds left in the final countdown, once it has started
    pub fn countdown_remaining(&self) -> Option<f64> {
        self.countdown.map(|c| {
            (self.tuning.ending_countdown_ms - (self.last_dt - c.started_at)).max(0.0) / 1000.0
        })
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Input ===

    /// Direction Felix walks in on the next updates (zero to stand still)
    pub fn steer(&mut self, dir: Vec2) {
        self.steering = dir;
    }

    /// Add a weapon to the active list; returns its slot
    pub fn add_weapon(&mut self, weapon: Weapon) -> WeaponSlot {
        self.weapons.push(weapon);
        self.weapons.len() - 1
    }

    /// Spawn a drawn enemy at a ground position
    pub fn spawn_enemy(&mut self, archetype: &'static Archetype, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::drawn(id, archetype, pos));
        self.events.push(GameEvent::Attach {
            id,
            visual: Visual::Enemy {
                archetype: archetype.name,
            },
            at: pos,
        });
        id
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Frame ===

    /// Advance the simulation. `dt` is game time (pauses excluded), `elapsed`
    /// the frame length, both in ms.
    pub fn update(&mut self, dt: f64, elapsed: f64) {
        self.flush_detaches();
        if self.phase.is_terminal() {
            return;
        }
        if !matches!(self.reward, RewardFlow::Idle) || self.menu_open {
            log::warn!("update while paused ignored");
            return;
        }

        self.felix.walk(self.steering, elapsed);
        let felix_pos = self.felix.pos;

        for weapon in &mut self.weapons {
            weapon.update(dt, elapsed, felix_pos, &self.enemies, &mut self.rng);
        }

        let mut enemies = std::mem::take(&mut self.enemies);
        let mut destroyed: Vec<EntityId> = Vec::new();
        for enemy in enemies.iter_mut() {
            if !enemy.visible || destroyed.contains(&enemy.id) {
                continue;
            }

            if self.resolve_weapon_hits(enemy, dt) {
                destroyed.push(enemy.id);
                continue;
            }

            if enemy.move_towards(felix_pos, elapsed, self.enemy_speed_multiplier, &mut self.rng)
                == Step::Recovered
            {
                self.events.push(GameEvent::Recovered { id: enemy.id });
            }

            if enemy.stun <= 0.0 && self.phase != Phase::GameOver && enemy.collides_with(felix_pos)
            {
                self.felix_contact(dt);
            }
        }
        if !destroyed.is_empty() {
            enemies.retain(|e| !destroyed.contains(&e.id));
        }
        self.enemies = enemies;

        if self.phase == Phase::GameOver {
            self.last_dt = dt;
            return;
        }

        self.collect_gems(felix_pos, elapsed);
        if let Some(bag) = self.bags.detect_pickup(felix_pos, self.tuning.bag_pickup_range) {
            self.begin_reward(bag);
            self.last_dt = dt;
            return;
        }

        self.run_world_tick(dt);
        self.last_dt = dt;
    }

    /// Frame callback while the driver is paused. Runs the modal fade timer;
    /// `elapsed` is real time.
    pub fn paused_frame(&mut self, elapsed: f64) {
        self.flush_detaches();
        let RewardFlow::Fading { minute, remaining } = &mut self.reward else {
            return;
        };
        *remaining -= elapsed;
        if *remaining > 0.0 {
            return;
        }
        let minute = *minute;
        self.reward = RewardFlow::Idle;
        self.events.push(GameEvent::Pause(Cue::UpgradeLoop));

        if minute == ENDING_MINUTE {
            self.start_countdown();
        } else if let Some(track) = self.music {
            self.events.push(GameEvent::Play(track));
        }
        self.events.push(GameEvent::ResumeRendering);
    }

    /// Scene removals queued by last frame's kills. Runs on every render
    /// tick, paused or not.
    fn flush_detaches(&mut self) {
        for id in self.pending_detach.drain(..) {
            self.events.push(GameEvent::Detach { id });
        }
    }

    /// Player pause menu. Ignored while a reward choice is open or the run
    /// is over.
    pub fn toggle_pause_menu(&mut self) {
        if self.phase.is_terminal() || !matches!(self.reward, RewardFlow::Idle) {
            return;
        }
        self.menu_open = !self.menu_open;
        if self.menu_open {
            self.events.push(GameEvent::PauseRendering);
            if let Some(track) = self.music {
                self.events.push(GameEvent::Pause(track));
            }
            self.events.push(GameEvent::ShowPauseMenu);
        } else {
            self.events.push(GameEvent::HidePauseMenu);
            if let Some(track) = self.music {
                self.events.push(GameEvent::Play(track));
            }
            self.events.push(GameEvent::ResumeRendering);
        }
    }

    // === Combat ===

    /// Run every weapon against one enemy. Returns true if it died.
    fn resolve_weapon_hits(&mut self, enemy: &mut Enemy, now: f64) -> bool {
        for slot in 0..self.weapons.len() {
            if !self.weapons[slot].detect_collision(enemy, now, &mut self.rng) {
                continue;
            }

            let roll = self.weapons[slot].roll_damage(&mut self.rng);
            let acquisition = match self.weapons[slot].minute {
                Some(minute) => match self.scalars.get(&minute) {
                    Some(scalar) => *scalar,
                    None => fault(Fault::MissingScalar { minute }),
                },
                None => 1.0,
            };
            let damage = final_damage(roll, acquisition, self.damage_multiplier);

            let outcome = enemy.take_damage(self.weapons[slot].strike(slot, damage), now);
            if !outcome.landed() {
                continue;
            }

            self.events.push(GameEvent::DamageNumber {
                amount: damage,
                at: enemy.pos,
            });
            self.events.push(GameEvent::Play(hit_cue(damage)));
            match self.weapons[slot].on_enemy_collide(enemy) {
                Some(Feedback::Shake { ms }) => self.events.push(GameEvent::Shake { ms }),
                Some(Feedback::Spark { at }) => self.events.push(GameEvent::Spark { at }),
                None => {}
            }

            if outcome == HitOutcome::Killed {
                self.kill(enemy);
                return true;
            }
        }
        false
    }

    fn kill(&mut self, enemy: &mut Enemy) {
        enemy.visible = false;
        self.events.push(GameEvent::Hide { id: enemy.id });
        self.pending_detach.push(enemy.id);

        match enemy.kind {
            EnemyKind::ClockNumber { minute } => {
                let id = self.next_entity_id();
                self.bags.drop_bag(id, minute, enemy.pos);
                self.events.push(GameEvent::Attach {
                    id,
                    visual: Visual::Bag { minute },
                    at: enemy.pos,
                });
                log::info!("clock number {minute} defeated, bag dropped");
            }
            EnemyKind::Drawn(archetype) => {
                let id = self.next_entity_id();
                let boost = self.rarity_boost + enemy.rarity_boost;
                let rarity = self.gems.place(id, enemy.pos, boost, &mut self.rng).rarity;
                self.events.push(GameEvent::Attach {
                    id,
                    visual: Visual::Gem { rarity },
                    at: enemy.pos,
                });
                log::debug!("{} killed, {rarity:?} gem", archetype.name);
            }
        }
    }

    fn felix_contact(&mut self, now: f64) {
        match self.felix.take_damage(now) {
            Hurt::Ignored => {}
            Hurt::Wounded { hp } => {
                log::info!("felix hurt, {hp} hp left");
                self.push_hp();
                self.events.push(GameEvent::HurtFlash);
                self.events.push(GameEvent::Shake { ms: HURT_SHAKE_MS });
                self.events.push(GameEvent::Play(Cue::FelixHurt));
            }
            Hurt::Died => self.game_over(),
        }
    }

    fn game_over(&mut self) {
        log::info!(
            "felix died at minute {} with {} xp",
            self.clock.minute(),
            self.xp.total
        );
        self.phase = Phase::GameOver;
        if let Some(track) = self.music.take() {
            self.events.push(GameEvent::Pause(track));
        }
        self.push_hp();
        self.events.push(GameEvent::Play(Cue::GameOver));
        self.events.push(GameEvent::GameOver);
        self.events.push(GameEvent::PauseRendering);
    }

    // === Loot ===

    fn collect_gems(&mut self, felix_pos: Vec2, elapsed: f64) {
        let pass = self.gems.update(felix_pos, self.pickup_range, elapsed);
        for id in pass.started_homing {
            self.events.push(GameEvent::GemHoming { id });
        }
        for gem in pass.collected {
            let xp = gem.rarity.xp();
            self.xp.running += xp;
            self.xp.total += xp;
            self.xp.session_gems += 1;
            self.events.push(GameEvent::Detach { id: gem.id });
            self.events.push(GameEvent::AddXp(xp));
            self.events.push(GameEvent::Flash { rarity: gem.rarity });
            self.events.push(GameEvent::Play(if gem.rarity == Rarity::Rare {
                Cue::XpPickupHigh
            } else {
                Cue::XpPickupNormal
            }));
        }
    }

    // === Reward flow ===

    fn begin_reward(&mut self, bag: RewardBag) {
        let minute = bag.minute;
        self.events.push(GameEvent::Detach { id: bag.id });
        self.events.push(GameEvent::PauseRendering);
        if let Some(track) = self.music {
            self.events.push(GameEvent::Pause(track));
        }
        self.events.push(GameEvent::Play(Cue::UpgradeLoop));
        self.events.push(GameEvent::Play(Cue::UpgradeShow));

        let xp = match self.xp.by_minute.get(&minute) {
            Some(xp) => *xp,
            None => fault(Fault::MissingLedgerXp { minute }),
        };
        let expected = match self.tuning.expected_xp_for(minute) {
            Some(expected) => expected,
            None => fault(Fault::MissingExpectedXp { minute }),
        };
        let scalar = xp as f64 / expected as f64;
        let weapon = self.arsenal.get(&minute).and_then(Weapon::info);
        let offer = UpgradeOffer::new(minute, scalar, weapon, &mut self.rng);

        log::info!("bag {minute} opened: {xp}/{expected} xp, scalar {scalar:.2}");
        self.events.push(GameEvent::Play(offer.mood.cue()));
        self.events.push(GameEvent::ShowUpgrade(offer.clone()));
        self.reward = RewardFlow::Choosing(offer);
    }

    /// Selection callback from the reward screen: claimed-weapon flag,
    /// upgrade wire id (when not claiming) and the power scalar shown.
    pub fn select_reward(&mut self, claimed_weapon: bool, upgrade: Option<&str>, scalar: f64) {
        let choice = if claimed_weapon {
            RewardChoice::ClaimWeapon
        } else {
            let id = upgrade.unwrap_or_default();
            match UpgradeId::from_id(id) {
                Some(upgrade) => RewardChoice::Upgrade(upgrade),
                None => fault(Fault::UnknownUpgrade { id: id.to_string() }),
            }
        };
        self.choose(choice, scalar);
    }

    /// Apply a reward choice and start the modal fade.
    pub fn choose(&mut self, choice: RewardChoice, scalar: f64) {
        let RewardFlow::Choosing(offer) = &self.reward else {
            log::warn!("reward choice with no open offer ignored");
            return;
        };
        let minute = offer.minute;

        match choice {
            RewardChoice::ClaimWeapon => self.activate_weapon(minute, scalar),
            RewardChoice::Upgrade(upgrade) => self.apply_upgrade(upgrade, scalar),
        }

        self.events.push(GameEvent::HideUpgrade);
        self.reward = RewardFlow::Fading {
            minute,
            remaining: self.tuning.fade_ms,
        };
    }

    fn activate_weapon(&mut self, minute: u32, scalar: f64) {
        let Some(weapon) = self.arsenal.remove(&minute) else {
            fault(Fault::MissingArsenalWeapon { minute });
        };
        self.scalars.insert(minute, scalar);
        self.weapons.push(weapon);
        log::info!("weapon {} claimed at scalar {scalar:.2}", crate::roman(minute));

        match minute {
            5 => {
                self.felix.grant_max_hp(MINUTE_FIVE_HP);
                self.push_hp();
            }
            7 => self.pickup_range += MINUTE_SEVEN_RANGE,
            _ => {}
        }
    }

    fn revert_temp_effects(&mut self) {
        for effect in self.temp_effects.drain(..) {
            match effect {
                TempEffect::SlowerEnemies {
                    restore_speed_multiplier,
                } => self.enemy_speed_multiplier = restore_speed_multiplier,
            }
        }
    }

    fn apply_upgrade(&mut self, upgrade: UpgradeId, scalar: f64) {
        self.revert_temp_effects();
        let s = scalar as f32;

        match upgrade {
            UpgradeId::MoreSpeed => self.felix.speed *= 1.0 + SPEED_BONUS * s,
            UpgradeId::MoreWeaponDamage => self.damage_multiplier += DAMAGE_BONUS * scalar,
            UpgradeId::HealNow => {
                self.felix.heal(heal_amount(scalar));
                self.push_hp();
            }
            UpgradeId::SlowerEnemies => {
                self.temp_effects.push(TempEffect::SlowerEnemies {
                    restore_speed_multiplier: self.enemy_speed_multiplier,
                });
                self.enemy_speed_multiplier =
                    (self.enemy_speed_multiplier * (1.0 - SLOW_FACTOR * s)).max(MIN_ENEMY_SPEED);
            }
            UpgradeId::PickUpRange => self.pickup_range += RANGE_BONUS * s,
            UpgradeId::Lucky => self.rarity_boost += LUCK_BONUS * s,
            UpgradeId::Freeze => {
                let ms = self.tuning.freeze_ms * scalar;
                for enemy in &mut self.enemies {
                    enemy.add_stun(ms);
                }
            }
        }
        log::info!("upgrade {} applied at scalar {scalar:.2}", upgrade.as_str());
    }

    // === World clock ===

    fn run_world_tick(&mut self, dt: f64) {
        match self.phase {
            Phase::Normal => {
                if let Some(seconds) = self.clock.pace_timer(dt, &self.tuning) {
                    self.events.push(GameEvent::SetTime { seconds });
                }
                let actions = self.clock.advance(dt, &self.tuning, &mut self.rng);
                for action in actions {
                    self.apply_clock_action(action);
                }
            }
            Phase::Ending => self.run_countdown(dt),
            Phase::Victory | Phase::GameOver => {}
        }
    }

    fn apply_clock_action(&mut self, action: ClockAction) {
        match action {
            ClockAction::MinuteReached {
                minute,
                era_changed,
                era,
            } => self.minute_reached(minute, era_changed, era),
            ClockAction::EraBegan { previous, era } => {
                if let Some(track) = self.music {
                    self.events.push(GameEvent::Pause(track));
                }
                self.music = Some(era.music());
                self.events.push(GameEvent::Play(era.music()));
                self.events.push(GameEvent::EraAnnouncement(era.announcement()));
                log::info!("era {:?} -> {}", previous.map(|e| e.as_str()), era.as_str());
            }
            ClockAction::SpawnWave { era, count } => {
                for _ in 0..count {
                    let archetype = roster::random_from_era(era, &mut self.rng);
                    let pos = roster::spawn_point(&mut self.rng);
                    self.spawn_enemy(archetype, pos);
                }
                log::debug!("spawned {count} {} enemies", era.as_str());
            }
            ClockAction::SetPiece { era } => {
                let Some(piece) = roster::random_set_piece(era, &mut self.rng) else {
                    return;
                };
                let Some(archetype) = roster::archetype(piece.archetype) else {
                    return;
                };
                for pos in piece.positions(self.felix.pos, &mut self.rng) {
                    self.spawn_enemy(archetype, pos);
                }
                log::debug!("set piece: {}", piece.name);
            }
        }
    }

    fn minute_reached(&mut self, minute: u32, era_changed: bool, era: Era) {
        let id = self.next_entity_id();
        let boss = Enemy::clock_number(id, minute);
        let boss_pos = boss.pos;
        self.events.push(GameEvent::Attach {
            id,
            visual: Visual::Numeral {
                index: minute % 12,
            },
            at: boss_pos,
        });
        self.enemies.push(boss);

        self.events.push(GameEvent::LootBagging {
            count: self.xp.session_gems,
            to: boss_pos,
        });
        self.xp.session_gems = 0;

        let xp = std::mem::take(&mut self.xp.running);
        self.xp.by_minute.insert(minute, xp);
        self.events.push(GameEvent::ArchiveMinuteXp { minute, xp });
        self.events.push(GameEvent::SetXp(0));

        if era_changed {
            self.events.push(GameEvent::Play(era.spawn_stinger()));
        }
        log::info!("minute {minute} reached, {xp} xp bagged");

        if minute >= ENDING_MINUTE {
            self.phase = Phase::Ending;
            self.events.push(GameEvent::TimerUnknown);
            log::info!("ending sequence: defeat XII");
        }
    }

    fn start_countdown(&mut self) {
        self.music = Some(Cue::FinalLoop);
        self.events.push(GameEvent::Play(Cue::FinalLoop));
        self.countdown = Some(Countdown {
            started_at: self.last_dt,
            seconds_done: 0,
        });
        let seconds_left = (self.tuning.ending_countdown_ms / 1000.0).ceil() as u32;
        self.events.push(GameEvent::Countdown { seconds_left });
        log::info!("final countdown started");
    }

    fn run_countdown(&mut self, dt: f64) {
        let Some(mut countdown) = self.countdown else {
            return;
        };
        let since = (dt - countdown.started_at).max(0.0);
        if since >= self.tuning.ending_countdown_ms {
            self.victory();
            return;
        }

        let seconds = (since / 1000.0).floor() as u32;
        if seconds > countdown.seconds_done {
            countdown.seconds_done = seconds;
            for _ in 0..self.tuning.ending_spawns_per_second {
                let archetype = roster::random_any(&mut self.rng);
                let pos = roster::spawn_point(&mut self.rng);
                self.spawn_enemy(archetype, pos);
            }
            let left = ((self.tuning.ending_countdown_ms - since) / 1000.0).ceil() as u32;
            self.events.push(GameEvent::Countdown { seconds_left: left });
        }
        self.countdown = Some(countdown);
    }

    fn victory(&mut self) {
        self.phase = Phase::Victory;
        let score = self.xp.total as u64;
        log::info!("victory with {score} xp");

        self.events.push(GameEvent::PauseRendering);
        if let Some(track) = self.music.take() {
            self.events.push(GameEvent::Pause(track));
        }
        self.events.push(GameEvent::Play(Cue::VictoryMusic));
        self.events.push(GameEvent::Victory { score });
        self.events.push(GameEvent::SubmitScore {
            score,
            metadata: self.score_metadata(),
        });
    }

    /// Roman numerals of the claimed weapons, in minute order
    pub fn score_metadata(&self) -> String {
        self.scalars
            .keys()
            .map(|m| crate::roman(*m))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn push_hp(&mut self) {
        self.events.push(GameEvent::SetHp {
            hp: self.felix.hp,
            max: self.felix.max_hp,
        });
    }
}
