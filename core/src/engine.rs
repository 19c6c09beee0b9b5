//! The progression engine — one instance per save slot, no globals.
//!
//! TICK ORDER (fixed, documented, never reordered):
//!   1. Play-time accounting
//!   2. Generator production
//!   3. Auto-clicker
//!   4. Achievement / milestone unlock evaluation
//!   5. Lucky-event lifecycle
//!
//! RULES:
//!   - Later steps read values written by earlier steps in the same tick.
//!   - All randomness flows through the GameRng.
//!   - Every lifetime-counter mutation passes the overflow guard.
//!   - Purchases are outcomes, not errors. Only config load and
//!     persistence return Err.

use crate::{
    clock::GameClock,
    config::{GameConfig, LuckyEventKind},
    economy,
    error::GameResult,
    event::GameEvent,
    rng::GameRng,
    snapshot::SaveSnapshot,
    state::{DailyRewardState, GameState, LuckyEventState},
    types::{ItemId, Seconds, TimestampMs},
};
use serde::{Deserialize, Serialize};

/// Minimum gap since the last claim before the daily reward re-arms.
const DAILY_CLAIM_GAP_MS: TimestampMs = 20 * 3_600_000;
/// Claiming within this window of the previous claim continues the
/// streak; past it the streak restarts at 1.
const DAILY_STREAK_WINDOW_MS: TimestampMs = 48 * 3_600_000;

/// The purchasable catalogs reachable through [`GameEngine::purchase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    Generators,
    ClickUpgrades,
    ClickMultipliers,
    GeneratorMultipliers,
    AutoClicker,
    Shop,
}

/// Why a purchase did or did not happen. Rejections are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Purchased,
    InsufficientFunds,
    MaxLevel,
    AlreadyOwned,
    UnknownItem,
}

impl PurchaseOutcome {
    pub fn purchased(self) -> bool {
        self == PurchaseOutcome::Purchased
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrestigeOutcome {
    pub gain: u64,
    pub total_points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebirthOutcome {
    pub total_points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRewardOutcome {
    pub reward: f64,
    pub streak: u32,
}

struct CostCurve {
    base_cost: f64,
    cost_multiplier: f64,
    max_level: Option<u32>,
}

pub struct GameEngine {
    pub config: GameConfig,
    pub state: GameState,
    pub clock: GameClock,
    rng: GameRng,
}

impl GameEngine {
    /// Fresh engine with zeroed state. Fails on an invalid config —
    /// formula code relies on the validated invariants.
    pub fn new(config: GameConfig, seed: u64, now_ms: TimestampMs) -> GameResult<Self> {
        config.validate()?;
        let state = GameState::new(&config, now_ms);
        let mut engine = Self {
            clock: GameClock::new(now_ms),
            rng: GameRng::new(seed),
            config,
            state,
        };
        engine.recompute_click_power();
        Ok(engine)
    }

    /// Resume from a decoded snapshot: seed any catalog ids added since
    /// the save, recompute derived stats, then run offline catch-up.
    /// Returns the events the catch-up produced.
    pub fn resume(
        config: GameConfig,
        seed: u64,
        snapshot: SaveSnapshot,
        now_ms: TimestampMs,
    ) -> GameResult<(Self, Vec<GameEvent>)> {
        config.validate()?;
        let mut state = snapshot.state;
        state.seed_missing(&config);
        let mut engine = Self {
            clock: GameClock::new(now_ms),
            rng: GameRng::new(seed),
            config,
            state,
        };
        engine.recompute_click_power();
        let events = engine.apply_offline_progress(now_ms);
        Ok((engine, events))
    }

    // ── Derived getters ────────────────────────────────────────

    pub fn click_power(&self) -> f64 {
        self.state.click_power
    }

    pub fn production_per_second(&self) -> f64 {
        economy::production_per_second(&self.state, &self.config)
    }

    pub fn pending_prestige_gain(&self) -> u64 {
        economy::prestige_gain(&self.state, &self.config)
    }

    pub fn rebirth_ready(&self) -> bool {
        economy::rebirth_available(&self.state, &self.config)
    }

    /// Cost of the next level (or the flat price for shop items).
    /// None for unknown ids.
    pub fn price_of(&self, catalog: Catalog, id: &str) -> Option<f64> {
        if catalog == Catalog::Shop {
            return self.config.shop.iter().find(|s| s.id == id).map(|s| s.cost);
        }
        let curve = self.curve_for(catalog, id)?;
        let level = self.level_of(catalog, id);
        let discount = economy::cost_discount_factor(&self.state, &self.config);
        Some(economy::purchase_cost(
            curve.base_cost,
            curve.cost_multiplier,
            level,
            discount,
        ))
    }

    // ── Player operations ──────────────────────────────────────

    /// One manual click. Returns the amount credited.
    pub fn register_click(&mut self) -> f64 {
        let amount = economy::guard(
            self.state.click_power * economy::click_event_factor(&self.state, &self.config),
        );
        let s = &mut self.state;
        s.currency = economy::guard(s.currency + amount);
        s.total_earned = economy::guard(s.total_earned + amount);
        s.click_earned = economy::guard(s.click_earned + amount);
        s.total_clicks = economy::guard(s.total_clicks + 1.0);
        amount
    }

    /// Attempt a purchase. Rejections leave state untouched.
    pub fn purchase(&mut self, catalog: Catalog, id: &str) -> PurchaseOutcome {
        if catalog == Catalog::Shop {
            return self.purchase_shop_item(id);
        }

        let Some(curve) = self.curve_for(catalog, id) else {
            return PurchaseOutcome::UnknownItem;
        };
        let level = self.level_of(catalog, id);
        if let Some(max) = curve.max_level {
            if level >= max {
                return PurchaseOutcome::MaxLevel;
            }
        }
        let discount = economy::cost_discount_factor(&self.state, &self.config);
        let cost = economy::purchase_cost(curve.base_cost, curve.cost_multiplier, level, discount);
        if self.state.currency < cost {
            return PurchaseOutcome::InsufficientFunds;
        }

        self.state.currency = (self.state.currency - cost).max(0.0);
        self.bump_level(catalog, id);
        if matches!(catalog, Catalog::ClickUpgrades | Catalog::ClickMultipliers) {
            self.recompute_click_power();
        }
        log::debug!("bought {catalog:?}/{id} (level {} -> {})", level, level + 1);
        PurchaseOutcome::Purchased
    }

    fn purchase_shop_item(&mut self, id: &str) -> PurchaseOutcome {
        let Some(item) = self.config.shop.iter().find(|s| s.id == id) else {
            return PurchaseOutcome::UnknownItem;
        };
        if self.state.owns_shop_item(id) {
            return PurchaseOutcome::AlreadyOwned;
        }
        let cost = item.cost;
        if self.state.currency < cost {
            return PurchaseOutcome::InsufficientFunds;
        }
        self.state.currency = (self.state.currency - cost).max(0.0);
        self.state.shop_purchases.insert(id.to_string(), true);
        // A ClickMultiplier flag changes the derived stat; recomputing
        // unconditionally is harmless for the rest.
        self.recompute_click_power();
        log::info!("shop item purchased: {id}");
        PurchaseOutcome::Purchased
    }

    /// Advance the game by an elapsed delta. This is the core step, used
    /// by the live loop. A paused engine and tick(0) are strict no-ops.
    pub fn tick(&mut self, delta: Seconds) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.clock.paused || delta <= 0.0 || !delta.is_finite() {
            return events;
        }
        self.clock.advance(delta);

        // 1. Play time.
        self.state.play_time_secs += delta;

        // 2. Generator production.
        let pps = economy::production_per_second(&self.state, &self.config);
        self.credit_production(pps * delta);

        // 3. Auto-clicker.
        if self.config.auto_clicker.enabled && self.state.auto_clicker_level > 0 {
            let clicks =
                economy::auto_clicker_rate(self.state.auto_clicker_level, &self.config) * delta;
            let earned = clicks
                * self.state.click_power
                * economy::click_event_factor(&self.state, &self.config);
            self.credit_auto_clicks(earned, clicks);
        }

        // 4. Unlocks.
        self.evaluate_unlocks(&mut events);

        // 5. Lucky-event lifecycle.
        self.advance_lucky_events(delta, &mut events);

        events
    }

    /// Drive the engine for `secs` in live-loop-sized steps. Test and
    /// tooling convenience.
    pub fn run_secs(&mut self, secs: Seconds) -> Vec<GameEvent> {
        let step = self.config.game.tick_interval_ms as f64 / 1000.0;
        let mut events = Vec::new();
        let mut remaining = secs;
        while remaining > 1e-9 {
            let slice = remaining.min(step);
            events.extend(self.tick(slice));
            remaining -= slice;
        }
        events
    }

    /// Voluntary reset for permanent points. None when the gain would be
    /// zero — the whole operation is a no-op then.
    pub fn prestige(&mut self) -> Option<PrestigeOutcome> {
        let gain = economy::prestige_gain(&self.state, &self.config);
        if gain == 0 {
            return None;
        }
        self.state
            .apply_prestige(&self.config, gain, self.clock.now_ms);
        self.recompute_click_power();
        log::info!(
            "prestige: +{gain} points ({} total, count {})",
            self.state.prestige_points,
            self.state.prestige_count
        );
        Some(PrestigeOutcome {
            gain,
            total_points: self.state.prestige_points,
        })
    }

    /// The deeper reset, gated on accumulated prestiges.
    pub fn rebirth(&mut self) -> Option<RebirthOutcome> {
        if !economy::rebirth_available(&self.state, &self.config) {
            return None;
        }
        self.state.apply_rebirth(&self.config, self.clock.now_ms);
        self.recompute_click_power();
        log::info!(
            "rebirth: {} points, count {}",
            self.state.rebirth_points,
            self.state.rebirth_count
        );
        Some(RebirthOutcome {
            total_points: self.state.rebirth_points,
        })
    }

    /// Claim the daily reward if the window allows it.
    pub fn claim_daily_reward(&mut self) -> Option<DailyRewardOutcome> {
        let cfg = &self.config.daily_reward;
        if !cfg.enabled {
            return None;
        }
        let now = self.clock.now_ms;
        let last = self.state.daily_reward.last_claim_ms;
        if last != 0 && now - last < DAILY_CLAIM_GAP_MS {
            return None;
        }
        let streak = if last != 0 && now - last < DAILY_STREAK_WINDOW_MS {
            (self.state.daily_reward.streak + 1).min(cfg.max_streak)
        } else {
            1
        };
        let base = (economy::production_per_second(&self.state, &self.config)
            * cfg.base_production_secs)
            .max(cfg.min_reward);
        let reward = economy::guard(base * (1.0 + cfg.streak_bonus * (streak - 1) as f64));

        self.state.currency = economy::guard(self.state.currency + reward);
        self.state.total_earned = economy::guard(self.state.total_earned + reward);
        self.state.daily_reward = DailyRewardState {
            last_claim_ms: now,
            streak,
        };
        log::info!("daily reward claimed: +{reward:.0} (streak {streak})");
        Some(DailyRewardOutcome { reward, streak })
    }

    /// One synthetic production tick covering the time the app was
    /// closed. Production and auto-clicker only — no unlock or event
    /// evaluation. Gaps below the minimum are ignored; time past the
    /// (extendable) cap is discarded, not credited.
    pub fn apply_offline_progress(&mut self, now_ms: TimestampMs) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.clock.synchronize(now_ms);

        // A buff that ran out mid-gap must not stretch across the whole
        // gap.
        if self.state.lucky_event.active && now_ms >= self.state.lucky_event.ends_at_ms {
            if let Some(id) = self.state.lucky_event.id.take() {
                events.push(GameEvent::LuckyEventExpired { id });
            }
            self.state.lucky_event = LuckyEventState::idle();
        }

        if !self.config.offline.enabled {
            return events;
        }
        let gap_secs = (now_ms - self.state.last_save_ms) as f64 / 1000.0;
        if gap_secs < self.config.offline.min_secs {
            return events;
        }
        let credited = gap_secs.min(economy::offline_cap_secs(&self.state, &self.config));

        let pps = economy::production_per_second(&self.state, &self.config);
        let mut earned = economy::guard(pps * credited);
        self.credit_production(earned);

        if self.config.auto_clicker.enabled && self.state.auto_clicker_level > 0 {
            let clicks =
                economy::auto_clicker_rate(self.state.auto_clicker_level, &self.config) * credited;
            let auto_earned = clicks
                * self.state.click_power
                * economy::click_event_factor(&self.state, &self.config);
            self.credit_auto_clicks(auto_earned, clicks);
            earned = economy::guard(earned + auto_earned);
        }

        log::info!("offline catch-up: {credited:.0}s credited, +{earned:.0}");
        events.push(GameEvent::OfflineProgressApplied {
            seconds: credited,
            earned,
        });
        events
    }

    /// Wipe everything. Idempotent; the host also wipes the persisted
    /// snapshot through the store.
    pub fn full_reset(&mut self) {
        self.state = GameState::new(&self.config, self.clock.now_ms);
        self.recompute_click_power();
        log::info!("full reset");
    }

    /// Capture a snapshot for persistence, stamping the save time.
    pub fn snapshot(&mut self) -> SaveSnapshot {
        self.state.last_save_ms = self.clock.now_ms;
        SaveSnapshot::capture(&self.state, self.clock.now_ms)
    }

    // ── Internals ──────────────────────────────────────────────

    fn recompute_click_power(&mut self) {
        self.state.click_power = economy::click_power(&self.state, &self.config);
    }

    fn credit_production(&mut self, amount: f64) {
        let s = &mut self.state;
        s.currency = economy::guard(s.currency + amount);
        s.total_earned = economy::guard(s.total_earned + amount);
        s.generator_earned = economy::guard(s.generator_earned + amount);
    }

    fn credit_auto_clicks(&mut self, amount: f64, clicks: f64) {
        let s = &mut self.state;
        s.currency = economy::guard(s.currency + amount);
        s.total_earned = economy::guard(s.total_earned + amount);
        s.click_earned = economy::guard(s.click_earned + amount);
        s.total_clicks = economy::guard(s.total_clicks + clicks);
    }

    /// Unlock checks are monotone and idempotent: already-unlocked ids
    /// are skipped, flags only go false→true.
    fn evaluate_unlocks(&mut self, events: &mut Vec<GameEvent>) {
        let newly_unlocked: Vec<ItemId> = self
            .config
            .achievements
            .iter()
            .filter(|a| !self.state.achievement_unlocked(&a.id) && a.requirement.is_met(&self.state))
            .map(|a| a.id.clone())
            .collect();
        for id in newly_unlocked {
            self.state.achievements.insert(id.clone(), true);
            log::info!("achievement unlocked: {id}");
            events.push(GameEvent::AchievementUnlocked { id });
        }

        let newly_reached: Vec<ItemId> = self
            .config
            .milestones
            .iter()
            .filter(|m| !self.state.milestone_unlocked(&m.id) && m.requirement.is_met(&self.state))
            .map(|m| m.id.clone())
            .collect();
        for id in newly_reached {
            self.state.milestones.insert(id.clone(), true);
            log::info!("milestone reached: {id}");
            events.push(GameEvent::MilestoneUnlocked { id });
        }
    }

    /// Expire the active event when its end time passes; otherwise
    /// sample a start. At most one event is ever active.
    fn advance_lucky_events(&mut self, delta: Seconds, events: &mut Vec<GameEvent>) {
        let cfg = &self.config.lucky_events;
        if !cfg.enabled || cfg.events.is_empty() {
            return;
        }
        let now = self.clock.now_ms;

        if self.state.lucky_event.active {
            if now >= self.state.lucky_event.ends_at_ms {
                if let Some(id) = self.state.lucky_event.id.take() {
                    log::debug!("lucky event expired: {id}");
                    events.push(GameEvent::LuckyEventExpired { id });
                }
                self.state.lucky_event = LuckyEventState::idle();
            }
            return;
        }

        let p = (cfg.chance_per_second * delta).min(1.0);
        if !self.rng.chance(p) {
            return;
        }
        let weights: Vec<f64> = cfg.events.iter().map(|e| e.weight).collect();
        let Some(idx) = self.rng.weighted_pick(&weights) else {
            return;
        };
        let id = cfg.events[idx].id.clone();
        let kind = cfg.events[idx].kind.clone();

        match kind {
            LuckyEventKind::Timed { duration_secs, .. } => {
                let ends_at_ms = now + (duration_secs * 1000.0) as TimestampMs;
                self.state.lucky_event = LuckyEventState {
                    active: true,
                    id: Some(id.clone()),
                    ends_at_ms,
                };
                log::info!("lucky event started: {id}");
                events.push(GameEvent::LuckyEventStarted { id, ends_at_ms });
            }
            LuckyEventKind::Instant { production_secs } => {
                let reward = economy::guard(
                    economy::production_per_second(&self.state, &self.config) * production_secs,
                );
                self.credit_production(reward);
                log::info!("instant event {id}: +{reward:.0}");
                events.push(GameEvent::InstantEventTriggered { id, reward });
            }
        }
    }

    fn curve_for(&self, catalog: Catalog, id: &str) -> Option<CostCurve> {
        match catalog {
            Catalog::Generators => self.config.generators.iter().find(|g| g.id == id).map(|g| {
                CostCurve {
                    base_cost: g.base_cost,
                    cost_multiplier: g.cost_multiplier,
                    max_level: g.max_level,
                }
            }),
            Catalog::ClickUpgrades => self
                .config
                .click_upgrades
                .iter()
                .find(|u| u.id == id)
                .map(|u| CostCurve {
                    base_cost: u.base_cost,
                    cost_multiplier: u.cost_multiplier,
                    max_level: u.max_level,
                }),
            Catalog::ClickMultipliers => self
                .config
                .click_multipliers
                .iter()
                .find(|m| m.id == id)
                .map(|m| CostCurve {
                    base_cost: m.base_cost,
                    cost_multiplier: m.cost_multiplier,
                    max_level: m.max_level,
                }),
            Catalog::GeneratorMultipliers => self
                .config
                .generator_multipliers
                .iter()
                .find(|m| m.id == id)
                .map(|m| CostCurve {
                    base_cost: m.base_cost,
                    cost_multiplier: m.cost_multiplier,
                    max_level: m.max_level,
                }),
            Catalog::AutoClicker => {
                if !self.config.auto_clicker.enabled {
                    return None;
                }
                Some(CostCurve {
                    base_cost: self.config.auto_clicker.base_cost,
                    cost_multiplier: self.config.auto_clicker.cost_multiplier,
                    max_level: self.config.auto_clicker.max_level,
                })
            }
            Catalog::Shop => None,
        }
    }

    fn level_of(&self, catalog: Catalog, id: &str) -> u32 {
        match catalog {
            Catalog::Generators => self.state.generator_level(id),
            Catalog::ClickUpgrades => self.state.click_upgrade_level(id),
            Catalog::ClickMultipliers => self.state.click_multiplier_level(id),
            Catalog::GeneratorMultipliers => self.state.generator_multiplier_level(id),
            Catalog::AutoClicker => self.state.auto_clicker_level,
            Catalog::Shop => 0,
        }
    }

    fn bump_level(&mut self, catalog: Catalog, id: &str) {
        use crate::state::OwnedLevel;
        let map = match catalog {
            Catalog::Generators => &mut self.state.generators,
            Catalog::ClickUpgrades => &mut self.state.click_upgrades,
            Catalog::ClickMultipliers => &mut self.state.click_multipliers,
            Catalog::GeneratorMultipliers => &mut self.state.generator_multipliers,
            Catalog::AutoClicker => {
                self.state.auto_clicker_level += 1;
                return;
            }
            Catalog::Shop => return,
        };
        map.entry(id.to_string())
            .or_insert(OwnedLevel { level: 0 })
            .level += 1;
    }
}
