//! The save-data record — every number the game is.
//!
//! One owned record per save slot. Mutated only by the engine's public
//! operations; persisted verbatim by the snapshot codec. BTreeMaps keep
//! iteration and serialized text stable, which the determinism test and
//! snapshot round-trips rely on.

use crate::config::GameConfig;
use crate::types::{ItemId, Seconds, TimestampMs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnedLevel {
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuckyEventState {
    pub active: bool,
    /// Id of the active event definition, when one is running.
    pub id: Option<ItemId>,
    pub ends_at_ms: TimestampMs,
}

impl LuckyEventState {
    pub fn idle() -> Self {
        Self {
            active: false,
            id: None,
            ends_at_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRewardState {
    /// 0 = never claimed.
    pub last_claim_ms: TimestampMs,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Spendable balance. Never negative, capped at SAFE_VALUE_CAP.
    pub currency: f64,
    // Lifetime counters — monotone except across prestige/rebirth resets.
    pub total_earned: f64,
    pub click_earned: f64,
    pub generator_earned: f64,
    /// Fractional: the auto-clicker credits partial clicks.
    pub total_clicks: f64,
    /// Derived, floored; recomputed whenever a contributing upgrade,
    /// prestige point, or shop flag changes.
    pub click_power: f64,

    pub prestige_points: u64,
    pub prestige_count: u32,
    pub rebirth_points: u64,
    pub rebirth_count: u32,

    pub generators: BTreeMap<ItemId, OwnedLevel>,
    pub click_upgrades: BTreeMap<ItemId, OwnedLevel>,
    pub click_multipliers: BTreeMap<ItemId, OwnedLevel>,
    pub generator_multipliers: BTreeMap<ItemId, OwnedLevel>,
    pub auto_clicker_level: u32,

    // One-shot unlock flags. false→true only, except explicit resets.
    pub shop_purchases: BTreeMap<ItemId, bool>,
    pub milestones: BTreeMap<ItemId, bool>,
    pub achievements: BTreeMap<ItemId, bool>,

    pub daily_reward: DailyRewardState,
    pub lucky_event: LuckyEventState,

    pub play_time_secs: Seconds,
    pub last_save_ms: TimestampMs,
    pub started_at_ms: TimestampMs,
}

impl GameState {
    /// Zeroed state with every catalog id seeded to level 0 / locked.
    pub fn new(config: &GameConfig, now_ms: TimestampMs) -> Self {
        let mut state = Self {
            currency: 0.0,
            total_earned: 0.0,
            click_earned: 0.0,
            generator_earned: 0.0,
            total_clicks: 0.0,
            click_power: 0.0,
            prestige_points: 0,
            prestige_count: 0,
            rebirth_points: 0,
            rebirth_count: 0,
            generators: BTreeMap::new(),
            click_upgrades: BTreeMap::new(),
            click_multipliers: BTreeMap::new(),
            generator_multipliers: BTreeMap::new(),
            auto_clicker_level: 0,
            shop_purchases: BTreeMap::new(),
            milestones: BTreeMap::new(),
            achievements: BTreeMap::new(),
            daily_reward: DailyRewardState {
                last_claim_ms: 0,
                streak: 0,
            },
            lucky_event: LuckyEventState::idle(),
            play_time_secs: 0.0,
            last_save_ms: now_ms,
            started_at_ms: now_ms,
        };
        state.seed_missing(config);
        state
    }

    /// Insert a zero/locked entry for every catalog id not yet present.
    /// Called on creation, on resume, and after every reset so that
    /// catalog entries added by a config update still initialize.
    pub fn seed_missing(&mut self, config: &GameConfig) {
        for g in &config.generators {
            self.generators
                .entry(g.id.clone())
                .or_insert(OwnedLevel { level: 0 });
        }
        for u in &config.click_upgrades {
            self.click_upgrades
                .entry(u.id.clone())
                .or_insert(OwnedLevel { level: 0 });
        }
        for m in &config.click_multipliers {
            self.click_multipliers
                .entry(m.id.clone())
                .or_insert(OwnedLevel { level: 0 });
        }
        for m in &config.generator_multipliers {
            self.generator_multipliers
                .entry(m.id.clone())
                .or_insert(OwnedLevel { level: 0 });
        }
        for s in &config.shop {
            self.shop_purchases.entry(s.id.clone()).or_insert(false);
        }
        for m in &config.milestones {
            self.milestones.entry(m.id.clone()).or_insert(false);
        }
        for a in &config.achievements {
            self.achievements.entry(a.id.clone()).or_insert(false);
        }
    }

    pub fn generator_level(&self, id: &str) -> u32 {
        self.generators.get(id).map(|o| o.level).unwrap_or(0)
    }

    pub fn click_upgrade_level(&self, id: &str) -> u32 {
        self.click_upgrades.get(id).map(|o| o.level).unwrap_or(0)
    }

    pub fn click_multiplier_level(&self, id: &str) -> u32 {
        self.click_multipliers.get(id).map(|o| o.level).unwrap_or(0)
    }

    pub fn generator_multiplier_level(&self, id: &str) -> u32 {
        self.generator_multipliers
            .get(id)
            .map(|o| o.level)
            .unwrap_or(0)
    }

    pub fn owns_shop_item(&self, id: &str) -> bool {
        self.shop_purchases.get(id).copied().unwrap_or(false)
    }

    pub fn milestone_unlocked(&self, id: &str) -> bool {
        self.milestones.get(id).copied().unwrap_or(false)
    }

    pub fn achievement_unlocked(&self, id: &str) -> bool {
        self.achievements.get(id).copied().unwrap_or(false)
    }

    /// Prestige reset: full replacement with an explicit carry-over list.
    /// Carries prestige (+gain, +1 count), rebirth fields, shop
    /// purchases, milestones, achievements, daily reward, play time.
    /// Everything else — currency, earnings, clicks, item levels, the
    /// active lucky event — starts over.
    pub fn apply_prestige(&mut self, config: &GameConfig, gain: u64, now_ms: TimestampMs) {
        let mut next = GameState::new(config, now_ms);
        next.prestige_points = self.prestige_points + gain;
        next.prestige_count = self.prestige_count + 1;
        next.rebirth_points = self.rebirth_points;
        next.rebirth_count = self.rebirth_count;
        next.shop_purchases = std::mem::take(&mut self.shop_purchases);
        next.milestones = std::mem::take(&mut self.milestones);
        next.achievements = std::mem::take(&mut self.achievements);
        next.daily_reward = self.daily_reward.clone();
        next.play_time_secs = self.play_time_secs;
        next.seed_missing(config);
        *self = next;
    }

    /// Rebirth reset: everything prestige zeroes, plus prestige points
    /// and count themselves. Carries rebirth (+1 point, +1 count), shop
    /// purchases, milestones, achievements, daily reward. Play time
    /// starts over, unlike prestige.
    pub fn apply_rebirth(&mut self, config: &GameConfig, now_ms: TimestampMs) {
        let mut next = GameState::new(config, now_ms);
        next.rebirth_points = self.rebirth_points + 1;
        next.rebirth_count = self.rebirth_count + 1;
        next.shop_purchases = std::mem::take(&mut self.shop_purchases);
        next.milestones = std::mem::take(&mut self.milestones);
        next.achievements = std::mem::take(&mut self.achievements);
        next.daily_reward = self.daily_reward.clone();
        next.seed_missing(config);
        *self = next;
    }
}
