//! Static configuration — the read-only catalogs the engine consumes.
//!
//! Loaded once from a single JSON document, validated fatally
//! (a malformed catalog is a [`GameError::Config`], never a silent
//! default), and treated as immutable for the lifetime of the engine.
//! In tests, use `GameConfig::default_test()`.

use crate::error::{GameError, GameResult};
use crate::state::GameState;
use crate::types::{ItemId, Seconds};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRules {
    /// Click power before any upgrade is owned.
    pub base_click_power: f64,
    pub save_interval_secs: Seconds,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    /// Currency per second per level.
    pub base_production: f64,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    /// None = unbounded.
    pub max_level: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickUpgradeConfig {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    /// Flat click power added per level.
    pub power_increase: f64,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub max_level: Option<u32>,
}

/// Shared shape of the two multiplier catalogs. Each level multiplies
/// the relevant figure by `multiplier` once more (`multiplier^level`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplierUpgradeConfig {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub multiplier: f64,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub max_level: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoClickerConfig {
    pub enabled: bool,
    pub clicks_per_second_per_level: f64,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    pub max_level: Option<u32>,
}

/// One-shot shop purchases. The effect enum replaces the original's
/// string-keyed flags so a new effect cannot be silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopItemConfig {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub cost: f64,
    pub effect: ShopEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShopEffect {
    ClickMultiplier { factor: f64 },
    ProductionMultiplier { factor: f64 },
    /// Flat fraction off every leveled purchase, applied after the
    /// cost-curve exponentiation.
    CostDiscount { fraction: f64 },
    DoublePrestige,
    OfflineCapExtension { extra_secs: Seconds },
}

/// Unlock predicates for achievements and milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    TotalClicks { value: f64 },
    TotalEarned { value: f64 },
    Currency { value: f64 },
    GeneratorLevel { id: ItemId, level: u32 },
    PrestigeCount { value: u32 },
}

impl Requirement {
    /// Monotone threshold check against the cumulative counters.
    pub fn is_met(&self, state: &GameState) -> bool {
        match self {
            Requirement::TotalClicks { value } => state.total_clicks >= *value,
            Requirement::TotalEarned { value } => state.total_earned >= *value,
            Requirement::Currency { value } => state.currency >= *value,
            Requirement::GeneratorLevel { id, level } => state.generator_level(id) >= *level,
            Requirement::PrestigeCount { value } => state.prestige_count >= *value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneConfig {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub requirement: Requirement,
    /// Joins the generator multiplier as (1 + bonus) once unlocked.
    pub production_bonus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementConfig {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    Production,
    Click,
    Both,
}

impl EventScope {
    pub fn affects_production(self) -> bool {
        matches!(self, EventScope::Production | EventScope::Both)
    }

    pub fn affects_click(self) -> bool {
        matches!(self, EventScope::Click | EventScope::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LuckyEventKind {
    /// A buff that lasts `duration_secs` and multiplies the scoped yield.
    Timed {
        scope: EventScope,
        multiplier: f64,
        duration_secs: Seconds,
    },
    /// A one-shot payout worth that many seconds of current production.
    /// Retains no active state.
    Instant { production_secs: Seconds },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuckyEventConfig {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub weight: f64,
    #[serde(flatten)]
    pub kind: LuckyEventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuckyEventsConfig {
    pub enabled: bool,
    /// Start probability, expressed per second so the 100 ms live loop
    /// and larger synthetic ticks sample consistently.
    pub chance_per_second: f64,
    pub events: Vec<LuckyEventConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrestigeFormula {
    Sqrt,
    Log10,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestigeConfig {
    pub enabled: bool,
    /// Lifetime earnings needed for the first prestige; each completed
    /// prestige multiplies the requirement by `requirement_growth`.
    pub requirement: f64,
    pub requirement_growth: f64,
    pub divisor: f64,
    pub formula: PrestigeFormula,
    /// Production and click power scale by (1 + points × bonus_per_point).
    pub bonus_per_point: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebirthConfig {
    pub enabled: bool,
    /// Prestige count gate.
    pub requirement: u32,
    /// Applied as bonus_per_point ^ rebirth_points.
    pub bonus_per_point: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRewardConfig {
    pub enabled: bool,
    /// Reward worth this many seconds of production...
    pub base_production_secs: Seconds,
    /// ...but never less than this flat amount.
    pub min_reward: f64,
    /// Each streak day past the first adds this fraction.
    pub streak_bonus: f64,
    pub max_streak: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineConfig {
    pub enabled: bool,
    /// Gaps below this are ignored entirely.
    pub min_secs: Seconds,
    /// Time past this cap is discarded, not credited. A shop
    /// OfflineCapExtension raises the effective cap.
    pub max_secs: Seconds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub game: GameRules,
    pub generators: Vec<GeneratorConfig>,
    pub click_upgrades: Vec<ClickUpgradeConfig>,
    pub click_multipliers: Vec<MultiplierUpgradeConfig>,
    pub generator_multipliers: Vec<MultiplierUpgradeConfig>,
    pub auto_clicker: AutoClickerConfig,
    pub shop: Vec<ShopItemConfig>,
    pub milestones: Vec<MilestoneConfig>,
    pub achievements: Vec<AchievementConfig>,
    pub lucky_events: LuckyEventsConfig,
    pub prestige: PrestigeConfig,
    pub rebirth: RebirthConfig,
    pub daily_reward: DailyRewardConfig,
    pub offline: OfflineConfig,
}

impl GameConfig {
    /// Load and validate a config document.
    pub fn load(path: &str) -> GameResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every catalog. Called at load — formula code may assume
    /// these invariants and never re-checks them per tick.
    pub fn validate(&self) -> GameResult<()> {
        if self.game.base_click_power < 0.0 {
            return Err(config_err("game.base_click_power must be >= 0"));
        }
        if self.game.tick_interval_ms == 0 {
            return Err(config_err("game.tick_interval_ms must be > 0"));
        }
        if self.game.save_interval_secs <= 0.0 {
            return Err(config_err("game.save_interval_secs must be > 0"));
        }

        let mut ids = HashSet::new();
        for g in &self.generators {
            check_id(&mut ids, "generator", &g.id)?;
            check_curve("generator", &g.id, g.base_cost, g.cost_multiplier)?;
            if g.base_production < 0.0 {
                return Err(config_err(format!(
                    "generator '{}': base_production must be >= 0",
                    g.id
                )));
            }
        }
        for u in &self.click_upgrades {
            check_id(&mut ids, "click upgrade", &u.id)?;
            check_curve("click upgrade", &u.id, u.base_cost, u.cost_multiplier)?;
        }
        for m in self
            .click_multipliers
            .iter()
            .chain(&self.generator_multipliers)
        {
            check_id(&mut ids, "multiplier upgrade", &m.id)?;
            check_curve("multiplier upgrade", &m.id, m.base_cost, m.cost_multiplier)?;
            if m.multiplier <= 0.0 {
                return Err(config_err(format!(
                    "multiplier upgrade '{}': multiplier must be > 0",
                    m.id
                )));
            }
        }
        if self.auto_clicker.enabled {
            check_curve(
                "auto clicker",
                "auto_clicker",
                self.auto_clicker.base_cost,
                self.auto_clicker.cost_multiplier,
            )?;
            if self.auto_clicker.clicks_per_second_per_level <= 0.0 {
                return Err(config_err(
                    "auto_clicker.clicks_per_second_per_level must be > 0",
                ));
            }
        }
        for s in &self.shop {
            check_id(&mut ids, "shop item", &s.id)?;
            if s.cost <= 0.0 {
                return Err(config_err(format!("shop item '{}': cost must be > 0", s.id)));
            }
            if let ShopEffect::CostDiscount { fraction } = s.effect {
                if !(0.0..1.0).contains(&fraction) {
                    return Err(config_err(format!(
                        "shop item '{}': discount fraction must be in [0, 1)",
                        s.id
                    )));
                }
            }
        }
        for m in &self.milestones {
            check_id(&mut ids, "milestone", &m.id)?;
            if m.production_bonus < 0.0 {
                return Err(config_err(format!(
                    "milestone '{}': production_bonus must be >= 0",
                    m.id
                )));
            }
        }
        for a in &self.achievements {
            check_id(&mut ids, "achievement", &a.id)?;
        }

        if self.lucky_events.enabled {
            if !(0.0..=1.0).contains(&self.lucky_events.chance_per_second) {
                return Err(config_err("lucky_events.chance_per_second must be in [0, 1]"));
            }
            for e in &self.lucky_events.events {
                check_id(&mut ids, "lucky event", &e.id)?;
                if e.weight < 0.0 {
                    return Err(config_err(format!(
                        "lucky event '{}': weight must be >= 0",
                        e.id
                    )));
                }
                match &e.kind {
                    LuckyEventKind::Timed {
                        multiplier,
                        duration_secs,
                        ..
                    } => {
                        if *multiplier <= 0.0 || *duration_secs <= 0.0 {
                            return Err(config_err(format!(
                                "lucky event '{}': multiplier and duration must be > 0",
                                e.id
                            )));
                        }
                    }
                    LuckyEventKind::Instant { production_secs } => {
                        if *production_secs <= 0.0 {
                            return Err(config_err(format!(
                                "lucky event '{}': production_secs must be > 0",
                                e.id
                            )));
                        }
                    }
                }
            }
        }

        if self.prestige.enabled {
            if self.prestige.divisor <= 0.0 {
                return Err(config_err("prestige.divisor must be > 0"));
            }
            if self.prestige.requirement <= 0.0 {
                return Err(config_err("prestige.requirement must be > 0"));
            }
            if self.prestige.requirement_growth < 1.0 {
                return Err(config_err("prestige.requirement_growth must be >= 1"));
            }
            if self.prestige.bonus_per_point < 0.0 {
                return Err(config_err("prestige.bonus_per_point must be >= 0"));
            }
        }
        if self.rebirth.enabled {
            if self.rebirth.requirement == 0 {
                return Err(config_err("rebirth.requirement must be >= 1"));
            }
            if self.rebirth.bonus_per_point <= 0.0 {
                return Err(config_err("rebirth.bonus_per_point must be > 0"));
            }
        }
        if self.daily_reward.enabled && self.daily_reward.max_streak == 0 {
            return Err(config_err("daily_reward.max_streak must be >= 1"));
        }
        if self.offline.enabled {
            if self.offline.min_secs < 0.0 || self.offline.max_secs <= 0.0 {
                return Err(config_err("offline window bounds must be positive"));
            }
            if self.offline.min_secs > self.offline.max_secs {
                return Err(config_err("offline.min_secs must not exceed offline.max_secs"));
            }
        }

        Ok(())
    }

    /// Config with hardcoded defaults for use in tests and the runner's
    /// no-config mode.
    pub fn default_test() -> Self {
        Self {
            game: GameRules {
                base_click_power: 1.0,
                save_interval_secs: 30.0,
                tick_interval_ms: 100,
            },
            generators: vec![
                GeneratorConfig {
                    id: "cursor".into(),
                    name: "Cursor".into(),
                    base_production: 1.0,
                    base_cost: 10.0,
                    cost_multiplier: 1.15,
                    max_level: None,
                },
                GeneratorConfig {
                    id: "factory".into(),
                    name: "Factory".into(),
                    base_production: 8.0,
                    base_cost: 120.0,
                    cost_multiplier: 1.18,
                    max_level: Some(200),
                },
            ],
            click_upgrades: vec![ClickUpgradeConfig {
                id: "sturdy_finger".into(),
                name: "Sturdy Finger".into(),
                power_increase: 1.0,
                base_cost: 25.0,
                cost_multiplier: 1.3,
                max_level: None,
            }],
            click_multipliers: vec![MultiplierUpgradeConfig {
                id: "golden_glove".into(),
                name: "Golden Glove".into(),
                multiplier: 2.0,
                base_cost: 500.0,
                cost_multiplier: 4.0,
                max_level: Some(5),
            }],
            generator_multipliers: vec![MultiplierUpgradeConfig {
                id: "overclock".into(),
                name: "Overclock".into(),
                multiplier: 2.0,
                base_cost: 1_000.0,
                cost_multiplier: 5.0,
                max_level: Some(5),
            }],
            auto_clicker: AutoClickerConfig {
                enabled: true,
                clicks_per_second_per_level: 1.0,
                base_cost: 200.0,
                cost_multiplier: 1.5,
                max_level: Some(50),
            },
            shop: vec![
                ShopItemConfig {
                    id: "click_doubler".into(),
                    name: "Click Doubler".into(),
                    cost: 5_000.0,
                    effect: ShopEffect::ClickMultiplier { factor: 2.0 },
                },
                ShopItemConfig {
                    id: "tuning_kit".into(),
                    name: "Tuning Kit".into(),
                    cost: 3_000.0,
                    effect: ShopEffect::ProductionMultiplier { factor: 1.2 },
                },
                ShopItemConfig {
                    id: "production_boost".into(),
                    name: "Production Boost".into(),
                    cost: 8_000.0,
                    effect: ShopEffect::ProductionMultiplier { factor: 1.5 },
                },
                ShopItemConfig {
                    id: "haggler".into(),
                    name: "Haggler".into(),
                    cost: 10_000.0,
                    effect: ShopEffect::CostDiscount { fraction: 0.10 },
                },
                ShopItemConfig {
                    id: "prestige_doubler".into(),
                    name: "Prestige Doubler".into(),
                    cost: 50_000.0,
                    effect: ShopEffect::DoublePrestige,
                },
                ShopItemConfig {
                    id: "travel_charger".into(),
                    name: "Travel Charger".into(),
                    cost: 20_000.0,
                    effect: ShopEffect::OfflineCapExtension {
                        extra_secs: 86_400.0,
                    },
                },
            ],
            milestones: vec![
                MilestoneConfig {
                    id: "first_hundred".into(),
                    name: "First Hundred".into(),
                    requirement: Requirement::TotalEarned { value: 100.0 },
                    production_bonus: 0.05,
                },
                MilestoneConfig {
                    id: "clicker_novice".into(),
                    name: "Clicker Novice".into(),
                    requirement: Requirement::TotalClicks { value: 100.0 },
                    production_bonus: 0.05,
                },
                MilestoneConfig {
                    id: "cursor_army".into(),
                    name: "Cursor Army".into(),
                    requirement: Requirement::GeneratorLevel {
                        id: "cursor".into(),
                        level: 10,
                    },
                    production_bonus: 0.10,
                },
            ],
            achievements: vec![
                AchievementConfig {
                    id: "first_click".into(),
                    name: "First Click".into(),
                    requirement: Requirement::TotalClicks { value: 1.0 },
                },
                AchievementConfig {
                    id: "hoarder".into(),
                    name: "Hoarder".into(),
                    requirement: Requirement::Currency { value: 1_000.0 },
                },
                AchievementConfig {
                    id: "reborn".into(),
                    name: "Reborn".into(),
                    requirement: Requirement::PrestigeCount { value: 1 },
                },
            ],
            lucky_events: LuckyEventsConfig {
                enabled: true,
                chance_per_second: 0.02,
                events: vec![
                    LuckyEventConfig {
                        id: "golden_surge".into(),
                        name: "Golden Surge".into(),
                        weight: 5.0,
                        kind: LuckyEventKind::Timed {
                            scope: EventScope::Production,
                            multiplier: 7.0,
                            duration_secs: 30.0,
                        },
                    },
                    LuckyEventConfig {
                        id: "click_frenzy".into(),
                        name: "Click Frenzy".into(),
                        weight: 3.0,
                        kind: LuckyEventKind::Timed {
                            scope: EventScope::Click,
                            multiplier: 10.0,
                            duration_secs: 15.0,
                        },
                    },
                    LuckyEventConfig {
                        id: "lucky_drop".into(),
                        name: "Lucky Drop".into(),
                        weight: 2.0,
                        kind: LuckyEventKind::Instant {
                            production_secs: 60.0,
                        },
                    },
                ],
            },
            prestige: PrestigeConfig {
                enabled: true,
                requirement: 1_000_000.0,
                requirement_growth: 1.5,
                divisor: 10_000.0,
                formula: PrestigeFormula::Sqrt,
                bonus_per_point: 0.02,
            },
            rebirth: RebirthConfig {
                enabled: true,
                requirement: 3,
                bonus_per_point: 2.0,
            },
            daily_reward: DailyRewardConfig {
                enabled: true,
                base_production_secs: 600.0,
                min_reward: 50.0,
                streak_bonus: 0.25,
                max_streak: 7,
            },
            offline: OfflineConfig {
                enabled: true,
                min_secs: 60.0,
                max_secs: 86_400.0,
            },
        }
    }
}

fn config_err(message: impl Into<String>) -> GameError {
    GameError::Config {
        message: message.into(),
    }
}

fn check_id(seen: &mut HashSet<ItemId>, kind: &str, id: &ItemId) -> GameResult<()> {
    if id.is_empty() {
        return Err(config_err(format!("{kind}: empty id")));
    }
    if !seen.insert(id.clone()) {
        return Err(config_err(format!("{kind} '{id}': duplicate id")));
    }
    Ok(())
}

fn check_curve(kind: &str, id: &str, base_cost: f64, cost_multiplier: f64) -> GameResult<()> {
    if base_cost <= 0.0 {
        return Err(config_err(format!("{kind} '{id}': base_cost must be > 0")));
    }
    // < 1 would make costs shrink with level; the cost curve must grow.
    if cost_multiplier < 1.0 {
        return Err(config_err(format!(
            "{kind} '{id}': cost_multiplier must be >= 1"
        )));
    }
    Ok(())
}
