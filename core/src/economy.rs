//! The economy model — pure (state, config) → number functions.
//!
//! STACKING ORDER IS LOAD-BEARING. Click power applies additive upgrades
//! first, then multiplicative upgrades, then prestige, then rebirth, then
//! flat shop bonuses, then floors. Achievement thresholds and prestige
//! gates depend on these exact numbers; do not "simplify" the order.
//!
//! Divisors and multipliers are validated at config load — nothing here
//! re-checks them. Any result that goes non-finite or past the
//! safe-integer cap is clamped by [`guard`], never propagated.

use crate::config::{GameConfig, LuckyEventConfig, LuckyEventKind, PrestigeFormula, ShopEffect};
use crate::state::GameState;
use crate::types::{Seconds, SAFE_VALUE_CAP};

/// Clamp a computed value into the storable range.
pub fn guard(value: f64) -> f64 {
    if !value.is_finite() || value > SAFE_VALUE_CAP {
        SAFE_VALUE_CAP
    } else {
        value
    }
}

/// Derived click power, floored to a whole number.
pub fn click_power(state: &GameState, config: &GameConfig) -> f64 {
    let mut power = config.game.base_click_power;

    // 1. Additive upgrades.
    for u in &config.click_upgrades {
        power += state.click_upgrade_level(&u.id) as f64 * u.power_increase;
    }
    // 2. Multiplicative upgrades.
    for m in &config.click_multipliers {
        let level = state.click_multiplier_level(&m.id);
        if level > 0 {
            power *= m.multiplier.powi(level as i32);
        }
    }
    // 3. Prestige.
    if config.prestige.enabled {
        power *= 1.0 + state.prestige_points as f64 * config.prestige.bonus_per_point;
    }
    // 4. Rebirth.
    if config.rebirth.enabled && state.rebirth_points > 0 {
        power *= config.rebirth.bonus_per_point.powi(state.rebirth_points as i32);
    }
    // 5. Flat shop bonuses.
    power *= shop_click_multiplier(state, config);

    guard(power.floor())
}

/// Combined multiplier applied to all generator output. Each factor is
/// applied exactly once — the tick must not re-apply the event factor.
pub fn generator_multiplier(state: &GameState, config: &GameConfig) -> f64 {
    let mut mult = 1.0;

    for m in &config.generator_multipliers {
        let level = state.generator_multiplier_level(&m.id);
        if level > 0 {
            mult *= m.multiplier.powi(level as i32);
        }
    }
    for milestone in &config.milestones {
        if state.milestone_unlocked(&milestone.id) {
            mult *= 1.0 + milestone.production_bonus;
        }
    }
    if config.prestige.enabled {
        mult *= 1.0 + state.prestige_points as f64 * config.prestige.bonus_per_point;
    }
    if config.rebirth.enabled && state.rebirth_points > 0 {
        mult *= config.rebirth.bonus_per_point.powi(state.rebirth_points as i32);
    }
    mult *= production_event_factor(state, config);
    mult *= shop_production_multiplier(state, config);

    guard(mult)
}

pub fn production_per_second(state: &GameState, config: &GameConfig) -> f64 {
    let base: f64 = config
        .generators
        .iter()
        .map(|g| state.generator_level(&g.id) as f64 * g.base_production)
        .sum();
    guard(base * generator_multiplier(state, config))
}

/// Cost of the next level on a standard cost curve. The discount factor
/// applies AFTER the exponentiation and floor, not before.
pub fn purchase_cost(
    base_cost: f64,
    cost_multiplier: f64,
    current_level: u32,
    discount_factor: f64,
) -> f64 {
    let cost = (base_cost * cost_multiplier.powi(current_level as i32)).floor();
    guard(cost * discount_factor)
}

/// Product of (1 − fraction) over owned CostDiscount shop flags.
/// 1.0 when none are owned.
pub fn cost_discount_factor(state: &GameState, config: &GameConfig) -> f64 {
    let mut factor = 1.0;
    for item in &config.shop {
        if let ShopEffect::CostDiscount { fraction } = item.effect {
            if state.owns_shop_item(&item.id) {
                factor *= 1.0 - fraction;
            }
        }
    }
    factor
}

pub fn shop_click_multiplier(state: &GameState, config: &GameConfig) -> f64 {
    let mut factor = 1.0;
    for item in &config.shop {
        if let ShopEffect::ClickMultiplier { factor: f } = item.effect {
            if state.owns_shop_item(&item.id) {
                factor *= f;
            }
        }
    }
    factor
}

pub fn shop_production_multiplier(state: &GameState, config: &GameConfig) -> f64 {
    let mut factor = 1.0;
    for item in &config.shop {
        if let ShopEffect::ProductionMultiplier { factor: f } = item.effect {
            if state.owns_shop_item(&item.id) {
                factor *= f;
            }
        }
    }
    factor
}

pub fn double_prestige_owned(state: &GameState, config: &GameConfig) -> bool {
    config
        .shop
        .iter()
        .any(|item| item.effect == ShopEffect::DoublePrestige && state.owns_shop_item(&item.id))
}

/// Effective offline cap: the configured window plus any purchased
/// extensions.
pub fn offline_cap_secs(state: &GameState, config: &GameConfig) -> Seconds {
    let mut cap = config.offline.max_secs;
    for item in &config.shop {
        if let ShopEffect::OfflineCapExtension { extra_secs } = item.effect {
            if state.owns_shop_item(&item.id) {
                cap += extra_secs;
            }
        }
    }
    cap
}

fn active_event<'a>(state: &GameState, config: &'a GameConfig) -> Option<&'a LuckyEventConfig> {
    if !state.lucky_event.active {
        return None;
    }
    let id = state.lucky_event.id.as_deref()?;
    config.lucky_events.events.iter().find(|e| e.id == id)
}

/// Multiplier from an active production-scoped lucky event, else 1.
pub fn production_event_factor(state: &GameState, config: &GameConfig) -> f64 {
    match active_event(state, config).map(|e| &e.kind) {
        Some(LuckyEventKind::Timed {
            scope, multiplier, ..
        }) if scope.affects_production() => *multiplier,
        _ => 1.0,
    }
}

/// Multiplier from an active click-scoped lucky event, else 1.
/// Applied to manual and auto clicks at earn time — never baked into
/// the stored click_power stat.
pub fn click_event_factor(state: &GameState, config: &GameConfig) -> f64 {
    match active_event(state, config).map(|e| &e.kind) {
        Some(LuckyEventKind::Timed {
            scope, multiplier, ..
        }) if scope.affects_click() => *multiplier,
        _ => 1.0,
    }
}

/// Lifetime earnings needed for the next prestige. Scales up with every
/// completed prestige.
pub fn prestige_requirement(config: &GameConfig, prestige_count: u32) -> f64 {
    config.prestige.requirement * config.prestige.requirement_growth.powi(prestige_count as i32)
}

/// Points granted by prestiging now. Zero below the requirement — the
/// caller treats zero as "prestige unavailable".
pub fn prestige_gain(state: &GameState, config: &GameConfig) -> u64 {
    if !config.prestige.enabled {
        return 0;
    }
    if state.total_earned < prestige_requirement(config, state.prestige_count) {
        return 0;
    }
    let ratio = state.total_earned / config.prestige.divisor;
    let raw = match config.prestige.formula {
        PrestigeFormula::Sqrt => ratio.sqrt().floor(),
        PrestigeFormula::Log10 => ratio.log10().floor(),
    };
    let mut gain = if raw.is_finite() && raw > 0.0 { raw } else { 0.0 };
    if double_prestige_owned(state, config) {
        gain *= 2.0;
    }
    guard(gain) as u64
}

pub fn rebirth_available(state: &GameState, config: &GameConfig) -> bool {
    config.rebirth.enabled && state.prestige_count >= config.rebirth.requirement
}

/// Simulated clicks per second from the auto-clicker.
pub fn auto_clicker_rate(level: u32, config: &GameConfig) -> f64 {
    if !config.auto_clicker.enabled {
        return 0.0;
    }
    level as f64 * config.auto_clicker.clicks_per_second_per_level
}
