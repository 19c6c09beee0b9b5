//! Economy formula tests — stacking order, cost curves, prestige math.
//!
//! The worked numbers here are contract: other systems (milestones,
//! prestige gates) depend on these exact results.

use idle_core::{
    config::GameConfig,
    economy,
    engine::{Catalog, GameEngine, PurchaseOutcome},
    state::{GameState, LuckyEventState, OwnedLevel},
    types::SAFE_VALUE_CAP,
};

fn engine() -> GameEngine {
    GameEngine::new(GameConfig::default_test(), 42, 0).expect("valid test config")
}

#[test]
fn click_power_base_is_one() {
    let engine = engine();
    assert_eq!(engine.click_power(), 1.0);
}

/// Base 1, one +1 upgrade level, one ×2 multiplier level:
/// floor((1 + 1) × 2) = 4.
#[test]
fn click_power_additive_then_multiplicative() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    state
        .click_upgrades
        .insert("sturdy_finger".into(), OwnedLevel { level: 1 });
    state
        .click_multipliers
        .insert("golden_glove".into(), OwnedLevel { level: 1 });
    assert_eq!(economy::click_power(&state, &config), 4.0);
}

/// Prestige applies after the upgrade stack, before the shop flag.
#[test]
fn click_power_full_stack_order() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    state
        .click_upgrades
        .insert("sturdy_finger".into(), OwnedLevel { level: 4 }); // 1 + 4 = 5
    state
        .click_multipliers
        .insert("golden_glove".into(), OwnedLevel { level: 2 }); // ×4 = 20
    state.prestige_points = 50; // ×(1 + 50×0.02) = ×2 = 40
    state.rebirth_points = 1; // ×2 = 80
    state.shop_purchases.insert("click_doubler".into(), true); // ×2 = 160
    assert_eq!(economy::click_power(&state, &config), 160.0);
}

#[test]
fn click_power_is_floored() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    state.prestige_points = 10; // 1 × 1.2 = 1.2 → floor 1
    assert_eq!(economy::click_power(&state, &config), 1.0);
}

/// Generator with baseProduction=1, baseCost=10, costMultiplier=1.15:
/// level 0 costs floor(10 × 1.15^0) = 10; level 1 costs floor(11.5) = 11.
#[test]
fn generator_cost_progression() {
    assert_eq!(economy::purchase_cost(10.0, 1.15, 0, 1.0), 10.0);
    assert_eq!(economy::purchase_cost(10.0, 1.15, 1, 1.0), 11.0);
    assert_eq!(economy::purchase_cost(10.0, 1.15, 2, 1.0), 13.0);
}

#[test]
fn purchase_cost_strictly_increasing() {
    let mut previous = 0.0;
    for level in 0..40 {
        let cost = economy::purchase_cost(10.0, 1.15, level, 1.0);
        assert!(
            cost > previous,
            "cost did not increase at level {level}: {previous} -> {cost}"
        );
        previous = cost;
    }
}

/// The discount applies after the exponentiation and floor, not before.
/// floor(10 × 1.15) × 0.9 = 9.9, NOT floor(10 × 1.15 × 0.9) = 10.
#[test]
fn discount_applies_after_exponentiation() {
    let mut engine = engine();
    engine.state.shop_purchases.insert("haggler".into(), true);
    engine
        .state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 1 });
    let price = engine.price_of(Catalog::Generators, "cursor").unwrap();
    assert!((price - 9.9).abs() < 1e-9, "expected 9.9, got {price}");
}

#[test]
fn buying_generator_spends_and_levels() {
    let mut engine = engine();
    engine.state.currency = 10.0;
    let outcome = engine.purchase(Catalog::Generators, "cursor");
    assert_eq!(outcome, PurchaseOutcome::Purchased);
    assert_eq!(engine.state.generator_level("cursor"), 1);
    assert!(engine.state.currency.abs() < 1e-9);
    assert_eq!(engine.price_of(Catalog::Generators, "cursor"), Some(11.0));
}

#[test]
fn purchase_rejections_are_noops() {
    let mut engine = engine();
    engine.state.currency = 5.0;
    assert_eq!(
        engine.purchase(Catalog::Generators, "cursor"),
        PurchaseOutcome::InsufficientFunds
    );
    assert_eq!(
        engine.purchase(Catalog::Generators, "no_such_thing"),
        PurchaseOutcome::UnknownItem
    );
    assert_eq!(engine.state.currency, 5.0);
    assert_eq!(engine.state.generator_level("cursor"), 0);
}

#[test]
fn max_level_blocks_purchase() {
    let mut engine = engine();
    engine.state.currency = 1e12;
    engine
        .state
        .click_multipliers
        .insert("golden_glove".into(), OwnedLevel { level: 5 });
    assert_eq!(
        engine.purchase(Catalog::ClickMultipliers, "golden_glove"),
        PurchaseOutcome::MaxLevel
    );
}

#[test]
fn shop_item_is_one_shot() {
    let mut engine = engine();
    engine.state.currency = 20_000.0;
    assert_eq!(
        engine.purchase(Catalog::Shop, "haggler"),
        PurchaseOutcome::Purchased
    );
    assert_eq!(
        engine.purchase(Catalog::Shop, "haggler"),
        PurchaseOutcome::AlreadyOwned
    );
    assert_eq!(engine.state.currency, 10_000.0);
}

/// Prestige with totalEarned below the requirement yields gain 0 and the
/// operation is a no-op on state.
#[test]
fn prestige_below_requirement_is_noop() {
    let mut engine = engine();
    engine.state.total_earned = 999_999.0;
    engine.state.currency = 500.0;
    assert_eq!(engine.pending_prestige_gain(), 0);
    let before = engine.state.clone();
    assert!(engine.prestige().is_none());
    assert_eq!(engine.state, before);
}

/// sqrt formula: floor(sqrt(1e6 / 1e4)) = floor(sqrt(100)) = 10.
#[test]
fn prestige_gain_sqrt_formula() {
    let mut engine = engine();
    engine.state.total_earned = 1_000_000.0;
    assert_eq!(engine.pending_prestige_gain(), 10);
}

#[test]
fn prestige_gain_doubled_by_shop_flag() {
    let mut engine = engine();
    engine.state.total_earned = 1_000_000.0;
    engine
        .state
        .shop_purchases
        .insert("prestige_doubler".into(), true);
    assert_eq!(engine.pending_prestige_gain(), 20);
}

/// The requirement scales ×1.5 per completed prestige.
#[test]
fn prestige_requirement_grows() {
    let config = GameConfig::default_test();
    assert_eq!(economy::prestige_requirement(&config, 0), 1_000_000.0);
    assert_eq!(economy::prestige_requirement(&config, 1), 1_500_000.0);
    assert_eq!(economy::prestige_requirement(&config, 2), 2_250_000.0);

    let mut engine = engine();
    engine.state.prestige_count = 1;
    engine.state.total_earned = 1_000_000.0;
    assert_eq!(engine.pending_prestige_gain(), 0);
    engine.state.total_earned = 1_500_000.0;
    assert_eq!(engine.pending_prestige_gain(), 12); // floor(sqrt(150))
}

#[test]
fn prestige_gain_monotone_in_total_earned() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    let mut previous = 0;
    for earned in [1e6, 2e6, 5e6, 1e8, 1e10, 1e12] {
        state.total_earned = earned;
        let gain = economy::prestige_gain(&state, &config);
        assert!(gain >= previous, "gain decreased at total_earned={earned}");
        previous = gain;
    }
}

#[test]
fn rebirth_bonus_compounds() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    state.rebirth_points = 2;
    // 1 × 2^2 = 4
    assert_eq!(economy::click_power(&state, &config), 4.0);
    state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 1 });
    assert!((economy::production_per_second(&state, &config) - 4.0).abs() < 1e-9);
}

#[test]
fn milestone_bonus_joins_generator_multiplier() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 1 });
    assert!((economy::production_per_second(&state, &config) - 1.0).abs() < 1e-9);
    state.milestones.insert("first_hundred".into(), true);
    assert!((economy::production_per_second(&state, &config) - 1.05).abs() < 1e-9);
}

#[test]
fn shop_production_multipliers_stack() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 10 });
    state.shop_purchases.insert("tuning_kit".into(), true); // ×1.2
    state.shop_purchases.insert("production_boost".into(), true); // ×1.5
    let expected = 10.0 * 1.2 * 1.5;
    assert!((economy::production_per_second(&state, &config) - expected).abs() < 1e-9);
}

#[test]
fn production_event_scopes_are_distinct() {
    let config = GameConfig::default_test();
    let mut state = GameState::new(&config, 0);
    state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 1 });

    state.lucky_event = LuckyEventState {
        active: true,
        id: Some("golden_surge".into()),
        ends_at_ms: 60_000,
    };
    assert!((economy::production_per_second(&state, &config) - 7.0).abs() < 1e-9);
    assert_eq!(economy::click_event_factor(&state, &config), 1.0);

    state.lucky_event.id = Some("click_frenzy".into());
    assert!((economy::production_per_second(&state, &config) - 1.0).abs() < 1e-9);
    assert_eq!(economy::click_event_factor(&state, &config), 10.0);
}

#[test]
fn guard_clamps_nonfinite_and_huge_values() {
    assert_eq!(economy::guard(f64::INFINITY), SAFE_VALUE_CAP);
    assert_eq!(economy::guard(f64::NAN), SAFE_VALUE_CAP);
    assert_eq!(economy::guard(SAFE_VALUE_CAP * 2.0), SAFE_VALUE_CAP);
    assert_eq!(economy::guard(123.0), 123.0);
}

#[test]
fn counters_never_exceed_cap() {
    let mut engine = engine();
    engine.config.lucky_events.enabled = false;
    engine.state.currency = SAFE_VALUE_CAP;
    engine.state.total_earned = SAFE_VALUE_CAP;
    engine
        .state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 100 });
    engine.tick(1_000.0);
    assert_eq!(engine.state.currency, SAFE_VALUE_CAP);
    assert_eq!(engine.state.total_earned, SAFE_VALUE_CAP);
}

#[test]
fn invalid_config_is_fatal_at_load() {
    let mut config = GameConfig::default_test();
    config.generators[0].cost_multiplier = 0.9;
    assert!(GameEngine::new(config, 1, 0).is_err());

    let mut config = GameConfig::default_test();
    config.prestige.divisor = 0.0;
    assert!(GameEngine::new(config, 1, 0).is_err());

    let mut config = GameConfig::default_test();
    config.generators.push(config.generators[0].clone());
    assert!(GameEngine::new(config, 1, 0).is_err());
}
