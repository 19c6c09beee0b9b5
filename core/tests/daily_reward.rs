//! Daily reward claim-window and streak tests.

use idle_core::{config::GameConfig, engine::GameEngine, state::OwnedLevel};

const DAY_SECS: f64 = 86_400.0;

fn engine() -> GameEngine {
    let mut config = GameConfig::default_test();
    config.lucky_events.enabled = false;
    GameEngine::new(config, 42, 1_000_000_000).unwrap()
}

#[test]
fn first_claim_pays_the_floor_reward() {
    let mut engine = engine();
    // No production yet, so the flat minimum applies.
    let outcome = engine.claim_daily_reward().expect("first claim");
    assert_eq!(outcome.streak, 1);
    assert_eq!(outcome.reward, 50.0);
    assert_eq!(engine.state.currency, 50.0);
    assert_eq!(engine.state.total_earned, 50.0);
}

#[test]
fn second_claim_same_day_is_rejected() {
    let mut engine = engine();
    engine.claim_daily_reward().unwrap();
    let before = engine.state.clone();
    assert!(engine.claim_daily_reward().is_none());
    assert_eq!(engine.state, before);
}

#[test]
fn next_day_claim_continues_the_streak() {
    let mut engine = engine();
    engine.claim_daily_reward().unwrap();
    engine.tick(DAY_SECS);
    let outcome = engine.claim_daily_reward().expect("second day");
    assert_eq!(outcome.streak, 2);
    // 50 × (1 + 0.25) = 62.5
    assert!((outcome.reward - 62.5).abs() < 1e-9);
}

#[test]
fn missing_two_days_resets_the_streak() {
    let mut engine = engine();
    engine.claim_daily_reward().unwrap();
    engine.tick(DAY_SECS);
    engine.claim_daily_reward().unwrap(); // streak 2
    engine.tick(3.0 * DAY_SECS);
    let outcome = engine.claim_daily_reward().expect("late claim");
    assert_eq!(outcome.streak, 1);
}

#[test]
fn streak_caps_at_the_configured_maximum() {
    let mut engine = engine();
    for _ in 0..10 {
        let _ = engine.claim_daily_reward();
        engine.tick(DAY_SECS);
    }
    assert_eq!(engine.state.daily_reward.streak, 7);
    let outcome = engine.claim_daily_reward().unwrap();
    assert_eq!(outcome.streak, 7);
    // 50 × (1 + 0.25 × 6) = 125
    assert!((outcome.reward - 125.0).abs() < 1e-9);
}

#[test]
fn reward_scales_with_production() {
    let mut engine = engine();
    engine
        .state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 10 });
    // 10/s × 600s = 6000, well past the 50 floor.
    let outcome = engine.claim_daily_reward().unwrap();
    assert!((outcome.reward - 6_000.0).abs() < 1e-9);
}

#[test]
fn disabled_daily_reward_claims_nothing() {
    let mut config = GameConfig::default_test();
    config.daily_reward.enabled = false;
    let mut engine = GameEngine::new(config, 42, 1_000_000_000).unwrap();
    assert!(engine.claim_daily_reward().is_none());
}
