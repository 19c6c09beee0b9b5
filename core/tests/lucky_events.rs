//! Lucky-event lifecycle tests.
//!
//! Single-event configs with chance_per_second = 1.0 make a one-second
//! tick spawn deterministically, so these tests never guess at the
//! weighted pick.

use idle_core::{
    config::{EventScope, GameConfig, LuckyEventConfig, LuckyEventKind},
    engine::GameEngine,
    event::GameEvent,
    state::OwnedLevel,
};

fn event_config(events: Vec<LuckyEventConfig>) -> GameConfig {
    let mut config = GameConfig::default_test();
    config.lucky_events.chance_per_second = 1.0;
    config.lucky_events.events = events;
    config
}

fn surge() -> LuckyEventConfig {
    LuckyEventConfig {
        id: "golden_surge".into(),
        name: String::new(),
        weight: 1.0,
        kind: LuckyEventKind::Timed {
            scope: EventScope::Production,
            multiplier: 7.0,
            duration_secs: 30.0,
        },
    }
}

fn frenzy() -> LuckyEventConfig {
    LuckyEventConfig {
        id: "click_frenzy".into(),
        name: String::new(),
        weight: 1.0,
        kind: LuckyEventKind::Timed {
            scope: EventScope::Click,
            multiplier: 10.0,
            duration_secs: 15.0,
        },
    }
}

fn drop_event() -> LuckyEventConfig {
    LuckyEventConfig {
        id: "lucky_drop".into(),
        name: String::new(),
        weight: 1.0,
        kind: LuckyEventKind::Instant {
            production_secs: 60.0,
        },
    }
}

#[test]
fn timed_event_starts_and_is_exclusive() {
    let mut engine = GameEngine::new(event_config(vec![surge()]), 42, 0).unwrap();
    let events = engine.tick(1.0);
    assert!(matches!(events[0], GameEvent::LuckyEventStarted { .. }));
    assert!(engine.state.lucky_event.active);
    assert_eq!(engine.state.lucky_event.id.as_deref(), Some("golden_surge"));

    // While one event runs, no second one can start.
    let events = engine.tick(1.0);
    assert!(events.is_empty());
    assert_eq!(engine.state.lucky_event.id.as_deref(), Some("golden_surge"));
}

#[test]
fn timed_event_expires_at_end_time() {
    let mut engine = GameEngine::new(event_config(vec![surge()]), 42, 0).unwrap();
    engine.tick(1.0); // starts; ends 30s later
    let ends_at = engine.state.lucky_event.ends_at_ms;
    assert_eq!(ends_at, 1_000 + 30_000);

    let mut expired = false;
    for _ in 0..31 {
        for event in engine.tick(1.0) {
            if let GameEvent::LuckyEventExpired { id } = event {
                assert_eq!(id, "golden_surge");
                expired = true;
            }
        }
        if expired {
            break;
        }
    }
    assert!(expired, "event never expired");
    assert!(!engine.state.lucky_event.active);
}

#[test]
fn production_event_scales_generator_output() {
    let mut engine = GameEngine::new(event_config(vec![surge()]), 42, 0).unwrap();
    engine
        .state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 1 });

    // First tick: production accrues before the event starts.
    engine.tick(1.0);
    assert!((engine.state.currency - 1.0).abs() < 1e-9);

    // Second tick: the ×7 buff is live.
    engine.tick(1.0);
    assert!((engine.state.currency - 8.0).abs() < 1e-9);
}

#[test]
fn click_event_scales_clicks_not_production() {
    let mut engine = GameEngine::new(event_config(vec![frenzy()]), 42, 0).unwrap();
    engine
        .state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 1 });
    engine.tick(1.0); // starts the frenzy

    let earned = engine.register_click();
    assert_eq!(earned, 10.0);
    // The stored derived stat is unaffected by the buff.
    assert_eq!(engine.state.click_power, 1.0);

    let before = engine.state.generator_earned;
    engine.tick(1.0);
    assert!((engine.state.generator_earned - before - 1.0).abs() < 1e-9);
}

#[test]
fn instant_event_pays_once_and_keeps_no_state() {
    let mut engine = GameEngine::new(event_config(vec![drop_event()]), 42, 0).unwrap();
    engine
        .state
        .generators
        .insert("cursor".into(), OwnedLevel { level: 2 });

    let events = engine.tick(1.0);
    // 2/s production for 1s, plus 60s worth as the one-shot reward.
    let reward = events
        .iter()
        .find_map(|e| match e {
            GameEvent::InstantEventTriggered { reward, .. } => Some(*reward),
            _ => None,
        })
        .expect("instant event should fire");
    assert!((reward - 120.0).abs() < 1e-9);
    assert!((engine.state.currency - 122.0).abs() < 1e-9);
    assert!(!engine.state.lucky_event.active);
}

#[test]
fn disabled_events_never_fire() {
    let mut config = event_config(vec![surge()]);
    config.lucky_events.enabled = false;
    let mut engine = GameEngine::new(config, 42, 0).unwrap();
    for _ in 0..100 {
        assert!(engine.tick(1.0).is_empty());
    }
    assert!(!engine.state.lucky_event.active);
}

#[test]
fn zero_weights_never_fire() {
    let mut cfg = surge();
    cfg.weight = 0.0;
    let mut engine = GameEngine::new(event_config(vec![cfg]), 42, 0).unwrap();
    for _ in 0..100 {
        assert!(engine.tick(1.0).is_empty());
    }
}
