//! game-runner: headless driver for the idle-clicker engine.
//!
//! Usage:
//!   game-runner --seed 42 --seconds 600 --save save.json
//!   game-runner --seed 42 --ipc-mode
//!
//! Batch mode simulates a scripted player (steady clicking plus a greedy
//! cheapest-purchase policy) and prints a run summary. IPC mode reads
//! line-delimited JSON commands on stdin and answers with JSON state on
//! stdout — the same surface a UI drives the engine through.

use anyhow::Result;
use idle_core::{
    config::GameConfig,
    engine::{Catalog, GameEngine},
    error::GameError,
    event::{event_type_name, GameEvent},
    store::SaveStore,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Click { count: Option<u32> },
    Buy { catalog: Catalog, id: String },
    Tick { secs: f64 },
    Prestige,
    Rebirth,
    ClaimDaily,
    Save,
    Export,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    currency: f64,
    per_second: f64,
    click_power: f64,
    total_earned: f64,
    total_clicks: f64,
    play_time_secs: f64,
    prestige_points: u64,
    prestige_pending: u64,
    rebirth_points: u64,
    rebirth_ready: bool,
    active_event: Option<String>,
    achievements_unlocked: usize,
    milestones_unlocked: usize,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let seconds = parse_arg(&args, "--seconds", 600.0f64);
    let cps = parse_arg(&args, "--cps", 4.0f64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    let save_path = args
        .windows(2)
        .find(|w| w[0] == "--save")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default_test(),
    };

    let store = save_path.map(SaveStore::at);
    let now = now_ms();

    let mut engine = match &store {
        Some(store) => match store.read() {
            Ok(snapshot) => {
                let (engine, events) = GameEngine::resume(config.clone(), seed, snapshot, now)?;
                for event in &events {
                    log::info!("resume event: {}", event_type_name(event));
                }
                engine
            }
            Err(GameError::SaveNotFound) => GameEngine::new(config.clone(), seed, now)?,
            Err(e) => {
                // A corrupt save must never crash the game — start fresh
                // and leave the broken file for the next write to replace.
                log::warn!("ignoring unreadable save ({e}); starting fresh");
                GameEngine::new(config.clone(), seed, now)?
            }
        },
        None => GameEngine::new(config.clone(), seed, now)?,
    };

    if ipc_mode {
        run_ipc_loop(&mut engine, store.as_ref())?;
    } else {
        println!("game-runner");
        println!("  seed:    {seed}");
        println!("  seconds: {seconds}");
        println!("  cps:     {cps}");
        println!();
        let events = run_batch(&mut engine, store.as_ref(), seconds, cps);
        print_summary(&engine, &events);
    }

    Ok(())
}

/// Scripted session: tick at the configured interval, click at a steady
/// rate, buy the cheapest affordable thing, save on the save interval.
fn run_batch(
    engine: &mut GameEngine,
    store: Option<&SaveStore>,
    seconds: f64,
    cps: f64,
) -> Vec<GameEvent> {
    let step = engine.config.game.tick_interval_ms as f64 / 1000.0;
    let save_interval = engine.config.game.save_interval_secs;
    let steps = (seconds / step) as u64;

    let mut events = Vec::new();
    let mut click_acc = 0.0;
    let mut since_save = 0.0;

    for _ in 0..steps {
        events.extend(engine.tick(step));

        click_acc += cps * step;
        while click_acc >= 1.0 {
            engine.register_click();
            click_acc -= 1.0;
        }

        greedy_buy(engine);

        since_save += step;
        if since_save >= save_interval {
            since_save = 0.0;
            if let Some(store) = store {
                if let Err(e) = store.write(&engine.snapshot()) {
                    log::warn!("save failed (will retry next interval): {e}");
                }
            }
        }
    }

    if let Some(store) = store {
        if let Err(e) = store.write(&engine.snapshot()) {
            log::warn!("final save failed: {e}");
        }
    }
    events
}

/// Buy the single cheapest affordable item across all catalogs.
fn greedy_buy(engine: &mut GameEngine) {
    let mut candidates: Vec<(Catalog, String)> = Vec::new();
    for g in &engine.config.generators {
        candidates.push((Catalog::Generators, g.id.clone()));
    }
    for u in &engine.config.click_upgrades {
        candidates.push((Catalog::ClickUpgrades, u.id.clone()));
    }
    for m in &engine.config.click_multipliers {
        candidates.push((Catalog::ClickMultipliers, m.id.clone()));
    }
    for m in &engine.config.generator_multipliers {
        candidates.push((Catalog::GeneratorMultipliers, m.id.clone()));
    }
    if engine.config.auto_clicker.enabled {
        candidates.push((Catalog::AutoClicker, "auto_clicker".into()));
    }
    for s in &engine.config.shop {
        candidates.push((Catalog::Shop, s.id.clone()));
    }

    let cheapest = candidates
        .into_iter()
        .filter_map(|(catalog, id)| {
            engine.price_of(catalog, &id).map(|price| (catalog, id, price))
        })
        .filter(|(_, _, price)| *price <= engine.state.currency)
        .min_by(|a, b| a.2.total_cmp(&b.2));

    if let Some((catalog, id, _)) = cheapest {
        engine.purchase(catalog, &id);
    }
}

fn run_ipc_loop(engine: &mut GameEngine, store: Option<&SaveStore>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Click { count } => {
                for _ in 0..count.unwrap_or(1) {
                    engine.register_click();
                }
            }
            IpcCommand::Buy { catalog, id } => {
                let outcome = engine.purchase(catalog, &id);
                log::debug!("buy {catalog:?}/{id}: {outcome:?}");
            }
            IpcCommand::Tick { secs } => {
                for event in engine.run_secs(secs) {
                    log::info!("event: {}", event_type_name(&event));
                }
            }
            IpcCommand::Prestige => {
                if engine.prestige().is_none() {
                    log::info!("prestige unavailable");
                }
            }
            IpcCommand::Rebirth => {
                if engine.rebirth().is_none() {
                    log::info!("rebirth unavailable");
                }
            }
            IpcCommand::ClaimDaily => {
                if engine.claim_daily_reward().is_none() {
                    log::info!("daily reward not ready");
                }
            }
            IpcCommand::Save => {
                if let Some(store) = store {
                    if let Err(e) = store.write(&engine.snapshot()) {
                        log::warn!("save failed: {e}");
                    }
                } else {
                    log::warn!("no --save path configured");
                }
            }
            IpcCommand::Export => {
                let blob = engine.snapshot().encode_export()?;
                writeln!(stdout, "{}", serde_json::json!({ "export": blob }))?;
                stdout.flush()?;
                continue;
            }
        }

        writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &GameEngine) -> UiState {
    let state = &engine.state;
    UiState {
        currency: state.currency,
        per_second: engine.production_per_second(),
        click_power: state.click_power,
        total_earned: state.total_earned,
        total_clicks: state.total_clicks,
        play_time_secs: state.play_time_secs,
        prestige_points: state.prestige_points,
        prestige_pending: engine.pending_prestige_gain(),
        rebirth_points: state.rebirth_points,
        rebirth_ready: engine.rebirth_ready(),
        active_event: state.lucky_event.id.clone(),
        achievements_unlocked: state.achievements.values().filter(|v| **v).count(),
        milestones_unlocked: state.milestones.values().filter(|v| **v).count(),
    }
}

fn print_summary(engine: &GameEngine, events: &[GameEvent]) {
    let state = &engine.state;

    println!("=== RUN SUMMARY ===");
    println!("  currency:       {:.0}", state.currency);
    println!("  total earned:   {:.0}", state.total_earned);
    println!("  click earned:   {:.0}", state.click_earned);
    println!("  gen earned:     {:.0}", state.generator_earned);
    println!("  total clicks:   {:.1}", state.total_clicks);
    println!("  click power:    {:.0}", state.click_power);
    println!("  per second:     {:.1}", engine.production_per_second());
    println!("  play time:      {:.0}s", state.play_time_secs);
    println!("  prestige:       {} pts ({} resets)", state.prestige_points, state.prestige_count);
    println!("  rebirth:        {} pts ({} resets)", state.rebirth_points, state.rebirth_count);

    println!();
    println!("=== LEVELS ===");
    for (id, owned) in &state.generators {
        println!("  generator {id}: {}", owned.level);
    }
    println!("  auto clicker: {}", state.auto_clicker_level);

    let achievements = state.achievements.values().filter(|v| **v).count();
    let milestones = state.milestones.values().filter(|v| **v).count();
    let shop_items = state.shop_purchases.values().filter(|v| **v).count();
    println!();
    println!("=== UNLOCKS ===");
    println!("  achievements: {achievements}/{}", state.achievements.len());
    println!("  milestones:   {milestones}/{}", state.milestones.len());
    println!("  shop items:   {shop_items}/{}", state.shop_purchases.len());

    let lucky_started = events
        .iter()
        .filter(|e| matches!(e, GameEvent::LuckyEventStarted { .. }))
        .count();
    let instant = events
        .iter()
        .filter(|e| matches!(e, GameEvent::InstantEventTriggered { .. }))
        .count();
    println!("  lucky events: {lucky_started} timed, {instant} instant");
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
