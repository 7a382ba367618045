//! Catch Arcade entry point
//!
//! On the web this only installs logging; the page drives `WebArcade`.
//! Natively it plays one headless session with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Catch Arcade starting...");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use catch_arcade::config::{ArcadeConfig, Preset};
    use catch_arcade::engine::ArcadeEngine;
    use catch_arcade::history::SessionHistory;
    use catch_arcade::persistence::MemoryStorage;
    use catch_arcade::sim::{ItemKind, Session, TickInput};

    env_logger::init();

    let preset = std::env::args()
        .nth(1)
        .and_then(|name| Preset::from_str(&name))
        .unwrap_or_default();
    let seed = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(12345);
    log::info!("Catch Arcade (native) - {} preset, seed {}", preset.as_str(), seed);

    /// Chase the lowest item worth catching
    fn autopilot(session: &Session) -> TickInput {
        let target = session
            .items
            .iter()
            .filter(|item| item.kind != ItemKind::Hazard)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|item| item.center().x);
        TickInput {
            target_x: target,
            steer: 0.0,
        }
    }

    let mut engine = ArcadeEngine::new(ArcadeConfig::from_preset(preset), seed)
        .with_render_sink(|_: &catch_arcade::Snapshot| {});
    if let Err(e) = engine.start() {
        eprintln!("Could not start session: {}", e);
        std::process::exit(1);
    }

    const DT: f32 = 1.0 / 60.0;
    let result = loop {
        let input = engine.session().map(autopilot).unwrap_or_default();
        if let Some(result) = engine.tick(DT, &input) {
            break result;
        }
    };

    let mut storage = MemoryStorage::default();
    let mut history = SessionHistory::load(&storage);
    let rank = history.record(&result, catch_arcade::platform::now_ms());
    history.save(&mut storage);

    println!("Final score: {}", result.final_score);
    println!("Reward tier: {:?}", result.tier);
    println!(
        "Payout:      {} coins, {} xp",
        result.payout.currency, result.payout.experience
    );
    println!(
        "Caught {} / missed {} / hazards {} / power-ups {} / best combo {}",
        result.stats.caught,
        result.stats.missed,
        result.stats.hazards_hit,
        result.stats.power_ups,
        result.stats.best_combo
    );
    if let Some(rank) = rank {
        println!("Leaderboard rank: #{}", rank);
    }
    if let Some(best) = history.top_score() {
        println!("Best score:  {}", best);
    }
}
