//! Tulip Catcher entry point
//!
//! On the web this mounts the game into `#tulip-catcher`. Natively it plays
//! one headless session so the game loop can be watched in the log.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    use tulip_catcher::ui::dom::{TulipCatcher, init_logging};

    init_logging();
    log::info!("Tulip Catcher starting...");

    let has_root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("tulip-catcher"))
        .is_some();
    if !has_root {
        log::info!("No #tulip-catcher element - waiting for the page to mount manually");
        return Ok(());
    }

    let game = TulipCatcher::new("tulip-catcher", false, None, None)?;
    // Lives as long as the page
    std::mem::forget(game);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Tulip Catcher (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    autoplay(seed);
}

/// Simulate a player who taps the lowest tulip every `REACTION_MS`
#[cfg(not(target_arch = "wasm32"))]
fn autoplay(seed: u64) {
    use std::cell::Cell;
    use std::rc::Rc;
    use tulip_catcher::GameController;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const REACTION_MS: f64 = 900.0;
    const TIME_LIMIT_MS: f64 = 120_000.0;

    let mut game = GameController::new(seed);
    let completed = Rc::new(Cell::new(false));
    let flag = completed.clone();
    game.on_complete(move || flag.set(true));
    game.start();

    let spawn_every = game.tuning().spawn_interval_ms as f64;
    let mut now = 0.0;
    let mut next_spawn = spawn_every;
    let mut next_tap = REACTION_MS;
    let mut missed = 0;

    while !completed.get() && now < TIME_LIMIT_MS {
        now += FRAME_MS;
        if now >= next_spawn {
            game.spawn();
            next_spawn += spawn_every;
        }
        let before = game.state().tulips.len();
        game.tick(FRAME_MS);
        missed += before.saturating_sub(game.state().tulips.len());

        if now >= next_tap {
            let lowest = game
                .state()
                .tulips
                .iter()
                .max_by(|a, b| a.y.total_cmp(&b.y))
                .map(|t| t.id);
            if let Some(id) = lowest {
                game.catch(id);
            }
            next_tap += REACTION_MS;
        }
    }

    log::info!(
        "Session over after {:.1}s: score {}/{}, {} tulips fell, victory={}",
        now / 1000.0,
        game.state().score,
        game.tuning().target_score,
        missed,
        game.state().victory
    );
}
