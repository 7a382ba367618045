//! Browser bindings
//!
//! Thin wrapper the page script drives from `requestAnimationFrame` and its
//! pointer/keyboard listeners. Snapshots cross the boundary as JSON.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::{ArcadeConfig, Preset};
use crate::engine::ArcadeEngine;
use crate::history::SessionHistory;
use crate::persistence::LocalStorage;
use crate::platform::{FrameClock, InputLatch};
use crate::rewards::{SessionResult, StoredAttempts};

#[wasm_bindgen]
pub struct WebArcade {
    engine: ArcadeEngine,
    clock: FrameClock,
    input: InputLatch,
    history: Rc<RefCell<SessionHistory>>,
    /// Board rank of the last finished session
    last_rank: Rc<Cell<Option<usize>>>,
}

#[wasm_bindgen]
impl WebArcade {
    /// Create an arcade for a preset name ("classic" or "deluxe"); `attempts_per_day` 0 means unlimited
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str, attempts_per_day: u32) -> WebArcade {
        let config = Preset::from_str(preset)
            .map(ArcadeConfig::from_preset)
            .unwrap_or_else(|| ArcadeConfig::load(&LocalStorage::new()));
        let now = js_sys::Date::now();
        let history = Rc::new(RefCell::new(SessionHistory::load(&LocalStorage::new())));

        let last_rank = Rc::new(Cell::new(None));

        let sink = {
            let history = history.clone();
            let last_rank = last_rank.clone();
            move |result: &SessionResult| {
                let mut history = history.borrow_mut();
                last_rank.set(history.record(result, js_sys::Date::now()));
                history.save(&mut LocalStorage::new());
            }
        };

        let mut engine = ArcadeEngine::new(config, now as u64).with_reward_sink(sink);
        if attempts_per_day > 0 {
            engine = engine.with_gate(StoredAttempts::load(
                LocalStorage::new(),
                attempts_per_day,
                now,
            ));
        }

        log::info!("Arcade ready ({} preset)", preset);
        WebArcade {
            engine,
            clock: FrameClock::new(),
            input: InputLatch::default(),
            history,
            last_rank,
        }
    }

    /// Start a session; false when rejected
    pub fn start(&mut self) -> bool {
        self.clock.reset();
        self.last_rank.set(None);
        match self.engine.start() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Start rejected: {}", e);
                false
            }
        }
    }

    /// Advance by one display frame; returns true while the session runs
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let dt = self.clock.advance(now_ms);
        let input = self.input.take();
        self.engine.tick(dt, &input);
        self.engine.is_live()
    }

    /// Pointer/touch x in field coordinates
    pub fn pointer(&mut self, x: f32) {
        self.input.pointer(x);
    }

    /// Keyboard axis (-1 left, 0 none, 1 right)
    pub fn steer(&mut self, axis: f32) {
        self.input.steer(axis);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.clock.reset();
        self.engine.pause() || self.engine.resume()
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.engine.snapshot()).unwrap_or_default()
    }

    pub fn last_result_json(&self) -> String {
        serde_json::to_string(&self.engine.last_result()).unwrap_or_default()
    }

    /// Attempts left today, -1 when unlimited
    pub fn attempts_remaining(&self) -> i32 {
        self.engine
            .attempts_remaining()
            .map_or(-1, |n| i32::try_from(n).unwrap_or(i32::MAX))
    }

    /// Board rank the running score would reach right now (0 when off the board)
    pub fn live_rank(&self) -> u32 {
        let score = self.engine.snapshot().score;
        rank_to_js(self.history.borrow().potential_rank(score))
    }

    /// Board rank of the last finished session (0 when it did not place)
    pub fn last_rank(&self) -> u32 {
        rank_to_js(self.last_rank.get())
    }

    /// Best score on the board, 0 when empty
    pub fn best_score(&self) -> f64 {
        self.history.borrow().top_score().unwrap_or(0) as f64
    }

    pub fn history_json(&self) -> String {
        serde_json::to_string(&*self.history.borrow()).unwrap_or_default()
    }
}

fn rank_to_js(rank: Option<usize>) -> u32 {
    rank.and_then(|r| u32::try_from(r).ok()).unwrap_or(0)
}
