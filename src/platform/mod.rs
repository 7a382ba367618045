//! Platform abstraction layer
//!
//! Turns host callbacks into simulation inputs:
//! - Display-refresh timestamps into clamped frame deltas
//! - Pointer/keyboard events into a latched `TickInput`
//! - The wall clock used for daily attempt limits

use crate::consts::MAX_FRAME_DT;
use crate::sim::TickInput;

/// Wall-clock time in milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock time in milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Converts millisecond frame timestamps into second deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous frame (0 on the first frame, capped)
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms > last => ((now_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.min(MAX_FRAME_DT)
    }

    /// Forget the previous frame (after a pause or tab switch)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Input gathered between ticks
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    pointer_x: Option<f32>,
    steer: f32,
}

impl InputLatch {
    /// Pointer/touch moved; only the latest position is kept
    pub fn pointer(&mut self, x: f32) {
        self.pointer_x = Some(x);
    }

    /// Keyboard axis held (-1 left, 1 right, 0 released)
    pub fn steer(&mut self, axis: f32) {
        self.steer = axis.clamp(-1.0, 1.0);
    }

    /// Input for the next tick; the pointer target is consumed, steering is held
    pub fn take(&mut self) -> TickInput {
        TickInput {
            target_x: self.pointer_x.take(),
            steer: self.steer,
        }
    }
}
