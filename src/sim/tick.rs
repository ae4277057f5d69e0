//! Throttled movement tick
//!
//! The host calls in at its own refresh rate; tulips advance at most one
//! step per frame interval so fall speed looks the same at 60 Hz and 144 Hz.

use super::state::GameState;
use crate::tuning::Tuning;

/// Accumulates host time until a movement step is due
#[derive(Debug, Clone, Default)]
pub struct FrameThrottle {
    accumulated_ms: f64,
}

impl FrameThrottle {
    /// Feed elapsed host time. Returns true when a step should run.
    ///
    /// At most one step per call; the remainder is dropped rather than
    /// carried, so a long stall does not cause a burst of catch-up steps.
    pub fn advance(&mut self, elapsed_ms: f64, interval_ms: f64) -> bool {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.accumulated_ms += elapsed_ms;
        }
        if self.accumulated_ms > interval_ms {
            self.accumulated_ms = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
    }
}

/// Apply one movement step: every tulip falls, then off-screen tulips are pruned.
///
/// Returns how many tulips were pruned.
pub fn step(state: &mut GameState, tuning: &Tuning) -> usize {
    for tulip in &mut state.tulips {
        tulip.fall();
    }
    let before = state.tulips.len();
    state.tulips.retain(|t| t.y < tuning.offscreen_y);
    before - state.tulips.len()
}
