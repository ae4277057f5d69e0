//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Haptic feedback (vibration)
//! - Recurring tasks (interval timer, animation-frame loop)

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Best-effort tactile feedback
pub trait Haptics {
    /// Request a vibration of `duration_ms`. Returns false when the host has
    /// no vibration support; callers treat that as a silent no-op.
    fn pulse(&self, duration_ms: u32) -> bool;
}

/// Host without tactile feedback (native builds, desktop browsers)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, _duration_ms: u32) -> bool {
        false
    }
}

/// A periodic producer registered with the host event loop.
///
/// After `cancel` returns the task must never run again.
pub trait RecurringTask {
    fn cancel(&mut self);
}

/// Build an RNG seed from a millisecond clock and a uniform sample in [0, 1).
///
/// The clock alone repeats for mounts within the same millisecond.
pub fn mix_seed(clock_ms: f64, entropy: f64) -> u64 {
    let clock = clock_ms as u64;
    let noise = (entropy.clamp(0.0, 1.0) * (1u64 << 53) as f64) as u64;
    clock.rotate_left(32) ^ noise
}

/// Which of the two Playing-scoped producers a task drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Fixed-period spawn timer
    Spawn,
    /// Self-rescheduling animation-frame callback
    Frame,
}
