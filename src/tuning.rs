//! Data-driven game balance
//!
//! Every gameplay number lives here so a host page can retune the game
//! without a rebuild. Defaults match `crate::consts`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced when a tuning set is inconsistent
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("target score must be at least 1")]
    ZeroTarget,
    #[error("spawn interval must be positive")]
    ZeroSpawnInterval,
    #[error("{name} range is empty ({min} >= {max})")]
    EmptyRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{name} range {min}..{max} must lie within {low}..={high}")]
    OutOfBounds {
        name: &'static str,
        min: f32,
        max: f32,
        low: f32,
        high: f32,
    },
    #[error("off-screen line {offscreen_y} must be below spawn line {spawn_y}")]
    OffscreenAboveSpawn { spawn_y: f32, offscreen_y: f32 },
    #[error("frame interval must be a positive number of milliseconds, got {0}")]
    BadFrameInterval(f64),
    #[error("confetti count {0} exceeds the limit of {MAX_CONFETTI}")]
    TooMuchConfetti(u32),
}

/// Upper bound for `Tuning::confetti_count`
pub const MAX_CONFETTI: u32 = 500;
/// Tulips must spawn inside the play area horizontally (percent)
const X_BOUNDS: (f32, f32) = (0.0, 100.0);

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub target_score: u32,
    pub spawn_interval_ms: u32,
    pub frame_interval_ms: f64,
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub spawn_y: f32,
    pub offscreen_y: f32,
    pub confetti_count: u32,
    pub haptic_pulse_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            target_score: TARGET_SCORE,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            spawn_x_min: SPAWN_X_MIN,
            spawn_x_max: SPAWN_X_MAX,
            speed_min: SPEED_MIN,
            speed_max: SPEED_MAX,
            spawn_y: SPAWN_Y,
            offscreen_y: OFFSCREEN_Y,
            confetti_count: CONFETTI_COUNT,
            haptic_pulse_ms: HAPTIC_PULSE_MS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()
    }

    /// Check internal consistency, returning the tuning unchanged on success
    pub fn validate(self) -> Result<Self, TuningError> {
        if self.target_score == 0 {
            return Err(TuningError::ZeroTarget);
        }
        if self.spawn_interval_ms == 0 {
            return Err(TuningError::ZeroSpawnInterval);
        }
        if !(self.frame_interval_ms.is_finite() && self.frame_interval_ms > 0.0) {
            return Err(TuningError::BadFrameInterval(self.frame_interval_ms));
        }
        if self.confetti_count > MAX_CONFETTI {
            return Err(TuningError::TooMuchConfetti(self.confetti_count));
        }
        // NaN and infinities fail the comparison and land here too
        if !(self.spawn_y.is_finite() && self.offscreen_y.is_finite())
            || !(self.spawn_y < self.offscreen_y)
        {
            return Err(TuningError::OffscreenAboveSpawn {
                spawn_y: self.spawn_y,
                offscreen_y: self.offscreen_y,
            });
        }
        check_range("spawn x", self.spawn_x_min, self.spawn_x_max, X_BOUNDS)?;
        // A single step may cross the whole play area, but no more
        let fall_span = self.offscreen_y - self.spawn_y;
        check_range("speed", self.speed_min, self.speed_max, (0.0, fall_span))?;
        if self.speed_min <= 0.0 {
            return Err(TuningError::OutOfBounds {
                name: "speed",
                min: self.speed_min,
                max: self.speed_max,
                low: 0.0,
                high: fall_span,
            });
        }
        Ok(self)
    }

    /// Score as a fraction of the target, clamped to [0, 1]
    pub fn progress(&self, score: u32) -> f32 {
        (score as f32 / self.target_score as f32).clamp(0.0, 1.0)
    }
}

/// `min..max` must be non-empty and inside `low..=high`, which keeps the
/// width finite for `Rng::random_range`
fn check_range(name: &'static str, min: f32, max: f32, (low, high): (f32, f32)) -> Result<(), TuningError> {
    if !(min < max) {
        return Err(TuningError::EmptyRange { name, min, max });
    }
    if !(low <= min && max <= high) {
        return Err(TuningError::OutOfBounds {
            name,
            min,
            max,
            low,
            high,
        });
    }
    Ok(())
}
