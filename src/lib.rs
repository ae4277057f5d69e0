//! Tulip Catcher - A Valentine greeting with a falling-tulip mini-game
//!
//! Core modules:
//! - `sim`: Deterministic game loop (spawning, movement, score, victory)
//! - `ui`: View model and DOM presentation shell
//! - `platform`: Browser/native platform abstraction (haptics, recurring tasks)
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use sim::{GameController, GamePhase, GameState, Intent, Tulip};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Catches required to unlock the invite card
    pub const TARGET_SCORE: u32 = 10;

    /// Spawn timer period (ms)
    pub const SPAWN_INTERVAL_MS: u32 = 400;
    /// Minimum host time between two movement steps (ms)
    pub const FRAME_INTERVAL_MS: f64 = 16.0;

    /// Horizontal spawn band, percent of the play area width
    pub const SPAWN_X_MIN: f32 = 5.0;
    pub const SPAWN_X_MAX: f32 = 90.0;
    /// Fall speed, percent of the play area height per step
    pub const SPEED_MIN: f32 = 0.3;
    pub const SPEED_MAX: f32 = 1.3;
    /// Tulips start just above the visible area
    pub const SPAWN_Y: f32 = -10.0;
    /// Tulips at or past this line are off-screen and pruned
    pub const OFFSCREEN_Y: f32 = 110.0;

    /// Confetti particles generated on victory
    pub const CONFETTI_COUNT: u32 = 50;
    /// Upper bound for a confetti particle's animation delay (seconds)
    pub const CONFETTI_MAX_DELAY_SECS: f32 = 0.5;
    pub const CONFETTI_EMOJI: [&str; 5] = ["💕", "❤️", "🌷", "✨", "🎉"];

    /// Vibration length on a successful catch (ms)
    pub const HAPTIC_PULSE_MS: u32 = 50;
}

/// Format a percentage for an inline CSS length
#[inline]
pub fn css_percent(value: f32) -> String {
    format!("{value}%")
}
