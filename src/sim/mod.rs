//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Throttled fixed-size movement steps only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies beyond the `platform` traits

pub mod controller;
pub mod state;
pub mod tick;

pub use controller::{GameController, Intent, PlayingTasks};
pub use state::{ConfettiParticle, GamePhase, GameState, Tulip, confetti_burst};
pub use tick::{FrameThrottle, step};
