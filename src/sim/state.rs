//! Game state and core simulation types
//!
//! Everything the presentation shell reads lives here.

use rand::Rng;
use serde::Serialize;

use crate::consts::{CONFETTI_EMOJI, CONFETTI_MAX_DELAY_SECS};
use crate::tuning::Tuning;

/// Current phase of the mini-game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Start screen, nothing falling
    NotStarted,
    /// Tulips spawning and falling
    Playing,
    /// Target reached, invite card unlocked
    Won,
}

/// A falling tulip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tulip {
    pub id: u32,
    /// Horizontal position (percent of play area width)
    pub x: f32,
    /// Vertical position (percent of play area height)
    pub y: f32,
    /// Fall distance per step (percent)
    pub speed: f32,
}

impl Tulip {
    /// Draw a fresh tulip from the tuning's spawn band
    pub fn random<R: Rng>(id: u32, tuning: &Tuning, rng: &mut R) -> Self {
        Self {
            id,
            x: rng.random_range(tuning.spawn_x_min..tuning.spawn_x_max),
            y: tuning.spawn_y,
            speed: rng.random_range(tuning.speed_min..tuning.speed_max),
        }
    }

    pub fn fall(&mut self) {
        self.y += self.speed;
    }
}

/// Decorative particle shown over the victory screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfettiParticle {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub emoji: &'static str,
    /// CSS animation delay (seconds)
    pub delay_secs: f32,
}

impl ConfettiParticle {
    pub fn random<R: Rng>(id: u32, rng: &mut R) -> Self {
        Self {
            id,
            x: rng.random_range(0.0..100.0),
            y: rng.random_range(0.0..100.0),
            emoji: CONFETTI_EMOJI[rng.random_range(0..CONFETTI_EMOJI.len())],
            delay_secs: rng.random_range(0.0..CONFETTI_MAX_DELAY_SECS),
        }
    }
}

/// Generate a full confetti burst
pub fn confetti_burst<R: Rng>(count: u32, rng: &mut R) -> Vec<ConfettiParticle> {
    (0..count)
        .map(|id| ConfettiParticle::random(id, rng))
        .collect()
}

/// Snapshot of one game session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameState {
    pub started: bool,
    pub score: u32,
    /// Active tulips in spawn order
    pub tulips: Vec<Tulip>,
    pub victory: bool,
    #[serde(skip)]
    pub confetti: Vec<ConfettiParticle>,
}

impl GameState {
    pub fn phase(&self) -> GamePhase {
        match (self.started, self.victory) {
            (_, true) => GamePhase::Won,
            (true, false) => GamePhase::Playing,
            (false, false) => GamePhase::NotStarted,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == GamePhase::Playing
    }

    pub fn tulip(&self, id: u32) -> Option<&Tulip> {
        self.tulips.iter().find(|t| t.id == id)
    }

    /// Remove a tulip by id, returning it if it was still falling
    pub fn take_tulip(&mut self, id: u32) -> Option<Tulip> {
        let index = self.tulips.iter().position(|t| t.id == id)?;
        Some(self.tulips.remove(index))
    }

    /// Back to the start screen
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
