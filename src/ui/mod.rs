//! Presentation shell
//!
//! `view` is pure and runs anywhere; `dom` applies it to a browser page.

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub use dom::TulipCatcher;
pub use view::{Screen, build};
