//! Game Lifecycle
//!
//! Matchmaking, the resolution timer, and the settlement engine, coordinated
//! by [`FlipEngine`].

pub mod engine;
pub mod matchmaking;
pub mod registry;
pub mod resolver;
pub mod settlement;
pub mod types;

pub use engine::FlipEngine;
