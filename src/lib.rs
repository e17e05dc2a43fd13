//! Skinflip - Real-Time Coin-Flip Wagering Server
//!
//! Two players stake virtual coins or cosmetic skins on a coin flip; a
//! server-side timer resolves the outcome and settlement transfers the
//! stake from loser to winner. All state is in-memory and lives only as
//! long as the process.

pub mod api;
pub mod config;
pub mod errors;
pub mod events;
pub mod games;
pub mod ledger;
pub mod notify;

pub use games::FlipEngine;
