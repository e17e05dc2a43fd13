//! HTTP + WebSocket Service
//!
//! The transport boundary around the flip engine: account endpoints,
//! session tokens, and the real-time game protocol.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::ApiServer;
