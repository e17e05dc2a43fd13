//! Wire Protocol
//!
//! Tagged event types exchanged over the WebSocket. Event names are part of
//! the client contract (`create_game`, `game_list_update`, ...).

use crate::games::types::{Game, Side, Wager};
use crate::ledger::Skin;
use serde::{Deserialize, Serialize};

/// Client -> server intents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    CreateGame { choice: Side, wager: Wager },
    JoinGame { game_id: u64, choice: Side, wager: Wager },
    GetGameList,
    ChatMessage { message: String },
}

/// Server -> client events, addressed to one connection or broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    AuthSuccess {
        username: String,
        balance: u64,
        skins: Vec<Skin>,
    },
    GameCreated {
        game_id: u64,
    },
    GameListUpdate {
        games: Vec<Game>,
    },
    GameStarted {
        game: Game,
    },
    JoinError {
        message: String,
    },
    GameResult {
        game: Game,
    },
    UpdateBalanceSkins {
        balance: u64,
        skins: Vec<Skin>,
    },
    ChatMessage {
        username: String,
        message: String,
    },
    /// Explicit rejection for malformed or unauthorized intents.
    Error {
        message: String,
    },
}
