//! Error types for the skinflip server
//!
//! Everything the core surfaces to callers; transport-level error envelopes
//! live in `api::errors`.

use thiserror::Error;

/// Errors raised by matchmaking and resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game {0} not found")]
    GameNotFound(u64),

    #[error("game {0} is no longer joinable")]
    GameNotJoinable(u64),

    #[error("cannot join your own game")]
    SelfJoin,

    #[error("choose the opposite side")]
    SideConflict,

    #[error("both sides must stake the same kind of wager")]
    WagerMismatch,

    #[error("game {0} has already been resolved")]
    AlreadyResolved(u64),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Settlement(#[from] crate::games::settlement::SettlementError),
}

/// Errors raised by registration and login.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("username taken")]
    UsernameTaken,

    #[error("invalid username or password")]
    InvalidCredentials,
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}
