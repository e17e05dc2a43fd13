//! Game data model: sides, wagers, and the flip record itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coin side. Exactly two symmetric values exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Ct,
    T,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Ct => Side::T,
            Side::T => Side::Ct,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Ct => write!(f, "ct"),
            Side::T => write!(f, "t"),
        }
    }
}

/// The stake one side commits: a coin amount or one specific owned skin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Wager {
    Coins { amount: u64 },
    Skin { id: u32 },
}

impl Wager {
    pub fn is_skin(&self) -> bool {
        matches!(self, Wager::Skin { .. })
    }

    /// Settlement is only defined when both sides stake the same kind.
    pub fn same_kind(&self, other: &Wager) -> bool {
        self.is_skin() == other.is_skin()
    }
}

/// One participant's position in a two-player game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSide {
    pub user: String,
    pub choice: Side,
    pub wager: Wager,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Ongoing,
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Waiting => write!(f, "waiting"),
            GameStatus::Ongoing => write!(f, "ongoing"),
            GameStatus::Finished => write!(f, "finished"),
        }
    }
}

/// A two-player flip. Status only ever moves waiting -> ongoing -> finished;
/// `result` is written exactly once, at the terminal transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    pub id: u64,
    pub proposer: GameSide,
    pub opponent: Option<GameSide>,
    pub status: GameStatus,
    pub result: Option<Side>,
    pub created_at: u64,
}

impl Game {
    pub fn new(id: u64, proposer: GameSide) -> Self {
        Self {
            id,
            proposer,
            opponent: None,
            status: GameStatus::Waiting,
            result: None,
            created_at: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == GameStatus::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_are_opposite() {
        assert_eq!(Side::Ct.opposite(), Side::T);
        assert_eq!(Side::T.opposite(), Side::Ct);
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Ct).unwrap(), r#""ct""#);
        assert_eq!(serde_json::to_string(&Side::T).unwrap(), r#""t""#);
    }

    #[test]
    fn wager_kinds() {
        let coins = Wager::Coins { amount: 50 };
        let skin = Wager::Skin { id: 1 };
        assert!(!coins.is_skin());
        assert!(skin.is_skin());
        assert!(coins.same_kind(&Wager::Coins { amount: 100 }));
        assert!(!coins.same_kind(&skin));
    }

    #[test]
    fn new_game_is_waiting_and_unresolved() {
        let game = Game::new(
            1,
            GameSide {
                user: "alice".to_string(),
                choice: Side::Ct,
                wager: Wager::Coins { amount: 50 },
            },
        );
        assert!(game.is_waiting());
        assert!(game.opponent.is_none());
        assert!(game.result.is_none());
    }
}
