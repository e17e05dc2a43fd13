//! Game Registry
//!
//! Owns every game for the lifetime of the process. Ids are monotonic and
//! never reused; games are never deleted. Callers hold the engine's state
//! lock, so no interior locking is needed here.

use super::types::{Game, GameSide};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct GameRegistry {
    games: HashMap<u64, Game>,
    next_id: u64,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
            next_id: 1,
        }
    }

    /// Store a new waiting game and return its id.
    pub fn create(&mut self, proposer: GameSide) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.games.insert(id, Game::new(id, proposer));
        id
    }

    pub fn get(&self, id: u64) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    /// Snapshots of all games still accepting a second participant,
    /// oldest first.
    pub fn waiting_games(&self) -> Vec<Game> {
        let mut waiting: Vec<Game> = self
            .games
            .values()
            .filter(|game| game.is_waiting())
            .cloned()
            .collect();
        waiting.sort_by_key(|game| game.id);
        waiting
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::types::{Side, Wager};

    fn side(user: &str) -> GameSide {
        GameSide {
            user: user.to_string(),
            choice: Side::Ct,
            wager: Wager::Coins { amount: 50 },
        }
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut registry = GameRegistry::new();
        let first = registry.create(side("alice"));
        let second = registry.create(side("bob"));
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn waiting_list_is_sorted_and_waiting_only() {
        let mut registry = GameRegistry::new();
        let a = registry.create(side("alice"));
        let b = registry.create(side("bob"));
        registry.get_mut(a).unwrap().status = super::super::types::GameStatus::Ongoing;

        let waiting = registry.waiting_games();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, b);
    }
}
