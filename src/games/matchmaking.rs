//! Matchmaking
//!
//! Game creation and the join-time checks guarding the waiting -> ongoing
//! transition. Creation always succeeds for a known user; affordability of
//! the wager is deliberately not checked.

use super::registry::GameRegistry;
use super::types::{GameSide, GameStatus, Side, Wager};
use crate::errors::GameError;

/// Create a waiting game from the proposer's wager.
pub fn propose(registry: &mut GameRegistry, user: &str, choice: Side, wager: Wager) -> u64 {
    registry.create(GameSide {
        user: user.to_string(),
        choice,
        wager,
    })
}

/// Pair `user` into a waiting game. On success the game is ongoing and a
/// snapshot is returned; on any error the game is left untouched.
pub fn join(
    registry: &mut GameRegistry,
    game_id: u64,
    user: &str,
    choice: Side,
    wager: Wager,
) -> Result<super::types::Game, GameError> {
    let game = registry
        .get_mut(game_id)
        .ok_or(GameError::GameNotFound(game_id))?;

    if game.status != GameStatus::Waiting {
        return Err(GameError::GameNotJoinable(game_id));
    }
    if game.proposer.user == user {
        return Err(GameError::SelfJoin);
    }
    if game.proposer.choice == choice {
        return Err(GameError::SideConflict);
    }
    if !game.proposer.wager.same_kind(&wager) {
        return Err(GameError::WagerMismatch);
    }

    game.opponent = Some(GameSide {
        user: user.to_string(),
        choice,
        wager,
    });
    game.status = GameStatus::Ongoing;
    Ok(game.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins(amount: u64) -> Wager {
        Wager::Coins { amount }
    }

    fn registry_with_game() -> (GameRegistry, u64) {
        let mut registry = GameRegistry::new();
        let id = propose(&mut registry, "alice", Side::Ct, coins(50));
        (registry, id)
    }

    #[test]
    fn join_pairs_and_starts_the_game() {
        let (mut registry, id) = registry_with_game();
        let game = join(&mut registry, id, "bob", Side::T, coins(50)).unwrap();

        assert_eq!(game.status, GameStatus::Ongoing);
        let opponent = game.opponent.unwrap();
        assert_eq!(opponent.user, "bob");
        assert_eq!(opponent.choice, Side::T);
        assert!(registry.waiting_games().is_empty());
    }

    #[test]
    fn unknown_game_is_rejected() {
        let (mut registry, _) = registry_with_game();
        let err = join(&mut registry, 99, "bob", Side::T, coins(50)).unwrap_err();
        assert_eq!(err, GameError::GameNotFound(99));
    }

    #[test]
    fn self_join_is_rejected() {
        let (mut registry, id) = registry_with_game();
        let err = join(&mut registry, id, "alice", Side::T, coins(50)).unwrap_err();
        assert_eq!(err, GameError::SelfJoin);
        assert!(registry.get(id).unwrap().is_waiting());
    }

    #[test]
    fn equal_choice_is_a_side_conflict_and_leaves_game_waiting() {
        let (mut registry, id) = registry_with_game();
        let err = join(&mut registry, id, "bob", Side::Ct, coins(50)).unwrap_err();
        assert_eq!(err, GameError::SideConflict);

        let game = registry.get(id).unwrap();
        assert!(game.is_waiting());
        assert!(game.opponent.is_none());
    }

    #[test]
    fn mixed_wager_kinds_are_rejected_at_join() {
        let (mut registry, id) = registry_with_game();
        let err = join(&mut registry, id, "bob", Side::T, Wager::Skin { id: 1 }).unwrap_err();
        assert_eq!(err, GameError::WagerMismatch);
        assert!(registry.get(id).unwrap().is_waiting());
    }

    #[test]
    fn ongoing_game_is_not_joinable() {
        let (mut registry, id) = registry_with_game();
        join(&mut registry, id, "bob", Side::T, coins(50)).unwrap();

        let err = join(&mut registry, id, "carol", Side::T, coins(50)).unwrap_err();
        assert_eq!(err, GameError::GameNotJoinable(id));
    }
}
