//! Flip Engine
//!
//! Coordinator owning the ledger and the registry behind one lock. Every
//! mutation (create, join, resolve/settle) takes the write lock, so no two
//! operations interleave mid-mutation; the lock is never held across an
//! await point.

use super::matchmaking;
use super::registry::GameRegistry;
use super::resolver::FlipScheduler;
use super::settlement;
use super::types::{Game, GameStatus, Side, Wager};
use crate::config::GameConfig;
use crate::errors::{AuthError, GameError};
use crate::events::ServerEvent;
use crate::ledger::{starter_skins, AccountSnapshot, UserLedger};
use crate::notify::Notifier;
use rand::Rng;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
struct WorldState {
    ledger: UserLedger,
    registry: GameRegistry,
}

pub struct FlipEngine {
    state: RwLock<WorldState>,
    scheduler: FlipScheduler,
    notifier: Notifier,
    config: GameConfig,
}

impl FlipEngine {
    pub fn new(config: GameConfig, notifier: Notifier) -> Self {
        Self {
            state: RwLock::new(WorldState::default()),
            scheduler: FlipScheduler::new(Duration::from_millis(config.flip_delay_ms)),
            notifier,
            config,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn scheduler(&self) -> &FlipScheduler {
        &self.scheduler
    }

    /// Create an account with the configured starting balance and skins.
    pub fn register_user(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let mut state = self.state.write().unwrap();
        state.ledger.register(
            username,
            password,
            self.config.starting_balance,
            starter_skins(self.config.starter_skins),
        )?;
        info!(%username, "user registered");
        Ok(())
    }

    /// Verify credentials for an existing account.
    pub fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let state = self.state.read().unwrap();
        let account = state
            .ledger
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;
        if !account.verify_password(password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }

    /// Bind a connection handle and return the account snapshot for the
    /// `auth_success` greeting.
    pub fn connect(&self, username: &str, connection: Uuid) -> Result<AccountSnapshot, GameError> {
        let mut state = self.state.write().unwrap();
        state
            .ledger
            .attach_connection(username, connection)
            .ok_or_else(|| GameError::UnknownUser(username.to_string()))
    }

    /// Clear the connection handle if this socket still owns it. Pending
    /// flips are never cancelled by a disconnect.
    pub fn disconnect(&self, username: &str, connection: Uuid) {
        let mut state = self.state.write().unwrap();
        state.ledger.detach_connection(username, connection);
    }

    pub fn waiting_games(&self) -> Vec<Game> {
        self.state.read().unwrap().registry.waiting_games()
    }

    pub fn game(&self, game_id: u64) -> Option<Game> {
        self.state.read().unwrap().registry.get(game_id).cloned()
    }

    pub fn snapshot(&self, username: &str) -> Option<AccountSnapshot> {
        self.state.read().unwrap().ledger.snapshot(username)
    }

    /// Create a waiting game from the proposer's wager. Affordability is
    /// deliberately not checked here.
    pub fn create_game(&self, user: &str, choice: Side, wager: Wager) -> Result<u64, GameError> {
        let (game_id, waiting) = {
            let mut state = self.state.write().unwrap();
            if !state.ledger.contains(user) {
                return Err(GameError::UnknownUser(user.to_string()));
            }
            let game_id = matchmaking::propose(&mut state.registry, user, choice, wager);
            (game_id, state.registry.waiting_games())
        };

        info!(game_id, %user, "game created");
        self.notifier.send_to(user, ServerEvent::GameCreated { game_id });
        self.notifier
            .broadcast(ServerEvent::GameListUpdate { games: waiting });
        Ok(game_id)
    }

    /// Pair `user` into a waiting game, notify both participants, and arm
    /// the resolution timer for this game.
    pub fn join_game(
        self: &Arc<Self>,
        user: &str,
        game_id: u64,
        choice: Side,
        wager: Wager,
    ) -> Result<(), GameError> {
        let game = {
            let mut state = self.state.write().unwrap();
            if !state.ledger.contains(user) {
                return Err(GameError::UnknownUser(user.to_string()));
            }
            matchmaking::join(&mut state.registry, game_id, user, choice, wager)?
        };

        info!(game_id, proposer = %game.proposer.user, joiner = %user, "game started");
        self.notifier
            .send_to(&game.proposer.user, ServerEvent::GameStarted { game: game.clone() });
        self.notifier
            .send_to(user, ServerEvent::GameStarted { game: game.clone() });

        let engine = Arc::clone(self);
        self.scheduler.schedule(game_id, async move {
            if let Err(err) = engine.resolve(game_id) {
                warn!(game_id, %err, "flip resolution failed");
            }
        });
        Ok(())
    }

    /// Timer entry point: draw a uniform outcome and settle.
    pub fn resolve(&self, game_id: u64) -> Result<Side, GameError> {
        let result = if rand::thread_rng().gen_bool(0.5) {
            Side::Ct
        } else {
            Side::T
        };
        self.resolve_with(game_id, result)
    }

    /// Resolve with a known outcome, split out so tests can drive a
    /// deterministic coin. Resolving anything but an ongoing game is an
    /// explicit error and never moves a stake twice.
    pub fn resolve_with(&self, game_id: u64, result: Side) -> Result<Side, GameError> {
        let (game, settlement, winner_snapshot, loser_snapshot, waiting) = {
            let mut state = self.state.write().unwrap();
            let game = state
                .registry
                .get_mut(game_id)
                .ok_or(GameError::GameNotFound(game_id))?;
            if game.status != GameStatus::Ongoing {
                return Err(GameError::AlreadyResolved(game_id));
            }
            game.result = Some(result);
            game.status = GameStatus::Finished;
            let game = game.clone();

            let settlement = settlement::settle(&mut state.ledger, &game)?;
            let winner_snapshot = state.ledger.snapshot(&settlement.winner);
            let loser_snapshot = state.ledger.snapshot(&settlement.loser);
            let waiting = state.registry.waiting_games();
            (game, settlement, winner_snapshot, loser_snapshot, waiting)
        };
        self.scheduler.complete(game_id);

        info!(
            game_id,
            result = %result,
            winner = %settlement.winner,
            loser = %settlement.loser,
            "flip resolved"
        );

        self.notifier
            .send_to(&settlement.winner, ServerEvent::GameResult { game: game.clone() });
        self.notifier
            .send_to(&settlement.loser, ServerEvent::GameResult { game });
        self.notifier
            .broadcast(ServerEvent::GameListUpdate { games: waiting });

        for (user, snapshot) in [
            (&settlement.winner, winner_snapshot),
            (&settlement.loser, loser_snapshot),
        ] {
            if let Some(snapshot) = snapshot {
                self.notifier.send_to(
                    user,
                    ServerEvent::UpdateBalanceSkins {
                        balance: snapshot.balance,
                        skins: snapshot.skins,
                    },
                );
            }
        }

        Ok(result)
    }

    /// Relay a chat line to everyone connected.
    pub fn chat(&self, username: &str, message: String) {
        self.notifier.broadcast(ServerEvent::ChatMessage {
            username: username.to_string(),
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::settlement::SettlementError;

    fn engine(flip_delay_ms: u64) -> Arc<FlipEngine> {
        let config = GameConfig {
            flip_delay_ms,
            starting_balance: 1000,
            starter_skins: 3,
        };
        let engine = Arc::new(FlipEngine::new(config, Notifier::new(64)));
        engine.register_user("alice", "pw").unwrap();
        engine.register_user("bob", "pw").unwrap();
        engine
    }

    // A delay long enough that the armed timer never fires inside a test,
    // so resolution can be driven deterministically.
    const NEVER_MS: u64 = 60_000;

    fn coins(amount: u64) -> Wager {
        Wager::Coins { amount }
    }

    #[tokio::test]
    async fn create_then_join_walks_the_status_chain() {
        let engine = engine(NEVER_MS);
        let id = engine.create_game("alice", Side::Ct, coins(50)).unwrap();
        assert_eq!(engine.game(id).unwrap().status, GameStatus::Waiting);

        engine.join_game("bob", id, Side::T, coins(50)).unwrap();
        let game = engine.game(id).unwrap();
        assert_eq!(game.status, GameStatus::Ongoing);
        assert_eq!(game.opponent.unwrap().user, "bob");
        assert_eq!(engine.scheduler().pending_count(), 1);
        assert!(engine.waiting_games().is_empty());
    }

    #[tokio::test]
    async fn unknown_user_cannot_create_or_join() {
        let engine = engine(NEVER_MS);
        let err = engine.create_game("mallory", Side::Ct, coins(50)).unwrap_err();
        assert_eq!(err, GameError::UnknownUser("mallory".to_string()));

        let id = engine.create_game("alice", Side::Ct, coins(50)).unwrap();
        let err = engine
            .join_game("mallory", id, Side::T, coins(50))
            .unwrap_err();
        assert_eq!(err, GameError::UnknownUser("mallory".to_string()));
    }

    #[tokio::test]
    async fn deterministic_resolution_settles_coins() {
        let engine = engine(NEVER_MS);
        let id = engine.create_game("alice", Side::Ct, coins(100)).unwrap();
        engine.join_game("bob", id, Side::T, coins(150)).unwrap();

        let result = engine.resolve_with(id, Side::Ct).unwrap();
        assert_eq!(result, Side::Ct);

        let game = engine.game(id).unwrap();
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.result, Some(Side::Ct));

        assert_eq!(engine.snapshot("alice").unwrap().balance, 1200);
        assert_eq!(engine.snapshot("bob").unwrap().balance, 900);
        assert_eq!(engine.scheduler().pending_count(), 0);
    }

    #[tokio::test]
    async fn resolving_huge_stakes_saturates_and_keeps_the_engine_usable() {
        let engine = engine(NEVER_MS);
        let id = engine
            .create_game("alice", Side::Ct, coins(u64::MAX))
            .unwrap();
        engine.join_game("bob", id, Side::T, coins(u64::MAX)).unwrap();

        engine.resolve_with(id, Side::Ct).unwrap();
        assert_eq!(engine.snapshot("alice").unwrap().balance, u64::MAX);
        assert_eq!(engine.snapshot("bob").unwrap().balance, 0);

        // The state lock must still be serviceable after settlement.
        assert!(engine.waiting_games().is_empty());
        engine.create_game("bob", Side::T, coins(10)).unwrap();
        assert_eq!(engine.waiting_games().len(), 1);
    }

    #[tokio::test]
    async fn resolving_twice_is_an_error_and_moves_nothing() {
        let engine = engine(NEVER_MS);
        let id = engine.create_game("alice", Side::Ct, coins(50)).unwrap();
        engine.join_game("bob", id, Side::T, coins(50)).unwrap();

        engine.resolve_with(id, Side::Ct).unwrap();
        let err = engine.resolve_with(id, Side::T).unwrap_err();
        assert_eq!(err, GameError::AlreadyResolved(id));

        assert_eq!(engine.snapshot("alice").unwrap().balance, 1100);
        assert_eq!(engine.snapshot("bob").unwrap().balance, 950);
        assert_eq!(engine.game(id).unwrap().result, Some(Side::Ct));
    }

    #[tokio::test]
    async fn resolving_a_waiting_game_is_rejected() {
        let engine = engine(NEVER_MS);
        let id = engine.create_game("alice", Side::Ct, coins(50)).unwrap();
        let err = engine.resolve_with(id, Side::Ct).unwrap_err();
        assert_eq!(err, GameError::AlreadyResolved(id));
        assert!(engine.game(id).unwrap().is_waiting());
    }

    #[tokio::test]
    async fn timer_resolves_the_game_end_to_end() {
        let engine = engine(30);
        let id = engine.create_game("alice", Side::Ct, coins(50)).unwrap();
        engine.join_game("bob", id, Side::T, coins(50)).unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        let game = engine.game(id).unwrap();
        assert_eq!(game.status, GameStatus::Finished);
        let result = game.result.unwrap();
        assert!(result == Side::Ct || result == Side::T);

        // Exactly one side matched, so exactly 100 coins changed hands.
        let alice = engine.snapshot("alice").unwrap().balance;
        let bob = engine.snapshot("bob").unwrap().balance;
        if result == Side::Ct {
            assert_eq!((alice, bob), (1100, 950));
        } else {
            assert_eq!((alice, bob), (950, 1100));
        }
    }

    #[tokio::test]
    async fn skin_games_transfer_ownership() {
        let engine = engine(NEVER_MS);
        let id = engine
            .create_game("alice", Side::Ct, Wager::Skin { id: 1 })
            .unwrap();
        engine
            .join_game("bob", id, Side::T, Wager::Skin { id: 2 })
            .unwrap();

        engine.resolve_with(id, Side::T).unwrap();

        let alice = engine.snapshot("alice").unwrap();
        let bob = engine.snapshot("bob").unwrap();
        assert_eq!(alice.skins.len(), 2);
        assert_eq!(bob.skins.len(), 4);
        assert!(bob.skins.iter().any(|s| s.id == 1));
    }

    #[tokio::test]
    async fn settlement_precondition_errors_pass_through() {
        // Corrupting a game into "ongoing without opponent" is impossible
        // through the public API; the conversion is still exercised here.
        let err: GameError = SettlementError::MissingOpponent(3).into();
        assert_eq!(
            err,
            GameError::Settlement(SettlementError::MissingOpponent(3))
        );
    }
}
