//! Settlement Engine
//!
//! Atomic stake transfer from loser to winner after resolution. The coin
//! rule is asymmetric on purpose: the winner gains double the smaller
//! declared stake and the loser only ever loses the smaller stake, even
//! when the declared amounts differ.

use super::types::{Game, Wager};
use crate::ledger::UserLedger;
use thiserror::Error;
use tracing::warn;

/// What a settlement actually moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    SkinMoved { skin_id: u32 },
    /// The loser no longer owned the wagered skin; nothing moved.
    SkinMissing { skin_id: u32 },
    CoinsMoved { winner_gain: u64, loser_loss: u64 },
    /// Wager kinds differ; nothing moved. Unreachable after the join-time
    /// kind check, kept so settlement never performs an undefined transfer.
    MixedWagers,
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub winner: String,
    pub loser: String,
    pub transfer: Transfer,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    #[error("game {0} has no second participant")]
    MissingOpponent(u64),

    #[error("game {0} has not been resolved")]
    Unresolved(u64),
}

/// Apply the stake transfer for a resolved game. Requires both sides
/// present and `result` set; exactly one side's choice matches the result
/// because sides were enforced opposite at join.
pub fn settle(ledger: &mut UserLedger, game: &Game) -> Result<Settlement, SettlementError> {
    let opponent = game
        .opponent
        .as_ref()
        .ok_or(SettlementError::MissingOpponent(game.id))?;
    let result = game.result.ok_or(SettlementError::Unresolved(game.id))?;

    let (winner, loser) = if game.proposer.choice == result {
        (&game.proposer, opponent)
    } else {
        (opponent, &game.proposer)
    };

    let transfer = match (&winner.wager, &loser.wager) {
        (Wager::Skin { .. }, Wager::Skin { id }) => match ledger.remove_skin(&loser.user, *id) {
            Some(skin) => {
                ledger.add_skin(&winner.user, skin);
                Transfer::SkinMoved { skin_id: *id }
            }
            None => {
                warn!(
                    game_id = game.id,
                    skin_id = *id,
                    loser = %loser.user,
                    "loser no longer owns the wagered skin; transfer skipped"
                );
                Transfer::SkinMissing { skin_id: *id }
            }
        },
        (Wager::Coins { amount: a }, Wager::Coins { amount: b }) => {
            // Stakes are raw client-supplied integers; the doubling must not
            // overflow inside the engine's critical section.
            let stake = (*a).min(*b);
            let gain = stake.saturating_mul(2);
            ledger.credit(&winner.user, gain);
            ledger.debit(&loser.user, stake);
            Transfer::CoinsMoved {
                winner_gain: gain,
                loser_loss: stake,
            }
        }
        _ => {
            warn!(game_id = game.id, "mixed wager kinds at settlement; no transfer");
            Transfer::MixedWagers
        }
    };

    Ok(Settlement {
        winner: winner.user.clone(),
        loser: loser.user.clone(),
        transfer,
    })
}
