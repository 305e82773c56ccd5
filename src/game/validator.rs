//! Single accept-or-reject decision for a requested action.
//!
//! Checks run in a fixed order and short-circuit on the first failure:
//! turn, player status, round liveness, rules legality, then amount bounds.
//! Validation is purely advisory — it never mutates anything, so a rejected
//! action leaves every stack, bet, and round field untouched.

use super::entities::{ActionKind, Chips, PlayerState, PlayerStatus};
use super::errors::{RoomError, RoomResult};
use super::round::BettingRoundState;
use super::rules;

/// Validate a requested action against the live round. `amount` is the
/// player's intended *new round total* for a raise, and the bet size for a
/// bet; it is ignored for every other action.
pub fn validate_action(
    player: &PlayerState,
    kind: ActionKind,
    amount: Option<Chips>,
    big_blind: Chips,
    round: &BettingRoundState,
) -> RoomResult<()> {
    if round.action_seat != Some(player.seat_number) {
        return Err(RoomError::NotYourTurn);
    }

    if player.status != PlayerStatus::Active {
        return Err(RoomError::NotActive(player.status));
    }

    if round.is_complete {
        return Err(RoomError::RoundComplete);
    }

    rules::action_legality(kind, player, round)?;

    match kind {
        ActionKind::Bet => {
            let amount = amount.filter(|a| *a > 0).ok_or(RoomError::AmountRequired)?;
            if amount < rules::minimum_bet(big_blind) {
                return Err(RoomError::BetTooSmall {
                    min: rules::minimum_bet(big_blind),
                });
            }
            if amount > player.stack {
                return Err(RoomError::AmountExceedsStack);
            }
        }
        ActionKind::Raise => {
            if round.is_raise_capped(player.player_id) {
                return Err(RoomError::RaiseNotReopened);
            }
            let amount = amount.filter(|a| *a > 0).ok_or(RoomError::AmountRequired)?;
            if amount <= round.highest_bet {
                return Err(RoomError::RaiseTooLow {
                    highest: round.highest_bet,
                });
            }
            if amount - player.current_bet < rules::minimum_raise(round) {
                return Err(RoomError::RaiseTooSmall {
                    min: rules::minimum_raise(round),
                });
            }
            if amount > player.stack + player.current_bet {
                return Err(RoomError::AmountExceedsStack);
            }
        }
        // A short call is an implicit all-in, so no stack bound applies;
        // all-in, check, and fold carry no amount at all.
        ActionKind::Call | ActionKind::AllIn | ActionKind::Check | ActionKind::Fold => {}
    }

    Ok(())
}
