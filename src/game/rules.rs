//! Pure betting-rules predicates.
//!
//! Everything here is side-effect-free and reads only the player and round
//! passed in. Turn order and amount bounds are the validator's business;
//! these functions decide whether an action *type* fits the round state.

use super::entities::{ActionKind, Chips, PlayerState};
use super::errors::{RoomError, RoomResult};
use super::round::BettingRoundState;

/// The smallest legal opening bet.
pub fn minimum_bet(big_blind: Chips) -> Chips {
    big_blind
}

/// The smallest legal raise increment: the size of the last full raise, or
/// the big blind while none has been made.
pub fn minimum_raise(round: &BettingRoundState) -> Chips {
    round.minimum_raise
}

/// Whether the action type is legal for this player in this round.
///
/// A call with a stack short of the full amount is legal — it resolves as an
/// implicit all-in. Betting is only open while nothing is outstanding
/// (`highest_bet == 0`), which preflop never is: the blinds open the
/// betting, so preflop aggression is always a raise, including from a
/// player whose current bet already matches the highest. Whether a matched
/// player is ever asked to act is turn order's decision, not this one.
pub fn action_legality(
    kind: ActionKind,
    player: &PlayerState,
    round: &BettingRoundState,
) -> RoomResult<()> {
    let to_call = round.amount_to_call(player.current_bet);
    match kind {
        ActionKind::Check if to_call > 0 => Err(RoomError::CannotCheck),
        ActionKind::Check => Ok(()),

        ActionKind::Call if to_call == 0 => Err(RoomError::NothingToCall),
        ActionKind::Call if player.stack == 0 => Err(RoomError::EmptyStack),
        ActionKind::Call => Ok(()),

        ActionKind::Bet if round.highest_bet > 0 => Err(RoomError::BetNotAllowed),
        ActionKind::Bet => Ok(()),

        ActionKind::Raise if round.highest_bet == 0 => Err(RoomError::RaiseNotAllowed),
        ActionKind::Raise => Ok(()),

        ActionKind::Fold => Ok(()),

        ActionKind::AllIn if player.stack == 0 => Err(RoomError::EmptyStack),
        ActionKind::AllIn => Ok(()),
    }
}

/// Whether an all-in constitutes a full raise that reopens the action for
/// players who already acted at the previous bet level. A short all-in —
/// one whose increment over the previous highest bet is below the minimum
/// raise — does not.
pub fn all_in_reopens_action(
    all_in_total: Chips,
    previous_highest: Chips,
    minimum_raise: Chips,
) -> bool {
    all_in_total.saturating_sub(previous_highest) >= minimum_raise
}
