//! Applies a validated action to player and round state.
//!
//! This is the single point where chips move: every branch satisfies
//! `Δstack == −Δcurrent_bet` for the acting player, and every branch
//! appends exactly one immutable record to the round's log.

use super::entities::{ActionKind, ActionRecord, Chips, PlayerState, PlayerStatus};
use super::errors::{RoomError, RoomResult};
use super::round::BettingRoundState;

/// Apply an already-validated action. The caller is responsible for having
/// run [`crate::game::validator::validate_action`] first; amounts are still
/// demanded for bet/raise so a skipped validation cannot move phantom chips.
pub fn apply_action(
    player: &mut PlayerState,
    kind: ActionKind,
    amount: Option<Chips>,
    round: &mut BettingRoundState,
) -> RoomResult<ActionRecord> {
    let previous_bet = player.current_bet;

    let resolved = match kind {
        ActionKind::Bet => {
            let amount = amount.filter(|a| *a > 0).ok_or(RoomError::AmountRequired)?;
            player.commit(amount);
            round.register_bet(player.current_bet);
            amount
        }
        ActionKind::Raise => {
            let amount = amount.filter(|a| *a > 0).ok_or(RoomError::AmountRequired)?;
            player.commit(amount.saturating_sub(previous_bet));
            round.register_bet(player.current_bet);
            // A raise records the new round total, not the increment.
            amount
        }
        ActionKind::Call => {
            let owed = round.amount_to_call(previous_bet);
            // Clamped by the stack: a short call resolves as an implicit
            // all-in inside `commit`.
            player.commit(owed)
        }
        ActionKind::Check => 0,
        ActionKind::Fold => {
            player.status = PlayerStatus::Folded;
            0
        }
        ActionKind::AllIn => {
            let paid = player.commit(player.stack);
            round.register_bet(player.current_bet);
            paid
        }
    };

    let record = ActionRecord::new(player.player_id, player.seat_number, kind, resolved);
    round.record(record.clone());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::round::Street;
    use uuid::Uuid;

    fn active_player(seat: u8, stack: Chips, current_bet: Chips) -> PlayerState {
        let mut p = PlayerState::new(Uuid::new_v4(), "tester".into(), seat, stack);
        p.current_bet = current_bet;
        p.status = PlayerStatus::Active;
        p
    }

    fn preflop() -> BettingRoundState {
        BettingRoundState::new(Street::Preflop, Some(1), 10)
    }

    fn total_chips(p: &PlayerState) -> Chips {
        p.stack + p.current_bet
    }

    #[test]
    fn raise_commits_only_the_increment() {
        let mut round = preflop();
        let mut player = active_player(1, 90, 10);
        let before = total_chips(&player);

        let record = apply_action(&mut player, ActionKind::Raise, Some(30), &mut round).unwrap();

        assert_eq!(player.current_bet, 30);
        assert_eq!(player.stack, 70);
        assert_eq!(record.amount, 30);
        assert_eq!(round.highest_bet, 30);
        assert_eq!(round.minimum_raise, 20);
        assert_eq!(total_chips(&player), before);
    }

    #[test]
    fn call_pays_the_gap() {
        let mut round = preflop();
        round.register_bet(30);
        let mut player = active_player(1, 95, 5);

        let record = apply_action(&mut player, ActionKind::Call, None, &mut round).unwrap();

        assert_eq!(record.amount, 25);
        assert_eq!(player.current_bet, 30);
        assert_eq!(player.stack, 70);
        assert_eq!(player.status, PlayerStatus::Active);
    }

    #[test]
    fn short_call_becomes_all_in() {
        let mut round = preflop();
        round.register_bet(50);
        let mut player = active_player(1, 15, 0);

        let record = apply_action(&mut player, ActionKind::Call, None, &mut round).unwrap();

        assert_eq!(record.amount, 15);
        assert_eq!(player.stack, 0);
        assert_eq!(player.current_bet, 15);
        assert_eq!(player.status, PlayerStatus::AllIn);
        // The highest bet belongs to the original raiser, untouched.
        assert_eq!(round.highest_bet, 50);
    }

    #[test]
    fn all_in_commits_the_whole_stack_on_top_of_the_blind() {
        let mut round = preflop();
        let mut player = active_player(2, 40, 5);

        let record = apply_action(&mut player, ActionKind::AllIn, None, &mut round).unwrap();

        assert_eq!(record.amount, 40);
        assert_eq!(player.stack, 0);
        assert_eq!(player.current_bet, 45);
        assert_eq!(player.status, PlayerStatus::AllIn);
        assert_eq!(round.highest_bet, 45);
    }

    #[test]
    fn check_and_fold_move_no_chips() {
        let mut round = preflop();
        let mut checker = active_player(1, 90, 10);
        let mut folder = active_player(2, 100, 0);
        let checker_before = total_chips(&checker);
        let folder_before = total_chips(&folder);

        let check = apply_action(&mut checker, ActionKind::Check, None, &mut round).unwrap();
        let fold = apply_action(&mut folder, ActionKind::Fold, None, &mut round).unwrap();

        assert_eq!(check.amount, 0);
        assert_eq!(fold.amount, 0);
        assert_eq!(total_chips(&checker), checker_before);
        assert_eq!(total_chips(&folder), folder_before);
        assert_eq!(folder.status, PlayerStatus::Folded);
        assert_eq!(round.actions.len(), 2);
    }

    #[test]
    fn every_action_appends_exactly_one_record() {
        let mut round = preflop();
        let mut player = active_player(1, 100, 0);
        apply_action(&mut player, ActionKind::Call, None, &mut round).unwrap();
        apply_action(&mut player, ActionKind::Check, None, &mut round).unwrap();
        assert_eq!(round.actions.len(), 2);
        assert!(round.has_acted(player.player_id));
    }
}
