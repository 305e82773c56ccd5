//! Turn-order computation and betting-round completion.
//!
//! These functions take the seat table and player map as plain references
//! so the room layer can call them while it holds a mutable borrow of the
//! live round. Completion is always computed fresh from current state,
//! never cached.

use std::collections::HashMap;

use super::entities::{PlayerId, PlayerState, PlayerStatus, Seat, SeatNumber};
use super::round::BettingRoundState;

fn player_at<'a>(
    seat_number: SeatNumber,
    seats: &[Seat],
    players: &'a HashMap<PlayerId, PlayerState>,
) -> Option<&'a PlayerState> {
    seats
        .iter()
        .find(|s| s.seat_number == seat_number)?
        .player_id
        .and_then(|id| players.get(&id))
}

/// Walk the seats clockwise starting just after `from`, wrapping at
/// `max_seats → 1`, and return the first seat whose player is active.
/// Unoccupied seats and folded/all-in players are skipped. At most one full
/// lap is taken; `None` means nobody can act.
pub fn next_action_seat(
    from: SeatNumber,
    max_seats: SeatNumber,
    seats: &[Seat],
    players: &HashMap<PlayerId, PlayerState>,
) -> Option<SeatNumber> {
    let mut seat = from;
    for _ in 0..max_seats {
        seat = if seat >= max_seats { 1 } else { seat + 1 };
        if let Some(player) = player_at(seat, seats, players)
            && player.status == PlayerStatus::Active
        {
            return Some(seat);
        }
    }
    None
}

/// Whether the betting round has closed. True when any of:
/// 1. all but one of the dealt-in players have folded,
/// 2. no active player remains and at least one is all-in,
/// 3. every active player has matched the highest bet.
///
/// Matching is the whole test: chips posted as a blind count the same as
/// chips posted by an action, so a round with every live bet level closes
/// without waiting on anyone.
pub fn is_round_complete(
    players: &HashMap<PlayerId, PlayerState>,
    round: &BettingRoundState,
) -> bool {
    let mut active = 0usize;
    let mut folded = 0usize;
    let mut all_in = 0usize;
    let mut pending = 0usize;

    for player in players.values() {
        match player.status {
            PlayerStatus::Active => {
                active += 1;
                if player.current_bet != round.highest_bet {
                    pending += 1;
                }
            }
            PlayerStatus::Folded => folded += 1,
            PlayerStatus::AllIn => all_in += 1,
            PlayerStatus::SittingOut | PlayerStatus::Disconnected => {}
        }
    }

    let dealt_in = active + folded + all_in;
    if dealt_in > 0 && folded == dealt_in - 1 {
        return true;
    }
    if active == 0 && all_in > 0 {
        return true;
    }
    active > 0 && pending == 0
}

/// Recompute the acting seat after an accepted action: freeze the round if
/// it is complete, otherwise advance to the next eligible seat (freezing if
/// no seat remains).
pub fn advance(
    max_seats: SeatNumber,
    seats: &[Seat],
    players: &HashMap<PlayerId, PlayerState>,
    round: &mut BettingRoundState,
) {
    if is_round_complete(players, round) {
        log::debug!("betting round {} complete", round.round_id);
        round.mark_complete();
        return;
    }

    let Some(current) = round.action_seat else {
        return;
    };

    match next_action_seat(current, max_seats, seats, players) {
        Some(seat) => round.action_seat = Some(seat),
        None => round.mark_complete(),
    }
}
