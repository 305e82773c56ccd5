//! One street's betting state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::entities::{ActionRecord, Chips, PlayerId, RoundId, SeatNumber};

/// Betting street. Only preflop is reachable in the current hand lifecycle;
/// the other variants mark the multi-street extension point.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        };
        write!(f, "{repr}")
    }
}

/// One betting round: whose turn it is, the outstanding bet, the raise
/// floor, and the chronological action log.
///
/// Invariants:
/// - `highest_bet` never decreases within the round.
/// - `minimum_raise` only changes on a full raise, i.e. when a new total
///   exceeds the previous highest bet by at least the current minimum.
/// - Once complete, `action_seat` is `None` and the round never reopens.
#[derive(Clone, Debug, PartialEq)]
pub struct BettingRoundState {
    pub round_id: RoundId,
    pub street: Street,
    /// Seat required to act, or `None` once the round is closed.
    pub action_seat: Option<SeatNumber>,
    pub highest_bet: Chips,
    pub minimum_raise: Chips,
    pub actions: Vec<ActionRecord>,
    /// Players barred from raising until a full raise reopens the action.
    /// Populated when a short all-in raises the highest bet by less than
    /// the minimum raise.
    raise_capped: BTreeSet<PlayerId>,
    pub is_complete: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BettingRoundState {
    /// Open a round. Preflop opens with the big blind as both the
    /// outstanding bet and the raise floor.
    pub fn new(street: Street, action_seat: Option<SeatNumber>, big_blind: Chips) -> Self {
        Self {
            round_id: Uuid::new_v4(),
            street,
            action_seat,
            highest_bet: big_blind,
            minimum_raise: big_blind,
            actions: Vec::new(),
            raise_capped: BTreeSet::new(),
            is_complete: false,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Chips the player still owes to match the outstanding bet.
    pub fn amount_to_call(&self, current_bet: Chips) -> Chips {
        self.highest_bet.saturating_sub(current_bet)
    }

    /// Register a player's new round total against the round. On a full
    /// raise the minimum raise becomes the increment and any raise caps are
    /// cleared; a short raise (only possible via all-in) leaves the minimum
    /// untouched for the caller to apply caps. The highest bet never
    /// decreases. Returns true iff this was a full raise.
    pub fn register_bet(&mut self, new_total: Chips) -> bool {
        let increment = new_total.saturating_sub(self.highest_bet);
        let full_raise = increment > 0 && increment >= self.minimum_raise;
        if full_raise {
            self.minimum_raise = increment;
            self.raise_capped.clear();
        }
        self.highest_bet = self.highest_bet.max(new_total);
        full_raise
    }

    /// Append an accepted action's record to the log.
    pub fn record(&mut self, action: ActionRecord) {
        self.actions.push(action);
    }

    /// Whether the player has taken an action this round. Posting a blind
    /// does not count as acting.
    pub fn has_acted(&self, player_id: PlayerId) -> bool {
        self.actions.iter().any(|a| a.player_id == player_id)
    }

    /// Bar the given players from raising until a full raise reopens action.
    pub fn cap_raises(&mut self, players: impl IntoIterator<Item = PlayerId>) {
        self.raise_capped.extend(players);
    }

    pub fn is_raise_capped(&self, player_id: PlayerId) -> bool {
        self.raise_capped.contains(&player_id)
    }

    /// Freeze the round. Terminal: the acting seat is cleared and the
    /// completion time stamped.
    pub fn mark_complete(&mut self) {
        self.is_complete = true;
        self.action_seat = None;
        self.completed_at = Some(Utc::now());
    }
}
