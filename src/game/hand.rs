//! One full hand: button and blind assignments plus its betting rounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entities::{Chips, HandId, SeatNumber};
use super::round::{BettingRoundState, Street};

/// Lifecycle tag for a hand. Only `Preflop` is reachable: a hand is created
/// directly in preflop and never resolves (showdown is out of scope).
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandPhase {
    PreHand,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Completed,
}

impl fmt::Display for HandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreHand => "pre-hand",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::Completed => "completed",
        };
        write!(f, "{repr}")
    }
}

/// One hand's state. Dealer, small blind, and big blind occupy three seats
/// chosen by walking the occupied-seat cycle clockwise from the dealer
/// (dealer and small blind coincide heads-up).
#[derive(Clone, Debug, PartialEq)]
pub struct HandState {
    pub hand_id: HandId,
    pub phase: HandPhase,
    pub dealer_seat: SeatNumber,
    pub small_blind_seat: SeatNumber,
    pub big_blind_seat: SeatNumber,
    /// Live betting round, or `None` between rounds (and after the only
    /// in-scope round closes).
    pub round: Option<BettingRoundState>,
    /// Frozen rounds, in play order.
    pub completed_rounds: Vec<BettingRoundState>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl HandState {
    pub fn new(
        dealer_seat: SeatNumber,
        small_blind_seat: SeatNumber,
        big_blind_seat: SeatNumber,
        first_action_seat: Option<SeatNumber>,
        big_blind: Chips,
    ) -> Self {
        Self {
            hand_id: Uuid::new_v4(),
            phase: HandPhase::Preflop,
            dealer_seat,
            small_blind_seat,
            big_blind_seat,
            round: Some(BettingRoundState::new(
                Street::Preflop,
                first_action_seat,
                big_blind,
            )),
            completed_rounds: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Move the live round into the history once turn-order logic has frozen
    /// it. No-op while the round is still open. This is the completion
    /// boundary a multi-street extension would hook the next street into.
    pub fn archive_round(&mut self) {
        if self.round.as_ref().is_some_and(|r| r.is_complete)
            && let Some(round) = self.round.take()
        {
            self.completed_rounds.push(round);
        }
    }
}
