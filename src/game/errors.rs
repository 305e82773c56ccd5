//! Rejection taxonomy for room and betting operations.
//!
//! Every error here is a structured rejection handed back to the requesting
//! connection. Nothing in this module is process-fatal, and a rejected
//! request produces zero state mutation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Chips, PlayerStatus, SeatNumber};

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum RoomError {
    // Routing
    #[error("you must join a room first")]
    NotInRoom,
    #[error("room {0} does not exist")]
    RoomNotFound(String),
    #[error("room is closed")]
    RoomClosed,

    // Authorization
    #[error("only the room owner can do that")]
    OwnerOnly,

    // State preconditions
    #[error("you are already seated")]
    AlreadySeated,
    #[error("seat {0} does not exist")]
    InvalidSeat(SeatNumber),
    #[error("seat {0} is already occupied")]
    SeatOccupied(SeatNumber),
    #[error("cannot shrink the table below occupied seat {0}")]
    SeatStillOccupied(SeatNumber),
    #[error("you are not seated")]
    NotSeated,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("no active hand")]
    NoActiveHand,
    #[error("no active betting round")]
    NoActiveRound,
    #[error("betting round is complete")]
    RoundComplete,
    #[error("need 2+ seated players")]
    NotEnoughPlayers,

    // Domain validity
    #[error("username \"{0}\" is already taken")]
    UsernameTaken(String),
    #[error("starting stack must be greater than 0")]
    InvalidStack,
    #[error("big blind must be exactly twice the small blind")]
    InvalidBlinds,
    #[error("not your turn")]
    NotYourTurn,
    #[error("cannot act while {0}")]
    NotActive(PlayerStatus),
    #[error("cannot check when there is a bet to call")]
    CannotCheck,
    #[error("cannot call when there is no bet to call")]
    NothingToCall,
    #[error("cannot bet once betting is open (use raise)")]
    BetNotAllowed,
    #[error("cannot raise before betting is open (use bet)")]
    RaiseNotAllowed,
    #[error("cannot go all-in with an empty stack")]
    EmptyStack,
    #[error("an amount greater than 0 is required for this action")]
    AmountRequired,
    #[error("bet must be at least {min}")]
    BetTooSmall { min: Chips },
    #[error("raise must exceed the current highest bet of {highest}")]
    RaiseTooLow { highest: Chips },
    #[error("raise must increase your bet by at least {min}")]
    RaiseTooSmall { min: Chips },
    #[error("amount exceeds available chips (use all-in)")]
    AmountExceedsStack,
    #[error("a short all-in did not reopen the action; you may not raise")]
    RaiseNotReopened,

    // Payload decoding problems surfaced by the transport boundary.
    #[error("invalid request: {0}")]
    InvalidPayload(String),
}

impl RoomError {
    /// Stable machine-readable code for the wire acknowledgement.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInRoom => "NOT_IN_ROOM",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::RoomClosed => "ROOM_CLOSED",
            Self::OwnerOnly => "OWNER_ONLY",
            Self::AlreadySeated => "ALREADY_SEATED",
            Self::InvalidSeat(_) => "INVALID_SEAT",
            Self::SeatOccupied(_) | Self::SeatStillOccupied(_) => "SEAT_OCCUPIED",
            Self::NotSeated => "NOT_SEATED",
            Self::HandInProgress => "HAND_IN_PROGRESS",
            Self::NoActiveHand => "NO_ACTIVE_HAND",
            Self::NoActiveRound => "NO_ACTIVE_ROUND",
            Self::RoundComplete => "ROUND_COMPLETE",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::UsernameTaken(_) => "USERNAME_TAKEN",
            Self::InvalidStack => "INVALID_STACK",
            Self::InvalidBlinds => "INVALID_BLINDS",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::NotActive(_) => "PLAYER_NOT_ACTIVE",
            Self::CannotCheck
            | Self::NothingToCall
            | Self::BetNotAllowed
            | Self::RaiseNotAllowed
            | Self::EmptyStack => "ILLEGAL_ACTION",
            Self::AmountRequired
            | Self::BetTooSmall { .. }
            | Self::RaiseTooLow { .. }
            | Self::RaiseTooSmall { .. }
            | Self::AmountExceedsStack => "INVALID_AMOUNT",
            Self::RaiseNotReopened => "RAISE_NOT_REOPENED",
            Self::InvalidPayload(_) => "VALIDATION_ERROR",
        }
    }
}

/// Result alias used throughout the room layer.
pub type RoomResult<T> = Result<T, RoomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_wire_identifiers() {
        assert_eq!(RoomError::NotYourTurn.code(), "NOT_YOUR_TURN");
        assert_eq!(RoomError::BetTooSmall { min: 10 }.code(), "INVALID_AMOUNT");
        assert_eq!(RoomError::SeatOccupied(3).code(), "SEAT_OCCUPIED");
        assert_eq!(
            RoomError::NotActive(PlayerStatus::Folded).code(),
            "PLAYER_NOT_ACTIVE"
        );
    }

    #[test]
    fn messages_name_the_offending_values() {
        let err = RoomError::UsernameTaken("alice".to_string());
        assert_eq!(err.to_string(), "username \"alice\" is already taken");
        let err = RoomError::RaiseTooSmall { min: 20 };
        assert_eq!(err.to_string(), "raise must increase your bet by at least 20");
    }
}
