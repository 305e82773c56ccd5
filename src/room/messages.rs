//! Room actor messages, acknowledgements, and broadcast events.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::game::entities::{
    ActionKind, Chips, ConnectionId, EventId, HandId, PlayerId, SeatNumber, Username,
};
use crate::game::errors::{RoomError, RoomResult};

use super::config::ConfigUpdate;
use super::snapshot::RoomSnapshot;

/// Reply channel carrying the acknowledgement for one request. Every
/// accepted mutation acks with an `EventId`; rejections carry the full
/// `RoomError`, which the transport flattens into an [`ErrorBody`].
pub type Ack<T> = oneshot::Sender<RoomResult<T>>;

/// Requests a room actor accepts. One message is handled at a time, which
/// is the room's whole concurrency story.
#[derive(Debug)]
pub enum RoomMessage {
    /// Enter the room as a viewer or rebind a seated player's connection.
    Join {
        connection: ConnectionId,
        player_id: Option<PlayerId>,
        reply: Ack<Arc<RoomSnapshot>>,
    },

    TakeSeat {
        connection: ConnectionId,
        seat_number: SeatNumber,
        username: Username,
        starting_stack: Chips,
        reply: Ack<Seated>,
    },

    LeaveSeat {
        connection: ConnectionId,
        reply: Ack<EventId>,
    },

    TakeAction {
        connection: ConnectionId,
        kind: ActionKind,
        amount: Option<Chips>,
        reply: Ack<EventId>,
    },

    StartHand {
        connection: ConnectionId,
        reply: Ack<EventId>,
    },

    UpdateConfig {
        connection: ConnectionId,
        update: ConfigUpdate,
        reply: Ack<EventId>,
    },

    RequestSeatChange {
        connection: ConnectionId,
        new_seat: SeatNumber,
        reply: Ack<EventId>,
    },

    ApproveSeatChange {
        connection: ConnectionId,
        player_id: PlayerId,
        new_seat: SeatNumber,
        reply: Ack<EventId>,
    },

    GetSnapshot {
        reply: oneshot::Sender<Arc<RoomSnapshot>>,
    },

    /// Transport-level disconnect. Fire and forget: the transport has
    /// nobody left to ack to.
    Disconnect { connection: ConnectionId },

    /// Subscribe a connection's outbound channel to room events.
    Subscribe {
        connection: ConnectionId,
        sender: mpsc::Sender<RoomEvent>,
    },

    Unsubscribe { connection: ConnectionId },

    Close { reply: oneshot::Sender<()> },
}

/// Successful `TakeSeat` acknowledgement: the caller needs the new stable
/// player id to reconnect with later.
#[derive(Clone, Copy, Debug)]
pub struct Seated {
    pub event_id: EventId,
    pub player_id: PlayerId,
}

/// Why a player's seat was released.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaveReason {
    Voluntary,
    Disconnected,
    /// Reserved for wire parity: the owner kick operation is not in scope,
    /// so nothing constructs this yet.
    Kicked,
}

/// Events fanned out to subscribed connections. `State` follows every
/// accepted mutation; the rest are deltas layered on top of it.
/// `SeatChangeRequested` goes to the owner's connection only.
#[derive(Clone, Debug)]
pub enum RoomEvent {
    State(Arc<RoomSnapshot>),
    PlayerJoined {
        player_id: PlayerId,
        username: String,
        seat_number: SeatNumber,
    },
    PlayerLeft {
        player_id: PlayerId,
        reason: LeaveReason,
    },
    HandStarted {
        hand_id: HandId,
        dealer_seat: SeatNumber,
        small_blind_seat: SeatNumber,
        big_blind_seat: SeatNumber,
    },
    SeatChangeRequested {
        player_id: PlayerId,
        current_seat: SeatNumber,
        requested_seat: SeatNumber,
    },
}

/// Wire shape of the error side of an acknowledgement.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&RoomError> for ErrorBody {
    fn from(err: &RoomError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_pairs_code_and_message() {
        let body = ErrorBody::from(&RoomError::SeatOccupied(3));
        assert_eq!(body.code, "SEAT_OCCUPIED");
        assert_eq!(body.message, "seat 3 is already occupied");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "SEAT_OCCUPIED");
    }

    #[test]
    fn leave_reasons_use_wire_casing() {
        let json = serde_json::to_string(&LeaveReason::Disconnected).unwrap();
        assert_eq!(json, "\"disconnected\"");
    }
}
