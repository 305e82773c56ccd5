//! Canonical wire representation of a room.
//!
//! Snapshots are the only shape room state crosses the actor boundary in:
//! internal structs never leave the actor, so internal refactors cannot leak
//! onto the wire. Every broadcast carries a full snapshot; clients replace,
//! never patch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::game::entities::{
    ActionRecord, Chips, ConnectionId, HandId, PlayerId, PlayerState, PlayerStatus, RoomId,
    RoundId, SeatNumber,
};
use crate::game::hand::{HandPhase, HandState};
use crate::game::round::{BettingRoundState, Street};

use super::config::RoomConfig;
use super::state::RoomState;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    /// Connection id of the room's creator, so clients can render
    /// owner-only controls.
    pub owner: ConnectionId,
    pub config: RoomConfig,
    pub seats: Vec<SeatSnapshot>,
    /// Seated players keyed by id, for lookups the seat array is awkward
    /// for (action records and events carry player ids).
    pub players: HashMap<PlayerId, PlayerSnapshot>,
    pub hand: Option<HandSnapshot>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeatSnapshot {
    pub seat_number: SeatNumber,
    pub is_occupied: bool,
    pub player: Option<PlayerSnapshot>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub username: String,
    pub seat_number: SeatNumber,
    pub stack: Chips,
    pub current_bet: Chips,
    pub status: PlayerStatus,
    pub is_connected: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HandSnapshot {
    pub hand_id: HandId,
    pub phase: HandPhase,
    pub dealer_seat: SeatNumber,
    pub small_blind_seat: SeatNumber,
    pub big_blind_seat: SeatNumber,
    pub round: Option<RoundSnapshot>,
    pub completed_rounds: Vec<RoundSnapshot>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoundSnapshot {
    pub round_id: RoundId,
    pub street: Street,
    pub action_seat: Option<SeatNumber>,
    pub highest_bet: Chips,
    pub minimum_raise: Chips,
    pub actions: Vec<ActionRecord>,
    pub is_complete: bool,
}

impl From<&PlayerState> for PlayerSnapshot {
    fn from(player: &PlayerState) -> Self {
        Self {
            player_id: player.player_id,
            username: player.username.to_string(),
            seat_number: player.seat_number,
            stack: player.stack,
            current_bet: player.current_bet,
            status: player.status,
            is_connected: player.is_connected,
        }
    }
}

impl From<&BettingRoundState> for RoundSnapshot {
    fn from(round: &BettingRoundState) -> Self {
        Self {
            round_id: round.round_id,
            street: round.street,
            action_seat: round.action_seat,
            highest_bet: round.highest_bet,
            minimum_raise: round.minimum_raise,
            actions: round.actions.clone(),
            is_complete: round.is_complete,
        }
    }
}

impl From<&HandState> for HandSnapshot {
    fn from(hand: &HandState) -> Self {
        Self {
            hand_id: hand.hand_id,
            phase: hand.phase,
            dealer_seat: hand.dealer_seat,
            small_blind_seat: hand.small_blind_seat,
            big_blind_seat: hand.big_blind_seat,
            round: hand.round.as_ref().map(RoundSnapshot::from),
            completed_rounds: hand.completed_rounds.iter().map(RoundSnapshot::from).collect(),
        }
    }
}

impl From<&RoomState> for RoomSnapshot {
    fn from(room: &RoomState) -> Self {
        let seats = room
            .seats
            .iter()
            .map(|seat| {
                let player = seat
                    .player_id
                    .and_then(|id| room.players.get(&id))
                    .map(PlayerSnapshot::from);
                SeatSnapshot {
                    seat_number: seat.seat_number,
                    is_occupied: player.is_some(),
                    player,
                }
            })
            .collect();
        let players = room
            .players
            .iter()
            .map(|(id, player)| (*id, PlayerSnapshot::from(player)))
            .collect();

        Self {
            room_id: room.room_id.clone(),
            owner: room.owner,
            config: room.config.clone(),
            seats,
            players,
            hand: room.current_hand.as_ref().map(HandSnapshot::from),
            created_at: room.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Username;
    use uuid::Uuid;

    fn seated_room() -> RoomState {
        let mut room = RoomState::new(RoomId::new("123456"), Uuid::new_v4(), RoomConfig::default());
        room.take_seat(Uuid::new_v4(), 1, Username::new("alice"), 100)
            .unwrap();
        room.take_seat(Uuid::new_v4(), 4, Username::new("bob"), 200)
            .unwrap();
        room
    }

    #[test]
    fn snapshot_carries_one_entry_per_seat() {
        let room = seated_room();
        let snapshot = RoomSnapshot::from(&room);
        assert_eq!(snapshot.seats.len(), 10);
        assert!(snapshot.seats[0].is_occupied);
        assert!(!snapshot.seats[1].is_occupied);
        assert!(snapshot.seats[3].is_occupied);
        assert!(snapshot.hand.is_none());
    }

    #[test]
    fn snapshot_names_the_owner_and_keys_players_by_id() {
        let room = seated_room();
        let snapshot = RoomSnapshot::from(&room);
        assert_eq!(snapshot.owner, room.owner);
        assert_eq!(snapshot.players.len(), 2);

        // Every seated player resolves by id, and the entry agrees with
        // the seat-array view.
        for seat in snapshot.seats.iter().filter(|s| s.is_occupied) {
            let from_seat = seat.player.as_ref().unwrap();
            let from_map = &snapshot.players[&from_seat.player_id];
            assert_eq!(from_map, from_seat);
        }
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut room = seated_room();
        room.start_hand(room.owner).unwrap();

        let snapshot = RoomSnapshot::from(&room);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: RoomSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
        assert_eq!(back.owner, room.owner);
        assert_eq!(back.players.len(), 2);
    }

    #[test]
    fn statuses_serialize_with_wire_casing() {
        let mut room = seated_room();
        room.take_seat(Uuid::new_v4(), 2, Username::new("carol"), 5)
            .unwrap();
        room.start_hand(room.owner).unwrap();
        // Carol sits clockwise of the dealer, so her 5-chip stack goes
        // all-in on the small blind.
        let snapshot = RoomSnapshot::from(&room);
        let json = serde_json::to_value(&snapshot).unwrap();
        let statuses: Vec<&str> = json["seats"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["player"]["status"].as_str())
            .collect();
        assert!(statuses.contains(&"all-in"));
        assert!(statuses.contains(&"active"));
    }
}
