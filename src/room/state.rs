//! Room state and the request handlers that mutate it.
//!
//! `RoomState` is a plain synchronous state machine: every public operation
//! either mutates and returns evidence of the mutation, or rejects and
//! mutates nothing. The actor wraps it to serialize access; nothing here
//! needs a runtime, which keeps the whole engine unit-testable.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::game::entities::{
    ActionKind, ActionRecord, Chips, ConnectionId, MIN_SEATS, MIN_STARTING_STACK, PlayerId,
    PlayerState, PlayerStatus, RoomId, Seat, SeatNumber, Username,
};
use crate::game::errors::{RoomError, RoomResult};
use crate::game::hand::HandState;
use crate::game::{processor, rules, turn_order, validator};

use super::config::{ConfigUpdate, RoomConfig};
use super::snapshot::RoomSnapshot;

/// One room: configuration, seats, players, and at most one hand.
///
/// The seat table and the player map are two views of the same occupancy
/// and are kept consistent by every mutation: a seat's `player_id` always
/// resolves in the map, and a player's `seat_number` always names the seat
/// pointing back at them.
#[derive(Clone, Debug)]
pub struct RoomState {
    pub room_id: RoomId,
    /// Connection that created the room. Owner-only operations compare
    /// against this.
    pub owner: ConnectionId,
    pub config: RoomConfig,
    pub seats: Vec<Seat>,
    pub players: HashMap<PlayerId, PlayerState>,
    pub current_hand: Option<HandState>,
    pub created_at: DateTime<Utc>,
}

impl RoomState {
    pub fn new(room_id: RoomId, owner: ConnectionId, config: RoomConfig) -> Self {
        let seats = (1..=config.max_seats).map(Seat::empty).collect();
        Self {
            room_id,
            owner,
            config,
            seats,
            players: HashMap::new(),
            current_hand: None,
            created_at: Utc::now(),
        }
    }

    pub fn seated_count(&self) -> usize {
        self.players.len()
    }

    /// Resolve the player bound to a connection, if any.
    pub fn player_id_for(&self, connection: ConnectionId) -> Option<PlayerId> {
        self.players
            .values()
            .find(|p| p.connection_id == connection)
            .map(|p| p.player_id)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot::from(self)
    }

    fn seat_free(&self, seat_number: SeatNumber) -> RoomResult<()> {
        if seat_number < 1 || seat_number > self.config.max_seats {
            return Err(RoomError::InvalidSeat(seat_number));
        }
        let occupied = self
            .seats
            .iter()
            .any(|s| s.seat_number == seat_number && s.is_occupied());
        if occupied {
            return Err(RoomError::SeatOccupied(seat_number));
        }
        Ok(())
    }

    fn next_occupied_seat(&self, from: SeatNumber) -> Option<SeatNumber> {
        let mut seat = from;
        for _ in 0..self.config.max_seats {
            seat = if seat >= self.config.max_seats {
                1
            } else {
                seat + 1
            };
            if self
                .seats
                .iter()
                .any(|s| s.seat_number == seat && s.is_occupied())
            {
                return Some(seat);
            }
        }
        None
    }

    fn commit_blind(&mut self, seat_number: SeatNumber, blind: Chips) {
        if let Some(player_id) = self
            .seats
            .iter()
            .find(|s| s.seat_number == seat_number)
            .and_then(|s| s.player_id)
            && let Some(player) = self.players.get_mut(&player_id)
        {
            player.commit(blind);
        }
    }

    /// Seat a connection as a new player. New players sit out until the
    /// next hand starts.
    pub fn take_seat(
        &mut self,
        connection: ConnectionId,
        seat_number: SeatNumber,
        username: Username,
        starting_stack: Chips,
    ) -> RoomResult<PlayerId> {
        if self.player_id_for(connection).is_some() {
            return Err(RoomError::AlreadySeated);
        }
        self.seat_free(seat_number)?;
        if username.is_empty() {
            return Err(RoomError::InvalidPayload(
                "username must not be empty".to_string(),
            ));
        }
        if self
            .players
            .values()
            .any(|p| p.username.eq_ignore_case(&username))
        {
            return Err(RoomError::UsernameTaken(username.to_string()));
        }
        if starting_stack < MIN_STARTING_STACK {
            return Err(RoomError::InvalidStack);
        }

        let player = PlayerState::new(connection, username, seat_number, starting_stack);
        let player_id = player.player_id;
        if let Some(seat) = self.seats.iter_mut().find(|s| s.seat_number == seat_number) {
            seat.player_id = Some(player_id);
        }
        log::info!(
            "room {}: {} took seat {} with {} chips",
            self.room_id,
            player.username,
            seat_number,
            starting_stack
        );
        self.players.insert(player_id, player);
        Ok(player_id)
    }

    /// Voluntary departure. The seat opens immediately.
    pub fn leave_seat(&mut self, connection: ConnectionId) -> RoomResult<PlayerState> {
        let player_id = self.player_id_for(connection).ok_or(RoomError::NotSeated)?;
        self.release_seat(player_id).ok_or(RoomError::NotSeated)
    }

    /// Transport-level disconnect. Same seat release as a voluntary leave;
    /// a connection with no seat is a no-op.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Option<PlayerState> {
        let player_id = self.player_id_for(connection)?;
        let player = self.release_seat(player_id)?;
        log::info!(
            "room {}: {} disconnected, seat {} released",
            self.room_id,
            player.username,
            player.seat_number
        );
        Some(player)
    }

    /// Rebind a still-seated player to a new connection.
    pub fn reconnect(&mut self, player_id: PlayerId, connection: ConnectionId) -> RoomResult<()> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(RoomError::NotSeated)?;
        player.reconnect(connection);
        log::debug!("room {}: {} reconnected", self.room_id, player.username);
        Ok(())
    }

    /// Remove a player and repair the live round around the hole they
    /// leave: if it was their turn the action moves on, and if their
    /// departure closes the round it freezes and is archived.
    fn release_seat(&mut self, player_id: PlayerId) -> Option<PlayerState> {
        let player = self.players.remove(&player_id)?;
        if let Some(seat) = self
            .seats
            .iter_mut()
            .find(|s| s.player_id == Some(player_id))
        {
            seat.player_id = None;
        }

        let max_seats = self.config.max_seats;
        if let Some(hand) = self.current_hand.as_mut() {
            if let Some(round) = hand.round.as_mut()
                && !round.is_complete
            {
                if round.action_seat == Some(player.seat_number) {
                    round.action_seat = turn_order::next_action_seat(
                        player.seat_number,
                        max_seats,
                        &self.seats,
                        &self.players,
                    );
                }
                if round.action_seat.is_none()
                    || turn_order::is_round_complete(&self.players, round)
                {
                    round.mark_complete();
                }
            }
            hand.archive_round();
        }
        Some(player)
    }

    /// Owner-only configuration change, rejected mid-hand. Shrinking the
    /// table must not strand an occupied seat.
    pub fn update_config(
        &mut self,
        connection: ConnectionId,
        update: &ConfigUpdate,
    ) -> RoomResult<()> {
        if connection != self.owner {
            return Err(RoomError::OwnerOnly);
        }
        if self.current_hand.is_some() {
            return Err(RoomError::HandInProgress);
        }
        let next = self.config.updated(update)?;
        if next.max_seats < self.config.max_seats
            && let Some(seat) = self
                .seats
                .iter()
                .find(|s| s.seat_number > next.max_seats && s.is_occupied())
        {
            return Err(RoomError::SeatStillOccupied(seat.seat_number));
        }

        self.seats.retain(|s| s.seat_number <= next.max_seats);
        for seat_number in (self.seats.len() as SeatNumber + 1)..=next.max_seats {
            self.seats.push(Seat::empty(seat_number));
        }
        log::info!(
            "room {}: config updated to blinds {}/{}, {} seats",
            self.room_id,
            next.small_blind,
            next.big_blind,
            next.max_seats
        );
        self.config = next;
        Ok(())
    }

    /// Validate a seat-change request without applying it. Returns the
    /// requester and their current seat so the actor can route the request
    /// to the owner.
    pub fn request_seat_change(
        &self,
        connection: ConnectionId,
        new_seat: SeatNumber,
    ) -> RoomResult<(PlayerId, SeatNumber)> {
        let player_id = self.player_id_for(connection).ok_or(RoomError::NotSeated)?;
        if self.current_hand.is_some() {
            return Err(RoomError::HandInProgress);
        }
        self.seat_free(new_seat)?;
        let current_seat = self
            .players
            .get(&player_id)
            .map(|p| p.seat_number)
            .ok_or(RoomError::NotSeated)?;
        Ok((player_id, current_seat))
    }

    /// Owner approval of a pending seat change. Re-validated here: the
    /// target seat may have filled since the request.
    pub fn approve_seat_change(
        &mut self,
        connection: ConnectionId,
        player_id: PlayerId,
        new_seat: SeatNumber,
    ) -> RoomResult<()> {
        if connection != self.owner {
            return Err(RoomError::OwnerOnly);
        }
        if self.current_hand.is_some() {
            return Err(RoomError::HandInProgress);
        }
        self.seat_free(new_seat)?;
        let old_seat = self
            .players
            .get(&player_id)
            .map(|p| p.seat_number)
            .ok_or(RoomError::NotSeated)?;

        if let Some(seat) = self.seats.iter_mut().find(|s| s.seat_number == old_seat) {
            seat.player_id = None;
        }
        if let Some(seat) = self.seats.iter_mut().find(|s| s.seat_number == new_seat) {
            seat.player_id = Some(player_id);
        }
        if let Some(player) = self.players.get_mut(&player_id) {
            player.seat_number = new_seat;
            log::info!(
                "room {}: {} moved from seat {} to seat {}",
                self.room_id,
                player.username,
                old_seat,
                new_seat
            );
        }
        Ok(())
    }

    /// Owner-only. Deal everyone in, post blinds, and open the preflop
    /// betting round.
    ///
    /// The dealer is the seat of the earliest-joined player. Heads-up the
    /// dealer posts the small blind and acts first; three-handed and up the
    /// small and big blinds are the next two occupied seats clockwise of
    /// the dealer. A blind a stack cannot cover posts the whole stack and
    /// puts the player all-in.
    pub fn start_hand(&mut self, connection: ConnectionId) -> RoomResult<&HandState> {
        if connection != self.owner {
            return Err(RoomError::OwnerOnly);
        }
        if self.current_hand.is_some() {
            return Err(RoomError::HandInProgress);
        }
        if self.seated_count() < MIN_SEATS as usize {
            return Err(RoomError::NotEnoughPlayers);
        }

        let dealer_seat = self
            .players
            .values()
            .min_by_key(|p| (p.joined_at, p.seat_number))
            .map(|p| p.seat_number)
            .ok_or(RoomError::NotEnoughPlayers)?;
        let (small_blind_seat, big_blind_seat) = if self.seated_count() == 2 {
            let other = self
                .next_occupied_seat(dealer_seat)
                .ok_or(RoomError::NotEnoughPlayers)?;
            (dealer_seat, other)
        } else {
            let small = self
                .next_occupied_seat(dealer_seat)
                .ok_or(RoomError::NotEnoughPlayers)?;
            let big = self
                .next_occupied_seat(small)
                .ok_or(RoomError::NotEnoughPlayers)?;
            (small, big)
        };

        for player in self.players.values_mut() {
            player.status = PlayerStatus::Active;
            player.reset_current_bet();
        }
        let (small_blind, big_blind) = (self.config.small_blind, self.config.big_blind);
        self.commit_blind(small_blind_seat, small_blind);
        self.commit_blind(big_blind_seat, big_blind);

        // First to act is the first eligible seat clockwise of the big
        // blind (the dealer, heads-up). A round the blinds already settle
        // freezes at the deal: everyone is all-in, or every active player
        // sits at the big blind.
        let first_action = turn_order::next_action_seat(
            big_blind_seat,
            self.config.max_seats,
            &self.seats,
            &self.players,
        );
        let mut hand = HandState::new(
            dealer_seat,
            small_blind_seat,
            big_blind_seat,
            first_action,
            big_blind,
        );
        let settled_at_deal = first_action.is_none()
            || hand
                .round
                .as_ref()
                .is_some_and(|round| turn_order::is_round_complete(&self.players, round));
        if settled_at_deal {
            if let Some(round) = hand.round.as_mut() {
                round.mark_complete();
            }
            hand.archive_round();
        }

        log::info!(
            "room {}: hand {} started, dealer seat {}, blinds {}/{}",
            self.room_id,
            hand.hand_id,
            dealer_seat,
            small_blind,
            big_blind
        );
        Ok(self.current_hand.insert(hand))
    }

    /// Validate-then-apply pipeline for one betting action, followed by
    /// the turn-order update. A rejection at any stage leaves the room
    /// untouched.
    pub fn player_action(
        &mut self,
        connection: ConnectionId,
        kind: ActionKind,
        amount: Option<Chips>,
    ) -> RoomResult<ActionRecord> {
        let player_id = self.player_id_for(connection).ok_or(RoomError::NotSeated)?;
        let big_blind = self.config.big_blind;
        let max_seats = self.config.max_seats;

        let hand = self.current_hand.as_mut().ok_or(RoomError::NoActiveHand)?;
        let round = hand.round.as_mut().ok_or(RoomError::NoActiveRound)?;

        {
            let player = self.players.get(&player_id).ok_or(RoomError::NotSeated)?;
            validator::validate_action(player, kind, amount, big_blind, round)?;
        }

        let previous_highest = round.highest_bet;
        let previous_minimum = round.minimum_raise;
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(RoomError::NotSeated)?;
        let record = processor::apply_action(player, kind, amount, round)?;
        let new_total = player.current_bet;

        // A short all-in raises the bet without reopening the action:
        // players who already matched the previous highest bet and have
        // acted may call but not raise until a later full raise.
        if kind == ActionKind::AllIn
            && new_total > previous_highest
            && !rules::all_in_reopens_action(new_total, previous_highest, previous_minimum)
        {
            let capped: Vec<PlayerId> = self
                .players
                .values()
                .filter(|p| {
                    p.player_id != player_id
                        && p.status == PlayerStatus::Active
                        && p.current_bet == previous_highest
                        && round.has_acted(p.player_id)
                })
                .map(|p| p.player_id)
                .collect();
            round.cap_raises(capped);
        }

        turn_order::advance(max_seats, &self.seats, &self.players, round);
        if round.is_complete {
            hand.archive_round();
        }

        log::debug!(
            "room {}: seat {} {} {}",
            self.room_id,
            record.seat_number,
            record.kind,
            record.amount
        );
        Ok(record)
    }
}
