use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Hard ceiling on table size.
pub const MAX_SEATS: SeatNumber = 10;
/// Smallest table a hand can be played at.
pub const MIN_SEATS: SeatNumber = 2;

pub const DEFAULT_SMALL_BLIND: Chips = 5;
pub const DEFAULT_BIG_BLIND: Chips = 10;

/// A seated player must bring at least this many chips.
pub const MIN_STARTING_STACK: Chips = 1;

const MAX_USERNAME_LENGTH: usize = 50;

/// Type alias for whole chips. All stacks and bets are whole chips; there is
/// no fractional currency anywhere in the engine.
pub type Chips = u32;

/// 1-based seat position at the table (1..=`max_seats`).
pub type SeatNumber = u8;

/// Stable player identity. Survives reconnects.
pub type PlayerId = Uuid;
/// Volatile transport connection identity. Replaced on reconnect.
pub type ConnectionId = Uuid;
pub type HandId = Uuid;
pub type RoundId = Uuid;
pub type ActionId = Uuid;
/// Opaque id handed back in successful acknowledgements.
pub type EventId = Uuid;

/// Short public room code, shareable as a link fragment.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Generate a 6-digit room code. Uniqueness is the registry's job; this
    /// only produces the candidate.
    pub fn generate() -> Self {
        let code = rand::rng().random_range(0..1_000_000u32);
        Self(format!("{code:06}"))
    }

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Display name, unique per room case-insensitively. Normalized on
/// construction: surrounding whitespace trimmed, length capped.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let mut username = s.trim().to_string();
        username.truncate(MAX_USERNAME_LENGTH);
        Self(username)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison, the uniqueness rule for rooms.
    pub fn eq_ignore_case(&self, other: &Username) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Where a player stands relative to the live hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStatus {
    /// Dealt in and still owes a decision.
    Active,
    Folded,
    AllIn,
    /// Seated but not in the current hand.
    SittingOut,
    Disconnected,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Active => "active",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::SittingOut => "sitting-out",
            Self::Disconnected => "disconnected",
        };
        write!(f, "{repr}")
    }
}

/// The betting actions a player can request.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Bet,
    Call,
    Raise,
    Check,
    Fold,
    AllIn,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Bet => "bet",
            Self::Call => "call",
            Self::Raise => "raise",
            Self::Check => "check",
            Self::Fold => "fold",
            Self::AllIn => "all-in",
        };
        write!(f, "{repr}")
    }
}

/// Immutable log entry for one accepted action. Never mutated once appended
/// to a round's log.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ActionRecord {
    pub action_id: ActionId,
    pub player_id: PlayerId,
    pub seat_number: SeatNumber,
    pub kind: ActionKind,
    /// Resolved chip amount: 0 for check/fold, the chips paid for
    /// call/all-in, the new round total for bet/raise.
    pub amount: Chips,
    pub at: DateTime<Utc>,
}

impl ActionRecord {
    pub fn new(
        player_id: PlayerId,
        seat_number: SeatNumber,
        kind: ActionKind,
        amount: Chips,
    ) -> Self {
        Self {
            action_id: Uuid::new_v4(),
            player_id,
            seat_number,
            kind,
            amount,
            at: Utc::now(),
        }
    }
}

/// A numbered position at the table, occupied by at most one player.
#[derive(Clone, Debug, PartialEq)]
pub struct Seat {
    pub seat_number: SeatNumber,
    pub player_id: Option<PlayerId>,
}

impl Seat {
    pub fn empty(seat_number: SeatNumber) -> Self {
        Self {
            seat_number,
            player_id: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.player_id.is_some()
    }
}

/// One seated participant's chip and status data.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub player_id: PlayerId,
    pub connection_id: ConnectionId,
    pub username: Username,
    pub seat_number: SeatNumber,
    /// Chips behind. Never negative by construction.
    pub stack: Chips,
    /// Chips committed in the current betting round. Reset to 0 when a
    /// round opens.
    pub current_bet: Chips,
    pub status: PlayerStatus,
    pub is_connected: bool,
    pub joined_at: DateTime<Utc>,
}

impl PlayerState {
    pub fn new(
        connection_id: ConnectionId,
        username: Username,
        seat_number: SeatNumber,
        starting_stack: Chips,
    ) -> Self {
        Self {
            player_id: Uuid::new_v4(),
            connection_id,
            username,
            seat_number,
            stack: starting_stack,
            current_bet: 0,
            // New players sit out until the next hand deals them in.
            status: PlayerStatus::SittingOut,
            is_connected: true,
            joined_at: Utc::now(),
        }
    }

    /// Rebind to a new transport connection after a reconnect.
    pub fn reconnect(&mut self, connection_id: ConnectionId) {
        self.connection_id = connection_id;
        self.is_connected = true;
    }

    pub fn mark_disconnected(&mut self) {
        self.is_connected = false;
    }

    pub fn reset_current_bet(&mut self) {
        self.current_bet = 0;
    }

    /// Move chips from the stack into the current round's committed bet.
    /// Clamps to the stack, so a blind or call that the stack cannot cover
    /// commits what is there. Emptying the stack puts the player all-in.
    /// Returns the chips actually committed.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let committed = amount.min(self.stack);
        self.stack -= committed;
        self.current_bet += committed;
        if self.stack == 0 && committed > 0 {
            self.status = PlayerStatus::AllIn;
        }
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_normalized() {
        let name = Username::new("  alice  ");
        assert_eq!(name.as_str(), "alice");
        let long = "x".repeat(80);
        assert_eq!(Username::new(&long).as_str().len(), MAX_USERNAME_LENGTH);
    }

    #[test]
    fn username_uniqueness_is_case_insensitive() {
        assert!(Username::new("Alice").eq_ignore_case(&Username::new("aLiCe")));
        assert!(!Username::new("alice").eq_ignore_case(&Username::new("bob")));
    }

    #[test]
    fn room_ids_are_six_digits() {
        for _ in 0..64 {
            let id = RoomId::generate();
            assert_eq!(id.as_str().len(), 6);
            assert!(id.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn commit_clamps_to_stack_and_flags_all_in() {
        let mut player = PlayerState::new(Uuid::new_v4(), "alice".into(), 1, 30);
        assert_eq!(player.commit(10), 10);
        assert_eq!(player.stack, 20);
        assert_eq!(player.current_bet, 10);
        assert_eq!(player.status, PlayerStatus::SittingOut);

        assert_eq!(player.commit(50), 20);
        assert_eq!(player.stack, 0);
        assert_eq!(player.current_bet, 30);
        assert_eq!(player.status, PlayerStatus::AllIn);
    }

    #[test]
    fn statuses_use_wire_casing() {
        let json = serde_json::to_string(&PlayerStatus::AllIn).unwrap();
        assert_eq!(json, "\"all-in\"");
        let json = serde_json::to_string(&PlayerStatus::SittingOut).unwrap();
        assert_eq!(json, "\"sitting-out\"");
        let json = serde_json::to_string(&ActionKind::AllIn).unwrap();
        assert_eq!(json, "\"all-in\"");
    }
}
