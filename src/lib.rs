//! # Chip Rooms
//!
//! A Texas Hold'em chip-accounting engine for live, shareable rooms.
//!
//! This library provides the betting state machine behind a multiplayer
//! poker room: seating, blind posting, turn-ordered action validation and
//! processing, and betting-round completion. Card dealing, hand evaluation,
//! and multi-street play are out of scope; a hand here is a single preflop
//! betting round that resolves when action closes.
//!
//! ## Architecture
//!
//! - [`game`]: the betting engine — entities, pure rules, the
//!   validator/processor pipeline, and turn-order management.
//! - [`room`]: room ownership — room state and request handling, the
//!   per-room actor (one serialization domain per room), and the registry
//!   mapping room codes and connections to rooms.
//!
//! Transport is an external collaborator: it resolves inbound events to
//! [`room::RoomRegistry`] calls, and fans broadcast events out to the
//! connections the registry reports for a room.
//!
//! ## Example
//!
//! ```
//! use chip_rooms::room::{RoomConfig, RoomState};
//! use chip_rooms::game::entities::RoomId;
//! use uuid::Uuid;
//!
//! let owner = Uuid::new_v4();
//! let room = RoomState::new(RoomId::generate(), owner, RoomConfig::default());
//! assert_eq!(room.seated_count(), 0);
//! ```

/// Betting engine: entities, rules, validation, processing, turn order.
pub mod game;
pub use game::{
    entities::{self, ActionKind, Chips, PlayerStatus, SeatNumber},
    errors::RoomError,
};

/// Room ownership: state, per-room actor, and the room registry.
pub mod room;
pub use room::{RoomConfig, RoomRegistry, RoomState};
