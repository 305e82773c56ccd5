//! Betting engine for a single room's table.
//!
//! The engine is split the same way action flows through it:
//! - [`entities`]: players, seats, action records, and the shared aliases.
//! - [`rules`]: pure legality predicates, no state access beyond reads.
//! - [`validator`]: orchestrates rules plus turn/status/amount checks into
//!   one accept-or-reject decision.
//! - [`processor`]: applies an accepted action and appends its immutable
//!   record. The only place chips move.
//! - [`turn_order`]: next-seat computation and round-completion detection.
//! - [`round`] / [`hand`]: the betting round and hand state they act on.

pub mod entities;
pub mod errors;
pub mod hand;
pub mod processor;
pub mod round;
pub mod rules;
pub mod turn_order;
pub mod validator;

pub use entities::{ActionKind, ActionRecord, Chips, PlayerState, PlayerStatus, Seat, SeatNumber};
pub use errors::RoomError;
pub use hand::HandState;
pub use round::BettingRoundState;
