//! Room ownership layer: state, per-room actor, and the registry.
//!
//! Each room is one serialization domain. The synchronous [`RoomState`]
//! holds the rules-level behavior; [`RoomActor`] wraps it in a task with an
//! mpsc inbox so requests apply one at a time; [`RoomRegistry`] maps short
//! room codes and transport connections to running actors.

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;
pub mod snapshot;
pub mod state;

pub use actor::{RoomActor, RoomHandle};
pub use config::{ConfigUpdate, RoomConfig};
pub use messages::{ErrorBody, LeaveReason, RoomEvent, RoomMessage, Seated};
pub use registry::{ConnectionInfo, RoomRegistry};
pub use snapshot::{HandSnapshot, PlayerSnapshot, RoomSnapshot, RoundSnapshot, SeatSnapshot};
pub use state::RoomState;
