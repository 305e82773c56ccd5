//! Registry of live rooms and connection-to-room bindings.
//!
//! The registry is an explicitly owned object: callers construct one and
//! share it (typically behind an `Arc`), and tests build isolated
//! registries freely. There is no global singleton. Locks guard only the
//! lookup maps and are never held across an actor round-trip.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use crate::game::entities::{
    ActionKind, Chips, ConnectionId, EventId, PlayerId, RoomId, SeatNumber, Username,
};
use crate::game::errors::{RoomError, RoomResult};

use super::actor::{RoomActor, RoomHandle};
use super::config::{ConfigUpdate, RoomConfig};
use super::messages::{RoomEvent, Seated};
use super::snapshot::RoomSnapshot;
use super::state::RoomState;

/// Which room a connection is in, and the player it is bound to once
/// seated.
#[derive(Clone, Debug)]
pub struct ConnectionInfo {
    pub room_id: RoomId,
    pub player_id: Option<PlayerId>,
}

struct RoomEntry {
    handle: RoomHandle,
    /// Last time any request touched the room. Reaping compares against
    /// this, so an idle-but-occupied room is never closed.
    last_active: DateTime<Utc>,
}

/// Room directory plus the connection routing table the transport needs.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, RoomEntry>>,
    connections: RwLock<HashMap<ConnectionId, ConnectionInfo>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room with a collision-checked 6-digit code, spawn its
    /// actor, and bind the creating connection to it as owner.
    pub async fn create_room(
        &self,
        owner: ConnectionId,
        config: RoomConfig,
    ) -> RoomResult<RoomId> {
        config.validate()?;

        let mut rooms = self.rooms.write().await;
        let mut room_id = RoomId::generate();
        while rooms.contains_key(&room_id) {
            room_id = RoomId::generate();
        }

        let state = RoomState::new(room_id.clone(), owner, config);
        let (actor, handle) = RoomActor::new(state);
        tokio::spawn(actor.run());
        rooms.insert(
            room_id.clone(),
            RoomEntry {
                handle,
                last_active: Utc::now(),
            },
        );
        drop(rooms);

        self.connections.write().await.insert(
            owner,
            ConnectionInfo {
                room_id: room_id.clone(),
                player_id: None,
            },
        );
        log::info!("room {room_id} created by connection {owner}");
        Ok(room_id)
    }

    /// Enter a room by code. With a `player_id` this is the reconnect
    /// path: the player's connection is rebound and they stay seated.
    pub async fn join_room(
        &self,
        connection: ConnectionId,
        room_id: &RoomId,
        player_id: Option<PlayerId>,
    ) -> RoomResult<Arc<RoomSnapshot>> {
        let handle = self.handle_for(room_id).await?;
        let snapshot = handle.join(connection, player_id).await?;
        self.connections.write().await.insert(
            connection,
            ConnectionInfo {
                room_id: room_id.clone(),
                player_id,
            },
        );
        self.touch(room_id).await;
        Ok(snapshot)
    }

    pub async fn take_seat(
        &self,
        connection: ConnectionId,
        seat_number: SeatNumber,
        username: Username,
        starting_stack: Chips,
    ) -> RoomResult<Seated> {
        let (room_id, handle) = self.routed(connection).await?;
        let seated = handle
            .take_seat(connection, seat_number, username, starting_stack)
            .await?;
        if let Some(info) = self.connections.write().await.get_mut(&connection) {
            info.player_id = Some(seated.player_id);
        }
        self.touch(&room_id).await;
        Ok(seated)
    }

    pub async fn leave_seat(&self, connection: ConnectionId) -> RoomResult<EventId> {
        let (room_id, handle) = self.routed(connection).await?;
        let event_id = handle.leave_seat(connection).await?;
        if let Some(info) = self.connections.write().await.get_mut(&connection) {
            info.player_id = None;
        }
        self.touch(&room_id).await;
        Ok(event_id)
    }

    pub async fn player_action(
        &self,
        connection: ConnectionId,
        kind: ActionKind,
        amount: Option<Chips>,
    ) -> RoomResult<EventId> {
        let (room_id, handle) = self.routed(connection).await?;
        let event_id = handle.take_action(connection, kind, amount).await?;
        self.touch(&room_id).await;
        Ok(event_id)
    }

    pub async fn start_hand(&self, connection: ConnectionId) -> RoomResult<EventId> {
        let (room_id, handle) = self.routed(connection).await?;
        let event_id = handle.start_hand(connection).await?;
        self.touch(&room_id).await;
        Ok(event_id)
    }

    pub async fn update_config(
        &self,
        connection: ConnectionId,
        update: ConfigUpdate,
    ) -> RoomResult<EventId> {
        let (room_id, handle) = self.routed(connection).await?;
        let event_id = handle.update_config(connection, update).await?;
        self.touch(&room_id).await;
        Ok(event_id)
    }

    pub async fn request_seat_change(
        &self,
        connection: ConnectionId,
        new_seat: SeatNumber,
    ) -> RoomResult<EventId> {
        let (_, handle) = self.routed(connection).await?;
        handle.request_seat_change(connection, new_seat).await
    }

    pub async fn approve_seat_change(
        &self,
        connection: ConnectionId,
        player_id: PlayerId,
        new_seat: SeatNumber,
    ) -> RoomResult<EventId> {
        let (room_id, handle) = self.routed(connection).await?;
        let event_id = handle
            .approve_seat_change(connection, player_id, new_seat)
            .await?;
        self.touch(&room_id).await;
        Ok(event_id)
    }

    pub async fn snapshot(&self, room_id: &RoomId) -> RoomResult<Arc<RoomSnapshot>> {
        let handle = self.handle_for(room_id).await?;
        handle.snapshot().await
    }

    /// Subscribe the connection's event channel in its current room.
    pub async fn subscribe(
        &self,
        connection: ConnectionId,
    ) -> RoomResult<mpsc::Receiver<RoomEvent>> {
        let (_, handle) = self.routed(connection).await?;
        handle.subscribe(connection).await
    }

    /// Transport-level disconnect: unbind the connection and release any
    /// seat it held.
    pub async fn disconnect(&self, connection: ConnectionId) {
        let info = self.connections.write().await.remove(&connection);
        let Some(info) = info else {
            return;
        };
        if let Ok(handle) = self.handle_for(&info.room_id).await {
            let _ = handle.disconnect(connection).await;
        }
        self.touch(&info.room_id).await;
    }

    pub async fn room_for_connection(&self, connection: ConnectionId) -> Option<RoomId> {
        self.connections
            .read()
            .await
            .get(&connection)
            .map(|info| info.room_id.clone())
    }

    /// All connections currently bound to a room, for broadcast fan-out.
    pub async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.connections
            .read()
            .await
            .iter()
            .filter(|(_, info)| &info.room_id == room_id)
            .map(|(connection, _)| *connection)
            .collect()
    }

    pub async fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.read().await.contains_key(room_id)
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Stop a room's actor and drop every binding into it.
    pub async fn close_room(&self, room_id: &RoomId) -> RoomResult<()> {
        let entry = self
            .rooms
            .write()
            .await
            .remove(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))?;
        entry.handle.close().await;
        self.connections
            .write()
            .await
            .retain(|_, info| &info.room_id != room_id);
        log::info!("room {room_id} closed");
        Ok(())
    }

    /// Close rooms with no bound connections whose last activity is older
    /// than `idle_for`. Returns how many rooms were reaped.
    pub async fn reap_empty_rooms(&self, idle_for: Duration) -> usize {
        let cutoff = Utc::now() - idle_for;
        let occupied: HashSet<RoomId> = self
            .connections
            .read()
            .await
            .values()
            .map(|info| info.room_id.clone())
            .collect();

        let mut rooms = self.rooms.write().await;
        let doomed: Vec<RoomId> = rooms
            .iter()
            .filter(|(room_id, entry)| {
                !occupied.contains(*room_id) && entry.last_active <= cutoff
            })
            .map(|(room_id, _)| room_id.clone())
            .collect();
        let handles: Vec<(RoomId, RoomHandle)> = doomed
            .iter()
            .filter_map(|room_id| {
                rooms
                    .remove(room_id)
                    .map(|entry| (room_id.clone(), entry.handle))
            })
            .collect();
        drop(rooms);

        for (room_id, handle) in &handles {
            handle.close().await;
            log::info!("room {room_id} reaped after idling empty");
        }
        handles.len()
    }

    async fn handle_for(&self, room_id: &RoomId) -> RoomResult<RoomHandle> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))
    }

    /// Resolve a connection to its room's handle, the `NOT_IN_ROOM` /
    /// `ROOM_NOT_FOUND` gate every in-room request passes through.
    async fn routed(&self, connection: ConnectionId) -> RoomResult<(RoomId, RoomHandle)> {
        let room_id = self
            .room_for_connection(connection)
            .await
            .ok_or(RoomError::NotInRoom)?;
        let handle = self.handle_for(&room_id).await?;
        Ok((room_id, handle))
    }

    async fn touch(&self, room_id: &RoomId) {
        if let Some(entry) = self.rooms.write().await.get_mut(room_id) {
            entry.last_active = Utc::now();
        }
    }
}
