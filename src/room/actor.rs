//! Per-room actor: the room's serialization domain.
//!
//! Each room runs in its own task with an mpsc inbox and handles one
//! message at a time, so every request observes and produces a consistent
//! room. Rooms never share state; cross-room requests never contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::game::entities::{
    ActionKind, Chips, ConnectionId, EventId, PlayerId, RoomId, SeatNumber, Username,
};
use crate::game::errors::{RoomError, RoomResult};

use super::config::ConfigUpdate;
use super::messages::{Ack, LeaveReason, RoomEvent, RoomMessage, Seated};
use super::snapshot::RoomSnapshot;
use super::state::RoomState;

const INBOX_CAPACITY: usize = 100;
const EVENT_CAPACITY: usize = 64;

/// Cloneable handle for sending requests into a room actor. All methods
/// map a dropped inbox or reply channel to [`RoomError::RoomClosed`].
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    async fn request<T>(&self, build: impl FnOnce(Ack<T>) -> RoomMessage) -> RoomResult<T> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| RoomError::RoomClosed)?;
        rx.await.map_err(|_| RoomError::RoomClosed)?
    }

    pub async fn join(
        &self,
        connection: ConnectionId,
        player_id: Option<PlayerId>,
    ) -> RoomResult<Arc<RoomSnapshot>> {
        self.request(|reply| RoomMessage::Join {
            connection,
            player_id,
            reply,
        })
        .await
    }

    pub async fn take_seat(
        &self,
        connection: ConnectionId,
        seat_number: SeatNumber,
        username: Username,
        starting_stack: Chips,
    ) -> RoomResult<Seated> {
        self.request(|reply| RoomMessage::TakeSeat {
            connection,
            seat_number,
            username,
            starting_stack,
            reply,
        })
        .await
    }

    pub async fn leave_seat(&self, connection: ConnectionId) -> RoomResult<EventId> {
        self.request(|reply| RoomMessage::LeaveSeat { connection, reply })
            .await
    }

    pub async fn take_action(
        &self,
        connection: ConnectionId,
        kind: ActionKind,
        amount: Option<Chips>,
    ) -> RoomResult<EventId> {
        self.request(|reply| RoomMessage::TakeAction {
            connection,
            kind,
            amount,
            reply,
        })
        .await
    }

    pub async fn start_hand(&self, connection: ConnectionId) -> RoomResult<EventId> {
        self.request(|reply| RoomMessage::StartHand { connection, reply })
            .await
    }

    pub async fn update_config(
        &self,
        connection: ConnectionId,
        update: ConfigUpdate,
    ) -> RoomResult<EventId> {
        self.request(|reply| RoomMessage::UpdateConfig {
            connection,
            update,
            reply,
        })
        .await
    }

    pub async fn request_seat_change(
        &self,
        connection: ConnectionId,
        new_seat: SeatNumber,
    ) -> RoomResult<EventId> {
        self.request(|reply| RoomMessage::RequestSeatChange {
            connection,
            new_seat,
            reply,
        })
        .await
    }

    pub async fn approve_seat_change(
        &self,
        connection: ConnectionId,
        player_id: PlayerId,
        new_seat: SeatNumber,
    ) -> RoomResult<EventId> {
        self.request(|reply| RoomMessage::ApproveSeatChange {
            connection,
            player_id,
            new_seat,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> RoomResult<Arc<RoomSnapshot>> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(RoomMessage::GetSnapshot { reply })
            .await
            .map_err(|_| RoomError::RoomClosed)?;
        rx.await.map_err(|_| RoomError::RoomClosed)
    }

    /// Attach an event channel for a connection and return its receiver.
    pub async fn subscribe(
        &self,
        connection: ConnectionId,
    ) -> RoomResult<mpsc::Receiver<RoomEvent>> {
        let (sender, receiver) = mpsc::channel(EVENT_CAPACITY);
        self.sender
            .send(RoomMessage::Subscribe { connection, sender })
            .await
            .map_err(|_| RoomError::RoomClosed)?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, connection: ConnectionId) -> RoomResult<()> {
        self.sender
            .send(RoomMessage::Unsubscribe { connection })
            .await
            .map_err(|_| RoomError::RoomClosed)
    }

    pub async fn disconnect(&self, connection: ConnectionId) -> RoomResult<()> {
        self.sender
            .send(RoomMessage::Disconnect { connection })
            .await
            .map_err(|_| RoomError::RoomClosed)
    }

    /// Stop the actor. Resolves once the actor has acknowledged; a room
    /// that is already gone counts as closed.
    pub async fn close(&self) {
        let (reply, rx) = oneshot::channel();
        if self
            .sender
            .send(RoomMessage::Close { reply })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }
}

/// Actor owning one room's state.
pub struct RoomActor {
    state: RoomState,
    inbox: mpsc::Receiver<RoomMessage>,
    subscribers: HashMap<ConnectionId, mpsc::Sender<RoomEvent>>,
    is_closed: bool,
}

impl RoomActor {
    pub fn new(state: RoomState) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = RoomHandle {
            sender,
            room_id: state.room_id.clone(),
        };
        let actor = Self {
            state,
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };
        (actor, handle)
    }

    /// Actor event loop. Runs until closed or until every handle is gone.
    pub async fn run(mut self) {
        log::info!("room {} actor starting", self.state.room_id);

        while let Some(message) = self.inbox.recv().await {
            self.handle(message);
            if self.is_closed {
                break;
            }
        }

        log::info!("room {} actor stopped", self.state.room_id);
    }

    fn handle(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join {
                connection,
                player_id,
                reply,
            } => {
                let result = self.handle_join(connection, player_id);
                let _ = reply.send(result);
            }

            RoomMessage::TakeSeat {
                connection,
                seat_number,
                username,
                starting_stack,
                reply,
            } => {
                let result = self
                    .state
                    .take_seat(connection, seat_number, username, starting_stack)
                    .map(|player_id| {
                        let username = self.state.players[&player_id].username.to_string();
                        self.notify(RoomEvent::PlayerJoined {
                            player_id,
                            username,
                            seat_number,
                        });
                        self.broadcast_state();
                        Seated {
                            event_id: Uuid::new_v4(),
                            player_id,
                        }
                    });
                let _ = reply.send(result);
            }

            RoomMessage::LeaveSeat { connection, reply } => {
                let result = self.state.leave_seat(connection).map(|player| {
                    self.notify(RoomEvent::PlayerLeft {
                        player_id: player.player_id,
                        reason: LeaveReason::Voluntary,
                    });
                    self.broadcast_state();
                    Uuid::new_v4()
                });
                let _ = reply.send(result);
            }

            RoomMessage::TakeAction {
                connection,
                kind,
                amount,
                reply,
            } => {
                let result = self
                    .state
                    .player_action(connection, kind, amount)
                    .map(|record| {
                        self.broadcast_state();
                        record.action_id
                    });
                let _ = reply.send(result);
            }

            RoomMessage::StartHand { connection, reply } => {
                let result = self.state.start_hand(connection).map(|hand| {
                    (
                        hand.hand_id,
                        hand.dealer_seat,
                        hand.small_blind_seat,
                        hand.big_blind_seat,
                    )
                });
                let result = result.map(
                    |(hand_id, dealer_seat, small_blind_seat, big_blind_seat)| {
                        self.notify(RoomEvent::HandStarted {
                            hand_id,
                            dealer_seat,
                            small_blind_seat,
                            big_blind_seat,
                        });
                        self.broadcast_state();
                        Uuid::new_v4()
                    },
                );
                let _ = reply.send(result);
            }

            RoomMessage::UpdateConfig {
                connection,
                update,
                reply,
            } => {
                let result = self.state.update_config(connection, &update).map(|()| {
                    self.broadcast_state();
                    Uuid::new_v4()
                });
                let _ = reply.send(result);
            }

            RoomMessage::RequestSeatChange {
                connection,
                new_seat,
                reply,
            } => {
                let result = self.state.request_seat_change(connection, new_seat).map(
                    |(player_id, current_seat)| {
                        // Routed to the owner, not broadcast: nothing
                        // changed yet.
                        self.notify_owner(RoomEvent::SeatChangeRequested {
                            player_id,
                            current_seat,
                            requested_seat: new_seat,
                        });
                        Uuid::new_v4()
                    },
                );
                let _ = reply.send(result);
            }

            RoomMessage::ApproveSeatChange {
                connection,
                player_id,
                new_seat,
                reply,
            } => {
                let result = self
                    .state
                    .approve_seat_change(connection, player_id, new_seat)
                    .map(|()| {
                        self.broadcast_state();
                        Uuid::new_v4()
                    });
                let _ = reply.send(result);
            }

            RoomMessage::GetSnapshot { reply } => {
                let _ = reply.send(Arc::new(self.state.snapshot()));
            }

            RoomMessage::Disconnect { connection } => {
                self.subscribers.remove(&connection);
                if let Some(player) = self.state.disconnect(connection) {
                    self.notify(RoomEvent::PlayerLeft {
                        player_id: player.player_id,
                        reason: LeaveReason::Disconnected,
                    });
                    self.broadcast_state();
                }
            }

            RoomMessage::Subscribe { connection, sender } => {
                self.subscribers.insert(connection, sender);
                log::debug!(
                    "room {}: connection {} subscribed",
                    self.state.room_id,
                    connection
                );
            }

            RoomMessage::Unsubscribe { connection } => {
                self.subscribers.remove(&connection);
            }

            RoomMessage::Close { reply } => {
                self.is_closed = true;
                let _ = reply.send(());
            }
        }
    }

    fn handle_join(
        &mut self,
        connection: ConnectionId,
        player_id: Option<PlayerId>,
    ) -> RoomResult<Arc<RoomSnapshot>> {
        if let Some(player_id) = player_id {
            self.state.reconnect(player_id, connection)?;
            self.broadcast_state();
        }
        Ok(Arc::new(self.state.snapshot()))
    }

    fn broadcast_state(&mut self) {
        let snapshot = Arc::new(self.state.snapshot());
        self.notify(RoomEvent::State(snapshot));
    }

    /// Fan an event out to every subscriber. A full channel drops the
    /// event for that subscriber; a closed channel drops the subscriber.
    fn notify(&mut self, event: RoomEvent) {
        let room_id = &self.state.room_id;
        self.subscribers.retain(|connection, sender| {
            match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "room {room_id}: subscriber {connection} channel full, dropping event"
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("room {room_id}: subscriber {connection} gone, removing");
                    false
                }
            }
        });
    }

    fn notify_owner(&mut self, event: RoomEvent) {
        let owner = self.state.owner;
        if let Some(sender) = self.subscribers.get(&owner)
            && sender.try_send(event).is_err()
        {
            log::warn!(
                "room {}: could not deliver owner event to {}",
                self.state.room_id,
                owner
            );
        }
    }
}
