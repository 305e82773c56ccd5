/// Integration tests for the room actor and registry
///
/// These exercise the async surface: acknowledgement contracts over
/// oneshot replies, event fan-out to subscribers, connection routing,
/// reconnects, and room reaping.
use std::time::Duration;

use chip_rooms::game::entities::{ActionKind, ConnectionId, RoomId, Username};
use chip_rooms::game::errors::RoomError;
use chip_rooms::room::{
    ConfigUpdate, RoomActor, RoomConfig, RoomEvent, RoomHandle, RoomRegistry, RoomState,
};
use tokio::sync::mpsc;
use tokio::time::timeout;
use uuid::Uuid;

fn spawn_room(owner: ConnectionId) -> RoomHandle {
    let state = RoomState::new(RoomId::generate(), owner, RoomConfig::default());
    let (actor, handle) = RoomActor::new(state);
    tokio::spawn(actor.run());
    handle
}

async fn recv_event(rx: &mut mpsc::Receiver<RoomEvent>) -> RoomEvent {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test]
async fn acks_carry_event_ids_or_structured_errors() {
    let owner = Uuid::new_v4();
    let handle = spawn_room(owner);

    let alice = Uuid::new_v4();
    let seated = handle
        .take_seat(alice, 1, Username::new("alice"), 100)
        .await
        .unwrap();

    // Same seat again: rejected with the taxonomy error, not a panic.
    let bob = Uuid::new_v4();
    let err = handle
        .take_seat(bob, 1, Username::new("bob"), 100)
        .await
        .unwrap_err();
    assert_eq!(err, RoomError::SeatOccupied(1));
    assert_eq!(err.code(), "SEAT_OCCUPIED");

    handle
        .take_seat(bob, 2, Username::new("bob"), 100)
        .await
        .unwrap();
    handle.start_hand(owner).await.unwrap();

    let event_id = handle.take_action(alice, ActionKind::Call, None).await.unwrap();
    assert_ne!(event_id, seated.event_id);
}

#[tokio::test]
async fn subscribers_get_deltas_and_a_fresh_snapshot() {
    let owner = Uuid::new_v4();
    let handle = spawn_room(owner);
    let mut events = handle.subscribe(owner).await.unwrap();

    let alice = Uuid::new_v4();
    handle
        .take_seat(alice, 3, Username::new("alice"), 100)
        .await
        .unwrap();

    let joined = recv_event(&mut events).await;
    match joined {
        RoomEvent::PlayerJoined {
            username,
            seat_number,
            ..
        } => {
            assert_eq!(username, "alice");
            assert_eq!(seat_number, 3);
        }
        other => panic!("expected PlayerJoined, got {other:?}"),
    }

    let state = recv_event(&mut events).await;
    match state {
        RoomEvent::State(snapshot) => {
            assert!(snapshot.seats[2].is_occupied);
        }
        other => panic!("expected State, got {other:?}"),
    }
}

#[tokio::test]
async fn seat_change_requests_reach_only_the_owner() {
    let owner = Uuid::new_v4();
    let handle = spawn_room(owner);
    let mut owner_events = handle.subscribe(owner).await.unwrap();

    let alice = Uuid::new_v4();
    let seated = handle
        .take_seat(alice, 1, Username::new("alice"), 100)
        .await
        .unwrap();
    let mut alice_events = handle.subscribe(alice).await.unwrap();

    // Drain the owner's join notifications first.
    recv_event(&mut owner_events).await;
    recv_event(&mut owner_events).await;

    handle.request_seat_change(alice, 5).await.unwrap();

    let event = recv_event(&mut owner_events).await;
    match event {
        RoomEvent::SeatChangeRequested {
            player_id,
            current_seat,
            requested_seat,
        } => {
            assert_eq!(player_id, seated.player_id);
            assert_eq!(current_seat, 1);
            assert_eq!(requested_seat, 5);
        }
        other => panic!("expected SeatChangeRequested, got {other:?}"),
    }

    // Alice sees nothing: the request changed no state.
    assert!(
        timeout(Duration::from_millis(100), alice_events.recv())
            .await
            .is_err()
    );

    handle
        .approve_seat_change(owner, seated.player_id, 5)
        .await
        .unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.seats[4].is_occupied);
    assert!(!snapshot.seats[0].is_occupied);
}

#[tokio::test]
async fn registry_routes_requests_and_updates_bindings() {
    let registry = RoomRegistry::new();
    let owner = Uuid::new_v4();
    let room_id = registry
        .create_room(owner, RoomConfig::default())
        .await
        .unwrap();
    assert_eq!(room_id.as_str().len(), 6);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    registry.join_room(alice, &room_id, None).await.unwrap();
    registry.join_room(bob, &room_id, None).await.unwrap();

    registry
        .take_seat(alice, 1, Username::new("alice"), 100)
        .await
        .unwrap();
    registry
        .take_seat(bob, 2, Username::new("bob"), 100)
        .await
        .unwrap();

    assert_eq!(
        registry.start_hand(alice).await.unwrap_err(),
        RoomError::OwnerOnly
    );
    registry.start_hand(owner).await.unwrap();

    // Alice's call matches the big blind, which is all it takes to close
    // the round.
    registry
        .player_action(alice, ActionKind::Call, None)
        .await
        .unwrap();

    let snapshot = registry.snapshot(&room_id).await.unwrap();
    let hand = snapshot.hand.as_ref().unwrap();
    assert!(hand.round.is_none());
    assert_eq!(hand.completed_rounds.len(), 1);

    let mut connections = registry.connections_in_room(&room_id).await;
    connections.sort();
    let mut expected = vec![owner, alice, bob];
    expected.sort();
    assert_eq!(connections, expected);
}

#[tokio::test]
async fn reconnect_rebinds_a_seated_player() {
    let registry = RoomRegistry::new();
    let owner = Uuid::new_v4();
    let room_id = registry
        .create_room(owner, RoomConfig::default())
        .await
        .unwrap();

    let alice = Uuid::new_v4();
    registry.join_room(alice, &room_id, None).await.unwrap();
    let seated = registry
        .take_seat(alice, 1, Username::new("alice"), 100)
        .await
        .unwrap();

    // A fresh connection joins as the same player and can act for them.
    let alice_again = Uuid::new_v4();
    let snapshot = registry
        .join_room(alice_again, &room_id, Some(seated.player_id))
        .await
        .unwrap();
    let player = snapshot.seats[0].player.as_ref().unwrap();
    assert_eq!(player.player_id, seated.player_id);
    assert!(player.is_connected);

    assert_eq!(
        registry.leave_seat(alice_again).await.err(),
        None,
        "the rebound connection controls the seat"
    );
}

#[tokio::test]
async fn disconnect_releases_the_seat_immediately() {
    let owner = Uuid::new_v4();
    let handle = spawn_room(owner);
    let mut events = handle.subscribe(owner).await.unwrap();

    let alice = Uuid::new_v4();
    let seated = handle
        .take_seat(alice, 1, Username::new("alice"), 100)
        .await
        .unwrap();
    recv_event(&mut events).await; // PlayerJoined
    recv_event(&mut events).await; // State

    handle.disconnect(alice).await.unwrap();
    let event = recv_event(&mut events).await;
    match event {
        RoomEvent::PlayerLeft { player_id, reason } => {
            assert_eq!(player_id, seated.player_id);
            assert_eq!(format!("{reason:?}"), "Disconnected");
        }
        other => panic!("expected PlayerLeft, got {other:?}"),
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.seats[0].is_occupied);
}

#[tokio::test]
async fn reaping_closes_only_idle_empty_rooms() {
    let registry = RoomRegistry::new();
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();
    let room_a = registry
        .create_room(owner_a, RoomConfig::default())
        .await
        .unwrap();
    let room_b = registry
        .create_room(owner_b, RoomConfig::default())
        .await
        .unwrap();

    // Room A empties out; room B keeps its owner connected.
    registry.disconnect(owner_a).await;

    let reaped = registry.reap_empty_rooms(chrono::Duration::zero()).await;
    assert_eq!(reaped, 1);
    assert!(!registry.contains(&room_a).await);
    assert!(registry.contains(&room_b).await);

    // An empty room inside its idle grace period survives.
    registry.disconnect(owner_b).await;
    let reaped = registry.reap_empty_rooms(chrono::Duration::hours(1)).await;
    assert_eq!(reaped, 0);
    assert!(registry.contains(&room_b).await);
}

#[tokio::test]
async fn rooms_are_isolated_from_each_other() {
    let registry = RoomRegistry::new();
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();
    let room_a = registry
        .create_room(owner_a, RoomConfig::default())
        .await
        .unwrap();
    let room_b = registry
        .create_room(owner_b, RoomConfig::default())
        .await
        .unwrap();
    assert_ne!(room_a, room_b);

    registry
        .take_seat(owner_a, 1, Username::new("alice"), 100)
        .await
        .unwrap();
    registry
        .update_config(
            owner_b,
            ConfigUpdate {
                small_blind: Some(50),
                ..ConfigUpdate::default()
            },
        )
        .await
        .unwrap();

    let snapshot_a = registry.snapshot(&room_a).await.unwrap();
    let snapshot_b = registry.snapshot(&room_b).await.unwrap();
    assert!(snapshot_a.seats[0].is_occupied);
    assert!(!snapshot_b.seats[0].is_occupied);
    assert_eq!(snapshot_a.config.small_blind, 5);
    assert_eq!(snapshot_b.config.small_blind, 50);

    // The same username is free in the other room.
    registry
        .take_seat(owner_b, 1, Username::new("alice"), 100)
        .await
        .unwrap();
}

#[tokio::test]
async fn closing_a_room_rejects_later_requests() {
    let registry = RoomRegistry::new();
    let owner = Uuid::new_v4();
    let room_id = registry
        .create_room(owner, RoomConfig::default())
        .await
        .unwrap();

    registry.close_room(&room_id).await.unwrap();
    assert!(!registry.contains(&room_id).await);
    assert_eq!(
        registry.start_hand(owner).await.unwrap_err(),
        RoomError::NotInRoom
    );
    assert_eq!(
        registry.join_room(owner, &room_id, None).await.unwrap_err(),
        RoomError::RoomNotFound(room_id.to_string())
    );
}
