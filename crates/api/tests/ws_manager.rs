//! Unit tests for `WsManager` room delivery and the realtime relay.
//!
//! These exercise the connection registry directly, without performing any
//! HTTP upgrades.

use std::sync::Arc;

use axum::extract::ws::Message;
use hostel_api::notifications::RealtimeRelay;
use hostel_api::ws::WsManager;
use hostel_core::outbox::Room;
use hostel_events::{EventBus, RealtimeEvent};
use serde_json::json;

fn text_json(message: Message) -> serde_json::Value {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn add_and_remove_track_room_membership() {
    let manager = WsManager::new();

    let _student = manager.add("conn-1".into(), 7, &[Room::User(7)]).await;
    let _admin = manager
        .add("conn-2".into(), 1, &[Room::User(1), Room::Admin])
        .await;

    assert_eq!(manager.connection_count().await, 2);
    assert_eq!(manager.room_size("user:7").await, 1);
    assert_eq!(manager.room_size("admin").await, 1);

    manager.remove("conn-2").await;
    assert_eq!(manager.room_size("admin").await, 0);
    assert_eq!(manager.connection_count().await, 1);

    // Unknown IDs are ignored.
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn send_to_room_reaches_only_members() {
    let manager = WsManager::new();

    let mut first_tab = manager.add("tab-1".into(), 7, &[Room::User(7)]).await;
    let mut second_tab = manager.add("tab-2".into(), 7, &[Room::User(7)]).await;
    let mut other = manager.add("conn-3".into(), 8, &[Room::User(8)]).await;

    let sent = manager
        .send_to_room("user:7", Message::Text("hello".into()))
        .await;

    assert_eq!(sent, 2);
    assert!(first_tab.try_recv().is_ok());
    assert!(second_tab.try_recv().is_ok());
    assert!(other.try_recv().is_err());
}

#[tokio::test]
async fn closed_receivers_are_skipped() {
    let manager = WsManager::new();

    let rx = manager.add("conn-1".into(), 7, &[Room::User(7)]).await;
    drop(rx);

    let sent = manager
        .send_to_room("user:7", Message::Text("hello".into()))
        .await;
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".into(), 1, &[Room::Admin]).await;
    let mut rx2 = manager.add("conn-2".into(), 2, &[Room::User(2)]).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn ping_all_reaches_every_connection() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".into(), 1, &[Room::Admin]).await;
    let mut rx2 = manager.add("conn-2".into(), 2, &[Room::User(2)]).await;

    manager.ping_all().await;

    assert!(matches!(rx1.recv().await, Some(Message::Ping(_))));
    assert!(matches!(rx2.recv().await, Some(Message::Ping(_))));
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_delivers_frame_to_event_room() {
    let manager = Arc::new(WsManager::new());
    let mut admin = manager.add("admin".into(), 1, &[Room::User(1), Room::Admin]).await;
    let mut student = manager.add("student".into(), 7, &[Room::User(7)]).await;
    let relay = RealtimeRelay::new(Arc::clone(&manager));

    let event =
        RealtimeEvent::new(Room::Admin, "complaintCreated").with_payload(json!({ "id": 3 }));
    assert_eq!(relay.deliver(&event).await, 1);

    let frame = text_json(admin.try_recv().unwrap());
    assert_eq!(frame["event"], "complaintCreated");
    assert_eq!(frame["data"]["id"], 3);
    assert!(student.try_recv().is_err());
}

#[tokio::test]
async fn relay_stops_when_bus_is_dropped() {
    let manager = Arc::new(WsManager::new());
    let mut student = manager.add("student".into(), 7, &[Room::User(7)]).await;

    let bus = EventBus::default();
    let handle = tokio::spawn(RealtimeRelay::new(Arc::clone(&manager)).run(bus.subscribe()));

    bus.publish(
        RealtimeEvent::new(Room::User(7), "complaintDeleted")
            .with_payload(json!({ "complaint_id": 9 })),
    );
    drop(bus);

    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("relay should exit once the bus closes")
        .unwrap();

    let frame = text_json(student.recv().await.unwrap());
    assert_eq!(frame["event"], "complaintDeleted");
    assert_eq!(frame["data"]["complaint_id"], 9);
}
