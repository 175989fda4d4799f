//! Room membership, bridging and migration through the manager.

mod common;

use common::Harness;
use mediactl_point_core::error::{Error, ManagerError};
use mediactl_point_core::transport::recording::TransportCall;
use mediactl_sdp_core::MediaType;
use pretty_assertions::assert_eq;
use serde_json::json;

async fn three_points() -> Harness {
    let mut h = Harness::new();
    h.connected_audio("a", 30000).await;
    h.connected_audio("b", 30010).await;
    h.connected_audio("c", 30020).await;
    h.outbox.drain();
    h.log.clear();
    h
}

#[tokio::test]
async fn test_two_points_are_bridged() {
    let mut h = three_points().await;

    h.manager.join_room("a", "r1").unwrap();
    assert_eq!(h.log.count(|call| matches!(call, TransportCall::Play { .. })), 0);
    h.manager.join_room("b", "r1").unwrap();

    let room = h.manager.get_room("r1").unwrap();
    assert_eq!(room.point_ids(), ["a".to_string(), "b".to_string()]);
    assert_eq!(room.media_room(MediaType::Audio).unwrap().len(), 2);
    assert!(room.media_room(MediaType::Video).is_none());

    // each leg is spliced behind its DTMF sender
    let links = h.log.filter(|call| matches!(call, TransportCall::Link { .. }));
    let destinations: Vec<String> = links
        .iter()
        .filter_map(|call| match call {
            TransportCall::Link { source, destination, .. } if source.starts_with("rtp-") => Some(destination.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(destinations, vec!["dtmf-b.sink".to_string(), "dtmf-a.sink".to_string()]);
    assert_eq!(h.log.count(|call| matches!(call, TransportCall::Play { .. })), 1);
    assert_eq!(h.log.count(|call| matches!(call, TransportCall::ForceKeyUnit { .. })), 2);
}

#[tokio::test]
async fn test_third_point_is_refused() {
    let mut h = three_points().await;
    h.manager.join_room("a", "r1").unwrap();
    h.manager.join_room("b", "r1").unwrap();

    let err = h.manager.join_room("c", "r1").unwrap_err();

    assert!(matches!(err, Error::Manager(ManagerError::MediaRoomFull(MediaType::Audio))));
    assert_eq!(h.manager.room_for_point("c").map(|room| room.room_id()), None);
    assert_eq!(h.manager.get_room("r1").unwrap().points_count(), 2);
}

#[tokio::test]
async fn test_room_is_deleted_when_empty() {
    let mut h = three_points().await;
    h.manager.join_room("a", "r1").unwrap();
    h.manager.join_room("b", "r1").unwrap();

    h.manager.unjoin("a").unwrap();
    assert_eq!(h.log.count(|call| matches!(call, TransportCall::StopContext { .. })), 1);
    assert_eq!(h.manager.rooms_count(), 1);

    h.manager.remove_point("b", &mut h.outbox).unwrap();
    assert_eq!(h.manager.rooms_count(), 0);
    assert!(h.manager.get_room("r1").is_none());

    let err = h.manager.unjoin("a").unwrap_err();
    assert!(matches!(err, Error::Manager(ManagerError::NotInRoom(_))));
}

#[tokio::test]
async fn test_join_moves_between_rooms() {
    let mut h = three_points().await;
    h.manager.join_room("a", "r1").unwrap();
    h.manager.join_room("b", "r2").unwrap();

    h.manager.join_room("a", "r2").unwrap();

    assert!(h.manager.get_room("r1").is_none());
    assert_eq!(h.manager.room_for_point("a").map(|room| room.room_id()), Some("r2"));
    assert_eq!(h.manager.get_room("r2").unwrap().points_count(), 2);
}

#[tokio::test]
async fn test_join_same_room_twice_is_an_error() {
    let mut h = three_points().await;
    h.manager.join_room("a", "r1").unwrap();

    let err = h.manager.join_room("a", "r1").unwrap_err();

    assert!(matches!(
        err,
        Error::Manager(ManagerError::AlreadyInRoom { ref point_id, ref room_id }) if point_id == "a" && room_id == "r1"
    ));
    assert_eq!(h.manager.get_room("r1").unwrap().points_count(), 1);
}

#[tokio::test]
async fn test_join_requires_existing_ready_point() {
    let mut h = Harness::new();
    let err = h.manager.join_room("ghost", "r1").unwrap_err();
    assert!(matches!(err, Error::Manager(ManagerError::PointNotFound(_))));

    h.offer("p1", json!({"audio": ["PCMA/8000"]}), json!([true, false]))
        .unwrap();
    let err = h.manager.join_room("p1", "r1").unwrap_err();
    assert!(matches!(err, Error::Manager(ManagerError::PointNotReady(_))));
    assert_eq!(h.manager.rooms_count(), 0);
}
