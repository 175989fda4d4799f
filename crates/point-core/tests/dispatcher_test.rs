//! End to end flows through the media controller task.

mod common;

use common::{answer, create_message, environment};
use mediactl_point_core::dispatcher::{MediaController, MediaControllerHandle};
use mediactl_point_core::messaging::{ChannelTransport, Message, MessageType, Outgoing};
use mediactl_point_core::transport::recording::{TransportCall, TransportLog};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::timeout;

struct Running {
    handle: MediaControllerHandle,
    outgoing: UnboundedReceiver<Outgoing>,
    log: TransportLog,
    task: JoinHandle<mediactl_point_core::Result<()>>,
}

fn start() -> Running {
    let (env, ready, _factory, log) = environment();
    let (transport, outgoing) = ChannelTransport::new();
    let (controller, handle) = MediaController::new(env, ready, Arc::new(transport));
    Running {
        handle,
        outgoing,
        log,
        task: controller.spawn(),
    }
}

impl Running {
    async fn next(&mut self) -> Outgoing {
        timeout(Duration::from_secs(5), self.outgoing.recv())
            .await
            .expect("no message from the controller")
            .expect("controller transport closed")
    }

    fn send(&self, message: Message) {
        self.handle.send_message(message).unwrap();
    }

    async fn connect(&mut self, point_id: &str, peer_port: u16) {
        self.send(create_message(point_id, json!({"audio": ["PCMA/8000"]}), json!([true, false])));
        let offer = self.next().await;
        assert_eq!(offer.message.message_type, MessageType::SdpOffer);

        self.send(
            Message::new(MessageType::SdpAnswer)
                .with("pointId", point_id)
                .with("sdp", answer(Some(peer_port), None)),
        );
        let ok = self.next().await;
        assert_eq!(ok.message.message_type, MessageType::CreateMediaPointOk);
    }

    async fn stop(self) {
        self.handle.shutdown().unwrap();
        self.task.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_create_answer_remove() {
    let mut running = start();
    running.connect("p1", 30000).await;

    running.send(Message::new(MessageType::RemoveMediaPoint).with("pointId", "p1"));
    let removed = running.next().await;
    assert_eq!(removed.channel, "sip-gw");
    assert_eq!(removed.message.message_type, MessageType::RemoveMediaPointOk);

    running.send(
        Message::new(MessageType::RemoveMediaPoint)
            .with("pointId", "p1")
            .with("sender", "sip-gw"),
    );
    let failed = running.next().await;
    assert_eq!(failed.message.message_type, MessageType::RemoveMediaPointFailed);
    assert_eq!(failed.message.get_str("reason").as_deref(), Some("Manager error: Point p1 not found"));

    running.stop().await;
}

#[tokio::test]
async fn test_failed_offer_removes_point() {
    let mut running = start();

    running.send(
        create_message("p1", json!({"audio": ["PCMA/8000"]}), json!([true, false])).with("profile", "nowhere"),
    );
    let failed = running.next().await;
    assert_eq!(failed.message.message_type, MessageType::CreateMediaPointFailed);

    // the id is free again
    running.send(create_message("p1", json!({"audio": ["PCMA/8000"]}), json!([true, false])));
    let offer = running.next().await;
    assert_eq!(offer.message.message_type, MessageType::SdpOffer);

    running.stop().await;
}

#[tokio::test]
async fn test_missing_point_id_is_critical() {
    let mut running = start();

    running.send(Message::new(MessageType::JoinRoom).with("sender", "sip-gw").with("roomId", "r1"));
    let reply = running.next().await;
    assert_eq!(reply.message.message_type, MessageType::CriticalError);
    assert_eq!(reply.message.get_str("reason").as_deref(), Some("pointId is missing"));

    running.stop().await;
}

#[tokio::test]
async fn test_bridge_two_points_and_dtmf() {
    let mut running = start();
    let log = running.log.clone();
    running.connect("a", 30000).await;
    running.connect("b", 30010).await;

    for point_id in ["a", "b"] {
        running.send(
            Message::new(MessageType::JoinRoom)
                .with("pointId", point_id)
                .with("roomId", "r1"),
        );
    }
    running.send(Message::new(MessageType::SendDtmf).with("pointId", "a").with("dtmf", "5"));
    running.send(Message::new(MessageType::from("BOGUS".to_string())).with("pointId", "a"));

    // inputs are handled in order, so shutdown runs after everything above
    running.stop().await;

    assert_eq!(log.count(|call| matches!(call, TransportCall::Play { .. })), 1);
    assert_eq!(
        log.filter(|call| matches!(call, TransportCall::SendDtmf { .. })),
        vec![TransportCall::SendDtmf {
            element: "dtmf-a".into(),
            digits: "5".into(),
        }]
    );
    assert_eq!(log.count(|call| matches!(call, TransportCall::StopContext { .. })), 1);
    assert_eq!(log.count(|call| matches!(call, TransportCall::DisposeFrontend { .. })), 2);
}

#[tokio::test]
async fn test_internal_timer_ticks_points() {
    let (env, ready, _factory, log) = environment();
    let (transport, mut outgoing) = ChannelTransport::new();
    let (controller, handle) = MediaController::new(env, ready, Arc::new(transport));
    let task = controller.with_timer(Duration::from_millis(10)).spawn();

    handle
        .send_message(create_message("p1", json!({"audio": ["PCMA/8000"]}), json!([true, false])))
        .unwrap();
    let offer = timeout(Duration::from_secs(5), outgoing.recv()).await.unwrap().unwrap();
    assert_eq!(offer.message.message_type, MessageType::SdpOffer);
    tokio::time::sleep(Duration::from_millis(50)).await;

    handle.shutdown().unwrap();
    task.await.unwrap().unwrap();
    assert_eq!(log.count(|call| matches!(call, TransportCall::DisposeFrontend { .. })), 1);
}
