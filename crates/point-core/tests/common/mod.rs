#![allow(dead_code)]

use mediactl_point_core::config::{ControllerConfig, ControllerSettings};
use mediactl_point_core::controller::PointState;
use mediactl_point_core::environment::MediaEnvironment;
use mediactl_point_core::manager::Manager;
use mediactl_point_core::media_point::FrontendReady;
use mediactl_point_core::messaging::{Message, MessageType, Outbox};
use mediactl_point_core::transport::recording::{RecordingKeyExchangeAgent, RecordingTranscodingFactory, TransportLog};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

pub const PUBLIC_IP: &str = "192.0.2.10";
pub const PEER_IP: &str = "198.51.100.7";

/// 30 bytes 0x00..0x1d, base64
pub const PEER_KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwd";
pub const PEER_KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d";

pub struct Harness {
    pub manager: Manager,
    pub ready: UnboundedReceiver<FrontendReady>,
    pub factory: Arc<RecordingTranscodingFactory>,
    pub log: TransportLog,
    pub outbox: Outbox,
}

pub fn config() -> ControllerConfig {
    let settings = ControllerSettings {
        default_ip: PUBLIC_IP.to_string(),
        profiles: HashMap::from([
            ("default".to_string(), format!("{}:40000-40100 (0.0.0.0)", PUBLIC_IP)),
            ("local".to_string(), "127.0.0.1:41000-41100 (127.0.0.1)".to_string()),
        ]),
        ..ControllerSettings::default()
    };
    ControllerConfig::from_settings(&settings).unwrap()
}

pub fn environment() -> (MediaEnvironment, UnboundedReceiver<FrontendReady>, Arc<RecordingTranscodingFactory>, TransportLog) {
    let log = TransportLog::new();
    let factory = Arc::new(RecordingTranscodingFactory::new(log.clone()));
    let (env, ready) = MediaEnvironment::new(config(), factory.clone());
    (env, ready, factory, log)
}

impl Harness {
    pub fn new() -> Self {
        let (env, ready, factory, log) = environment();
        Self::from_env(env, ready, factory, log)
    }

    pub fn with_key_exchange() -> Self {
        let (env, ready, factory, log) = environment();
        let agent = Arc::new(RecordingKeyExchangeAgent::new(log.clone(), 50000));
        Self::from_env(env.with_key_exchange(agent), ready, factory, log)
    }

    fn from_env(
        env: MediaEnvironment,
        ready: UnboundedReceiver<FrontendReady>,
        factory: Arc<RecordingTranscodingFactory>,
        log: TransportLog,
    ) -> Self {
        Self {
            manager: Manager::new(env),
            ready,
            factory,
            log,
            outbox: Outbox::new(),
        }
    }

    pub fn state(&self, point_id: &str) -> Option<PointState> {
        self.manager.get_point(point_id).map(|controller| controller.state())
    }

    /// Create a point and feed it `CREATE_OFFER` on the default profile
    pub fn offer(&mut self, point_id: &str, cc: Value, vv: Value) -> mediactl_point_core::Result<()> {
        self.manager
            .create_point(point_id, create_message(point_id, cc.clone(), vv.clone()))
            .unwrap();
        self.manager.create_offer(point_id, cc, vv, "", &mut self.outbox)
    }

    /// Deliver frontend results until the point is done creating its offer
    pub async fn pump(&mut self, point_id: &str) {
        while self.state(point_id) == Some(PointState::CreatingOffer) {
            let ready = self.ready.recv().await.unwrap();
            let _ = self.manager.on_frontend_ready(ready, &mut self.outbox);
        }
    }

    /// Offer, bind and answer an audio only point
    pub async fn connected_audio(&mut self, point_id: &str, peer_port: u16) {
        self.offer(point_id, json!({"audio": ["PCMA/8000"]}), json!([true, false]))
            .unwrap();
        self.pump(point_id).await;
        self.answer(point_id, &answer(Some(peer_port), None));
        assert_eq!(self.state(point_id), Some(PointState::Connected));
    }

    pub fn answer(&mut self, point_id: &str, sdp: &str) {
        self.manager
            .dispatch(
                point_id,
                mediactl_point_core::controller::PointEvent::SdpAnswer(sdp.to_string()),
                &mut self.outbox,
            )
            .unwrap();
    }

    pub fn sent_types(&mut self) -> Vec<MessageType> {
        self.outbox
            .drain()
            .into_iter()
            .map(|outgoing| outgoing.message.message_type)
            .collect()
    }
}

pub fn create_message(point_id: &str, cc: Value, vv: Value) -> Message {
    Message::new(MessageType::CreateMediaPoint)
        .with("pointId", point_id)
        .with("sender", "sip-gw")
        .with("cc", cc)
        .with("vv", vv)
}

/// Plain RTP answer; `None` leaves the media out, `Some(0)` declines it
pub fn answer(audio_port: Option<u16>, video_port: Option<u16>) -> String {
    let mut lines = vec![
        "v=0".to_string(),
        format!("o=- 4242 1 IN IP4 {}", PEER_IP),
        "s=-".to_string(),
        format!("c=IN IP4 {}", PEER_IP),
        "t=0 0".to_string(),
    ];
    if let Some(port) = audio_port {
        lines.push(format!("m=audio {} RTP/AVP 8", port));
        lines.push("a=rtpmap:8 PCMA/8000".to_string());
    }
    if let Some(port) = video_port {
        lines.push(format!("m=video {} RTP/AVP 100", port));
        lines.push("a=rtpmap:100 VP8/90000".to_string());
    }
    lines.push(String::new());
    lines.join("\r\n")
}

/// SRTP answer carrying ICE credentials, a crypto key and one ssrc
pub fn secure_answer(audio_port: u16) -> String {
    [
        "v=0".to_string(),
        format!("o=- 4242 1 IN IP4 {}", PEER_IP),
        "s=-".to_string(),
        format!("c=IN IP4 {}", PEER_IP),
        "t=0 0".to_string(),
        format!("m=audio {} RTP/SAVPF 8", audio_port),
        "a=ice-ufrag:peerufrag".to_string(),
        "a=ice-pwd:peerpasswordpeerpassword".to_string(),
        "a=sendrecv".to_string(),
        format!("a=crypto:1 AES_CM_128_HMAC_SHA1_80 inline:{}", PEER_KEY),
        "a=rtpmap:8 PCMA/8000".to_string(),
        "a=ssrc:3735928559 cname:peer".to_string(),
        String::new(),
    ]
    .join("\r\n")
}
