//! Signaling messages exchanged with the message bus.
//!
//! A message is a type plus a flat string keyed map. On the wire the type is
//! stored under `"type"` next to the data keys:
//!
//! ```json
//! {"type": "CREATE_MEDIA_POINT", "pointId": "p1", "sender": "sip-gw", "vv": [true, false]}
//! ```

mod transport;

pub use transport::{ChannelTransport, MessageTransport};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Message types understood or produced by the controller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    CreateMediaPoint,
    CreateMediaPointOk,
    CreateMediaPointFailed,
    RemoveMediaPoint,
    RemoveMediaPointOk,
    RemoveMediaPointFailed,
    JoinRoom,
    UnjoinRoom,
    SdpOffer,
    SdpAnswer,
    SendDtmf,
    CriticalError,
    /// Anything else; kept verbatim so it can be logged
    Unknown(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::CreateMediaPoint => "CREATE_MEDIA_POINT",
            MessageType::CreateMediaPointOk => "CREATE_MEDIA_POINT_OK",
            MessageType::CreateMediaPointFailed => "CREATE_MEDIA_POINT_FAILED",
            MessageType::RemoveMediaPoint => "REMOVE_MEDIA_POINT",
            MessageType::RemoveMediaPointOk => "REMOVE_MEDIA_POINT_OK",
            MessageType::RemoveMediaPointFailed => "REMOVE_MEDIA_POINT_FAILED",
            MessageType::JoinRoom => "JOIN_ROOM",
            MessageType::UnjoinRoom => "UNJOIN_ROOM",
            MessageType::SdpOffer => "SDP_OFFER",
            MessageType::SdpAnswer => "SDP_ANSWER",
            MessageType::SendDtmf => "SEND_DTMF",
            MessageType::CriticalError => "CRITICAL_ERROR",
            MessageType::Unknown(other) => other,
        }
    }
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CREATE_MEDIA_POINT" => MessageType::CreateMediaPoint,
            "CREATE_MEDIA_POINT_OK" => MessageType::CreateMediaPointOk,
            "CREATE_MEDIA_POINT_FAILED" => MessageType::CreateMediaPointFailed,
            "REMOVE_MEDIA_POINT" => MessageType::RemoveMediaPoint,
            "REMOVE_MEDIA_POINT_OK" => MessageType::RemoveMediaPointOk,
            "REMOVE_MEDIA_POINT_FAILED" => MessageType::RemoveMediaPointFailed,
            "JOIN_ROOM" => MessageType::JoinRoom,
            "UNJOIN_ROOM" => MessageType::UnjoinRoom,
            "SDP_OFFER" => MessageType::SdpOffer,
            "SDP_ANSWER" => MessageType::SdpAnswer,
            "SEND_DTMF" => MessageType::SendDtmf,
            "CRITICAL_ERROR" => MessageType::CriticalError,
            _ => MessageType::Unknown(s),
        }
    }
}

impl From<MessageType> for String {
    fn from(message_type: MessageType) -> Self {
        match message_type {
            MessageType::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signaling message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Message {
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            data: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// String value of `key`; numbers are accepted and rendered as text.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn sender(&self) -> Option<String> {
        self.get_str("sender")
    }

    pub fn point_id(&self) -> Option<String> {
        self.get_str("pointId")
    }

    pub fn room_id(&self) -> Option<String> {
        self.get_str("roomId")
    }

    /// Copy of this message's data under a new type, extended with `extra`,
    /// addressed to `channel`.
    pub fn forward(&self, channel: impl Into<String>, message_type: MessageType, extra: Option<Map<String, Value>>) -> Outgoing {
        let mut data = self.data.clone();
        if let Some(extra) = extra {
            data.extend(extra);
        }
        Outgoing {
            channel: channel.into(),
            message: Message { message_type, data },
        }
    }

    /// [`Message::forward`] to the sender; `None` when the message names none.
    pub fn reply(&self, message_type: MessageType, extra: Option<Map<String, Value>>) -> Option<Outgoing> {
        let sender = self.sender()?;
        Some(self.forward(sender, message_type, extra))
    }

    /// One line summary with long values cut, for logs
    pub fn summary(&self) -> String {
        let mut out = format!("type={}", self.message_type);
        for (key, value) in &self.data {
            let mut text = match value {
                Value::String(s) => s.replace("\r\n", "\\n"),
                other => other.to_string(),
            };
            if text.len() > 60 {
                let cut = (0..=60).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
                text.truncate(cut);
                text.push_str("...");
            }
            out.push_str(&format!(" {}={}", key, text));
        }
        out
    }
}

/// A message addressed to a bus channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outgoing {
    pub channel: String,
    pub message: Message,
}

/// Messages produced while handling one input, sent once handling is done
#[derive(Debug, Default)]
pub struct Outbox {
    items: Vec<Outgoing>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outgoing: Outgoing) {
        self.items.push(outgoing);
    }

    /// Reply to `origin`'s sender; dropped with a warning when it has none.
    pub fn reply(&mut self, origin: &Message, message_type: MessageType, extra: Option<Map<String, Value>>) {
        match origin.reply(message_type.clone(), extra) {
            Some(outgoing) => self.items.push(outgoing),
            None => tracing::warn!("Cannot send {}: message has no sender ({})", message_type, origin.summary()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outgoing> + '_ {
        self.items.iter()
    }

    pub fn drain(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.items)
    }
}
