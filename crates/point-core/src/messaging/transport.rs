//! Outbound side of the message bus.

use super::{Message, Outgoing};
use crate::error::{Error, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Sends messages to named bus channels
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, channel: &str, message: &Message) -> Result<()>;
}

/// Transport backed by a tokio channel; the receiver sees every message
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outgoing>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MessageTransport for ChannelTransport {
    async fn send(&self, channel: &str, message: &Message) -> Result<()> {
        self.tx
            .send(Outgoing {
                channel: channel.to_string(),
                message: message.clone(),
            })
            .map_err(|_| Error::MessageTransport(format!("channel to {} is closed", channel)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessageType;

    #[tokio::test]
    async fn test_channel_transport() {
        let (transport, mut rx) = ChannelTransport::new();
        transport
            .send("gw", &Message::new(MessageType::SdpOffer).with("pointId", "p1"))
            .await
            .unwrap();

        let outgoing = rx.recv().await.unwrap();
        assert_eq!(outgoing.channel, "gw");
        assert_eq!(outgoing.message.point_id().as_deref(), Some("p1"));

        drop(rx);
        assert!(transport.send("gw", &Message::new(MessageType::SdpOffer)).await.is_err());
    }
}
