//! The media controller task.
//!
//! One tokio task owns the [`Manager`] and serializes everything that touches
//! points and rooms: bus messages, timer ticks and frontend allocation
//! results. Replies produced while handling an input are flushed to the
//! [`MessageTransport`] before the next input is taken.

use crate::controller::{PointEvent, PointState};
use crate::environment::MediaEnvironment;
use crate::error::{Error, ManagerError, Result};
use crate::manager::Manager;
use crate::media_point::FrontendReady;
use crate::messaging::{Message, MessageTransport, MessageType, Outbox};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Inputs accepted by the controller task
#[derive(Debug, Clone)]
pub enum ControllerInput {
    Message(Message),
    Timer,
    Shutdown,
}

/// Cloneable sender side of a running [`MediaController`]
#[derive(Debug, Clone)]
pub struct MediaControllerHandle {
    tx: mpsc::UnboundedSender<ControllerInput>,
}

impl MediaControllerHandle {
    pub fn send_message(&self, message: Message) -> Result<()> {
        self.send(ControllerInput::Message(message))
    }

    pub fn tick(&self) -> Result<()> {
        self.send(ControllerInput::Timer)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(ControllerInput::Shutdown)
    }

    fn send(&self, input: ControllerInput) -> Result<()> {
        self.tx
            .send(input)
            .map_err(|_| Error::MessageTransport("media controller is not running".into()))
    }
}

pub struct MediaController {
    manager: Manager,
    transport: Arc<dyn MessageTransport>,
    inputs: mpsc::UnboundedReceiver<ControllerInput>,
    ready: mpsc::UnboundedReceiver<FrontendReady>,
    timer_interval: Option<Duration>,
}

impl MediaController {
    /// `ready` is the receiver returned with `env` by [`MediaEnvironment::new`].
    pub fn new(
        env: MediaEnvironment,
        ready: mpsc::UnboundedReceiver<FrontendReady>,
        transport: Arc<dyn MessageTransport>,
    ) -> (Self, MediaControllerHandle) {
        let (tx, inputs) = mpsc::unbounded_channel();
        let controller = Self {
            manager: Manager::new(env),
            transport,
            inputs,
            ready,
            timer_interval: None,
        };
        (controller, MediaControllerHandle { tx })
    }

    /// Tick every point on an internal interval instead of waiting for
    /// [`ControllerInput::Timer`].
    pub fn with_timer(mut self, interval: Duration) -> Self {
        self.timer_interval = Some(interval);
        self
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) -> Result<()> {
        info!("Media controller started");
        let mut ticker = self.timer_interval.map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            let mut outbox = Outbox::new();
            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(ControllerInput::Message(message)) => self.handle_message(message, &mut outbox),
                    Some(ControllerInput::Timer) => self.manager.on_timer(&mut outbox),
                    Some(ControllerInput::Shutdown) | None => break,
                },
                Some(ready) = self.ready.recv() => self.on_frontend_ready(ready, &mut outbox),
                _ = next_tick(&mut ticker) => self.manager.on_timer(&mut outbox),
            }
            self.flush(&mut outbox).await;
        }

        let mut outbox = Outbox::new();
        self.manager.shutdown(&mut outbox);
        self.flush(&mut outbox).await;
        info!("Media controller stopped");
        Ok(())
    }

    async fn flush(&self, outbox: &mut Outbox) {
        let transport = self.transport.clone();
        for outgoing in outbox.drain() {
            debug!("Sending to {}: {}", outgoing.channel, outgoing.message.summary());
            if let Err(err) = transport.send(&outgoing.channel, &outgoing.message).await {
                error!("Failed to send {} to {}: {}", outgoing.message.message_type, outgoing.channel, err);
            }
        }
    }

    fn on_frontend_ready(&mut self, ready: FrontendReady, outbox: &mut Outbox) {
        let point_id = ready.point_id.clone();
        if let Err(err) = self.manager.on_frontend_ready(ready, outbox) {
            debug!("Offer of point {} failed: {}", point_id, err);
            self.drop_failed_point(&point_id, outbox);
        }
    }

    /// Handle one bus message
    pub fn handle_message(&mut self, message: Message, outbox: &mut Outbox) {
        debug!("Received {}", message.summary());

        if let MessageType::Unknown(name) = &message.message_type {
            warn!("Unknown message type: {:?}", name);
            return;
        }

        let Some(point_id) = message.point_id() else {
            warn!("Message without pointId: {}", message.summary());
            outbox.reply(&message, MessageType::CriticalError, Some(reason("pointId is missing")));
            return;
        };

        match message.message_type.clone() {
            MessageType::CreateMediaPoint => self.on_create_point(&point_id, message, outbox),

            MessageType::RemoveMediaPoint => {
                if let Err(err) = self.manager.remove_point(&point_id, outbox) {
                    warn!("Cannot remove point {}: {}", point_id, err);
                    outbox.reply(&message, MessageType::RemoveMediaPointFailed, Some(reason(&err.to_string())));
                }
            }

            MessageType::JoinRoom => {
                let Some(room_id) = message.room_id() else {
                    warn!("JOIN_ROOM without roomId: {}", message.summary());
                    outbox.reply(&message, MessageType::CriticalError, Some(reason("roomId is missing")));
                    return;
                };
                if let Err(err) = self.manager.join_room(&point_id, &room_id) {
                    warn!("Cannot join point {} to room {}: {}", point_id, room_id, err);
                }
            }

            MessageType::UnjoinRoom => {
                if let Err(err) = self.manager.unjoin(&point_id) {
                    warn!("Cannot unjoin point {}: {}", point_id, err);
                }
            }

            MessageType::SdpAnswer => {
                let sdp = message.get_str("sdp").unwrap_or_default();
                self.dispatch(&point_id, PointEvent::SdpAnswer(sdp), outbox);
            }

            MessageType::SendDtmf => match message.get_str("dtmf") {
                Some(digits) => self.dispatch(&point_id, PointEvent::SendDtmf(digits), outbox),
                None => warn!("SEND_DTMF without dtmf for point {}", point_id),
            },

            other => warn!("Unexpected message type {} for point {}", other, point_id),
        }
    }

    fn on_create_point(&mut self, point_id: &str, message: Message, outbox: &mut Outbox) {
        let cc = message.get("cc").cloned();
        let vv = message.get("vv").cloned();
        let profile = message.get_str("profile").unwrap_or_default();

        if let Err(err) = self.manager.create_point(point_id, message) {
            warn!("Attempt to add existing media point: {}", err);
            return;
        }

        let (Some(cc), Some(vv)) = (cc, vv) else {
            warn!("No cc or vv in initiator message of point {}", point_id);
            warn!("Answer model not implemented");
            return;
        };

        if let Err(err) = self.manager.create_offer(point_id, cc, vv, &profile, outbox) {
            debug!("Offer of point {} failed: {}", point_id, err);
            self.drop_failed_point(point_id, outbox);
        }
    }

    fn dispatch(&mut self, point_id: &str, event: PointEvent, outbox: &mut Outbox) {
        match self.manager.dispatch(point_id, event, outbox) {
            Ok(()) => {}
            Err(Error::Manager(ManagerError::PointNotFound(_))) => warn!("Unknown point {}", point_id),
            Err(err) => warn!("Point {}: {}", point_id, err),
        }
    }

    /// A point whose offer failed is forgotten
    fn drop_failed_point(&mut self, point_id: &str, outbox: &mut Outbox) {
        let failed = self
            .manager
            .get_point(point_id)
            .is_some_and(|controller| controller.state() == PointState::Error);
        if failed {
            if let Err(err) = self.manager.remove_point(point_id, outbox) {
                warn!("Cannot remove failed point {}: {}", point_id, err);
            }
        }
    }
}

fn reason(text: &str) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("reason".into(), Value::String(text.to_string()));
    extra
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_point::MediaCapability;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_controller_task_is_spawnable() {
        // The run future holds `&MediaController` across transport sends.
        assert_send_sync::<MediaController>();
        assert_send_sync::<Box<dyn MediaCapability>>();
        assert_send_sync::<Manager>();
    }
}
