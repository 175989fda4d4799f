//! Per point state machine.
//!
//! ```text
//! START --CREATE_OFFER--> CREATING_OFFER --CONN_READY--> WAITING_REMOTE_SDP --SDP_ANSWER--> CONNECTED
//!   |                          |                              |                              |
//!   +-- bad cc/vv/profile      +-- all media failed           +-- bad answer                 |
//!   v                          v                              v                              |
//! ERROR <----------------------+------------------------------+                              |
//!                                                                                            |
//! CLOSED <----------------------------- REMOVE (from any live state) ------------------------+
//! ```
//!
//! Every reply goes to the sender of the message that created the point.
//! Events that make no sense in the current state are logged and dropped.

use crate::config::Profile;
use crate::environment::MediaEnvironment;
use crate::error::{Error, PointControllerError, ProfileError, Result};
use crate::media_point::FrontendReady;
use crate::messaging::{Message, MessageType, Outbox};
use crate::point::{Point, Readiness};
use mediactl_sdp_core::factory;
use mediactl_sdp_core::{Cc, Vv};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, info, warn};

/// Lifecycle of a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointState {
    Start,
    CreatingOffer,
    WaitingRemoteSdp,
    Connected,
    Error,
    Closed,
}

impl PointState {
    /// `ERROR` and `CLOSED` never leave and never touch media again
    pub fn is_terminal(&self) -> bool {
        matches!(self, PointState::Error | PointState::Closed)
    }
}

impl fmt::Display for PointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PointState::Start => "START",
            PointState::CreatingOffer => "CREATING_OFFER",
            PointState::WaitingRemoteSdp => "WAITING_REMOTE_SDP",
            PointState::Connected => "CONNECTED",
            PointState::Error => "ERROR",
            PointState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// Inputs of the state machine
#[derive(Debug, Clone)]
pub enum PointEvent {
    /// Build a local offer from the peer's capabilities
    CreateOffer {
        cc: Value,
        vv: Value,
        profile: std::result::Result<Profile, ProfileError>,
    },
    /// Every media has a bound frontend
    ConnReady,
    /// No media could be bound
    ConnFailed(String),
    SdpAnswer(String),
    Remove,
    Timer,
    SendDtmf(String),
}

impl PointEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PointEvent::CreateOffer { .. } => "CREATE_OFFER",
            PointEvent::ConnReady => "CONN_READY",
            PointEvent::ConnFailed(_) => "CONN_FAILED",
            PointEvent::SdpAnswer(_) => "SDP_ANSWER",
            PointEvent::Remove => "REMOVE",
            PointEvent::Timer => "TIMER",
            PointEvent::SendDtmf(_) => "SEND_DTMF",
        }
    }
}

pub struct PointController {
    point_id: String,
    initiator: Message,
    state: PointState,
    point: Option<Point>,
    room_id: Option<String>,
    env: MediaEnvironment,
}

impl fmt::Debug for PointController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointController")
            .field("point_id", &self.point_id)
            .field("state", &self.state)
            .field("room_id", &self.room_id)
            .field("point", &self.point)
            .finish()
    }
}

impl PointController {
    pub fn new(point_id: impl Into<String>, initiator: Message, env: MediaEnvironment) -> Self {
        Self {
            point_id: point_id.into(),
            initiator,
            state: PointState::Start,
            point: None,
            room_id: None,
            env,
        }
    }

    pub fn point_id(&self) -> &str {
        &self.point_id
    }

    pub fn state(&self) -> PointState {
        self.state
    }

    pub fn initiator(&self) -> &Message {
        &self.initiator
    }

    pub fn point(&self) -> Option<&Point> {
        self.point.as_ref()
    }

    pub fn point_mut(&mut self) -> Option<&mut Point> {
        self.point.as_mut()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub(crate) fn set_room_id(&mut self, room_id: Option<String>) {
        self.room_id = room_id;
    }

    fn set_state(&mut self, state: PointState) {
        debug!("PointController[{}]: transition {} -> {}", self.point_id, self.state, state);
        self.state = state;
    }

    fn reply(&self, outbox: &mut Outbox, message_type: MessageType, extra: Option<Map<String, Value>>) {
        outbox.reply(&self.initiator, message_type, extra);
    }

    /// Feed one event.
    ///
    /// Only a failed offer is returned as an error; the point is in `ERROR`
    /// by then and the negative reply is already queued.
    pub fn handle(&mut self, event: PointEvent, outbox: &mut Outbox) -> Result<()> {
        if !matches!(event, PointEvent::Timer) {
            debug!(
                "PointController[{}]: got event {} in state {}",
                self.point_id,
                event.name(),
                self.state
            );
        }

        match (self.state, event) {
            (PointState::Start, PointEvent::CreateOffer { cc, vv, profile }) => {
                self.create_offer(&cc, &vv, profile, outbox)
            }

            (PointState::CreatingOffer, PointEvent::ConnReady) => {
                let Some(point) = &self.point else {
                    return Ok(());
                };
                let sdp = point.local_sdp().to_string();
                debug!("PointController[{}]: local SDP:\n{}", self.point_id, sdp);
                self.set_state(PointState::WaitingRemoteSdp);
                let mut extra = Map::new();
                extra.insert("sdp".into(), Value::String(sdp));
                self.reply(outbox, MessageType::SdpOffer, Some(extra));
                Ok(())
            }
            (PointState::CreatingOffer, PointEvent::ConnFailed(reason)) => {
                warn!("PointController[{}]: {}", self.point_id, reason);
                self.fail(outbox);
                Err(PointControllerError::NoMedia.into())
            }
            (PointState::CreatingOffer, PointEvent::Timer) => Ok(()),

            (PointState::WaitingRemoteSdp, PointEvent::SdpAnswer(text)) => {
                self.on_remote_sdp(&text, outbox);
                Ok(())
            }
            (PointState::WaitingRemoteSdp, PointEvent::Timer) => Ok(()),

            (PointState::Connected, PointEvent::Timer) => {
                if let Some(point) = &mut self.point {
                    point.on_timer();
                }
                Ok(())
            }
            (PointState::Connected, PointEvent::SendDtmf(digits)) => {
                if let Some(point) = &mut self.point {
                    if let Err(err) = point.send_dtmf(&digits) {
                        warn!("PointController[{}]: cannot send DTMF {:?}: {}", self.point_id, digits, err);
                    }
                }
                Ok(())
            }
            (PointState::Connected, PointEvent::SdpAnswer(_)) => {
                warn!("PointController[{}]: remote SDP renegotiation is not implemented", self.point_id);
                Ok(())
            }

            (PointState::CreatingOffer | PointState::WaitingRemoteSdp | PointState::Connected, PointEvent::Remove) => {
                self.teardown();
                self.set_state(PointState::Closed);
                self.reply(outbox, MessageType::RemoveMediaPointOk, None);
                Ok(())
            }

            (state, event) => {
                if !matches!(event, PointEvent::Timer) {
                    warn!(
                        "PointController[{}]: unhandled event {} in state {}",
                        self.point_id,
                        event.name(),
                        state
                    );
                }
                Ok(())
            }
        }
    }

    /// Apply a frontend allocation result and raise `CONN_READY` or
    /// `CONN_FAILED` once every media is settled.
    pub fn on_frontend_ready(&mut self, ready: FrontendReady, outbox: &mut Outbox) -> Result<()> {
        let Some(point) = self.point.as_mut().filter(|_| !self.state.is_terminal()) else {
            debug!("PointController[{}]: frontend result for a closed point", self.point_id);
            ready.discard(&self.env.allocator);
            return Ok(());
        };

        match point.on_frontend_ready(ready) {
            Readiness::Ready => self.handle(PointEvent::ConnReady, outbox),
            Readiness::Failed(reason) => self.handle(PointEvent::ConnFailed(reason), outbox),
            Readiness::Pending | Readiness::Stale => Ok(()),
        }
    }

    fn create_offer(
        &mut self,
        cc: &Value,
        vv: &Value,
        profile: std::result::Result<Profile, ProfileError>,
        outbox: &mut Outbox,
    ) -> Result<()> {
        let offer = profile.map_err(Error::from).and_then(|profile| {
            let cc = Cc::from_json(cc)?;
            let vv = Vv::from_json(vv)?;
            let sdp = factory::create_offer_with_policy(
                &cc,
                vv,
                &self.env.factory.supported_codecs(),
                self.env.config.payload_type_policy(),
            )?;
            Ok((sdp, profile))
        });

        let (sdp, profile) = match offer {
            Ok(offer) => offer,
            Err(err) => {
                warn!("PointController[{}]: error in CC/VV: {}", self.point_id, err);
                self.reply(outbox, MessageType::CreateMediaPointFailed, None);
                self.set_state(PointState::Error);
                return Err(err);
            }
        };

        info!("PointController[{}]: creating offer on profile {}", self.point_id, profile);
        self.set_state(PointState::CreatingOffer);
        let mut point = Point::new(self.point_id.clone(), sdp, profile, self.env.clone());
        let readiness = point.start();
        self.point = Some(point);

        match readiness {
            Readiness::Ready => self.handle(PointEvent::ConnReady, outbox),
            Readiness::Failed(reason) => self.handle(PointEvent::ConnFailed(reason), outbox),
            Readiness::Pending | Readiness::Stale => Ok(()),
        }
    }

    fn on_remote_sdp(&mut self, text: &str, outbox: &mut Outbox) {
        debug!("PointController[{}]: remote SDP:\n{}", self.point_id, text);
        let bound = factory::create_from_string(text)
            .map_err(Error::from)
            .and_then(|remote| match &mut self.point {
                Some(point) => point.set_remote_sdp(remote).map_err(Error::from),
                None => Err(PointControllerError::NoMedia.into()),
            });

        match bound {
            Ok(()) => {
                self.set_state(PointState::Connected);
                self.reply(outbox, MessageType::CreateMediaPointOk, None);
            }
            Err(err) => {
                warn!("PointController[{}]: cannot apply SDP answer: {}", self.point_id, err);
                self.fail(outbox);
            }
        }
    }

    fn fail(&mut self, outbox: &mut Outbox) {
        self.teardown();
        self.set_state(PointState::Error);
        self.reply(outbox, MessageType::CreateMediaPointFailed, None);
    }

    fn teardown(&mut self) {
        if let Some(mut point) = self.point.take() {
            point.stop();
            point.dispose();
        }
    }
}
