//! Media points: one RTP frontend per media of a point, plus the
//! capabilities attached to it.
//!
//! A media point is a fixed pipeline: the base RTP behaviour (port binding,
//! sender and receiver setup, key frame requests) followed by an ordered list
//! of [`MediaCapability`] hooks. Audio gets a DTMF sender, media carrying
//! `a=crypto` get an SRTP key exchange relay.
//!
//! Binding ports happens on a spawned task. Its outcome comes back to the
//! dispatcher as a [`FrontendReady`] tagged with the point generation, so a
//! late result for a removed point can be recognised and cleaned up.

mod dtmf;
mod key_exchange;

pub use dtmf::{DtmfCapability, is_valid_dtmf};
pub use key_exchange::{KEY_UNIT_INTERVAL_TICKS, KeyExchangeCapability};

use crate::config::Profile;
use crate::environment::MediaEnvironment;
use crate::error::{MediaPointError, PointControllerError, TransportError};
use crate::ports::PortAllocator;
use crate::transport::{FrontendRequest, MediaDestination, MediaSource, RtpFrontend, TranscodingContext};
use mediactl_sdp_core::factory::{self, NegotiatedMedia};
use mediactl_sdp_core::{MediaDescription, MediaDescriptionMut, MediaType, RtpCodec, codec::codec_list};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Candidate pairs tried before giving up with `NoFreePorts`
const MAX_BIND_ATTEMPTS: usize = 64;

/// Bound frontend plus the relay port when SRTP is terminated in front of it
#[derive(Debug, Clone)]
pub struct FrontendAllocation {
    pub frontend: Arc<dyn RtpFrontend>,
    pub relay_port: Option<u16>,
}

/// Outcome of a frontend allocation task
#[derive(Debug)]
pub struct FrontendReady {
    pub point_id: String,
    pub generation: Uuid,
    pub media_type: MediaType,
    pub result: Result<FrontendAllocation, MediaPointError>,
}

impl FrontendReady {
    /// Undo a successful allocation nobody is going to use
    pub fn discard(self, allocator: &PortAllocator) {
        if let Ok(allocation) = &self.result {
            allocation.frontend.stop();
            allocation.frontend.dispose();
        }
        allocator.release(&allocator_owner(&self.point_id, self.generation, self.media_type));
    }
}

/// Endpoints a media room links for one media point
#[derive(Debug, Clone)]
pub struct MediaLeg {
    pub point_id: String,
    pub source: MediaSource,
    pub destination: MediaDestination,
    pub frontend: Arc<dyn RtpFrontend>,
}

/// Hook attached to a media point
pub trait MediaCapability: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn start(&mut self) {}

    /// Called once the frontend is bound, with the local media to adjust
    fn on_frontend_ready(
        &mut self,
        _allocation: &FrontendAllocation,
        _local: &mut MediaDescriptionMut<'_>,
    ) -> Result<(), MediaPointError> {
        Ok(())
    }

    /// Called after the base point configured sender and receiver
    fn on_remote_description(
        &mut self,
        _frontend: &dyn RtpFrontend,
        _local: &MediaDescription<'_>,
        _remote: &MediaDescription<'_>,
    ) -> Result<(), MediaPointError> {
        Ok(())
    }

    fn on_timer(&mut self, _frontend: &dyn RtpFrontend) {}

    /// Place the capability in `context` in front of `destination` and return
    /// the destination upstream elements should link to.
    fn attach(
        &mut self,
        _context: &dyn TranscodingContext,
        destination: MediaDestination,
    ) -> Result<MediaDestination, MediaPointError> {
        Ok(destination)
    }

    fn detach(&mut self, _context: &dyn TranscodingContext) {}

    /// `None` when the capability does not send DTMF
    fn send_dtmf(&mut self, _digits: &str) -> Option<Result<(), PointControllerError>> {
        None
    }

    fn stop(&mut self) {}
}

/// Reservations are keyed per generation, so a late result of a replaced
/// point never releases the ports of the point now using the same id.
pub(crate) fn allocator_owner(point_id: &str, generation: Uuid, media_type: MediaType) -> String {
    format!("{}/{}/{}", point_id, generation, media_type)
}

/// One media (audio or video) of a point
#[derive(Debug)]
pub struct MediaPoint {
    point_id: String,
    media_type: MediaType,
    profile: Profile,
    relay_profile: Option<Profile>,
    allocator: Arc<PortAllocator>,
    capabilities: Vec<Box<dyn MediaCapability>>,
    frontend: Option<Arc<dyn RtpFrontend>>,
    negotiated: Option<NegotiatedMedia>,
    context: Option<Arc<dyn TranscodingContext>>,
    generation: Option<Uuid>,
    ready: bool,
    stopped: bool,
}

impl MediaPoint {
    /// `profile` is where the frontend binds. `relay_profile` is set when
    /// SRTP is terminated by a relay advertised on that profile instead.
    pub fn new(
        point_id: impl Into<String>,
        media_type: MediaType,
        profile: Profile,
        relay_profile: Option<Profile>,
        allocator: Arc<PortAllocator>,
    ) -> Self {
        Self {
            point_id: point_id.into(),
            media_type,
            profile,
            relay_profile,
            allocator,
            capabilities: Vec::new(),
            frontend: None,
            negotiated: None,
            context: None,
            generation: None,
            ready: false,
            stopped: false,
        }
    }

    pub fn with_capability(mut self, capability: Box<dyn MediaCapability>) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn point_id(&self) -> &str {
        &self.point_id
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn frontend(&self) -> Option<&Arc<dyn RtpFrontend>> {
        self.frontend.as_ref()
    }

    pub fn negotiated(&self) -> Option<&NegotiatedMedia> {
        self.negotiated.as_ref()
    }

    pub fn capability_names(&self) -> Vec<&'static str> {
        self.capabilities.iter().map(|c| c.name()).collect()
    }

    /// Start the capabilities and spawn the frontend allocation task
    pub fn start(&mut self, env: &MediaEnvironment, generation: Uuid) {
        for capability in &mut self.capabilities {
            capability.start();
        }
        self.generation = Some(generation);

        let env = env.clone();
        let point_id = self.point_id.clone();
        let media_type = self.media_type;
        let profile = self.profile.clone();
        let relay_profile = self.relay_profile.clone();

        tokio::spawn(async move {
            let result = allocate(&env, &point_id, generation, media_type, &profile, relay_profile.as_ref()).await;
            let ready = FrontendReady {
                point_id,
                generation,
                media_type,
                result,
            };
            if let Err(unsent) = env.ready_sender().send(ready) {
                debug!("Dispatcher gone, discarding {} frontend", unsent.0.media_type);
                unsent.0.discard(&env.allocator);
            }
        });
    }

    /// Take the bound frontend and advertise it in the local media
    pub fn on_frontend_ready(
        &mut self,
        allocation: FrontendAllocation,
        local: &mut MediaDescriptionMut<'_>,
    ) -> Result<(), MediaPointError> {
        let frontend = allocation.frontend.clone();
        self.frontend = Some(frontend.clone());
        local.set_addr(frontend.rtp_port(), Some(&self.profile.ip));
        for capability in &mut self.capabilities {
            capability.on_frontend_ready(&allocation, local)?;
        }
        self.ready = true;
        debug!(
            "Media point {}/{} ready on {}:{}",
            self.point_id,
            self.media_type,
            self.profile.ip,
            frontend.rtp_port()
        );
        Ok(())
    }

    /// Negotiate against the remote media and start sending and receiving
    pub fn set_remote_media_description(
        &mut self,
        local: &MediaDescription<'_>,
        remote: &MediaDescription<'_>,
    ) -> Result<(), MediaPointError> {
        let frontend = self
            .frontend
            .clone()
            .ok_or_else(|| TransportError::failed(format!("{} frontend is not bound", self.media_type)))?;

        let negotiated = factory::negotiate(local, remote).map_err(|err| {
            if let mediactl_sdp_core::Error::CodecInconsistency { .. } = &err {
                warn!(
                    "Codec inconsistency on {}/{}: local={{{}}}, remote={{{}}}",
                    self.point_id,
                    self.media_type,
                    codec_list(local.rtp_codecs().iter().map(RtpCodec::base_codec)),
                    codec_list(remote.rtp_codecs().iter().map(RtpCodec::base_codec)),
                );
            }
            MediaPointError::from(err)
        })?;

        debug!(
            "Media point {}/{} sending to {}:{}/{} with {}",
            self.point_id,
            self.media_type,
            negotiated.remote_host,
            negotiated.remote_rtp_port,
            negotiated.remote_rtcp_port,
            codec_list(&negotiated.codecs)
        );
        frontend.create_sender(
            &negotiated.local_codecs,
            &negotiated.remote_host,
            negotiated.remote_rtp_port,
            negotiated.remote_rtcp_port,
        )?;
        frontend.create_receiver(&negotiated.remote_codecs)?;

        for capability in &mut self.capabilities {
            capability.on_remote_description(frontend.as_ref(), local, remote)?;
        }
        self.negotiated = Some(negotiated);
        Ok(())
    }

    pub fn on_timer(&mut self) {
        if let Some(frontend) = &self.frontend {
            for capability in &mut self.capabilities {
                capability.on_timer(frontend.as_ref());
            }
        }
    }

    pub fn send_dtmf(&mut self, digits: &str) -> Result<(), PointControllerError> {
        self.capabilities
            .iter_mut()
            .find_map(|capability| capability.send_dtmf(digits))
            .unwrap_or(Err(PointControllerError::NoDtmfSender))
    }

    pub fn force_key_unit(&self) {
        if let Some(frontend) = &self.frontend {
            frontend.force_key_unit();
        }
    }

    /// Add the point to a room pipeline and return what the room links
    pub fn join_context(&mut self, context: Arc<dyn TranscodingContext>) -> Result<MediaLeg, MediaPointError> {
        let frontend = self
            .frontend
            .clone()
            .ok_or_else(|| TransportError::failed(format!("{} frontend is not bound", self.media_type)))?;

        context.add(frontend.element());
        let mut destination = frontend.destination();
        for index in 0..self.capabilities.len() {
            match self.capabilities[index].attach(context.as_ref(), destination) {
                Ok(next) => destination = next,
                Err(err) => {
                    for capability in self.capabilities[..index].iter_mut().rev() {
                        capability.detach(context.as_ref());
                    }
                    context.remove(frontend.element());
                    return Err(err);
                }
            }
        }
        self.context = Some(context);

        Ok(MediaLeg {
            point_id: self.point_id.clone(),
            source: frontend.source(),
            destination,
            frontend,
        })
    }

    pub fn leave_context(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };
        for capability in self.capabilities.iter_mut().rev() {
            capability.detach(context.as_ref());
        }
        if let Some(frontend) = &self.frontend {
            context.remove(frontend.element());
        }
    }

    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.leave_context();
        for capability in self.capabilities.iter_mut().rev() {
            capability.stop();
        }
        if let Some(frontend) = &self.frontend {
            frontend.stop();
        }
    }

    /// Stop, release the frontend and give the ports back
    pub fn dispose(&mut self) {
        self.stop();
        if let Some(frontend) = self.frontend.take() {
            frontend.dispose();
        }
        if let Some(generation) = self.generation {
            self.allocator.release(&allocator_owner(&self.point_id, generation, self.media_type));
        }
    }
}

/// Bind a frontend on a free pair of `profile`, then open the SRTP relay
async fn allocate(
    env: &MediaEnvironment,
    point_id: &str,
    generation: Uuid,
    media_type: MediaType,
    profile: &Profile,
    relay_profile: Option<&Profile>,
) -> Result<FrontendAllocation, MediaPointError> {
    let frontend = bind_frontend(env, point_id, generation, media_type, profile).await?;

    let relay_port = match relay_profile {
        None => None,
        Some(relay_profile) => {
            let opened = match &env.key_exchange {
                Some(agent) => agent
                    .open_relay(point_id, media_type, relay_profile)
                    .await
                    .map_err(|err| MediaPointError::KeyExchange(err.to_string())),
                None => Err(MediaPointError::KeyExchange("no key exchange agent configured".into())),
            };
            match opened {
                Ok(port) => Some(port),
                Err(err) => {
                    frontend.dispose();
                    env.allocator.release(&allocator_owner(point_id, generation, media_type));
                    return Err(err);
                }
            }
        }
    };

    Ok(FrontendAllocation { frontend, relay_port })
}

async fn bind_frontend(
    env: &MediaEnvironment,
    point_id: &str,
    generation: Uuid,
    media_type: MediaType,
    profile: &Profile,
) -> Result<Arc<dyn RtpFrontend>, MediaPointError> {
    let owner = allocator_owner(point_id, generation, media_type);
    let range = &profile.port_range;
    let mut busy = Vec::new();

    for _ in 0..MAX_BIND_ATTEMPTS {
        let Some((rtp_port, rtcp_port)) = env.allocator.reserve_any(&owner, &profile.interface, range) else {
            break;
        };
        let request = FrontendRequest {
            point_id: point_id.to_string(),
            media_type,
            interface: profile.interface.clone(),
            rtp_port,
            rtcp_port,
        };
        match env.factory.create_rtp_frontend(request).await {
            Ok(frontend) => {
                for pair in busy {
                    env.allocator.release_pair(&owner, &profile.interface, pair);
                }
                debug!("Bound {} frontend of {} on {}:{}", media_type, point_id, profile.interface, rtp_port);
                return Ok(frontend);
            }
            Err(TransportError::PortInUse { .. }) => {
                debug!("Ports {}/{} busy on {}, trying next pair", rtp_port, rtcp_port, profile.interface);
                busy.push((rtp_port, rtcp_port));
            }
            Err(err) => {
                env.allocator.release(&owner);
                return Err(err.into());
            }
        }
    }

    env.allocator.release(&owner);
    Err(MediaPointError::NoFreePorts {
        interface: profile.interface.clone(),
        range: range.to_string(),
    })
}
