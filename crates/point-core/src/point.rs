//! A call endpoint: the local offer, the remote answer and one media point
//! per offered media.

use crate::config::Profile;
use crate::environment::MediaEnvironment;
use crate::error::{MediaPointError, PointControllerError};
use crate::media_point::{DtmfCapability, FrontendReady, KeyExchangeCapability, MediaPoint};
use mediactl_sdp_core::{MediaType, SessionDescription};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where a point stands after a frontend allocation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Some media are still binding
    Pending,
    /// Every media is bound; the local SDP is final
    Ready,
    /// No media could be bound
    Failed(String),
    /// The result belonged to another generation and was discarded
    Stale,
}

pub struct Point {
    point_id: String,
    generation: Uuid,
    profile: Profile,
    local: SessionDescription,
    remote: Option<SessionDescription>,
    media_points: Vec<MediaPoint>,
    env: MediaEnvironment,
    started: bool,
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("point_id", &self.point_id)
            .field("generation", &self.generation)
            .field("profile", &self.profile)
            .field("media_points", &self.media_points)
            .field("has_remote", &self.remote.is_some())
            .finish()
    }
}

impl Point {
    /// Build media points for every media of `local`.
    ///
    /// Media carrying crypto bind their frontend on the `local` profile and
    /// are reached through the key exchange relay advertised on `profile`.
    pub fn new(
        point_id: impl Into<String>,
        local: SessionDescription,
        profile: Profile,
        env: MediaEnvironment,
    ) -> Self {
        let point_id = point_id.into();
        let mut media_points = Vec::new();

        for media in local.medias() {
            let media_type = media.media_type();
            if media_points.iter().any(|mp: &MediaPoint| mp.media_type() == media_type) {
                warn!("Point {}: ignoring extra {} media", point_id, media_type);
                continue;
            }

            let secure = media.has_crypto();
            let (bind_profile, relay_profile) = if secure {
                let local_profile = env.config.profile("local").cloned().unwrap_or_else(|| profile.clone());
                (local_profile, Some(profile.clone()))
            } else {
                (profile.clone(), None)
            };

            let mut media_point =
                MediaPoint::new(point_id.clone(), media_type, bind_profile, relay_profile, env.allocator.clone());

            if media_type == MediaType::Audio {
                match env.factory.create_dtmf_sender(&point_id) {
                    Ok(sender) => media_point = media_point.with_capability(Box::new(DtmfCapability::new(sender))),
                    Err(err) => warn!("Point {}: no DTMF sender: {}", point_id, err),
                }
            }
            if secure {
                if let Some(agent) = &env.key_exchange {
                    media_point = media_point.with_capability(Box::new(KeyExchangeCapability::new(
                        agent.clone(),
                        point_id.clone(),
                        media_type,
                        profile.clone(),
                    )));
                }
            }
            media_points.push(media_point);
        }

        Self {
            point_id,
            generation: Uuid::new_v4(),
            profile,
            local,
            remote: None,
            media_points,
            env,
            started: false,
        }
    }

    pub fn point_id(&self) -> &str {
        &self.point_id
    }

    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn local_sdp(&self) -> &SessionDescription {
        &self.local
    }

    pub fn remote_sdp(&self) -> Option<&SessionDescription> {
        self.remote.as_ref()
    }

    pub fn media_point(&self, media_type: MediaType) -> Option<&MediaPoint> {
        self.media_points.iter().find(|mp| mp.media_type() == media_type)
    }

    pub fn media_point_mut(&mut self, media_type: MediaType) -> Option<&mut MediaPoint> {
        self.media_points.iter_mut().find(|mp| mp.media_type() == media_type)
    }

    /// Media types that currently have a bound frontend
    pub fn media_types(&self) -> Vec<MediaType> {
        self.media_points
            .iter()
            .filter(|mp| mp.frontend().is_some())
            .map(MediaPoint::media_type)
            .collect()
    }

    /// Spawn the frontend allocations. A point without media is ready at once.
    pub fn start(&mut self) -> Readiness {
        if self.started {
            return self.readiness();
        }
        self.started = true;
        info!("Starting point {} with profile {}", self.point_id, self.profile);
        for media_point in &mut self.media_points {
            media_point.start(&self.env, self.generation);
        }
        self.readiness()
    }

    fn readiness(&self) -> Readiness {
        if self.media_points.is_empty() {
            Readiness::Failed(format!("point {} has no media", self.point_id))
        } else if self.media_points.iter().all(MediaPoint::is_ready) {
            Readiness::Ready
        } else {
            Readiness::Pending
        }
    }

    /// Apply a frontend allocation result.
    pub fn on_frontend_ready(&mut self, ready: FrontendReady) -> Readiness {
        if ready.point_id != self.point_id || ready.generation != self.generation {
            debug!("Point {}: discarding stale {} frontend", self.point_id, ready.media_type);
            ready.discard(&self.env.allocator);
            return Readiness::Stale;
        }

        let media_type = ready.media_type;
        let Some(index) = self
            .media_points
            .iter()
            .position(|mp| mp.media_type() == media_type && !mp.is_ready())
        else {
            ready.discard(&self.env.allocator);
            return Readiness::Stale;
        };

        let outcome = match ready.result {
            Ok(allocation) => match self.local.get_media_mut(media_type) {
                Some(mut local) => self.media_points[index].on_frontend_ready(allocation, &mut local),
                None => {
                    allocation.frontend.dispose();
                    Err(MediaPointError::MediaDeclined(media_type))
                }
            },
            Err(err) => Err(err),
        };

        if let Err(err) = outcome {
            warn!("Point {}: dropping {} media: {}", self.point_id, media_type, err);
            let mut media_point = self.media_points.remove(index);
            media_point.dispose();
        }

        if !self.media_points.iter().all(MediaPoint::is_ready) {
            return Readiness::Pending;
        }
        if self.media_points.is_empty() {
            return Readiness::Failed(format!("no media of point {} could be started", self.point_id));
        }

        self.on_all_media_ready();
        Readiness::Ready
    }

    /// Without SRTP every media shares the profile address, so it moves to
    /// session level.
    fn on_all_media_ready(&mut self) {
        if self.local.medias().any(|media| media.has_crypto()) {
            return;
        }
        let ip = self.profile.ip.clone();
        self.local.set_host(Some(&ip));
        self.local.set_origin_address(ip);
        for index in 0..self.local.media_count() {
            if let Some(mut media) = self.local.media_mut(index) {
                let port = media.view().rtp_port();
                media.set_addr(port, None);
            }
        }
    }

    /// Bind the remote answer. Media the remote side declined or cannot
    /// decode are dropped; the point keeps the rest.
    pub fn set_remote_sdp(&mut self, remote: SessionDescription) -> Result<(), PointControllerError> {
        if self.remote.is_some() {
            warn!("Point {}: changing the remote SDP is not implemented", self.point_id);
            return Err(PointControllerError::RemoteSdpAlreadySet);
        }

        let mut failed = Vec::new();
        for (index, media_point) in self.media_points.iter_mut().enumerate() {
            let media_type = media_point.media_type();
            let (Some(local), Some(remote_media)) = (self.local.get_media(media_type), remote.get_media(media_type))
            else {
                continue;
            };
            if let Err(err) = media_point.set_remote_media_description(&local, &remote_media) {
                warn!("Point {}: {} media failed: {}", self.point_id, media_type, err);
                failed.push(index);
            }
        }

        for index in failed.into_iter().rev() {
            let mut media_point = self.media_points.remove(index);
            media_point.dispose();
        }

        self.remote = Some(remote);
        Ok(())
    }

    pub fn on_timer(&mut self) {
        for media_point in &mut self.media_points {
            media_point.on_timer();
        }
    }

    pub fn send_dtmf(&mut self, digits: &str) -> Result<(), PointControllerError> {
        match self.media_point_mut(MediaType::Audio) {
            Some(audio) => audio.send_dtmf(digits),
            None => {
                warn!("Point {}: no audio media to send DTMF on", self.point_id);
                Err(PointControllerError::NoDtmfSender)
            }
        }
    }

    pub fn stop(&mut self) {
        for media_point in &mut self.media_points {
            media_point.stop();
        }
    }

    pub fn dispose(&mut self) {
        for media_point in &mut self.media_points {
            media_point.dispose();
        }
        self.media_points.clear();
    }
}
