use super::{FrontendAllocation, MediaCapability};
use crate::config::Profile;
use crate::error::MediaPointError;
use crate::transport::{KeyExchangeAgent, KeyExchangeStream, RtpFrontend};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mediactl_sdp_core::{MediaDescription, MediaDescriptionMut, MediaType, SdpDirection};
use std::sync::Arc;
use tracing::debug;

/// Timer ticks between key frame requests on SRTP media
pub const KEY_UNIT_INTERVAL_TICKS: u32 = 10;

/// SRTP termination through a [`KeyExchangeAgent`] relay.
///
/// The frontend binds plain RTP locally; the relay is what the remote side
/// sees, so the local media advertises the relay port on the public profile.
#[derive(Debug)]
pub struct KeyExchangeCapability {
    agent: Arc<dyn KeyExchangeAgent>,
    point_id: String,
    media_type: MediaType,
    public_profile: Profile,
    relay_port: Option<u16>,
    ticks: u32,
}

impl KeyExchangeCapability {
    pub fn new(
        agent: Arc<dyn KeyExchangeAgent>,
        point_id: impl Into<String>,
        media_type: MediaType,
        public_profile: Profile,
    ) -> Self {
        Self {
            agent,
            point_id: point_id.into(),
            media_type,
            public_profile,
            relay_port: None,
            ticks: 0,
        }
    }
}

fn key_to_hex(key: &str) -> Result<String, MediaPointError> {
    STANDARD
        .decode(key)
        .map(hex::encode)
        .map_err(|err| MediaPointError::KeyExchange(format!("invalid SRTP key {:?}: {}", key, err)))
}

impl MediaCapability for KeyExchangeCapability {
    fn name(&self) -> &'static str {
        "key-exchange"
    }

    fn on_frontend_ready(
        &mut self,
        allocation: &FrontendAllocation,
        local: &mut MediaDescriptionMut<'_>,
    ) -> Result<(), MediaPointError> {
        let relay_port = allocation
            .relay_port
            .ok_or_else(|| MediaPointError::KeyExchange("relay port missing".into()))?;
        self.relay_port = Some(relay_port);

        local.set_direction(SdpDirection::SendRecv)?;
        local.generate_stream(allocation.frontend.ssrc());
        local.set_addr(relay_port, Some(&self.public_profile.ip));
        local.add_candidate(relay_port, &self.public_profile.ip);
        Ok(())
    }

    fn on_remote_description(
        &mut self,
        frontend: &dyn RtpFrontend,
        local: &MediaDescription<'_>,
        remote: &MediaDescription<'_>,
    ) -> Result<(), MediaPointError> {
        let local_crypto = local
            .crypto()
            .ok_or_else(|| MediaPointError::KeyExchange("local media has no crypto".into()))?;
        let remote_crypto = remote
            .crypto()
            .ok_or_else(|| MediaPointError::KeyExchange("remote media has no crypto".into()))?;

        let ice_credentials = match (remote.ice_ufrag(), remote.ice_pwd()) {
            (Some(ufrag), Some(pwd)) => Some(format!("{}:{}", ufrag, pwd)),
            _ => None,
        };

        let stream = KeyExchangeStream {
            point_id: self.point_id.clone(),
            media_type: self.media_type,
            ice_credentials,
            local_key: key_to_hex(&local_crypto.key_params.key)?,
            remote_key: key_to_hex(&remote_crypto.key_params.key)?,
            local_ssrc: frontend.ssrc(),
            remote_ssrcs: remote.ssrc_ids(),
            frontend_rtp_port: frontend.rtp_port(),
            frontend_rtcp_port: frontend.rtcp_port(),
        };
        debug!(
            "Starting SRTP stream for {}/{} (remote ssrcs {:?})",
            self.point_id, self.media_type, stream.remote_ssrcs
        );
        self.agent
            .start_stream(stream)
            .map_err(|err| MediaPointError::KeyExchange(err.to_string()))
    }

    fn on_timer(&mut self, frontend: &dyn RtpFrontend) {
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % KEY_UNIT_INTERVAL_TICKS == 0 {
            frontend.force_key_unit();
        }
    }

    fn stop(&mut self) {
        if self.relay_port.take().is_some() {
            self.agent.withdraw(&self.point_id, self.media_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_hex() {
        assert_eq!(key_to_hex("AAEC").unwrap(), "000102");
        assert!(matches!(key_to_hex("not base64!"), Err(MediaPointError::KeyExchange(_))));
    }
}
