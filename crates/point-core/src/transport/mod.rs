//! Media transport seams.
//!
//! The controller never touches sockets or codecs itself. It drives a
//! transcoding pipeline through the traits below: a factory that binds RTP
//! frontends and builds per room contexts, the frontends themselves, inband
//! DTMF senders and an optional SRTP key exchange agent.
//!
//! Binding ports is the only asynchronous step; everything else is a command
//! handed to the pipeline and returns immediately.

pub mod recording;

use crate::config::Profile;
use crate::error::TransportError;
use async_trait::async_trait;
use mediactl_sdp_core::{Codec, MediaType, RtpCodec};
use std::fmt;
use std::sync::Arc;

/// Result type for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Output pad of a pipeline element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaSource(String);

impl MediaSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input pad of a pipeline element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaDestination(String);

impl MediaDestination {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ports and interface a frontend should bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendRequest {
    pub point_id: String,
    pub media_type: MediaType,
    pub interface: String,
    pub rtp_port: u16,
    pub rtcp_port: u16,
}

/// A bound RTP/RTCP socket pair with its depayloader and payloader chain
pub trait RtpFrontend: Send + Sync + fmt::Debug {
    /// Pipeline element name, unique per frontend
    fn element(&self) -> &str;

    fn media_type(&self) -> MediaType;

    fn rtp_port(&self) -> u16;

    fn rtcp_port(&self) -> u16;

    /// SSRC used for outgoing packets
    fn ssrc(&self) -> u32;

    /// Decoded media coming from the remote side
    fn source(&self) -> MediaSource;

    /// Raw media to encode and send to the remote side
    fn destination(&self) -> MediaDestination;

    /// Start sending `codecs` to `host`. The first codec is preferred.
    fn create_sender(&self, codecs: &[RtpCodec], host: &str, rtp_port: u16, rtcp_port: u16) -> TransportResult<()>;

    /// Accept packets carrying any of `codecs`
    fn create_receiver(&self, codecs: &[RtpCodec]) -> TransportResult<()>;

    /// Ask the encoder for a key frame
    fn force_key_unit(&self);

    fn stop(&self);

    /// Release the sockets; the frontend is unusable afterwards
    fn dispose(&self);
}

/// Pipeline in which one media room links its points
pub trait TranscodingContext: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn media_type(&self) -> MediaType;

    fn add(&self, element: &str);

    fn remove(&self, element: &str);

    /// Link with transcoding when both ends use different codecs
    fn link(&self, source: &MediaSource, destination: &MediaDestination) -> TransportResult<()>;

    fn play(&self);

    fn stop(&self);
}

/// Inband DTMF generator placed in front of an audio frontend
pub trait DtmfSender: Send + Sync + fmt::Debug {
    fn element(&self) -> &str;

    fn source(&self) -> MediaSource;

    fn destination(&self) -> MediaDestination;

    fn start(&self);

    fn stop(&self);

    fn send_dtmf(&self, digits: &str) -> TransportResult<()>;
}

/// Entry point of a transcoding pipeline implementation
#[async_trait]
pub trait TranscodingFactory: Send + Sync + fmt::Debug {
    /// Codecs the pipeline can encode and decode; offers are filtered by them
    fn supported_codecs(&self) -> Vec<Codec>;

    /// Bind a frontend on the requested ports. Fails with
    /// [`TransportError::PortInUse`] when the pair is taken.
    async fn create_rtp_frontend(&self, request: FrontendRequest) -> TransportResult<Arc<dyn RtpFrontend>>;

    fn create_context(&self, media_type: MediaType) -> Arc<dyn TranscodingContext>;

    fn create_dtmf_sender(&self, point_id: &str) -> TransportResult<Arc<dyn DtmfSender>>;
}

/// Parameters of one SRTP stream handed to the key exchange agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExchangeStream {
    pub point_id: String,
    pub media_type: MediaType,
    /// Remote `ufrag:pwd`, when the remote side uses ICE
    pub ice_credentials: Option<String>,
    /// Local SRTP master key, hex encoded
    pub local_key: String,
    /// Remote SRTP master key, hex encoded
    pub remote_key: String,
    pub local_ssrc: u32,
    pub remote_ssrcs: Vec<u32>,
    /// Plain RTP ports of the frontend behind the relay
    pub frontend_rtp_port: u16,
    pub frontend_rtcp_port: u16,
}

/// Relay that terminates ICE and SRTP in front of a plain RTP frontend
#[async_trait]
pub trait KeyExchangeAgent: Send + Sync + fmt::Debug {
    /// Open the public side of the relay; returns the port to advertise
    async fn open_relay(&self, point_id: &str, media_type: MediaType, profile: &Profile) -> TransportResult<u16>;

    fn start_stream(&self, stream: KeyExchangeStream) -> TransportResult<()>;

    /// Tear the relay of a media point down
    fn withdraw(&self, point_id: &str, media_type: MediaType);
}
