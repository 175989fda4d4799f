//! Error types for call control.
//!
//! Media level failures ([`MediaPointError`]) are recoverable: the point drops
//! the affected media and carries on. Everything else is reported back to the
//! signaling peer as a negative reply.

use mediactl_sdp_core::MediaType;
use thiserror::Error;

/// Result type for call control operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by a media transport implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The (rtp, rtcp) pair could not be bound
    #[error("Ports {rtp}/{rtcp} on {interface} are already in use")]
    PortInUse { interface: String, rtp: u16, rtcp: u16 },

    /// The pipeline refused an operation
    #[error("Transport failure: {0}")]
    Failed(String),
}

impl TransportError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Per media failures; the point degrades instead of failing as a whole
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaPointError {
    #[error("No free ports in range {range} on {interface}")]
    NoFreePorts { interface: String, range: String },

    #[error("Remote side declined {0} media")]
    MediaDeclined(MediaType),

    #[error("No common codecs: local={{{local}}}, remote={{{remote}}}")]
    CodecInconsistency { local: String, remote: String },

    #[error("Key exchange failed: {0}")]
    KeyExchange(String),

    #[error("Media transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid media description: {0}")]
    Sdp(mediactl_sdp_core::Error),
}

impl From<mediactl_sdp_core::Error> for MediaPointError {
    fn from(err: mediactl_sdp_core::Error) -> Self {
        match err {
            mediactl_sdp_core::Error::MediaDeclined(media_type) => Self::MediaDeclined(media_type),
            mediactl_sdp_core::Error::CodecInconsistency { local, remote } => {
                Self::CodecInconsistency { local, remote }
            }
            other => Self::Sdp(other),
        }
    }
}

/// Profile string and port range errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Cannot parse profile string: {0:?}")]
    InvalidSyntax(String),

    #[error("Port {0} is out of range")]
    PortOutOfRange(u32),

    #[error("Port {start} is not less than {end}")]
    EmptyRange { start: u32, end: u32 },

    #[error("Unknown profile {0:?}")]
    UnknownProfile(String),

    #[error("Cannot parse message queue url: {0:?}")]
    InvalidQueueUrl(String),
}

/// Registry and room errors; no state changes when one is returned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    #[error("Point {0} already exists")]
    PointExists(String),

    #[error("Point {0} not found")]
    PointNotFound(String),

    #[error("Point {0} is not in a room")]
    NotInRoom(String),

    #[error("Point {point_id} is already in room {room_id}")]
    AlreadyInRoom { point_id: String, room_id: String },

    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("{0} media room already bridges two points")]
    MediaRoomFull(MediaType),

    #[error("Point {0} has no media ready")]
    PointNotReady(String),
}

/// Errors raised while driving a single point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointControllerError {
    #[error("Invalid DTMF digits {0:?}")]
    InvalidDtmf(String),

    #[error("Point has no DTMF sender")]
    NoDtmfSender,

    #[error("Remote SDP is already set")]
    RemoteSdpAlreadySet,

    #[error("No media could be started")]
    NoMedia,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Umbrella error for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("SDP error: {0}")]
    Sdp(#[from] mediactl_sdp_core::Error),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Media point error: {0}")]
    MediaPoint(#[from] MediaPointError),

    #[error("Manager error: {0}")]
    Manager(#[from] ManagerError),

    #[error("Point error: {0}")]
    PointController(#[from] PointControllerError),

    #[error("Configuration error: {0}")]
    Config(#[from] mediactl_infra_common::Error),

    #[error("Invalid message: {0}")]
    Message(String),

    #[error("Message transport error: {0}")]
    MessageTransport(String),
}

impl Error {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    /// Semantic failures of point creation: bad capabilities, unknown
    /// profiles and unsupported SDP constructs.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            Error::Sdp(mediactl_sdp_core::Error::Semantic(_)) | Error::Profile(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdp_negotiation_errors_map_to_media_errors() {
        assert_eq!(
            MediaPointError::from(mediactl_sdp_core::Error::MediaDeclined(MediaType::Audio)),
            MediaPointError::MediaDeclined(MediaType::Audio)
        );
        assert!(matches!(
            MediaPointError::from(mediactl_sdp_core::Error::semantic("x")),
            MediaPointError::Sdp(_)
        ));
    }

    #[test]
    fn test_is_semantic() {
        assert!(Error::from(ProfileError::UnknownProfile("x".into())).is_semantic());
        assert!(Error::from(mediactl_sdp_core::Error::semantic("bad cc")).is_semantic());
        assert!(!Error::from(mediactl_sdp_core::Error::parse("bad line")).is_semantic());
    }
}
