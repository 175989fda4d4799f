//! Error types for the SDP engine.

use crate::media_type::MediaType;
use thiserror::Error;

/// Errors produced while parsing, validating or negotiating SDP
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed SDP text, field order violation or bad attribute value
    #[error("Error parsing SDP: {0}")]
    Parse(String),

    /// Structurally valid SDP that breaks a semantic rule, such as two
    /// `a=mid` lines in one media or an unparseable capability string
    #[error("SDP semantic error: {0}")]
    Semantic(String),

    /// Payload type with neither an rtpmap nor a well-known mapping
    #[error("Unknown codec for payload type {0}")]
    UnknownCodec(u8),

    /// The dynamic payload type range 96-126 has no free slot left
    #[error("No free dynamic payload type left in {media_type} media")]
    PayloadTypeExhausted { media_type: MediaType },

    /// Local and remote media share no codec
    #[error("No common codecs: local={{{local}}}, remote={{{remote}}}")]
    CodecInconsistency { local: String, remote: String },

    /// The remote side answered a media with port 0
    #[error("Remote side declined {0} media")]
    MediaDeclined(MediaType),

    /// An attribute handle that is not a live member of the collection
    #[error("Attribute handle {0} is not a member of this collection")]
    InvalidHandle(usize),
}

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    pub fn semantic(msg: impl Into<String>) -> Self {
        Error::Semantic(msg.into())
    }

    /// True for errors raised while reading SDP text
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

/// Result type for SDP operations
pub type Result<T> = std::result::Result<T, Error>;
