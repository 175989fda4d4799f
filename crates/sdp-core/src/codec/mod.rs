//! Codec identity and payload type binding.
//!
//! A [`Codec`] is what both sides must agree on: encoding name, clock rate
//! and channel count. An [`RtpCodec`] binds a codec to the payload type one
//! media description uses for it.

mod collection;
mod known;

pub use collection::{PayloadTypePolicy, add_codec, codecs_from_media, create_codec_from_attributes};
pub use known::{DYNAMIC_PAYLOAD_TYPES, known_by_codec, known_by_payload_type, known_rtp_codecs};

use crate::error::{Error, Result};
use crate::media_type::MediaType;
use crate::raw::attributes::common::{identifier, number, parse_all};
use nom::{
    character::complete::char,
    combinator::opt,
    sequence::{preceded, tuple},
};
use std::fmt;
use std::hash::{Hash, Hasher};

pub const DEFAULT_CHANNELS: u16 = 1;

/// Codec identity.
///
/// Equality and hashing use the encoding name (ASCII case-insensitive), the
/// clock rate and the channel count. The media type is carried along but does
/// not take part in comparisons.
#[derive(Debug, Clone, Eq)]
pub struct Codec {
    pub media_type: MediaType,
    pub encoding_name: String,
    pub clock_rate: u32,
    pub channels: u16,
}

impl Codec {
    /// A `channels` of 0 is stored as [`DEFAULT_CHANNELS`].
    pub fn new(media_type: MediaType, encoding_name: impl Into<String>, clock_rate: u32, channels: u16) -> Self {
        Self {
            media_type,
            encoding_name: encoding_name.into(),
            clock_rate,
            channels: if channels == 0 { DEFAULT_CHANNELS } else { channels },
        }
    }

    pub fn audio(encoding_name: impl Into<String>, clock_rate: u32, channels: u16) -> Self {
        Self::new(MediaType::Audio, encoding_name, clock_rate, channels)
    }

    pub fn video(encoding_name: impl Into<String>, clock_rate: u32) -> Self {
        Self::new(MediaType::Video, encoding_name, clock_rate, DEFAULT_CHANNELS)
    }

    /// Parse the capability grammar `encoding-name/clock-rate[/channels]`.
    ///
    /// A malformed string is a semantic error of the capability set, not a
    /// parse error of an SDP document.
    pub fn parse(media_type: MediaType, s: &str) -> Result<Self> {
        let (name, _, clock_rate, channels) = parse_all(
            tuple((
                identifier,
                char('/'),
                number::<u32>,
                opt(preceded(char('/'), number::<u16>)),
            )),
            s,
            "codec",
        )
        .map_err(|_| Error::semantic(format!("invalid codec in capabilities: {:?}", s)))?;
        Ok(Self::new(media_type, name, clock_rate, channels.unwrap_or(DEFAULT_CHANNELS)))
    }
}

impl PartialEq for Codec {
    fn eq(&self, other: &Self) -> bool {
        self.encoding_name.eq_ignore_ascii_case(&other.encoding_name)
            && self.clock_rate == other.clock_rate
            && self.channels == other.channels
    }
}

impl Hash for Codec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoding_name.to_ascii_lowercase().hash(state);
        self.clock_rate.hash(state);
        self.channels.hash(state);
    }
}

impl fmt::Display for Codec {
    /// `name/rate` with `/channels` only when not mono
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.encoding_name, self.clock_rate)?;
        if self.channels != DEFAULT_CHANNELS {
            write!(f, "/{}", self.channels)?;
        }
        Ok(())
    }
}

/// A codec bound to an RTP payload type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RtpCodec {
    pub codec: Codec,
    pub payload_type: u8,
}

impl RtpCodec {
    pub fn new(codec: Codec, payload_type: u8) -> Self {
        Self { codec, payload_type }
    }

    /// The codec without its payload type
    pub fn base_codec(&self) -> &Codec {
        &self.codec
    }

    pub fn media_type(&self) -> MediaType {
        self.codec.media_type
    }
}

impl fmt::Display for RtpCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pt={}", self.codec, self.payload_type)
    }
}

/// Comma separated codec list, used in log lines and error messages
pub fn codec_list<'a>(codecs: impl IntoIterator<Item = &'a Codec>) -> String {
    codecs
        .into_iter()
        .map(Codec::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_media_type_and_case() {
        assert_eq!(Codec::audio("PCMA", 8000, 1), Codec::new(MediaType::Video, "pcma", 8000, 1));
        assert_ne!(Codec::audio("PCMA", 8000, 1), Codec::audio("PCMA", 8000, 2));
        assert_ne!(Codec::audio("PCMA", 8000, 1), Codec::audio("PCMA", 16000, 1));

        let set: HashSet<Codec> = [Codec::audio("opus", 48000, 2)].into_iter().collect();
        assert!(set.contains(&Codec::audio("OPUS", 48000, 2)));
    }

    #[test]
    fn test_zero_channels_means_mono() {
        assert_eq!(Codec::audio("PCMU", 8000, 0).channels, 1);
    }

    #[test]
    fn test_parse_capability_codec() {
        assert_eq!(
            Codec::parse(MediaType::Audio, "PCMA/8000").unwrap(),
            Codec::audio("PCMA", 8000, 1)
        );
        assert_eq!(
            Codec::parse(MediaType::Audio, "opus/48000/2").unwrap(),
            Codec::audio("opus", 48000, 2)
        );
        assert_eq!(
            Codec::parse(MediaType::Video, "H263-1998/90000").unwrap().encoding_name,
            "H263-1998"
        );
        assert!(matches!(
            Codec::parse(MediaType::Audio, "WrongCodec"),
            Err(Error::Semantic(_))
        ));
        assert!(Codec::parse(MediaType::Audio, "PCMA/fast").is_err());
        assert!(Codec::parse(MediaType::Audio, "PCMA/8000/").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Codec::audio("opus", 48000, 2).to_string(), "opus/48000/2");
        assert_eq!(RtpCodec::new(Codec::audio("PCMU", 8000, 1), 0).to_string(), "PCMU/8000 pt=0");
    }
}
