//! Static payload types of the RTP audio/video profile (RFC 3551, tables 4
//! and 5).

use super::{Codec, RtpCodec};
use crate::media_type::MediaType;
use std::ops::RangeInclusive;

/// Payload types handed out to codecs without a static assignment
pub const DYNAMIC_PAYLOAD_TYPES: RangeInclusive<u8> = 96..=126;

struct KnownCodec {
    payload_type: u8,
    media_type: MediaType,
    encoding_name: &'static str,
    clock_rate: u32,
    channels: u16,
}

const fn audio(payload_type: u8, encoding_name: &'static str, clock_rate: u32, channels: u16) -> KnownCodec {
    KnownCodec {
        payload_type,
        media_type: MediaType::Audio,
        encoding_name,
        clock_rate,
        channels,
    }
}

const fn video(payload_type: u8, encoding_name: &'static str) -> KnownCodec {
    KnownCodec {
        payload_type,
        media_type: MediaType::Video,
        encoding_name,
        clock_rate: 90000,
        channels: 1,
    }
}

const KNOWN_CODECS: &[KnownCodec] = &[
    audio(0, "PCMU", 8000, 1),
    audio(3, "GSM", 8000, 1),
    audio(4, "G723", 8000, 1),
    audio(5, "DVI4", 8000, 1),
    audio(6, "DVI4", 16000, 1),
    audio(7, "LPC", 8000, 1),
    audio(8, "PCMA", 8000, 1),
    audio(9, "G722", 8000, 1),
    audio(10, "L16", 44100, 2),
    audio(11, "L16", 44100, 1),
    audio(12, "QCELP", 8000, 1),
    audio(13, "CN", 8000, 1),
    audio(14, "MPA", 90000, 1),
    audio(15, "G728", 8000, 1),
    audio(16, "DVI4", 11025, 1),
    audio(17, "DVI4", 22050, 1),
    audio(18, "G729", 8000, 1),
    video(25, "CelB"),
    video(26, "JPEG"),
    video(28, "nv"),
    video(31, "H261"),
    video(32, "MPV"),
    video(33, "MP2T"),
    video(34, "H263"),
];

impl KnownCodec {
    fn rtp_codec(&self) -> RtpCodec {
        RtpCodec::new(
            Codec::new(self.media_type, self.encoding_name, self.clock_rate, self.channels),
            self.payload_type,
        )
    }
}

pub fn known_rtp_codecs() -> impl Iterator<Item = RtpCodec> {
    KNOWN_CODECS.iter().map(KnownCodec::rtp_codec)
}

pub fn known_by_payload_type(payload_type: u8) -> Option<RtpCodec> {
    KNOWN_CODECS
        .iter()
        .find(|k| k.payload_type == payload_type)
        .map(KnownCodec::rtp_codec)
}

/// Static assignment for `codec`, if it has one
pub fn known_by_codec(codec: &Codec) -> Option<RtpCodec> {
    KNOWN_CODECS
        .iter()
        .find(|k| {
            k.encoding_name.eq_ignore_ascii_case(&codec.encoding_name)
                && k.clock_rate == codec.clock_rate
                && k.channels == codec.channels
        })
        .map(KnownCodec::rtp_codec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(known_by_payload_type(8).unwrap().codec, Codec::audio("PCMA", 8000, 1));
        assert_eq!(known_by_payload_type(34).unwrap().codec.media_type, MediaType::Video);
        assert!(known_by_payload_type(96).is_none());
        assert!(known_by_payload_type(2).is_none());

        assert_eq!(known_by_codec(&Codec::audio("pcmu", 8000, 1)).unwrap().payload_type, 0);
        assert_eq!(known_by_codec(&Codec::audio("L16", 44100, 2)).unwrap().payload_type, 10);
        assert!(known_by_codec(&Codec::audio("PCMU", 8000, 2)).is_none());
        assert!(known_by_codec(&Codec::video("VP8", 90000)).is_none());
    }

    #[test]
    fn test_payload_types_are_unique_and_static() {
        let mut seen = std::collections::HashSet::new();
        for codec in known_rtp_codecs() {
            assert!(codec.payload_type < 96);
            assert!(seen.insert(codec.payload_type));
        }
    }
}
