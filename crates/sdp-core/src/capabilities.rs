//! Capability set requested by a signaling peer.
//!
//! `cc` describes what the offer should look like:
//!
//! ```json
//! {
//!     "profile": "RTP/AVP" | "RTP/SAVPF",
//!     "ice": true,
//!     "bundle": true,
//!     "ssrcRequired": true,
//!     "rtcpMux": true,
//!     "audio": ["PCMA/8000", "opus/48000/2"],
//!     "video": ["VP8/90000"]
//! }
//! ```
//!
//! `vv` is `[audio, video]`, selecting which media are offered.

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::media_type::MediaType;
use crate::raw::Proto;
use serde_json::{Map, Value};

/// Codec capabilities (`cc`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cc {
    pub profile: Proto,
    pub ice: bool,
    pub ssrc_required: bool,
    pub bundle: bool,
    pub rtcp_mux: bool,
    pub audio_codecs: Vec<Codec>,
    pub video_codecs: Vec<Codec>,
}

fn flag(object: &Map<String, Value>, key: &str) -> bool {
    matches!(object.get(key), Some(Value::Bool(true)))
}

fn codec_list(object: &Map<String, Value>, key: &str, media_type: MediaType) -> Result<Vec<Codec>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Codec::parse(media_type, s),
                other => Err(Error::semantic(format!("invalid codec in capabilities: {}", other))),
            })
            .collect(),
        Some(other) => Err(Error::semantic(format!("capability {:?} must be a list, got {}", key, other))),
    }
}

impl Cc {
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::semantic(format!("capabilities must be an object, got {}", value)))?;

        let profile = match object.get("profile") {
            None => Proto::default(),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| Error::semantic(format!("invalid capability profile {:?}", s)))?,
            Some(other) => return Err(Error::semantic(format!("invalid capability profile {}", other))),
        };

        Ok(Self {
            profile,
            ice: flag(object, "ice"),
            ssrc_required: flag(object, "ssrcRequired"),
            bundle: flag(object, "bundle"),
            rtcp_mux: flag(object, "rtcpMux"),
            audio_codecs: codec_list(object, "audio", MediaType::Audio)?,
            video_codecs: codec_list(object, "video", MediaType::Video)?,
        })
    }

    pub fn codecs(&self, media_type: MediaType) -> &[Codec] {
        match media_type {
            MediaType::Audio => &self.audio_codecs,
            MediaType::Video => &self.video_codecs,
            MediaType::Application => &[],
        }
    }
}

/// Voice/video selection (`vv`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vv {
    pub audio: bool,
    pub video: bool,
}

impl Vv {
    pub fn new(audio: bool, video: bool) -> Self {
        Self { audio, video }
    }

    /// Parse `[audio, video]`; each entry counts only when exactly `true`.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value.as_array().map(Vec::as_slice) {
            Some([audio, video]) => Ok(Self::new(
                matches!(audio, Value::Bool(true)),
                matches!(video, Value::Bool(true)),
            )),
            _ => Err(Error::semantic(format!("vv must be [audio, video], got {}", value))),
        }
    }

    pub fn media_types(&self) -> Vec<MediaType> {
        let mut types = Vec::with_capacity(2);
        if self.audio {
            types.push(MediaType::Audio);
        }
        if self.video {
            types.push(MediaType::Video);
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let cc = Cc::from_json(&json!({
            "audio": ["PCMA/8000", "telephone-event/8000"],
            "video": ["H263/90000"]
        }))
        .unwrap();
        assert_eq!(cc.profile, Proto::RtpAvp);
        assert!(!cc.ice && !cc.rtcp_mux && !cc.ssrc_required && !cc.bundle);
        assert_eq!(
            cc.audio_codecs,
            vec![Codec::audio("PCMA", 8000, 1), Codec::audio("telephone-event", 8000, 1)]
        );
        assert_eq!(cc.codecs(MediaType::Video), &[Codec::video("H263", 90000)]);
    }

    #[test]
    fn test_browser_capabilities() {
        let cc = Cc::from_json(&json!({
            "userAgent": "Chrome",
            "audio": ["PCMA/8000", "NV/90000"],
            "video": ["H404/90000", "VP10/100000", "JPEG/8000", "H263/90000/4"],
            "profile": "RTP/SAVPF",
            "rtcpMux": true,
            "ice": true,
            "ssrcRequired": true
        }))
        .unwrap();
        assert_eq!(cc.profile, Proto::RtpSavpf);
        assert!(cc.ice && cc.rtcp_mux && cc.ssrc_required);
        assert!(!cc.bundle);
        assert_eq!(cc.video_codecs[3], Codec::new(MediaType::Video, "H263", 90000, 4));
    }

    #[test]
    fn test_flags_must_be_true() {
        let cc = Cc::from_json(&json!({"ice": "true", "bundle": 1, "rtcpMux": false})).unwrap();
        assert!(!cc.ice && !cc.bundle && !cc.rtcp_mux);
        assert!(cc.audio_codecs.is_empty());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(Cc::from_json(&json!({"audio": ["WrongCodec"]})), Err(Error::Semantic(_))));
        assert!(Cc::from_json(&json!({"audio": ["RightCodec/8000"]})).is_ok());
        assert!(matches!(Cc::from_json(&json!({"profile": "BadProfile"})), Err(Error::Semantic(_))));
        assert!(Cc::from_json(&json!({"audio": "PCMA/8000"})).is_err());
        assert!(Cc::from_json(&json!([])).is_err());
    }

    #[test]
    fn test_vv() {
        assert_eq!(Vv::from_json(&json!([true, false])).unwrap().media_types(), vec![MediaType::Audio]);
        assert_eq!(
            Vv::from_json(&json!([true, true])).unwrap().media_types(),
            vec![MediaType::Audio, MediaType::Video]
        );
        assert!(Vv::from_json(&json!([true])).is_err());
        assert!(Vv::from_json(&json!({"audio": true})).is_err());
    }
}
