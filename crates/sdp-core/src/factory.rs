//! Offer creation and answer negotiation.

use crate::capabilities::{Cc, Vv};
use crate::codec::{Codec, PayloadTypePolicy, RtpCodec, codec_list};
use crate::error::{Error, Result};
use crate::media_description::MediaDescription;
use crate::media_type::MediaType;
use crate::raw::attributes::{GroupSemantics, SdpDirection};
use crate::raw::{ConnectionData, Media, Proto};
use crate::session_description::SessionDescription;
use tracing::debug;

const ICE_PLACEHOLDER_ADDRESS: &str = "0.0.0.0";
const ICE_PLACEHOLDER_RTCP_PORT: u16 = 1;

/// Build an offer with the default payload type policy.
pub fn create_offer(cc: &Cc, vv: Vv, supported: &[Codec]) -> Result<SessionDescription> {
    create_offer_with_policy(cc, vv, supported, PayloadTypePolicy::default())
}

/// Build an offer for the media selected by `vv`.
///
/// Each media carries the codecs of `cc` that are also in `supported`, in the
/// order `cc` lists them. Attributes are written in the order browsers emit
/// them: `mid`, `rtcp`, ICE, direction, `rtcp-mux`, `crypto`, `rtpmap`.
pub fn create_offer_with_policy(
    cc: &Cc,
    vv: Vv,
    supported: &[Codec],
    policy: PayloadTypePolicy,
) -> Result<SessionDescription> {
    let mut sdp = SessionDescription::new().with_payload_type_policy(policy);

    if cc.bundle {
        sdp.set_group_semantics(Some(GroupSemantics::Bundle));
    }

    for media_type in vv.media_types() {
        let codecs: Vec<&Codec> = cc
            .codecs(media_type)
            .iter()
            .filter(|codec| supported.contains(codec))
            .collect();
        debug!(
            "Creating {} media description with codecs: {}",
            media_type,
            codec_list(codecs.iter().copied())
        );

        let index = sdp.add_raw_media(Media::new(media_type))?;
        let mut media = sdp
            .media_mut(index)
            .ok_or_else(|| Error::semantic(format!("{} media missing after insertion", media_type)))?;

        if cc.ice {
            media.set_connection(Some(ConnectionData::ip4(ICE_PLACEHOLDER_ADDRESS)));
            media.set_rtcp_port(ICE_PLACEHOLDER_RTCP_PORT);
            media.set_rtcp_address(ICE_PLACEHOLDER_ADDRESS);
            media.generate_ice()?;
        }

        if cc.ssrc_required {
            media.set_direction(SdpDirection::RecvOnly)?;
        }

        if cc.rtcp_mux {
            media.set_rtcp_mux(true);
        }

        media.set_proto(cc.profile);
        if cc.profile == Proto::RtpSavpf {
            media.generate_crypto();
        }

        for codec in codecs {
            media.add_codec(codec)?;
        }
    }

    Ok(sdp)
}

/// Parse a remote document into a [`SessionDescription`].
pub fn create_from_string(text: &str) -> Result<SessionDescription> {
    text.parse()
}

/// Outcome of matching one local media against the remote one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedMedia {
    pub media_type: MediaType,
    /// Codecs both sides support, in local order
    pub codecs: Vec<Codec>,
    /// Local bindings of `codecs`
    pub local_codecs: Vec<RtpCodec>,
    /// Remote bindings of `codecs`, in local order
    pub remote_codecs: Vec<RtpCodec>,
    pub remote_host: String,
    pub remote_rtp_port: u16,
    pub remote_rtcp_port: u16,
}

/// Base codecs present on both sides, in `local` order
pub fn common_codecs(local: &[RtpCodec], remote: &[RtpCodec]) -> Vec<Codec> {
    let mut common: Vec<Codec> = Vec::new();
    for codec in local.iter().map(RtpCodec::base_codec) {
        if remote.iter().any(|r| r.codec == *codec) && !common.contains(codec) {
            common.push(codec.clone());
        }
    }
    common
}

/// Match a local media against the remote answer for it.
///
/// A remote port of 0 declines the media. Payload types are ignored when
/// comparing codecs.
pub fn negotiate(local: &MediaDescription<'_>, remote: &MediaDescription<'_>) -> Result<NegotiatedMedia> {
    let media_type = local.media_type();
    if remote.rtp_port() == 0 {
        return Err(Error::MediaDeclined(media_type));
    }

    let codecs = common_codecs(local.rtp_codecs(), remote.rtp_codecs());
    if codecs.is_empty() {
        return Err(Error::CodecInconsistency {
            local: codec_list(local.rtp_codecs().iter().map(RtpCodec::base_codec)),
            remote: codec_list(remote.rtp_codecs().iter().map(RtpCodec::base_codec)),
        });
    }

    let pick = |side: &[RtpCodec]| -> Vec<RtpCodec> {
        codecs
            .iter()
            .filter_map(|codec| side.iter().find(|rtp| rtp.codec == *codec).cloned())
            .collect()
    };

    let remote_host = remote
        .host()
        .ok_or_else(|| Error::semantic(format!("remote {} media has no connection address", media_type)))?;

    Ok(NegotiatedMedia {
        media_type,
        local_codecs: pick(local.rtp_codecs()),
        remote_codecs: pick(remote.rtp_codecs()),
        codecs,
        remote_host: remote_host.to_string(),
        remote_rtp_port: remote.rtp_port(),
        remote_rtcp_port: remote.rtcp_port(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn supported() -> Vec<Codec> {
        vec![
            Codec::audio("PCMA", 8000, 1),
            Codec::audio("PCMU", 8000, 1),
            Codec::audio("opus", 48000, 2),
            Codec::video("VP8", 90000),
            Codec::video("H264", 90000),
        ]
    }

    #[test]
    fn test_offer_default_audio() {
        let cc = Cc::from_json(&json!({"audio": ["PCMA/8000"]})).unwrap();
        let sdp = create_offer(&cc, Vv::new(true, false), &supported()).unwrap();
        assert_eq!(
            sdp.lines(),
            vec!["v=0", "o=- 0 0 IN IP4 127.0.0.1", "s=Session SIP/SDP", "t=0 0", "m=audio 0 RTP/AVP 8"]
        );
    }

    #[test]
    fn test_offer_filters_unsupported_codecs() {
        let cc = Cc::from_json(&json!({
            "audio": ["G729/8000", "opus/48000/2", "PCMU/8000"],
            "video": ["H263/90000"]
        }))
        .unwrap();
        let sdp = create_offer(&cc, Vv::new(true, true), &supported()).unwrap();

        let audio = sdp.audio().unwrap();
        assert_eq!(audio.base_codecs(), vec![Codec::audio("opus", 48000, 2), Codec::audio("PCMU", 8000, 1)]);
        assert_eq!(audio.raw().formats, vec![96, 0]);
        assert!(sdp.video().unwrap().rtp_codecs().is_empty());
    }

    #[test]
    fn test_offer_browser_profile() {
        let cc = Cc::from_json(&json!({
            "profile": "RTP/SAVPF",
            "ice": true,
            "bundle": true,
            "ssrcRequired": true,
            "rtcpMux": true,
            "audio": ["PCMA/8000", "PCMU/8000"],
            "video": ["VP8/90000"]
        }))
        .unwrap();
        let sdp = create_offer(&cc, Vv::new(true, true), &supported()).unwrap();
        let lines = sdp.lines();

        assert_eq!(lines[4], "a=group:BUNDLE audio video");
        assert_eq!(lines[5], "m=audio 0 RTP/SAVPF 8 0");
        assert_eq!(lines[6], "c=IN IP4 0.0.0.0");
        assert_eq!(lines[7], "a=mid:audio");
        assert_eq!(lines[8], "a=rtcp:1 IN IP4 0.0.0.0");
        assert!(lines[9].starts_with("a=ice-ufrag:"));
        assert!(lines[10].starts_with("a=ice-pwd:"));
        assert_eq!(lines[11], "a=ice-options:google-ice");
        assert_eq!(lines[12], "a=recvonly");
        assert_eq!(lines[13], "a=rtcp-mux");
        assert!(lines[14].starts_with("a=crypto:1 AES_CM_128_HMAC_SHA1_80 inline:"));

        let video = sdp.video().unwrap();
        assert_eq!(video.proto(), Proto::RtpSavpf);
        assert_eq!(video.mid(), Some("video"));
        assert_eq!(video.raw().formats, vec![96]);
        assert_eq!(video.direction(), SdpDirection::RecvOnly);
        assert!(video.has_crypto());
        assert_eq!(video.rtcp_port(), 1);
    }

    #[test]
    fn test_offer_savp_has_no_crypto() {
        let cc = Cc::from_json(&json!({"profile": "RTP/SAVP", "audio": ["PCMA/8000"]})).unwrap();
        let sdp = create_offer(&cc, Vv::new(true, false), &supported()).unwrap();

        let audio = sdp.audio().unwrap();
        assert_eq!(audio.proto(), Proto::RtpSavp);
        assert!(!audio.has_crypto());
        assert!(!sdp.lines().iter().any(|line| line.starts_with("a=crypto:")));
    }

    fn remote_answer(audio_port: u16, audio_formats: &str) -> SessionDescription {
        create_from_string(&format!(
            "v=0\r\no=- 1 1 IN IP4 10.0.0.2\r\ns=-\r\nc=IN IP4 10.0.0.2\r\nt=0 0\r\n\
             m=audio {} RTP/AVP {}\r\na=rtpmap:97 opus/48000/2\r\n\
             m=video 6000 RTP/AVP 100\r\nc=IN IP4 10.0.0.3\r\na=rtcp:6100\r\na=rtpmap:100 VP8/90000\r\n",
            audio_port, audio_formats
        ))
        .unwrap()
    }

    #[test]
    fn test_negotiate() {
        let cc = Cc::from_json(&json!({
            "audio": ["opus/48000/2", "PCMA/8000"],
            "video": ["H264/90000", "VP8/90000"]
        }))
        .unwrap();
        let local = create_offer(&cc, Vv::new(true, true), &supported()).unwrap();
        let remote = remote_answer(5000, "8 97");

        let audio = negotiate(&local.audio().unwrap(), &remote.audio().unwrap()).unwrap();
        assert_eq!(audio.codecs, vec![Codec::audio("opus", 48000, 2), Codec::audio("PCMA", 8000, 1)]);
        assert_eq!(audio.local_codecs[0].payload_type, 96);
        assert_eq!(audio.remote_codecs[0].payload_type, 97);
        assert_eq!(audio.remote_host, "10.0.0.2");
        assert_eq!((audio.remote_rtp_port, audio.remote_rtcp_port), (5000, 5001));

        let video = negotiate(&local.video().unwrap(), &remote.video().unwrap()).unwrap();
        assert_eq!(video.codecs, vec![Codec::video("VP8", 90000)]);
        assert_eq!(video.remote_host, "10.0.0.3");
        assert_eq!(video.remote_rtcp_port, 6100);
    }

    #[test]
    fn test_negotiate_failures() {
        let cc = Cc::from_json(&json!({"audio": ["PCMU/8000"]})).unwrap();
        let local = create_offer(&cc, Vv::new(true, false), &supported()).unwrap();

        let declined = remote_answer(0, "0");
        assert_eq!(
            negotiate(&local.audio().unwrap(), &declined.audio().unwrap()),
            Err(Error::MediaDeclined(MediaType::Audio))
        );

        let disjoint = remote_answer(5000, "8 97");
        assert_eq!(
            negotiate(&local.audio().unwrap(), &disjoint.audio().unwrap()),
            Err(Error::CodecInconsistency {
                local: "PCMU/8000".into(),
                remote: "PCMA/8000,opus/48000/2".into(),
            })
        );
    }

    #[test]
    fn test_common_codecs() {
        let local = [
            RtpCodec::new(Codec::audio("PCMA", 8000, 1), 8),
            RtpCodec::new(Codec::video("H264", 90000), 96),
        ];
        let remote = [
            RtpCodec::new(Codec::audio("PCMA", 8000, 1), 8),
            RtpCodec::new(Codec::video("VP8", 90000), 96),
        ];
        assert_eq!(common_codecs(&local, &remote), vec![Codec::audio("PCMA", 8000, 1)]);
        assert!(common_codecs(&local[1..], &remote[1..]).is_empty());
    }
}
