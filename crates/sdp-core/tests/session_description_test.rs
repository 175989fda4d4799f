//! Facade level tests over complete browser and gateway documents

use mediactl_sdp_core::{
    Cc, Codec, Error, GroupSemantics, MediaType, Proto, SdpDirection, SessionDescription, Vv, factory,
};
use mediactl_sdp_core::raw::Media;
use pretty_assertions::assert_eq;
use serde_json::json;

const BROWSER_OFFER: &str = "v=0\r\n\
o=- 830320942 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE audio video\r\n\
m=audio 1 RTP/SAVPF 111 103 104 0 8 126\r\n\
c=IN IP4 0.0.0.0\r\n\
a=rtcp:1 IN IP4 0.0.0.0\r\n\
a=ice-ufrag:lReNzue8HxnC/VXP\r\n\
a=ice-pwd:dtyy51IyYkn1mF6z0HkJ6w67\r\n\
a=ice-options:google-ice\r\n\
a=fingerprint:sha-256 14:31:FB:23:F9:A6:31:FF:D1:8E:1D:EE:BE:34:3B:D0:CC:37:77:61:60:F1:C0:7F:9C:3B:1E:F5:5E:33:72:9A\r\n\
a=sendrecv\r\n\
a=mid:audio\r\n\
a=rtcp-mux\r\n\
a=crypto:1 AES_CM_128_HMAC_SHA1_80 inline:hEYMCUOo8YzHpgMz4InXf3gaLwK2XE7aQ65W70rQ\r\n\
a=rtpmap:103 ISAC/16000\r\n\
a=rtpmap:104 ISAC/32000\r\n\
a=rtpmap:111 opus/48000/2\r\n\
a=fmtp:111 minptime=10\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=rtpmap:8 PCMA/8000\r\n\
a=rtpmap:126 telephone-event/8000\r\n\
a=maxptime:60\r\n\
a=ssrc:163910515 cname:yGUAz7Kn04WIjbiD\r\n\
a=ssrc:163910515 msid:vn7yXi1OjJ6CVPavCTtJeGE1ohpsu8CuQ4y3 vn7yXi1OjJ6CVPavCTtJeGE1ohpsu8CuQ4y3a0\r\n\
a=ssrc:163910515 mslabel:vn7yXi1OjJ6CVPavCTtJeGE1ohpsu8CuQ4y3\r\n\
a=ssrc:163910515 label:vn7yXi1OjJ6CVPavCTtJeGE1ohpsu8CuQ4y3a0\r\n\
m=video 1 RTP/SAVPF 100 116 117\r\n\
c=IN IP4 0.0.0.0\r\n\
a=rtcp:1 IN IP4 0.0.0.0\r\n\
a=ice-ufrag:lReNzue8HxnC/VXP\r\n\
a=ice-pwd:dtyy51IyYkn1mF6z0HkJ6w67\r\n\
a=ice-options:google-ice\r\n\
a=sendrecv\r\n\
a=mid:video\r\n\
a=rtcp-mux\r\n\
a=crypto:1 AES_CM_128_HMAC_SHA1_80 inline:hEYMCUOo8YzHpgMz4InXf3gaLwK2XE7aQ65W70rQ\r\n\
a=rtpmap:100 VP8/90000\r\n\
a=rtpmap:116 red/90000\r\n\
a=rtpmap:117 ulpfec/90000\r\n\
a=ssrc:2649854635 cname:yGUAz7Kn04WIjbiD\r\n\
a=ssrc:2649854635 msid:vn7yXi1OjJ6CVPavCTtJeGE1ohpsu8CuQ4y3 vn7yXi1OjJ6CVPavCTtJeGE1ohpsu8CuQ4y3v0\r\n";

#[test]
fn test_browser_offer_round_trip() {
    let sdp: SessionDescription = BROWSER_OFFER.parse().unwrap();
    assert_eq!(sdp.to_string(), BROWSER_OFFER);
}

#[test]
fn test_browser_offer_semantics() {
    let sdp: SessionDescription = BROWSER_OFFER.parse().unwrap();

    assert_eq!(sdp.group_semantics(), Some(GroupSemantics::Bundle));
    assert_eq!(sdp.group_tags(), vec!["audio", "video"]);
    assert_eq!(sdp.host(), None);

    let audio = sdp.audio().unwrap();
    assert_eq!(audio.proto(), Proto::RtpSavpf);
    assert_eq!(audio.mid(), Some("audio"));
    assert_eq!(audio.direction(), SdpDirection::SendRecv);
    assert!(audio.rtcp_mux());
    assert_eq!(audio.host(), Some("0.0.0.0"));
    assert_eq!(audio.rtp_port(), 1);
    assert_eq!(audio.rtcp_port(), 1);
    assert_eq!(audio.ice_ufrag().as_deref(), Some("lReNzue8HxnC/VXP"));
    assert_eq!(audio.ice_pwd().as_deref(), Some("dtyy51IyYkn1mF6z0HkJ6w67"));
    assert_eq!(audio.ice_options().as_deref(), Some("google-ice"));
    assert_eq!(audio.ssrc_ids(), vec![163910515]);
    assert_eq!(
        audio.rtp_codecs().iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        vec![
            "opus/48000/2 pt=111",
            "ISAC/16000 pt=103",
            "ISAC/32000 pt=104",
            "PCMU/8000 pt=0",
            "PCMA/8000 pt=8",
            "telephone-event/8000 pt=126",
        ]
    );

    let stream = audio.streams().get(0).unwrap();
    assert_eq!(stream.cname(audio.attributes()), Some("yGUAz7Kn04WIjbiD"));
    assert_eq!(
        stream.media_stream_label(audio.attributes()),
        Some("vn7yXi1OjJ6CVPavCTtJeGE1ohpsu8CuQ4y3")
    );

    let video = sdp.video().unwrap();
    assert_eq!(video.base_codecs()[0], Codec::video("VP8", 90000));
    assert_eq!(video.streams().len(), 1);
    assert_eq!(video.crypto().map(|c| c.tag), Some(1));
}

#[test]
fn test_mutation_keeps_foreign_attributes() {
    let mut sdp: SessionDescription = BROWSER_OFFER.parse().unwrap();
    {
        let mut audio = sdp.audio_mut().unwrap();
        audio.set_addr(40000, Some("192.0.2.10"));
        audio.set_rtcp_port(40001);
        audio.set_direction(SdpDirection::SendOnly).unwrap();
        audio.set_ice_ufrag(None).unwrap();
        audio.set_ice_pwd(None).unwrap();
        audio.set_ice_options(None).unwrap();
        audio.set_crypto(None);
    }

    let audio = sdp.audio().unwrap();
    let lines = audio.lines();
    assert_eq!(lines[0], "m=audio 40000 RTP/SAVPF 111 103 104 0 8 126");
    assert_eq!(lines[1], "c=IN IP4 192.0.2.10");
    assert_eq!(lines[2], "a=rtcp:40001 IN IP4 0.0.0.0");
    assert!(lines[3].starts_with("a=fingerprint:sha-256 14:31"));
    assert_eq!(lines[4], "a=sendonly");
    assert!(lines.iter().any(|l| l == "a=maxptime:60"));
    assert!(!audio.has_ice());
    assert!(!audio.has_crypto());

    let reparsed: SessionDescription = sdp.to_string().parse().unwrap();
    assert_eq!(reparsed.to_string(), sdp.to_string());
}

#[test]
fn test_bundle_assigns_mids_in_add_order() {
    let mut sdp = SessionDescription::new();
    for media_type in [MediaType::Video, MediaType::Video, MediaType::Audio] {
        sdp.add_raw_media(Media::new(media_type)).unwrap();
    }
    sdp.set_group_semantics(Some(GroupSemantics::Bundle));

    assert_eq!(
        sdp.lines(),
        vec![
            "v=0",
            "o=- 0 0 IN IP4 127.0.0.1",
            "s=Session SIP/SDP",
            "t=0 0",
            "a=group:BUNDLE video video-1 audio",
            "m=video 0 RTP/AVP",
            "a=mid:video",
            "m=video 0 RTP/AVP",
            "a=mid:video-1",
            "m=audio 0 RTP/AVP",
            "a=mid:audio",
        ]
    );
}

#[test]
fn test_duplicate_singletons_are_semantic_errors() {
    let duplicated = BROWSER_OFFER.replace("a=mid:video\r\n", "a=mid:video\r\na=mid:other\r\n");
    assert!(matches!(duplicated.parse::<SessionDescription>(), Err(Error::Semantic(_))));

    let duplicated = BROWSER_OFFER.replace("a=rtcp-mux\r\n", "a=rtcp-mux\r\na=rtcp-mux\r\n");
    assert!(matches!(duplicated.parse::<SessionDescription>(), Err(Error::Semantic(_))));

    let no_cname = BROWSER_OFFER.replace("a=ssrc:2649854635 cname:yGUAz7Kn04WIjbiD\r\n", "");
    assert!(matches!(no_cname.parse::<SessionDescription>(), Err(Error::Semantic(_))));
}

#[test]
fn test_unknown_payload_type_is_skipped() {
    let text = "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\nm=audio 5000 RTP/AVP 0 99\r\n";
    let sdp = factory::create_from_string(text).unwrap();
    assert_eq!(sdp.audio().unwrap().base_codecs(), vec![Codec::audio("PCMU", 8000, 1)]);
    assert_eq!(sdp.to_string(), text);
}

#[test]
fn test_offer_answer_exchange() {
    let cc = Cc::from_json(&json!({
        "audio": ["PCMA/8000", "H264/90000"],
        "video": ["H264/90000"]
    }))
    .unwrap();
    let supported = [Codec::audio("PCMA", 8000, 1), Codec::video("H264", 90000)];
    let offer = factory::create_offer(&cc, Vv::new(true, false), &supported).unwrap();
    assert!(offer.video().is_none());

    let answer = factory::create_from_string(
        "v=0\r\no=- 0 0 IN IP4 198.51.100.7\r\ns=-\r\nc=IN IP4 198.51.100.7\r\nt=0 0\r\n\
         m=audio 30000 RTP/AVP 8 96\r\na=rtpmap:96 VP8/90000\r\n",
    )
    .unwrap();

    let negotiated = factory::negotiate(&offer.audio().unwrap(), &answer.audio().unwrap()).unwrap();
    assert_eq!(negotiated.codecs, vec![Codec::audio("PCMA", 8000, 1)]);
    assert_eq!(negotiated.remote_host, "198.51.100.7");
    assert_eq!(negotiated.remote_rtp_port, 30000);
}
