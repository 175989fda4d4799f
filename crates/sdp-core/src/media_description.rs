//! Per-media view of a [`crate::SessionDescription`].

use crate::codec::{self, Codec, RtpCodec};
use crate::error::Result;
use crate::media_type::MediaType;
use crate::raw::attributes::{Crypto, SdpDirection};
use crate::raw::{Attribute, AttributeCollection, AttributeValue, ConnectionData, Media, Proto};
use crate::semantic::{
    CryptoWrapper, Direction, Ice, Mid, Ptime, RtcpMux, RtcpWrapper, SilenceSuppWrapper, StreamCollection,
};

const CANDIDATE_FOUNDATION: &str = "2896278100";
const CANDIDATE_PRIORITY: u32 = 2113937151;

/// Semantic wrappers of one raw media, kept next to it by the session
#[derive(Debug, Clone)]
pub(crate) struct MediaSemantics {
    direction: Direction,
    ice: Ice,
    crypto: CryptoWrapper,
    streams: StreamCollection,
    rtcp: RtcpWrapper,
    rtcp_mux: RtcpMux,
    mid: Mid,
    ptime: Ptime,
    silence_supp: SilenceSuppWrapper,
    codecs: Vec<RtpCodec>,
}

impl MediaSemantics {
    /// Fails when any wrapper finds more than one attribute of its kind, or
    /// when a payload type carries conflicting codec attributes.
    pub(crate) fn from_media(media: &Media) -> Result<Self> {
        let attributes = &media.attributes;
        Ok(Self {
            direction: Direction::from_attributes(attributes)?,
            ice: Ice::from_attributes(attributes)?,
            crypto: CryptoWrapper::from_attributes(attributes)?,
            streams: StreamCollection::from_attributes(attributes)?,
            rtcp: RtcpWrapper::from_attributes(attributes)?,
            rtcp_mux: RtcpMux::from_attributes(attributes)?,
            mid: Mid::from_attributes(attributes)?,
            ptime: Ptime::from_attributes(attributes)?,
            silence_supp: SilenceSuppWrapper::from_attributes(attributes)?,
            codecs: codec::codecs_from_media(media)?,
        })
    }

    pub(crate) fn codecs(&self) -> &[RtpCodec] {
        &self.codecs
    }
}

/// Read access to one media description
#[derive(Debug, Clone, Copy)]
pub struct MediaDescription<'a> {
    media: &'a Media,
    semantics: &'a MediaSemantics,
    session_connection: Option<&'a ConnectionData>,
}

impl<'a> MediaDescription<'a> {
    pub(crate) fn new(
        media: &'a Media,
        semantics: &'a MediaSemantics,
        session_connection: Option<&'a ConnectionData>,
    ) -> Self {
        Self {
            media,
            semantics,
            session_connection,
        }
    }

    pub fn raw(&self) -> &'a Media {
        self.media
    }

    pub fn attributes(&self) -> &'a AttributeCollection {
        &self.media.attributes
    }

    pub fn media_type(&self) -> MediaType {
        self.media.media_type
    }

    pub fn proto(&self) -> Proto {
        self.media.proto
    }

    pub fn rtp_codecs(&self) -> &'a [RtpCodec] {
        &self.semantics.codecs
    }

    /// Codecs without their payload types, in `m=` line order
    pub fn base_codecs(&self) -> Vec<Codec> {
        self.semantics.codecs.iter().map(|c| c.codec.clone()).collect()
    }

    pub fn direction(&self) -> SdpDirection {
        self.semantics.direction.get(self.attributes())
    }

    pub fn ice(&self) -> &'a Ice {
        &self.semantics.ice
    }

    pub fn ice_ufrag(&self) -> Option<String> {
        self.semantics.ice.ufrag(self.attributes())
    }

    pub fn ice_pwd(&self) -> Option<String> {
        self.semantics.ice.pwd(self.attributes())
    }

    pub fn ice_options(&self) -> Option<String> {
        self.semantics.ice.options(self.attributes())
    }

    pub fn has_ice(&self) -> bool {
        self.semantics.ice.is_present(self.attributes())
    }

    pub fn crypto(&self) -> Option<&'a Crypto> {
        self.semantics.crypto.get(&self.media.attributes)
    }

    pub fn has_crypto(&self) -> bool {
        self.crypto().is_some()
    }

    pub fn streams(&self) -> &'a StreamCollection {
        &self.semantics.streams
    }

    pub fn ssrc_ids(&self) -> Vec<u32> {
        self.semantics.streams.ssrc_ids()
    }

    pub fn rtcp_mux(&self) -> bool {
        self.semantics.rtcp_mux.get(self.attributes())
    }

    pub fn mid(&self) -> Option<&'a str> {
        self.semantics.mid.get(&self.media.attributes)
    }

    pub fn packet_time(&self) -> Option<u32> {
        self.semantics.ptime.get(self.attributes())
    }

    pub fn silence_supp_enabled(&self) -> Option<bool> {
        self.semantics.silence_supp.enabled(self.attributes())
    }

    /// Media level `c=`
    pub fn connection(&self) -> Option<&'a ConnectionData> {
        self.media.connection.as_ref()
    }

    /// Media `c=` address, falling back to the session `c=`
    pub fn host(&self) -> Option<&'a str> {
        self.media
            .connection
            .as_ref()
            .or(self.session_connection)
            .map(|c| c.address.as_str())
    }

    pub fn rtp_port(&self) -> u16 {
        self.media.port
    }

    /// `a=rtcp` port, or the port following the RTP port
    pub fn rtcp_port(&self) -> u16 {
        self.semantics
            .rtcp
            .port(self.attributes())
            .unwrap_or_else(|| self.media.port.saturating_add(1))
    }

    pub fn rtcp_address(&self) -> Option<&'a str> {
        self.semantics.rtcp.connection_address(&self.media.attributes)
    }

    /// SDP lines of this media without terminators
    pub fn lines(&self) -> Vec<String> {
        self.media.lines()
    }
}

/// Write access to one media description.
///
/// Every mutation goes through the semantic wrappers so that the raw
/// attribute list and the cached codec list stay consistent.
#[derive(Debug)]
pub struct MediaDescriptionMut<'a> {
    media: &'a mut Media,
    semantics: &'a mut MediaSemantics,
    session_connection: Option<&'a ConnectionData>,
    reserved_payload_types: Vec<u8>,
}

impl<'a> MediaDescriptionMut<'a> {
    pub(crate) fn new(
        media: &'a mut Media,
        semantics: &'a mut MediaSemantics,
        session_connection: Option<&'a ConnectionData>,
        reserved_payload_types: Vec<u8>,
    ) -> Self {
        Self {
            media,
            semantics,
            session_connection,
            reserved_payload_types,
        }
    }

    /// Read-only view for the getters
    pub fn view(&self) -> MediaDescription<'_> {
        MediaDescription::new(self.media, self.semantics, self.session_connection)
    }

    pub fn media_type(&self) -> MediaType {
        self.media.media_type
    }

    /// Add a codec, assigning its payload type.
    pub fn add_codec(&mut self, codec: &Codec) -> Result<RtpCodec> {
        let rtp_codec = codec::add_codec(
            self.media,
            &mut self.semantics.codecs,
            codec,
            &self.reserved_payload_types,
        )?;
        if !self.reserved_payload_types.contains(&rtp_codec.payload_type) {
            self.reserved_payload_types.push(rtp_codec.payload_type);
        }
        Ok(rtp_codec)
    }

    pub fn set_proto(&mut self, proto: Proto) {
        self.media.proto = proto;
    }

    pub fn set_direction(&mut self, direction: SdpDirection) -> Result<()> {
        self.semantics.direction.set(&mut self.media.attributes, direction)
    }

    pub fn set_rtcp_mux(&mut self, enabled: bool) {
        self.semantics.rtcp_mux.set(&mut self.media.attributes, enabled);
    }

    pub fn set_mid(&mut self, mid: Option<String>) {
        self.semantics.mid.set(&mut self.media.attributes, mid);
    }

    pub fn set_packet_time(&mut self, packet_time: Option<u32>) {
        self.semantics.ptime.set(&mut self.media.attributes, packet_time);
    }

    pub fn set_silence_supp_enabled(&mut self, enabled: Option<bool>) {
        self.semantics.silence_supp.set_enabled(&mut self.media.attributes, enabled);
    }

    pub fn set_ice_ufrag(&mut self, ufrag: Option<String>) -> Result<()> {
        self.semantics.ice.set_ufrag(&mut self.media.attributes, ufrag)
    }

    pub fn set_ice_pwd(&mut self, pwd: Option<String>) -> Result<()> {
        self.semantics.ice.set_pwd(&mut self.media.attributes, pwd)
    }

    pub fn set_ice_options(&mut self, options: Option<String>) -> Result<()> {
        self.semantics.ice.set_options(&mut self.media.attributes, options)
    }

    /// Random ufrag/pwd with `google-ice` options
    pub fn generate_ice(&mut self) -> Result<()> {
        self.semantics.ice.generate(&mut self.media.attributes)
    }

    pub fn set_crypto(&mut self, crypto: Option<Crypto>) {
        self.semantics.crypto.set(&mut self.media.attributes, crypto);
    }

    pub fn generate_crypto(&mut self) {
        self.semantics
            .crypto
            .generate_aes_cm_128_hmac_sha1_80(&mut self.media.attributes);
    }

    /// Append cname/msid/mslabel/label lines for `ssrc_id`
    pub fn generate_stream(&mut self, ssrc_id: u32) {
        let media_type = self.media.media_type;
        self.semantics
            .streams
            .generate(&mut self.media.attributes, ssrc_id, media_type);
    }

    pub fn set_rtp_port(&mut self, port: u16) {
        self.media.port = port;
    }

    pub fn set_rtcp_port(&mut self, port: u16) {
        self.semantics.rtcp.set_port(&mut self.media.attributes, port);
    }

    pub fn set_rtcp_address(&mut self, address: &str) {
        self.semantics
            .rtcp
            .set_connection_address(&mut self.media.attributes, address);
    }

    pub fn set_connection(&mut self, connection: Option<ConnectionData>) {
        self.media.connection = connection;
    }

    /// Set the RTP port and the media `c=` address. `None` clears the media
    /// `c=` so the session address applies.
    pub fn set_addr(&mut self, port: u16, host: Option<&str>) {
        self.media.port = port;
        match host {
            Some(host) => match self.media.connection.as_mut() {
                Some(connection) => connection.address = host.to_string(),
                None => self.media.connection = Some(ConnectionData::ip4(host)),
            },
            None => self.media.connection = None,
        }
    }

    /// Append server reflexive `a=candidate` lines for RTP and RTCP (components
    /// 1 and 2) on `host:port`.
    pub fn add_candidate(&mut self, port: u16, host: &str) {
        for component in 1..=2 {
            self.media.attributes.append(Attribute::new(
                "candidate",
                AttributeValue::Str(format!(
                    "{} {} udp {} {} {} typ srflx generation 0",
                    CANDIDATE_FOUNDATION, component, CANDIDATE_PRIORITY, host, port
                )),
            ));
        }
    }
}
