use super::known::{DYNAMIC_PAYLOAD_TYPES, known_by_codec, known_by_payload_type};
use super::{Codec, DEFAULT_CHANNELS, RtpCodec};
use crate::error::{Error, Result};
use crate::media_type::MediaType;
use crate::raw::attributes::Rtpmap;
use crate::raw::{Attribute, AttributeCollection, AttributeValue, Media};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Scope in which dynamic payload types must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadTypePolicy {
    /// Each media description allocates from the full 96-126 range
    #[default]
    PerMedia,
    /// Payload types already used by other media of the session are skipped
    PerSession,
}

/// Build the codec a media uses for `payload_type`.
///
/// An `a=rtpmap` for the payload type wins; otherwise the static table is
/// consulted. More than one rtpmap, fmtp or imageattr line for the same
/// payload type is a semantic error.
pub fn create_codec_from_attributes(
    media_type: MediaType,
    payload_type: u8,
    attributes: &AttributeCollection,
) -> Result<RtpCodec> {
    let mut rtpmaps = Vec::new();
    let mut fmtps = 0;
    let mut imageattrs = 0;

    for attribute in attributes.iter() {
        match attribute.value() {
            AttributeValue::Rtpmap(rtpmap) if rtpmap.payload_type == payload_type => rtpmaps.push(rtpmap),
            AttributeValue::Fmtp(fmtp) if fmtp.format == payload_type => fmtps += 1,
            AttributeValue::Imageattr(imageattr) if imageattr.payload_type == payload_type => imageattrs += 1,
            _ => {}
        }
    }

    if rtpmaps.len() > 1 || fmtps > 1 || imageattrs > 1 {
        return Err(Error::semantic(format!(
            "too many rtpmap/fmtp/imageattr entries for payload type {}",
            payload_type
        )));
    }

    match rtpmaps.first() {
        Some(rtpmap) => Ok(RtpCodec::new(
            Codec::new(
                media_type,
                rtpmap.encoding_name.clone(),
                rtpmap.clock_rate,
                rtpmap.channels.unwrap_or(DEFAULT_CHANNELS),
            ),
            payload_type,
        )),
        None => known_by_payload_type(payload_type).ok_or(Error::UnknownCodec(payload_type)),
    }
}

/// Codecs of a media in `m=` line order. Unknown payload types are logged and
/// skipped.
pub fn codecs_from_media(media: &Media) -> Result<Vec<RtpCodec>> {
    let mut codecs = Vec::with_capacity(media.formats.len());
    for payload_type in &media.formats {
        match create_codec_from_attributes(media.media_type, *payload_type, &media.attributes) {
            Ok(codec) => codecs.push(codec),
            Err(Error::UnknownCodec(pt)) => {
                warn!("Unknown codec with payload type {} in {} media", pt, media.media_type);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(codecs)
}

/// Add `codec` to a media, assigning its payload type.
///
/// Codecs with a static payload type keep it and get no rtpmap. Others take
/// the lowest dynamic payload type not used by `codecs` nor listed in
/// `reserved`, and an `a=rtpmap` line is appended. Adding a codec the media
/// already carries returns the existing binding.
pub fn add_codec(
    media: &mut Media,
    codecs: &mut Vec<RtpCodec>,
    codec: &Codec,
    reserved: &[u8],
) -> Result<RtpCodec> {
    if let Some(existing) = codecs.iter().find(|c| c.codec == *codec) {
        return Ok(existing.clone());
    }

    let rtp_codec = match known_by_codec(codec) {
        Some(mut known) => {
            known.codec.media_type = media.media_type;
            known
        }
        None => {
            let payload_type = DYNAMIC_PAYLOAD_TYPES
                .clone()
                .find(|pt| !reserved.contains(pt) && !codecs.iter().any(|c| c.payload_type == *pt))
                .ok_or(Error::PayloadTypeExhausted {
                    media_type: media.media_type,
                })?;

            let channels = (codec.channels != DEFAULT_CHANNELS).then_some(codec.channels);
            let rtpmap = Rtpmap::new(payload_type, codec.encoding_name.clone(), codec.clock_rate, channels);
            media
                .attributes
                .append(Attribute::new("rtpmap", AttributeValue::Rtpmap(rtpmap)));
            RtpCodec::new(
                Codec::new(media.media_type, codec.encoding_name.clone(), codec.clock_rate, codec.channels),
                payload_type,
            )
        }
    };

    media.formats.push(rtp_codec.payload_type);
    codecs.push(rtp_codec.clone());
    Ok(rtp_codec)
}
