//! Media stream identification carried in `a=ssrc` lines.
//!
//! ```text
//! a=ssrc:2981060093 cname:J6DFN5eAAZLoflul
//! a=ssrc:2981060093 msid:gOAmN6lzediz9H2WtqONgA9bbcmJldbeQDKf gOAmN6lzediz9H2WtqONgA9bbcmJldbeQDKfv0
//! a=ssrc:2981060093 mslabel:gOAmN6lzediz9H2WtqONgA9bbcmJldbeQDKf
//! a=ssrc:2981060093 label:gOAmN6lzediz9H2WtqONgA9bbcmJldbeQDKfv0
//! ```

use super::random_string;
use crate::error::{Error, Result};
use crate::media_type::MediaType;
use crate::raw::attributes::Ssrc;
use crate::raw::{Attribute, AttributeCollection, AttributeHandle, AttributeValue};

const ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const CNAME_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const CNAME_LEN: usize = 16;
const STREAM_ID_LEN: usize = 36;

/// One synchronization source and its identification attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    ssrc_id: u32,
    cname: AttributeHandle,
    msid: Option<AttributeHandle>,
    mslabel: Option<AttributeHandle>,
    label: Option<AttributeHandle>,
}

fn ssrc_value(attributes: &AttributeCollection, handle: AttributeHandle) -> Option<&str> {
    match attributes.value(handle)? {
        AttributeValue::Ssrc(ssrc) => ssrc.value.as_deref(),
        _ => None,
    }
}

impl Stream {
    /// Collect the attributes of `ssrc_id`: exactly one `cname`, at most one
    /// each of `msid`, `mslabel` and `label`.
    pub fn from_attributes(ssrc_id: u32, attributes: &AttributeCollection) -> Result<Self> {
        let mut cnames = Vec::new();
        let mut msids = Vec::new();
        let mut mslabels = Vec::new();
        let mut labels = Vec::new();

        for (handle, attribute) in attributes.iter_handles() {
            let AttributeValue::Ssrc(ssrc) = attribute.value() else {
                continue;
            };
            if ssrc.ssrc_id != ssrc_id {
                continue;
            }
            match ssrc.attribute.as_str() {
                "cname" => cnames.push(handle),
                "msid" => msids.push(handle),
                "mslabel" => mslabels.push(handle),
                "label" => labels.push(handle),
                _ => {}
            }
        }

        if cnames.len() != 1 {
            return Err(Error::semantic(format!(
                "wrong number of cname attributes for ssrc {}: {}",
                ssrc_id,
                cnames.len()
            )));
        }
        let single = |found: Vec<AttributeHandle>, what: &str| -> Result<Option<AttributeHandle>> {
            if found.len() > 1 {
                Err(Error::semantic(format!(
                    "wrong number of {} attributes for ssrc {}: {}",
                    what,
                    ssrc_id,
                    found.len()
                )))
            } else {
                Ok(found.first().copied())
            }
        };

        Ok(Self {
            ssrc_id,
            cname: cnames[0],
            msid: single(msids, "msid")?,
            mslabel: single(mslabels, "mslabel")?,
            label: single(labels, "label")?,
        })
    }

    pub fn ssrc_id(&self) -> u32 {
        self.ssrc_id
    }

    pub fn cname<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        ssrc_value(attributes, self.cname)
    }

    pub fn msid<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        ssrc_value(attributes, self.msid?)
    }

    pub fn media_stream_label<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        ssrc_value(attributes, self.mslabel?)
    }

    pub fn media_stream_track_label<'a>(&self, attributes: &'a AttributeCollection) -> Option<&'a str> {
        ssrc_value(attributes, self.label?)
    }
}

/// All streams of one media, in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct StreamCollection {
    streams: Vec<Stream>,
}

impl StreamCollection {
    pub fn from_attributes(attributes: &AttributeCollection) -> Result<Self> {
        let mut ids: Vec<u32> = Vec::new();
        for attribute in attributes.iter() {
            if let AttributeValue::Ssrc(ssrc) = attribute.value() {
                if !ids.contains(&ssrc.ssrc_id) {
                    ids.push(ssrc.ssrc_id);
                }
            }
        }
        let streams = ids
            .into_iter()
            .map(|id| Stream::from_attributes(id, attributes))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { streams })
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Stream> {
        self.streams.get(index)
    }

    pub fn ssrc_ids(&self) -> Vec<u32> {
        self.streams.iter().map(Stream::ssrc_id).collect()
    }

    /// Append a stream for `ssrc_id` with random cname and stream id. The
    /// track id is the stream id followed by `a0` for audio or `v0` for video.
    pub fn generate(
        &mut self,
        attributes: &mut AttributeCollection,
        ssrc_id: u32,
        media_type: MediaType,
    ) -> &Stream {
        let cname = random_string(CNAME_CHARS, CNAME_LEN);
        let stream_id = random_string(ID_CHARS, STREAM_ID_LEN);
        let suffix = if media_type == MediaType::Video { "v0" } else { "a0" };
        let track_id = format!("{}{}", stream_id, suffix);

        let mut append = |name: &str, value: String| {
            attributes.append(Attribute::new(
                "ssrc",
                AttributeValue::Ssrc(Ssrc::new(ssrc_id, name, Some(value))),
            ))
        };
        let cname = append("cname", cname);
        let msid = append("msid", format!("{} {}", stream_id, track_id));
        let mslabel = append("mslabel", stream_id);
        let label = append("label", track_id);

        self.streams.push(Stream {
            ssrc_id,
            cname,
            msid: Some(msid),
            mslabel: Some(mslabel),
            label: Some(label),
        });
        &self.streams[self.streams.len() - 1]
    }
}
