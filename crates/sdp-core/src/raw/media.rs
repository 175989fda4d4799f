//! Raw media description (`m=` line and the fields that follow it).

use super::attribute::AttributeCollection;
use super::attributes::common::{non_space, number, parse_all, remainder, word};
use super::entity::{Bandwidth, ConnectionData};
use crate::error::{Error, Result};
use crate::media_type::MediaType;
use nom::{character::complete::char, sequence::tuple};
use std::fmt;
use std::str::FromStr;

/// Transport protocol of an `m=` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Proto {
    #[default]
    RtpAvp,
    RtpAvpf,
    RtpSavp,
    RtpSavpf,
    Rtmp,
}

impl Proto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Proto::RtpAvp => "RTP/AVP",
            Proto::RtpAvpf => "RTP/AVPF",
            Proto::RtpSavp => "RTP/SAVP",
            Proto::RtpSavpf => "RTP/SAVPF",
            Proto::Rtmp => "RTMP",
        }
    }

    /// SRTP profiles that need `a=crypto` key material
    pub fn is_secure(&self) -> bool {
        matches!(self, Proto::RtpSavp | Proto::RtpSavpf)
    }
}

impl FromStr for Proto {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RTP/AVP" => Ok(Proto::RtpAvp),
            "RTP/AVPF" => Ok(Proto::RtpAvpf),
            "RTP/SAVP" => Ok(Proto::RtpSavp),
            "RTP/SAVPF" => Ok(Proto::RtpSavpf),
            "RTMP" => Ok(Proto::Rtmp),
            other => Err(Error::parse(format!("unsupported media protocol {:?}", other))),
        }
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of the `m=` line itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLine {
    pub media_type: MediaType,
    pub port: u16,
    pub proto: Proto,
    pub formats: Vec<u8>,
}

impl FromStr for MediaLine {
    type Err = Error;

    /// `<media> <port> <proto> <fmt> ...`
    fn from_str(s: &str) -> Result<Self> {
        let (media_type, _, port, _, proto, _, formats) = parse_all(
            tuple((
                word,
                char(' '),
                number::<u16>,
                char(' '),
                non_space,
                char(' '),
                remainder,
            )),
            s,
            "media",
        )?;

        let formats = formats
            .split(' ')
            .map(|f| {
                f.parse::<u8>()
                    .ok()
                    .filter(|pt| *pt <= 127)
                    .ok_or_else(|| Error::parse(format!("invalid media format {:?} in {:?}", f, s)))
            })
            .collect::<Result<Vec<u8>>>()?;

        Ok(Self {
            media_type: media_type.parse()?,
            port,
            proto: proto.parse()?,
            formats,
        })
    }
}

impl fmt::Display for MediaLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.media_type, self.port, self.proto)?;
        for format in &self.formats {
            write!(f, " {}", format)?;
        }
        Ok(())
    }
}

/// One media section of an SDP document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub media_type: MediaType,
    pub port: u16,
    pub proto: Proto,
    /// Payload types in `m=` line order
    pub formats: Vec<u8>,
    /// `i=`
    pub title: Option<String>,
    /// `c=`
    pub connection: Option<ConnectionData>,
    /// `b=`
    pub bandwidths: Vec<Bandwidth>,
    /// `k=`
    pub encryption_key: Option<String>,
    pub attributes: AttributeCollection,
}

impl Default for Media {
    fn default() -> Self {
        Self::new(MediaType::Audio)
    }
}

impl Media {
    /// Port 0, `RTP/AVP`, no formats
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            port: 0,
            proto: Proto::RtpAvp,
            formats: Vec::new(),
            title: None,
            connection: None,
            bandwidths: Vec::new(),
            encryption_key: None,
            attributes: AttributeCollection::new(),
        }
    }

    pub fn from_line(line: MediaLine) -> Self {
        Self {
            port: line.port,
            proto: line.proto,
            formats: line.formats,
            ..Self::new(line.media_type)
        }
    }

    pub fn media_line(&self) -> MediaLine {
        MediaLine {
            media_type: self.media_type,
            port: self.port,
            proto: self.proto,
            formats: self.formats.clone(),
        }
    }

    /// SDP lines without terminators, in `m i c b k a` order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("m={}", self.media_line())];
        if let Some(title) = &self.title {
            lines.push(format!("i={}", title));
        }
        if let Some(connection) = &self.connection {
            lines.push(format!("c={}", connection));
        }
        lines.extend(self.bandwidths.iter().map(|b| format!("b={}", b)));
        if let Some(key) = &self.encryption_key {
            lines.push(format!("k={}", key));
        }
        lines.extend(self.attributes.iter().map(|a| format!("a={}", a)));
        lines
    }
}
