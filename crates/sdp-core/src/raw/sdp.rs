use super::attribute::AttributeCollection;
use super::entity::{Bandwidth, ConnectionData, Origin, ProtocolVersion, SessionName, TimeDescription};
use super::media::Media;
use super::parser;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Raw SDP document.
///
/// Fields map one-to-one onto SDP lines. [`Sdp::default`] yields the minimal
/// valid document:
///
/// ```text
/// v=0
/// o=- 0 0 IN IP4 127.0.0.1
/// s=Session SIP/SDP
/// t=0 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sdp {
    pub version: ProtocolVersion,
    pub origin: Origin,
    pub session_name: SessionName,
    /// `i=`
    pub information: Option<String>,
    /// `u=`
    pub uri: Option<String>,
    /// `e=`
    pub emails: Vec<String>,
    /// `p=`
    pub phones: Vec<String>,
    /// Session level `c=`
    pub connection: Option<ConnectionData>,
    pub bandwidths: Vec<Bandwidth>,
    /// One or more `t=` blocks with their `r=` lines
    pub time_descriptions: Vec<TimeDescription>,
    /// `z=`, kept as written
    pub time_zones: Option<String>,
    /// `k=`
    pub encryption_key: Option<String>,
    pub attributes: AttributeCollection,
    pub medias: Vec<Media>,
}

impl Default for Sdp {
    fn default() -> Self {
        Self {
            version: ProtocolVersion,
            origin: Origin::default(),
            session_name: SessionName::default(),
            information: None,
            uri: None,
            emails: Vec::new(),
            phones: Vec::new(),
            connection: None,
            bandwidths: Vec::new(),
            time_descriptions: vec![TimeDescription::default()],
            time_zones: None,
            encryption_key: None,
            attributes: AttributeCollection::new(),
            medias: Vec::new(),
        }
    }
}

impl Sdp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session section lines, in `v o s i u e p c b t r z k a` order
    pub fn session_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("v={}", self.version),
            format!("o={}", self.origin),
            format!("s={}", self.session_name),
        ];
        if let Some(information) = &self.information {
            lines.push(format!("i={}", information));
        }
        if let Some(uri) = &self.uri {
            lines.push(format!("u={}", uri));
        }
        lines.extend(self.emails.iter().map(|e| format!("e={}", e)));
        lines.extend(self.phones.iter().map(|p| format!("p={}", p)));
        if let Some(connection) = &self.connection {
            lines.push(format!("c={}", connection));
        }
        lines.extend(self.bandwidths.iter().map(|b| format!("b={}", b)));
        for time_description in &self.time_descriptions {
            lines.extend(time_description.lines());
        }
        if let Some(zones) = &self.time_zones {
            lines.push(format!("z={}", zones));
        }
        if let Some(key) = &self.encryption_key {
            lines.push(format!("k={}", key));
        }
        lines.extend(self.attributes.iter().map(|a| format!("a={}", a)));
        lines
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.session_lines();
        for media in &self.medias {
            lines.extend(media.lines());
        }
        lines
    }
}

impl FromStr for Sdp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parser::parse_sdp(s)
    }
}

impl fmt::Display for Sdp {
    /// CRLF terminated lines, including the last one
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            write!(f, "{}\r\n", line)?;
        }
        Ok(())
    }
}
