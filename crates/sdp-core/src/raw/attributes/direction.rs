//! Media direction flags (RFC 4566 section 6).

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SdpDirection {
    #[default]
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl SdpDirection {
    pub const ATTRIBUTE_NAMES: [&'static str; 4] = ["sendrecv", "sendonly", "recvonly", "inactive"];

    pub fn attribute_name(&self) -> &'static str {
        match self {
            SdpDirection::SendRecv => "sendrecv",
            SdpDirection::SendOnly => "sendonly",
            SdpDirection::RecvOnly => "recvonly",
            SdpDirection::Inactive => "inactive",
        }
    }

    /// The direction as seen from the other side of the session
    pub fn reversed(&self) -> Self {
        match self {
            SdpDirection::SendOnly => SdpDirection::RecvOnly,
            SdpDirection::RecvOnly => SdpDirection::SendOnly,
            other => *other,
        }
    }
}

impl FromStr for SdpDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sendrecv" => Ok(SdpDirection::SendRecv),
            "sendonly" => Ok(SdpDirection::SendOnly),
            "recvonly" => Ok(SdpDirection::RecvOnly),
            "inactive" => Ok(SdpDirection::Inactive),
            other => Err(Error::parse(format!("unknown direction {:?}", other))),
        }
    }
}

impl fmt::Display for SdpDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}
