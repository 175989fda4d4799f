//! Image attribute (RFC 6236).
//!
//! ```text
//! a=imageattr:97 send [x=800,y=640,sar=1.1,q=0.6] [x=480,y=320] recv [x=330,y=250]
//! a=imageattr:97 recv [x=800,y=640,sar=1.1] send [x=330,y=250]
//! a=imageattr:100 recv [x=320,y=240]
//! ```
//!
//! The attribute lists themselves are kept as opaque text.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imageattr {
    pub payload_type: u8,
    pub send: Option<String>,
    pub recv: Option<String>,
    /// The `recv` list was written before the `send` list
    pub recv_first: bool,
}

impl Imageattr {
    pub fn new(payload_type: u8, send: Option<String>, recv: Option<String>) -> Self {
        Self {
            payload_type,
            send,
            recv,
            recv_first: false,
        }
    }
}

/// Split `<first list>[ <second dir> <second list>]`
fn split_lists<'a>(rest: &'a str, second: &str) -> (&'a str, Option<&'a str>) {
    let marker = format!(" {} ", second);
    match rest.find(&marker) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + marker.len()..])),
        None => (rest, None),
    }
}

impl FromStr for Imageattr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::parse(format!("invalid imageattr value: {:?}", s));

        let (pt, rest) = s.split_once(' ').ok_or_else(invalid)?;
        if pt.is_empty() || !pt.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let payload_type: u8 = pt.parse().map_err(|_| invalid())?;

        let (recv_first, rest) = if let Some(rest) = rest.strip_prefix("send ") {
            (false, rest)
        } else if let Some(rest) = rest.strip_prefix("recv ") {
            (true, rest)
        } else {
            return Err(invalid());
        };

        let (first, second) = split_lists(rest, if recv_first { "send" } else { "recv" });
        if first.is_empty() || second.is_some_and(str::is_empty) {
            return Err(invalid());
        }
        let first = Some(first.to_string());
        let second = second.map(str::to_string);
        let (send, recv) = if recv_first { (second, first) } else { (first, second) };

        Ok(Self {
            payload_type,
            send,
            recv,
            recv_first,
        })
    }
}

impl fmt::Display for Imageattr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload_type)?;
        let send = self.send.as_ref().map(|list| ("send", list));
        let recv = self.recv.as_ref().map(|list| ("recv", list));
        let ordered = if self.recv_first { [recv, send] } else { [send, recv] };
        for (direction, list) in ordered.into_iter().flatten() {
            write!(f, " {} {}", direction, list)?;
        }
        Ok(())
    }
}
