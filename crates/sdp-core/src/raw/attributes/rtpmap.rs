//! `a=rtpmap:<payload type> <encoding name>/<clock rate>[/<channels>]`

use super::common::{number, parse_all};
use crate::error::{Error, Result};
use nom::{
    IResult,
    bytes::complete::take_while,
    character::complete::char,
    combinator::opt,
    sequence::{preceded, tuple},
};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rtpmap {
    pub payload_type: u8,
    pub encoding_name: String,
    pub clock_rate: u32,
    pub channels: Option<u16>,
}

impl Rtpmap {
    pub fn new(
        payload_type: u8,
        encoding_name: impl Into<String>,
        clock_rate: u32,
        channels: Option<u16>,
    ) -> Self {
        Self {
            payload_type,
            encoding_name: encoding_name.into(),
            clock_rate,
            channels,
        }
    }
}

fn rtpmap(input: &str) -> IResult<&str, Rtpmap> {
    let (input, (payload_type, _, encoding_name, _, clock_rate, channels)) = tuple((
        number::<u8>,
        char(' '),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
        char('/'),
        number::<u32>,
        opt(preceded(char('/'), number::<u16>)),
    ))(input)?;

    Ok((
        input,
        Rtpmap::new(payload_type, encoding_name, clock_rate, channels),
    ))
}

impl FromStr for Rtpmap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = parse_all(rtpmap, s, "rtpmap")?;
        if value.payload_type > 127 {
            return Err(Error::parse(format!("rtpmap payload type out of range: {:?}", s)));
        }
        Ok(value)
    }
}

impl fmt::Display for Rtpmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.payload_type, self.encoding_name, self.clock_rate)?;
        if let Some(channels) = self.channels {
            write!(f, "/{}", channels)?;
        }
        Ok(())
    }
}
