//! `a=silenceSupp:<on|off> <timer> <pref> <siduse> <fxnslevel>` (RFC 3108)
//!
//! Any of the last four fields may be `-`, meaning "not specified".

use super::common::{number, parse_all};
use crate::error::{Error, Result};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, value},
    sequence::tuple,
};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceSuppPref {
    Standard,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidUse {
    NoSid,
    FixedNoise,
    SampledNoise,
}

impl SidUse {
    fn as_str(&self) -> &'static str {
        match self {
            SidUse::NoSid => "No SID",
            SidUse::FixedNoise => "Fixed Noise",
            SidUse::SampledNoise => "Sampled Noise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceSupp {
    pub enabled: bool,
    pub timer: Option<u32>,
    pub pref: Option<SilenceSuppPref>,
    pub sid_use: Option<SidUse>,
    pub fxnslevel: Option<u32>,
}

impl SilenceSupp {
    /// Suppression switched on or off with every other field unspecified
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            timer: None,
            pref: None,
            sid_use: None,
            fxnslevel: None,
        }
    }
}

fn unspecified<'a, T, P>(parser: P) -> impl FnMut(&'a str) -> IResult<&'a str, Option<T>>
where
    T: Clone,
    P: FnMut(&'a str) -> IResult<&'a str, T>,
{
    alt((value(None, char('-')), map(parser, Some)))
}

fn silence_supp(input: &str) -> IResult<&str, SilenceSupp> {
    let (input, (enabled, _, timer, _, pref, _, sid_use, _, fxnslevel)) = tuple((
        alt((value(true, tag("on")), value(false, tag("off")))),
        char(' '),
        unspecified(number::<u32>),
        char(' '),
        unspecified(alt((
            value(SilenceSuppPref::Standard, tag("standard")),
            value(SilenceSuppPref::Custom, tag("custom")),
        ))),
        char(' '),
        unspecified(alt((
            value(SidUse::NoSid, tag("No SID")),
            value(SidUse::FixedNoise, tag("Fixed Noise")),
            value(SidUse::SampledNoise, tag("Sampled Noise")),
        ))),
        char(' '),
        unspecified(number::<u32>),
    ))(input)?;

    Ok((
        input,
        SilenceSupp {
            enabled,
            timer,
            pref,
            sid_use,
            fxnslevel,
        },
    ))
}

impl FromStr for SilenceSupp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_all(silence_supp, s, "silenceSupp")
    }
}

fn write_field<T: fmt::Display>(f: &mut fmt::Formatter<'_>, field: Option<T>) -> fmt::Result {
    match field {
        Some(v) => write!(f, " {}", v),
        None => f.write_str(" -"),
    }
}

impl fmt::Display for SilenceSupp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.enabled { "on" } else { "off" })?;
        write_field(f, self.timer)?;
        write_field(
            f,
            self.pref.map(|p| match p {
                SilenceSuppPref::Standard => "standard",
                SilenceSuppPref::Custom => "custom",
            }),
        )?;
        write_field(f, self.sid_use.map(|s| s.as_str()))?;
        write_field(f, self.fxnslevel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_silence_supp() {
        let value: SilenceSupp = "off - - - -".parse().unwrap();
        assert_eq!(value, SilenceSupp::with_enabled(false));

        let value: SilenceSupp = "on 200 custom Sampled Noise 10".parse().unwrap();
        assert!(value.enabled);
        assert_eq!(value.timer, Some(200));
        assert_eq!(value.pref, Some(SilenceSuppPref::Custom));
        assert_eq!(value.sid_use, Some(SidUse::SampledNoise));
        assert_eq!(value.fxnslevel, Some(10));
        assert_eq!(value.to_string(), "on 200 custom Sampled Noise 10");
    }

    #[test]
    fn test_parse_silence_supp_errors() {
        assert!("maybe - - - -".parse::<SilenceSupp>().is_err());
        assert!("on - - -".parse::<SilenceSupp>().is_err());
        assert!("on - fancy - -".parse::<SilenceSupp>().is_err());
        assert!("on - - No Sid -".parse::<SilenceSupp>().is_err());
    }
}
