//! `a=fmtp:<format> <format specific parameters>`

use super::common::{number, parse_all, remainder};
use crate::error::{Error, Result};
use nom::{IResult, character::complete::char, sequence::tuple};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fmtp {
    pub format: u8,
    pub parameters: String,
}

impl Fmtp {
    pub fn new(format: u8, parameters: impl Into<String>) -> Self {
        Self {
            format,
            parameters: parameters.into(),
        }
    }

    /// Split the parameter string on `;` into `key[=value]` pairs.
    pub fn parameter_list(&self) -> Vec<(&str, Option<&str>)> {
        self.parameters
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| match p.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (p, None),
            })
            .collect()
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameter_list()
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v)
    }
}

fn fmtp(input: &str) -> IResult<&str, Fmtp> {
    let (input, (format, _, parameters)) = tuple((number::<u8>, char(' '), remainder))(input)?;
    Ok((input, Fmtp::new(format, parameters)))
}

impl FromStr for Fmtp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_all(fmtp, s, "fmtp")
    }
}

impl fmt::Display for Fmtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format, self.parameters)
    }
}
