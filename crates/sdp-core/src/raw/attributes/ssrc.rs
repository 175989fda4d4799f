//! Source-specific media attribute (RFC 5576).
//!
//! ```text
//! a=ssrc:<ssrc-id> <attribute>
//! a=ssrc:<ssrc-id> <attribute>:<value>
//! ```

use super::common::{identifier, number, parse_all, remainder};
use crate::error::{Error, Result};
use nom::{
    IResult,
    character::complete::char,
    combinator::opt,
    sequence::{preceded, tuple},
};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ssrc {
    pub ssrc_id: u32,
    pub attribute: String,
    pub value: Option<String>,
}

impl Ssrc {
    pub fn new(ssrc_id: u32, attribute: impl Into<String>, value: Option<String>) -> Self {
        Self {
            ssrc_id,
            attribute: attribute.into(),
            value,
        }
    }
}

fn ssrc(input: &str) -> IResult<&str, Ssrc> {
    let (input, (ssrc_id, _, attribute, value)) = tuple((
        number::<u32>,
        char(' '),
        identifier,
        opt(preceded(char(':'), remainder)),
    ))(input)?;
    Ok((input, Ssrc::new(ssrc_id, attribute, value.map(str::to_string))))
}

impl FromStr for Ssrc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_all(ssrc, s, "ssrc")
    }
}

impl fmt::Display for Ssrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ssrc_id, self.attribute)?;
        if let Some(value) = &self.value {
            write!(f, ":{}", value)?;
        }
        Ok(())
    }
}
