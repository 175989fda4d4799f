//! `a=ptime:<packet time>`

use super::common::{number, parse_all};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketTime(pub u32);

impl FromStr for PacketTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_all(number::<u32>, s, "ptime").map(PacketTime)
    }
}

impl fmt::Display for PacketTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ptime() {
        assert_eq!("20".parse::<PacketTime>().unwrap(), PacketTime(20));
        assert!("20ms".parse::<PacketTime>().is_err());
        assert!("".parse::<PacketTime>().is_err());
    }
}
