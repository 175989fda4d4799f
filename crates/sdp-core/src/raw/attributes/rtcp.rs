//! `a=rtcp:<port> [<nettype> <addrtype> <connection-address>]` (RFC 3605)

use super::common::{non_space, number, parse_all, word};
use crate::error::{Error, Result};
use nom::{
    IResult,
    character::complete::char,
    combinator::opt,
    sequence::{preceded, tuple},
};
use std::fmt;
use std::str::FromStr;

/// Explicit RTCP address carried after the port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpAddress {
    pub net_type: String,
    pub addr_type: String,
    pub address: String,
}

impl RtcpAddress {
    pub fn ip4(address: impl Into<String>) -> Self {
        Self {
            net_type: "IN".to_string(),
            addr_type: "IP4".to_string(),
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rtcp {
    pub port: u16,
    pub address: Option<RtcpAddress>,
}

impl Rtcp {
    pub fn new(port: u16) -> Self {
        Self { port, address: None }
    }
}

fn rtcp(input: &str) -> IResult<&str, Rtcp> {
    let (input, (port, address)) = tuple((
        number::<u16>,
        opt(preceded(
            char(' '),
            tuple((word, char(' '), word, char(' '), non_space)),
        )),
    ))(input)?;

    let address = address.map(|(net_type, _, addr_type, _, address)| RtcpAddress {
        net_type: net_type.to_string(),
        addr_type: addr_type.to_string(),
        address: address.to_string(),
    });
    Ok((input, Rtcp { port, address }))
}

impl FromStr for Rtcp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_all(rtcp, s, "rtcp")
    }
}

impl fmt::Display for Rtcp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.port)?;
        if let Some(addr) = &self.address {
            write!(f, " {} {} {}", addr.net_type, addr.addr_type, addr.address)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rtcp() {
        let value: Rtcp = "53020".parse().unwrap();
        assert_eq!(value, Rtcp::new(53020));

        let value: Rtcp = "1 IN IP4 0.0.0.0".parse().unwrap();
        assert_eq!(value.port, 1);
        assert_eq!(value.address, Some(RtcpAddress::ip4("0.0.0.0")));
        assert_eq!(value.to_string(), "1 IN IP4 0.0.0.0");
    }

    #[test]
    fn test_parse_rtcp_errors() {
        assert!("port".parse::<Rtcp>().is_err());
        assert!("1 IN IP4".parse::<Rtcp>().is_err());
        assert!("70000".parse::<Rtcp>().is_err());
    }
}
