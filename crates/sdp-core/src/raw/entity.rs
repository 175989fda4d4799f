//! Session-level SDP fields (RFC 4566 section 5).

use super::attributes::{common, common::parse_all};
use crate::error::{Error, Result};
use nom::{
    IResult,
    character::complete::{char, one_of},
    combinator::{map, opt},
    multi::many1,
    sequence::{pair, preceded, tuple},
};
use std::fmt;
use std::str::FromStr;

/// `v=` - only version 0 exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolVersion;

impl FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "0" {
            Ok(ProtocolVersion)
        } else {
            Err(Error::parse(format!("unsupported protocol version {:?}", s)))
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetType {
    #[default]
    In,
}

impl FromStr for NetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "IN" => Ok(NetType::In),
            other => Err(Error::parse(format!("unknown network type {:?}", other))),
        }
    }
}

impl fmt::Display for NetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IN")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddrType {
    #[default]
    Ip4,
    Ip6,
}

impl FromStr for AddrType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "IP4" => Ok(AddrType::Ip4),
            "IP6" => Ok(AddrType::Ip6),
            other => Err(Error::parse(format!("unknown address type {:?}", other))),
        }
    }
}

impl fmt::Display for AddrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddrType::Ip4 => "IP4",
            AddrType::Ip6 => "IP6",
        })
    }
}

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub net_type: NetType,
    pub addr_type: AddrType,
    pub unicast_address: String,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            username: "-".to_string(),
            session_id: 0,
            session_version: 0,
            net_type: NetType::In,
            addr_type: AddrType::Ip4,
            unicast_address: "127.0.0.1".to_string(),
        }
    }
}

fn origin(input: &str) -> IResult<&str, (&str, u64, u64, &str, &str, &str)> {
    let (input, (username, _, session_id, _, session_version, _, net_type, _, addr_type, _, address)) =
        tuple((
            common::non_space,
            char(' '),
            common::number::<u64>,
            char(' '),
            common::number::<u64>,
            char(' '),
            common::non_space,
            char(' '),
            common::non_space,
            char(' '),
            common::non_space,
        ))(input)?;
    Ok((input, (username, session_id, session_version, net_type, addr_type, address)))
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (username, session_id, session_version, net_type, addr_type, address) =
            parse_all(origin, s, "origin")?;
        Ok(Self {
            username: username.to_string(),
            session_id,
            session_version,
            net_type: net_type.parse()?,
            addr_type: addr_type.parse()?,
            unicast_address: address.to_string(),
        })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.username,
            self.session_id,
            self.session_version,
            self.net_type,
            self.addr_type,
            self.unicast_address
        )
    }
}

/// `s=` - free text, kept as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionName(pub String);

impl Default for SessionName {
    fn default() -> Self {
        SessionName("Session SIP/SDP".to_string())
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `c=<nettype> <addrtype> <connection-address>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionData {
    pub net_type: NetType,
    pub addr_type: AddrType,
    pub address: String,
}

impl ConnectionData {
    pub fn ip4(address: impl Into<String>) -> Self {
        Self {
            net_type: NetType::In,
            addr_type: AddrType::Ip4,
            address: address.into(),
        }
    }
}

impl FromStr for ConnectionData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (net_type, _, addr_type, _, address) = parse_all(
            tuple((
                common::non_space,
                char(' '),
                common::non_space,
                char(' '),
                common::non_space,
            )),
            s,
            "connection data",
        )?;
        Ok(Self {
            net_type: net_type.parse()?,
            addr_type: addr_type.parse()?,
            address: address.to_string(),
        })
    }
}

impl fmt::Display for ConnectionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.net_type, self.addr_type, self.address)
    }
}

/// `b=<bwtype>:<bandwidth>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bandwidth {
    pub bw_type: String,
    pub bandwidth: u64,
}

impl FromStr for Bandwidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::parse(format!("invalid bandwidth {:?}", s));
        let (bw_type, bandwidth) = s.split_once(':').ok_or_else(invalid)?;
        if bw_type.is_empty() || bw_type.contains(' ') {
            return Err(invalid());
        }
        Ok(Self {
            bw_type: bw_type.to_string(),
            bandwidth: bandwidth.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bw_type, self.bandwidth)
    }
}

/// `t=<start-time> <stop-time>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    pub start: u64,
    pub stop: u64,
}

impl FromStr for Timing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, _, stop) = parse_all(
            tuple((common::number::<u64>, char(' '), common::number::<u64>)),
            s,
            "timing",
        )?;
        Ok(Self { start, stop })
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.stop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn multiplier(&self) -> u64 {
        match self {
            TimeUnit::Days => 86_400,
            TimeUnit::Hours => 3_600,
            TimeUnit::Minutes => 60,
            TimeUnit::Seconds => 1,
        }
    }

    fn suffix(&self) -> char {
        match self {
            TimeUnit::Days => 'd',
            TimeUnit::Hours => 'h',
            TimeUnit::Minutes => 'm',
            TimeUnit::Seconds => 's',
        }
    }
}

/// A time written with an optional unit suffix, e.g. `7d`, `25h`, `3600`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedTime {
    pub amount: u64,
    pub unit: Option<TimeUnit>,
}

impl TypedTime {
    pub fn seconds(amount: u64) -> Self {
        Self { amount, unit: None }
    }

    /// Length in seconds
    pub fn value(&self) -> u64 {
        self.amount * self.unit.map_or(1, |u| u.multiplier())
    }
}

fn typed_time(input: &str) -> IResult<&str, TypedTime> {
    map(
        pair(
            common::number::<u64>,
            opt(map(one_of("dhms"), |c| match c {
                'd' => TimeUnit::Days,
                'h' => TimeUnit::Hours,
                'm' => TimeUnit::Minutes,
                _ => TimeUnit::Seconds,
            })),
        ),
        |(amount, unit)| TypedTime { amount, unit },
    )(input)
}

impl FromStr for TypedTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_all(typed_time, s, "typed time")
    }
}

impl fmt::Display for TypedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount)?;
        if let Some(unit) = self.unit {
            write!(f, "{}", unit.suffix())?;
        }
        Ok(())
    }
}

/// `r=<repeat interval> <active duration> <offsets from start-time>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatTimes {
    pub interval: TypedTime,
    pub duration: TypedTime,
    /// At least one offset is required
    pub offsets: Vec<TypedTime>,
}

impl FromStr for RepeatTimes {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (interval, _, duration, offsets) = parse_all(
            tuple((
                typed_time,
                char(' '),
                typed_time,
                many1(preceded(char(' '), typed_time)),
            )),
            s,
            "repeat times",
        )?;
        Ok(Self {
            interval,
            duration,
            offsets,
        })
    }
}

impl fmt::Display for RepeatTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interval, self.duration)?;
        for offset in &self.offsets {
            write!(f, " {}", offset)?;
        }
        Ok(())
    }
}

/// A `t=` line and the `r=` lines that follow it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeDescription {
    pub timing: Timing,
    pub repeat_times: Vec<RepeatTimes>,
}

impl TimeDescription {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            repeat_times: Vec::new(),
        }
    }

    /// SDP lines without line terminators
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("t={}", self.timing)];
        lines.extend(self.repeat_times.iter().map(|r| format!("r={}", r)));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin() {
        let origin: Origin = "jdoe 2890844526 2890842807 IN IP4 10.47.16.5".parse().unwrap();
        assert_eq!(origin.username, "jdoe");
        assert_eq!(origin.session_id, 2890844526);
        assert_eq!(origin.addr_type, AddrType::Ip4);
        assert_eq!(origin.to_string(), "jdoe 2890844526 2890842807 IN IP4 10.47.16.5");

        assert!("jdoe x 1 IN IP4 10.0.0.1".parse::<Origin>().is_err());
        assert!("jdoe 1 1 ATM IP4 10.0.0.1".parse::<Origin>().is_err());
        assert!("jdoe 1 1 IN IPX 10.0.0.1".parse::<Origin>().is_err());
        assert!("jdoe 1 1 IN IP4".parse::<Origin>().is_err());
    }

    #[test]
    fn test_default_origin() {
        assert_eq!(Origin::default().to_string(), "- 0 0 IN IP4 127.0.0.1");
    }

    #[test]
    fn test_parse_connection_data() {
        let c: ConnectionData = "IN IP6 ::1".parse().unwrap();
        assert_eq!(c.addr_type, AddrType::Ip6);
        assert_eq!(c.address, "::1");
        assert_eq!(ConnectionData::ip4("0.0.0.0").to_string(), "IN IP4 0.0.0.0");
        assert!("IN IP4".parse::<ConnectionData>().is_err());
    }

    #[test]
    fn test_parse_timing() {
        let t: Timing = "2873397496 2873404696".parse().unwrap();
        assert_eq!(t.start, 2873397496);
        assert_eq!(t.stop, 2873404696);
        assert!("-1 100000".parse::<Timing>().is_err());
        assert!("0".parse::<Timing>().is_err());
    }

    #[test]
    fn test_typed_time_value() {
        assert_eq!("7d".parse::<TypedTime>().unwrap().value(), 604_800);
        assert_eq!("25h".parse::<TypedTime>().unwrap().value(), 90_000);
        assert_eq!("3m".parse::<TypedTime>().unwrap().value(), 180);
        assert_eq!("15s".parse::<TypedTime>().unwrap().value(), 15);
        assert_eq!("3600".parse::<TypedTime>().unwrap().value(), 3600);
        assert!("3w".parse::<TypedTime>().is_err());
    }

    #[test]
    fn test_parse_repeat_times() {
        let r: RepeatTimes = "7d 1h 0 25h".parse().unwrap();
        assert_eq!(r.interval.value(), 604_800);
        assert_eq!(r.duration.value(), 3_600);
        assert_eq!(r.offsets.iter().map(TypedTime::value).collect::<Vec<_>>(), vec![0, 90_000]);
        assert_eq!(r.to_string(), "7d 1h 0 25h");

        assert!("10 10".parse::<RepeatTimes>().is_err());
        assert!("10 10 ".parse::<RepeatTimes>().is_err());
    }

    #[test]
    fn test_time_description_lines() {
        let mut td = TimeDescription::new(Timing::default());
        td.repeat_times.push("604800 3600 0 90000".parse().unwrap());
        assert_eq!(td.lines(), vec!["t=0 0", "r=604800 3600 0 90000"]);
    }

    #[test]
    fn test_parse_bandwidth() {
        let b: Bandwidth = "AS:256".parse().unwrap();
        assert_eq!(b.bw_type, "AS");
        assert_eq!(b.bandwidth, 256);
        assert!("AS256".parse::<Bandwidth>().is_err());
    }
}
