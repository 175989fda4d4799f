//! Network profiles: which address to advertise, which ports to bind and on
//! which interface.
//!
//! Grammar: `[ip][:port-range|:*][ (interface-ip)]`, for example
//! `192.168.1.2:40000-49999 (0.0.0.0)`. A missing ip falls back to the
//! configured default, a missing range means any port and a missing interface
//! means `0.0.0.0`.

use crate::error::ProfileError;
use rand::Rng;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

pub const DEFAULT_MIN_PORT: u16 = 1024;
pub const DEFAULT_MAX_PORT: u16 = 65535;
pub const DEFAULT_IP: &str = "127.0.0.1";
pub const DEFAULT_INTERFACE: &str = "0.0.0.0";

/// Range of (even rtp, odd rtcp) port pairs, end exclusive
#[derive(Debug, Clone, Copy)]
pub struct PortRange {
    start: u16,
    end: u16,
    any: bool,
}

impl PortRange {
    pub fn new(start: u32, end: u32) -> Result<Self, ProfileError> {
        let max = u32::from(DEFAULT_MAX_PORT);
        if !(1..=max).contains(&start) {
            return Err(ProfileError::PortOutOfRange(start));
        }
        if !(1..=max).contains(&end) {
            return Err(ProfileError::PortOutOfRange(end));
        }
        if start >= end {
            return Err(ProfileError::EmptyRange { start, end });
        }
        Ok(Self {
            start: start as u16,
            end: end as u16,
            any: false,
        })
    }

    /// 1024-65535, displayed as `*`
    pub fn any() -> Self {
        Self {
            start: DEFAULT_MIN_PORT,
            end: DEFAULT_MAX_PORT,
            any: true,
        }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn is_any(&self) -> bool {
        self.any
    }

    /// Number of pairs in the range
    pub fn len(&self) -> usize {
        let (start, end) = (usize::from(self.start), usize::from(self.end));
        (end - start - start % 2) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<(u16, u16)> {
        if index >= self.len() {
            return None;
        }
        let rtp = usize::from(self.start) + usize::from(self.start % 2) + index * 2;
        let rtp = u16::try_from(rtp).ok()?;
        Some((rtp, rtp.checked_add(1)?))
    }

    pub fn contains(&self, (rtp, rtcp): (u16, u16)) -> bool {
        self.start <= rtp && rtp < rtcp && rtcp < self.end
    }

    /// All pairs, starting at a random one and wrapping around
    pub fn iter(&self) -> PortPairs {
        let offset = match self.len() {
            0 => 0,
            len => rand::thread_rng().gen_range(0..len),
        };
        self.offset_iter(offset)
    }

    /// All pairs, starting at pair `offset` (modulo the length)
    pub fn offset_iter(&self, offset: usize) -> PortPairs {
        PortPairs {
            range: *self,
            offset,
            index: 0,
        }
    }
}

impl PartialEq for PortRange {
    fn eq(&self, other: &Self) -> bool {
        (self.start, self.end) == (other.start, other.end)
    }
}

impl Eq for PortRange {}

impl PartialOrd for PortRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PortRange {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start, self.end).cmp(&(other.start, other.end))
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.any {
            f.write_str("*")
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Iterator over the pairs of a [`PortRange`]
#[derive(Debug, Clone)]
pub struct PortPairs {
    range: PortRange,
    offset: usize,
    index: usize,
}

impl Iterator for PortPairs {
    type Item = (u16, u16);

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.range.len();
        if self.index >= len {
            return None;
        }
        let pair = self.range.get((self.offset + self.index) % len);
        self.index += 1;
        pair
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.range.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PortPairs {}

fn profile_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\d+\.\d+\.\d+\.\d+)?(?:(?::|^)(\*|(?:(\d+)-(\d+))))?(?:\s*\((\d+\.\d+\.\d+\.\d+)\))?$",
        )
        .ok()
    })
    .as_ref()
}

/// Advertised address, port range and bind interface of a media point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub ip: String,
    pub port_range: PortRange,
    pub interface: String,
}

impl Profile {
    pub fn new(ip: impl Into<String>, port_range: PortRange, interface: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port_range,
            interface: interface.into(),
        }
    }

    /// Parse a profile string, using `default_ip` when it names no ip
    pub fn parse(profile: &str, default_ip: &str) -> Result<Self, ProfileError> {
        let invalid = || ProfileError::InvalidSyntax(profile.to_string());
        let captures = profile_regex().and_then(|re| re.captures(profile)).ok_or_else(invalid)?;

        let ip = captures.get(1).map_or(default_ip, |m| m.as_str());
        let port_range = match (captures.get(3), captures.get(4)) {
            (Some(start), Some(end)) => {
                let start = start.as_str().parse::<u32>().map_err(|_| invalid())?;
                let end = end.as_str().parse::<u32>().map_err(|_| invalid())?;
                PortRange::new(start, end)?
            }
            _ => PortRange::any(),
        };
        let interface = captures.get(5).map_or(DEFAULT_INTERFACE, |m| m.as_str());

        Ok(Self::new(ip, port_range, interface))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (interface={})", self.ip, self.port_range, self.interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_range_bounds() {
        assert_eq!(PortRange::new(1, 1), Err(ProfileError::EmptyRange { start: 1, end: 1 }));
        assert_eq!(PortRange::new(10, 1), Err(ProfileError::EmptyRange { start: 10, end: 1 }));
        assert_eq!(PortRange::new(0, 100), Err(ProfileError::PortOutOfRange(0)));
        assert_eq!(PortRange::new(1, 65536), Err(ProfileError::PortOutOfRange(65536)));
        assert_eq!(PortRange::new(15, 16).map(|r| r.end()), Ok(16));
    }

    #[test]
    fn test_range_len() {
        let len = |start, end| PortRange::new(start, end).unwrap().len();
        assert_eq!(len(1, 2), 0);
        assert_eq!(len(1, 3), 0);
        assert_eq!(len(1, 4), 1);
        assert_eq!(len(1, 6), 2);
        assert_eq!(len(1, 9), 3);
        assert_eq!(len(2, 3), 0);
        assert_eq!(len(2, 4), 1);
        assert_eq!(len(2, 8), 3);
        assert_eq!(len(2, 9), 3);
    }

    #[test]
    fn test_range_order() {
        let mut ranges: Vec<PortRange> = [(1, 100), (3, 100), (2, 100), (3, 101), (1, 101), (2, 101)]
            .into_iter()
            .map(|(s, e)| PortRange::new(s, e).unwrap())
            .collect();
        ranges.sort();
        let pairs: Vec<(u16, u16)> = ranges.iter().map(|r| (r.start(), r.end())).collect();
        assert_eq!(pairs, vec![(1, 100), (1, 101), (2, 100), (2, 101), (3, 100), (3, 101)]);
    }

    #[test]
    fn test_range_contains() {
        let range = PortRange::new(1, 10).unwrap();
        assert!(range.contains((2, 3)));
        assert!(range.contains((8, 9)));
        assert!(!range.contains((0, 1)));
        assert!(!range.contains((10, 11)));
        assert!(!PortRange::new(1, 11).unwrap().contains((10, 11)));
    }

    #[test]
    fn test_offset_iter_wraps() {
        let range = PortRange::new(1, 10).unwrap();
        assert_eq!(range.offset_iter(0).collect::<Vec<_>>(), vec![(2, 3), (4, 5), (6, 7), (8, 9)]);
        assert_eq!(range.offset_iter(1).collect::<Vec<_>>(), vec![(4, 5), (6, 7), (8, 9), (2, 3)]);
        assert_eq!(range.offset_iter(4).collect::<Vec<_>>(), vec![(2, 3), (4, 5), (6, 7), (8, 9)]);
        assert_eq!(PortRange::new(1, 5).unwrap().offset_iter(1).collect::<Vec<_>>(), vec![(2, 3)]);

        let mut random: Vec<_> = range.iter().collect();
        random.sort();
        assert_eq!(random, vec![(2, 3), (4, 5), (6, 7), (8, 9)]);
        assert_eq!(PortRange::new(1, 3).unwrap().iter().count(), 0);
    }

    #[test]
    fn test_parse_profile() {
        let p = Profile::parse("1.2.3.4", DEFAULT_IP).unwrap();
        assert_eq!((p.ip.as_str(), p.port_range.is_any(), p.interface.as_str()), ("1.2.3.4", true, "0.0.0.0"));

        let p = Profile::parse("1.2.3.4:*", DEFAULT_IP).unwrap();
        assert!(p.port_range.is_any());

        let p = Profile::parse("(1.1.1.1)", DEFAULT_IP).unwrap();
        assert_eq!((p.ip.as_str(), p.interface.as_str()), (DEFAULT_IP, "1.1.1.1"));

        let p = Profile::parse("23-45", "10.0.0.1").unwrap();
        assert_eq!(p.ip, "10.0.0.1");
        assert_eq!((p.port_range.start(), p.port_range.end()), (23, 45));

        let p = Profile::parse("192.168.1.2:40000-49999 (192.168.1.2)", DEFAULT_IP).unwrap();
        assert_eq!(p.to_string(), "192.168.1.2:40000-49999 (interface=192.168.1.2)");

        assert_eq!(Profile::parse("", "10.0.0.1").unwrap().to_string(), "10.0.0.1:* (interface=0.0.0.0)");
    }

    #[test]
    fn test_parse_profile_errors() {
        assert_eq!(
            Profile::parse("Hello", DEFAULT_IP),
            Err(ProfileError::InvalidSyntax("Hello".into()))
        );
        assert_eq!(Profile::parse("1.2.3.4:50-40", DEFAULT_IP), Err(ProfileError::EmptyRange { start: 50, end: 40 }));
        assert_eq!(Profile::parse(":1-70000", DEFAULT_IP), Err(ProfileError::PortOutOfRange(70000)));
    }
}
