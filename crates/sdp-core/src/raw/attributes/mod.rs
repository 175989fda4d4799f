//! Typed values of SDP `a=` lines.
//!
//! Every attribute name the engine understands maps to one variant of
//! [`AttributeValue`] through a fixed table in [`AttributeValue::parse`].
//! Names not in the table are kept verbatim as [`AttributeValue::Str`] (or
//! [`AttributeValue::Flag`] when they carry no value), so foreign attributes
//! survive a parse/serialize cycle untouched.
//!
//! | Name | Variant |
//! |------|---------|
//! | `rtpmap` | [`Rtpmap`] |
//! | `fmtp` | [`Fmtp`] |
//! | `ptime` | [`PacketTime`] |
//! | `crypto` | [`Crypto`] |
//! | `ice-ufrag`, `ice-pwd`, `ice-options` | string |
//! | `ice-lite`, `ice-mismatch`, `rtcp-mux` | flag |
//! | `sendrecv`, `sendonly`, `recvonly`, `inactive` | flag |
//! | `ssrc` | [`Ssrc`] |
//! | `rtcp` | [`Rtcp`] |
//! | `group` | [`Group`] |
//! | `mid` | string |
//! | `silenceSupp` | [`SilenceSupp`] |
//! | `imageattr` | [`Imageattr`] |

pub(crate) mod common;
mod crypto;
mod direction;
mod fmtp;
mod group;
mod imageattr;
mod ptime;
mod rtcp;
mod rtpmap;
mod silence_supp;
mod ssrc;

pub use crypto::{Crypto, CryptoSuite, KeyParams};
pub use direction::SdpDirection;
pub use fmtp::Fmtp;
pub use group::{Group, GroupSemantics};
pub use imageattr::Imageattr;
pub use ptime::PacketTime;
pub use rtcp::{Rtcp, RtcpAddress};
pub use rtpmap::Rtpmap;
pub use silence_supp::{SidUse, SilenceSupp, SilenceSuppPref};
pub use ssrc::Ssrc;

use crate::error::{Error, Result};
use std::fmt;

/// Value of a single `a=` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Value-less attribute: direction flags and unknown flags
    Flag,
    /// Unknown attribute with a value, kept as written
    Str(String),
    Rtpmap(Rtpmap),
    Fmtp(Fmtp),
    Crypto(Crypto),
    IceUfrag(String),
    IcePwd(String),
    IceOptions(String),
    IceLite,
    IceMismatch,
    Ssrc(Ssrc),
    Rtcp(Rtcp),
    RtcpMux,
    Group(Group),
    Mid(String),
    Ptime(PacketTime),
    SilenceSupp(SilenceSupp),
    Imageattr(Imageattr),
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| Error::parse(format!("attribute {:?} requires a value", name)))
}

fn flag(name: &str, value: Option<&str>, flag: AttributeValue) -> Result<AttributeValue> {
    match value {
        None => Ok(flag),
        Some(v) => Err(Error::parse(format!(
            "flag attribute {:?} does not take a value, got {:?}",
            name, v
        ))),
    }
}

impl AttributeValue {
    /// Parse the value of attribute `name`.
    ///
    /// `value` is the text after the first `:` of the line, or `None` when the
    /// line has no colon.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Self> {
        match name {
            "rtpmap" => Ok(Self::Rtpmap(required(name, value)?.parse()?)),
            "fmtp" => Ok(Self::Fmtp(required(name, value)?.parse()?)),
            "ptime" => Ok(Self::Ptime(required(name, value)?.parse()?)),
            "crypto" => Ok(Self::Crypto(required(name, value)?.parse()?)),
            "ssrc" => Ok(Self::Ssrc(required(name, value)?.parse()?)),
            "rtcp" => Ok(Self::Rtcp(required(name, value)?.parse()?)),
            "group" => Ok(Self::Group(required(name, value)?.parse()?)),
            "silenceSupp" => Ok(Self::SilenceSupp(required(name, value)?.parse()?)),
            "imageattr" => Ok(Self::Imageattr(required(name, value)?.parse()?)),
            "ice-ufrag" => Ok(Self::IceUfrag(required(name, value)?.to_string())),
            "ice-pwd" => Ok(Self::IcePwd(required(name, value)?.to_string())),
            "ice-options" => Ok(Self::IceOptions(required(name, value)?.to_string())),
            "mid" => Ok(Self::Mid(required(name, value)?.to_string())),
            "ice-lite" => flag(name, value, Self::IceLite),
            "ice-mismatch" => flag(name, value, Self::IceMismatch),
            "rtcp-mux" => flag(name, value, Self::RtcpMux),
            "sendrecv" | "sendonly" | "recvonly" | "inactive" => flag(name, value, Self::Flag),
            _ => Ok(match value {
                Some(v) => Self::Str(v.to_string()),
                None => Self::Flag,
            }),
        }
    }

    /// Value-less variants serialize as the attribute name alone
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            AttributeValue::Flag
                | AttributeValue::IceLite
                | AttributeValue::IceMismatch
                | AttributeValue::RtcpMux
        )
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag | Self::IceLite | Self::IceMismatch | Self::RtcpMux => Ok(()),
            Self::Str(s) | Self::IceUfrag(s) | Self::IcePwd(s) | Self::IceOptions(s) | Self::Mid(s) => f.write_str(s),
            Self::Rtpmap(v) => v.fmt(f),
            Self::Fmtp(v) => v.fmt(f),
            Self::Crypto(v) => v.fmt(f),
            Self::Ssrc(v) => v.fmt(f),
            Self::Rtcp(v) => v.fmt(f),
            Self::Group(v) => v.fmt(f),
            Self::Ptime(v) => v.fmt(f),
            Self::SilenceSupp(v) => v.fmt(f),
            Self::Imageattr(v) => v.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_table_dispatch() {
        assert!(matches!(
            AttributeValue::parse("rtpmap", Some("0 PCMU/8000")),
            Ok(AttributeValue::Rtpmap(_))
        ));
        assert_eq!(
            AttributeValue::parse("ice-ufrag", Some("F7gI")).unwrap(),
            AttributeValue::IceUfrag("F7gI".into())
        );
        assert_eq!(AttributeValue::parse("rtcp-mux", None).unwrap(), AttributeValue::RtcpMux);
        assert_eq!(AttributeValue::parse("recvonly", None).unwrap(), AttributeValue::Flag);
    }

    #[test]
    fn test_unknown_attributes_are_opaque() {
        assert_eq!(
            AttributeValue::parse("extmap", Some("1 urn:ietf:params:rtp-hdrext:toffset")).unwrap(),
            AttributeValue::Str("1 urn:ietf:params:rtp-hdrext:toffset".into())
        );
        assert_eq!(
            AttributeValue::parse("extmap-allow-mixed", None).unwrap(),
            AttributeValue::Flag
        );
    }

    #[test]
    fn test_flag_rejects_value_and_value_requires_one() {
        assert!(AttributeValue::parse("rtcp-mux", Some("yes")).is_err());
        assert!(AttributeValue::parse("sendrecv", Some("x")).is_err());
        assert!(AttributeValue::parse("mid", None).is_err());
        assert!(AttributeValue::parse("rtpmap", None).is_err());
    }

    fn reformat(name: &str, text: &str) -> String {
        AttributeValue::parse(name, Some(text)).unwrap().to_string()
    }

    proptest! {
        #[test]
        fn rtpmap_round_trip(
            pt in 0u8..=127,
            name in "[A-Za-z0-9\\-]{1,16}",
            rate in 1u32..200_000,
            channels in proptest::option::of(1u16..8),
        ) {
            let text = match channels {
                Some(ch) => format!("{} {}/{}/{}", pt, name, rate, ch),
                None => format!("{} {}/{}", pt, name, rate),
            };
            prop_assert_eq!(reformat("rtpmap", &text), text);
        }

        #[test]
        fn ssrc_round_trip(id in any::<u32>(), attr in "[a-z][a-z\\-]{0,8}", value in proptest::option::of("[ -~]{1,24}")) {
            let text = match value {
                Some(v) => format!("{} {}:{}", id, attr, v),
                None => format!("{} {}", id, attr),
            };
            prop_assert_eq!(reformat("ssrc", &text), text);
        }

        #[test]
        fn crypto_round_trip(
            tag in 1u32..100,
            key in "[A-Za-z0-9+/]{40}",
            lifetime in proptest::option::of("2\\^(20|31)"),
        ) {
            let text = match lifetime {
                Some(l) => format!("{} AES_CM_128_HMAC_SHA1_80 inline:{}|{}", tag, key, l),
                None => format!("{} AES_CM_128_HMAC_SHA1_32 inline:{}", tag, key),
            };
            prop_assert_eq!(reformat("crypto", &text), text);
        }

        #[test]
        fn rtcp_round_trip(port in any::<u16>(), a in 0u8..=255, b in 0u8..=255) {
            let text = format!("{} IN IP4 10.0.{}.{}", port, a, b);
            prop_assert_eq!(reformat("rtcp", &text), text);
        }

        #[test]
        fn group_round_trip(tags in proptest::collection::vec("[a-z0-9\\-]{1,8}", 1..5)) {
            let text = format!("BUNDLE {}", tags.join(" "));
            prop_assert_eq!(reformat("group", &text), text);
        }

        #[test]
        fn constructed_values_reparse_equal(pt in 0u8..=127, rate in 1u32..100_000) {
            let value = AttributeValue::Rtpmap(Rtpmap::new(pt, "X-codec", rate, None));
            let reparsed = AttributeValue::parse("rtpmap", Some(&value.to_string())).unwrap();
            prop_assert_eq!(reparsed, value);
        }
    }
}
