//! SDES crypto attribute (RFC 4568).
//!
//! ```text
//! a=crypto:<tag> <crypto-suite> <key-params> [<session-params>]
//! a=crypto:1 AES_CM_128_HMAC_SHA1_80 inline:WVNfX19zZW1jdGwgKCkgewkyMjA7fQp9CnVubGVz|2^20|1:32
//! ```

use super::common::{non_space, number, parse_all, remainder};
use crate::error::{Error, Result};
use nom::{
    IResult,
    character::complete::char,
    combinator::opt,
    sequence::{preceded, tuple},
};
use std::fmt;
use std::str::FromStr;

/// SRTP crypto suites understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryptoSuite {
    AesCm128HmacSha1_32,
    F8_128HmacSha1_32,
    AesCm128HmacSha1_80,
}

impl CryptoSuite {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoSuite::AesCm128HmacSha1_32 => "AES_CM_128_HMAC_SHA1_32",
            CryptoSuite::F8_128HmacSha1_32 => "F8_128_HMAC_SHA1_32",
            CryptoSuite::AesCm128HmacSha1_80 => "AES_CM_128_HMAC_SHA1_80",
        }
    }
}

impl FromStr for CryptoSuite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AES_CM_128_HMAC_SHA1_32" => Ok(CryptoSuite::AesCm128HmacSha1_32),
            "F8_128_HMAC_SHA1_32" => Ok(CryptoSuite::F8_128HmacSha1_32),
            "AES_CM_128_HMAC_SHA1_80" => Ok(CryptoSuite::AesCm128HmacSha1_80),
            other => Err(Error::parse(format!("unsupported crypto suite {:?}", other))),
        }
    }
}

impl fmt::Display for CryptoSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `inline:<key||salt>[|<lifetime>][|<mki>:<length>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParams {
    pub key: String,
    pub lifetime: Option<String>,
    pub mki: Option<String>,
}

impl KeyParams {
    pub fn inline(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            lifetime: None,
            mki: None,
        }
    }
}

fn is_key_char(c: char) -> bool {
    // printable ASCII except ';'
    matches!(c, '\x21'..='\x3A' | '\x3C'..='\x7E')
}

impl FromStr for KeyParams {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::parse(format!("invalid crypto key params: {:?}", s));

        let body = s.strip_prefix("inline:").ok_or_else(invalid)?;
        let mut parts = body.splitn(3, '|');
        let key = parts.next().unwrap_or_default();
        let lifetime = parts.next();
        let mki = parts.next();

        if key.is_empty() || !key.chars().all(is_key_char) {
            return Err(invalid());
        }
        if lifetime.is_some_and(str::is_empty) || mki.is_some_and(str::is_empty) {
            return Err(invalid());
        }

        Ok(Self {
            key: key.to_string(),
            lifetime: lifetime.map(str::to_string),
            mki: mki.map(str::to_string),
        })
    }
}

impl fmt::Display for KeyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inline:{}", self.key)?;
        if let Some(lifetime) = &self.lifetime {
            write!(f, "|{}", lifetime)?;
        }
        if let Some(mki) = &self.mki {
            write!(f, "|{}", mki)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crypto {
    pub tag: u32,
    pub suite: CryptoSuite,
    pub key_params: KeyParams,
    /// Raw session parameters such as `KDR=1 UNENCRYPTED_SRTCP`
    pub session_params: Option<String>,
}

impl Crypto {
    pub fn new(tag: u32, suite: CryptoSuite, key_params: KeyParams) -> Self {
        Self {
            tag,
            suite,
            key_params,
            session_params: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key_params.key
    }
}

fn crypto_fields(input: &str) -> IResult<&str, (u32, &str, &str, Option<&str>)> {
    let (input, (tag, _, suite, _, key_params, session_params)) = tuple((
        number::<u32>,
        char(' '),
        non_space,
        char(' '),
        non_space,
        opt(preceded(char(' '), remainder)),
    ))(input)?;
    Ok((input, (tag, suite, key_params, session_params)))
}

impl FromStr for Crypto {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (tag, suite, key_params, session_params) = parse_all(crypto_fields, s, "crypto")?;
        Ok(Self {
            tag,
            suite: suite.parse()?,
            key_params: key_params.parse()?,
            session_params: session_params.map(str::to_string),
        })
    }
}

impl fmt::Display for Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.tag, self.suite, self.key_params)?;
        if let Some(params) = &self.session_params {
            write!(f, " {}", params)?;
        }
        Ok(())
    }
}
