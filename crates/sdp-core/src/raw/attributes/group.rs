//! `a=group:<semantics> <identification-tag>+` (RFC 5888)

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupSemantics {
    /// Lip synchronization
    Ls,
    /// Flow identification
    Fid,
    /// Transport bundling
    Bundle,
}

impl GroupSemantics {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupSemantics::Ls => "LS",
            GroupSemantics::Fid => "FID",
            GroupSemantics::Bundle => "BUNDLE",
        }
    }
}

impl FromStr for GroupSemantics {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LS" => Ok(GroupSemantics::Ls),
            "FID" => Ok(GroupSemantics::Fid),
            "BUNDLE" => Ok(GroupSemantics::Bundle),
            other => Err(Error::parse(format!("unknown group semantics {:?}", other))),
        }
    }
}

impl fmt::Display for GroupSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub semantics: GroupSemantics,
    pub tags: Vec<String>,
}

impl Group {
    pub fn new(semantics: GroupSemantics, tags: Vec<String>) -> Self {
        Self { semantics, tags }
    }
}

impl FromStr for Group {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (semantics, tags) = s
            .split_once(' ')
            .ok_or_else(|| Error::parse(format!("invalid group value: {:?}", s)))?;
        let tags: Vec<String> = tags.split(' ').map(str::to_string).collect();
        if tags.iter().any(String::is_empty) {
            return Err(Error::parse(format!("empty tag in group value: {:?}", s)));
        }
        Ok(Self {
            semantics: semantics.parse()?,
            tags,
        })
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.semantics)?;
        for tag in &self.tags {
            write!(f, " {}", tag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group() {
        let value: Group = "BUNDLE audio video".parse().unwrap();
        assert_eq!(value.semantics, GroupSemantics::Bundle);
        assert_eq!(value.tags, vec!["audio".to_string(), "video".to_string()]);
        assert_eq!(value.to_string(), "BUNDLE audio video");
    }

    #[test]
    fn test_parse_group_errors() {
        assert!("BUNDLE".parse::<Group>().is_err());
        assert!("SYNC a b".parse::<Group>().is_err());
        assert!("FID a  b".parse::<Group>().is_err());
    }
}
