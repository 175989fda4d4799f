//! Parsing helpers shared by the attribute value parsers.

use crate::error::{Error, Result};
use nom::{
    IResult,
    bytes::complete::take_while1,
    character::complete::digit1,
    combinator::{all_consuming, map_res, rest, verify},
};
use std::str::FromStr;

/// Run `parser` over the whole of `input`, mapping failure to a parse error
/// that names the attribute.
pub(crate) fn parse_all<'a, T, P>(parser: P, input: &'a str, what: &str) -> Result<T>
where
    P: FnMut(&'a str) -> IResult<&'a str, T>,
{
    match all_consuming(parser)(input) {
        Ok((_, value)) => Ok(value),
        Err(_) => Err(Error::parse(format!("invalid {} value: {:?}", what, input))),
    }
}

/// Unsigned decimal number of any width
pub(crate) fn number<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, |s: &str| s.parse::<T>())(input)
}

/// One or more characters up to the next space
pub(crate) fn non_space(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ' ')(input)
}

/// A `\w+` style word: letters, digits and underscore
pub(crate) fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Word characters plus hyphen, used by encoding and ssrc attribute names
pub(crate) fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
}

/// Everything that is left, which must not be empty
pub(crate) fn remainder(input: &str) -> IResult<&str, &str> {
    verify(rest, |s: &str| !s.is_empty())(input)
}
