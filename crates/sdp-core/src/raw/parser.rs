//! Line-oriented SDP parser.
//!
//! Two nested state machines validate field order. The session machine
//! accepts
//!
//! ```text
//! v o s [i] [u] e* p* [c] b* (t r*)+ [z] [k] a* m*
//! ```
//!
//! and hands control to the media machine on each `m=` line, which accepts
//!
//! ```text
//! m [i] [c] b* [k] a*
//! ```
//!
//! The end of input is fed to the machines as a synthetic `$` field so that
//! the last media is closed the same way as one followed by another `m=`.
//! Any violation aborts the parse; there is no partial document.

use super::attribute::Attribute;
use super::entity::{
    Bandwidth, ConnectionData, Origin, ProtocolVersion, RepeatTimes, SessionName, TimeDescription,
    Timing,
};
use super::media::{Media, MediaLine};
use super::sdp::Sdp;
use crate::error::{Error, Result};
use tracing::trace;

const END: char = '$';

/// Letters allowed after `prev` at session level
fn session_next(prev: Option<char>) -> &'static str {
    match prev {
        None => "v",
        Some('v') => "o",
        Some('o') => "s",
        Some('s') => "iuepcbt",
        Some('i') => "uepcbt",
        Some('u') => "epcbt",
        Some('e') => "epcbt",
        Some('p') => "pcbt",
        Some('c') => "bt",
        Some('b') => "bt",
        Some('t') | Some('r') => "trzkam$",
        Some('z') => "kam$",
        Some('k') => "am$",
        Some('a') => "am$",
        _ => "",
    }
}

/// Letters allowed after `prev` inside a media section
fn media_next(prev: char) -> &'static str {
    match prev {
        'm' => "icbkam$",
        'i' => "cbkam$",
        'c' | 'b' => "bkam$",
        'k' | 'a' => "am$",
        _ => "",
    }
}

struct MediaState {
    media: Media,
    prev: char,
}

impl MediaState {
    fn accept(&mut self, letter: char, value: &str) -> Result<()> {
        if !media_next(self.prev).contains(letter) {
            return Err(Error::parse(format!(
                "unexpected media field {:?} after {:?}",
                letter, self.prev
            )));
        }
        match letter {
            'i' => self.media.title = Some(value.to_string()),
            'c' => self.media.connection = Some(value.parse::<ConnectionData>()?),
            'b' => self.media.bandwidths.push(value.parse::<Bandwidth>()?),
            'k' => self.media.encryption_key = Some(value.to_string()),
            'a' => {
                self.media.attributes.append(value.parse::<Attribute>()?);
            }
            _ => {
                return Err(Error::parse(format!("unexpected media field {:?}", letter)));
            }
        }
        self.prev = letter;
        Ok(())
    }
}

struct SdpParser {
    sdp: Sdp,
    prev: Option<char>,
    media: Option<MediaState>,
}

impl SdpParser {
    fn new() -> Self {
        let mut sdp = Sdp::new();
        sdp.time_descriptions.clear();
        Self {
            sdp,
            prev: None,
            media: None,
        }
    }

    fn close_media(&mut self) -> Result<()> {
        if let Some(state) = self.media.take() {
            if !media_next(state.prev).contains(END) {
                return Err(Error::parse("media section ended unexpectedly"));
            }
            self.sdp.medias.push(state.media);
        }
        Ok(())
    }

    fn accept(&mut self, letter: char, value: &str) -> Result<()> {
        if let Some(media) = self.media.as_mut() {
            if letter != 'm' && letter != END {
                return media.accept(letter, value);
            }
            self.close_media()?;
            if letter == 'm' {
                return self.open_media(value);
            }
            return Ok(());
        }

        if !session_next(self.prev).contains(letter) {
            return Err(Error::parse(format!(
                "unexpected field {:?} after {:?}",
                letter,
                self.prev.map(String::from).unwrap_or_default()
            )));
        }

        let sdp = &mut self.sdp;
        match letter {
            'v' => sdp.version = value.parse::<ProtocolVersion>()?,
            'o' => sdp.origin = value.parse::<Origin>()?,
            's' => sdp.session_name = SessionName(value.to_string()),
            'i' => sdp.information = Some(value.to_string()),
            'u' => sdp.uri = Some(value.to_string()),
            'e' => sdp.emails.push(value.to_string()),
            'p' => sdp.phones.push(value.to_string()),
            'c' => sdp.connection = Some(value.parse::<ConnectionData>()?),
            'b' => sdp.bandwidths.push(value.parse::<Bandwidth>()?),
            't' => sdp
                .time_descriptions
                .push(TimeDescription::new(value.parse::<Timing>()?)),
            'r' => {
                let repeat = value.parse::<RepeatTimes>()?;
                match sdp.time_descriptions.last_mut() {
                    Some(td) => td.repeat_times.push(repeat),
                    None => return Err(Error::parse("repeat time without timing")),
                }
            }
            'z' => sdp.time_zones = Some(value.to_string()),
            'k' => sdp.encryption_key = Some(value.to_string()),
            'a' => {
                sdp.attributes.append(value.parse::<Attribute>()?);
            }
            'm' => return self.open_media(value),
            END => {}
            other => return Err(Error::parse(format!("unexpected field {:?}", other))),
        }
        self.prev = Some(letter);
        Ok(())
    }

    fn open_media(&mut self, value: &str) -> Result<()> {
        let line = value.parse::<MediaLine>()?;
        self.media = Some(MediaState {
            media: Media::from_line(line),
            prev: 'm',
        });
        self.prev = Some('m');
        Ok(())
    }

    fn finish(mut self) -> Result<Sdp> {
        self.accept(END, "")?;
        Ok(self.sdp)
    }
}

/// Split `x=value` into its letter and value
fn split_line(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    if !(letter.is_alphanumeric() || letter == '_') || chars.next()? != '=' {
        return None;
    }
    let value = &line[letter.len_utf8() + 1..];
    if value.is_empty() { None } else { Some((letter, value)) }
}

/// Parse a complete SDP document.
///
/// Accepts CRLF or bare LF line endings. Errors name the 1-based line number
/// of the offending line.
pub fn parse_sdp(text: &str) -> Result<Sdp> {
    let mut parser = SdpParser::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let (letter, value) = split_line(line).ok_or_else(|| {
            Error::parse(format!("Error parsing sdp at line {}: {:?}", line_no, line))
        })?;
        trace!("sdp line {}: {}={}", line_no, letter, value);
        parser.accept(letter, value).map_err(|e| match e {
            Error::Parse(msg) => Error::parse(format!("line {} ({:?}): {}", line_no, line, msg)),
            other => other,
        })?;
    }

    parser
        .finish()
        .map_err(|e| Error::parse(format!("incomplete SDP document: {}", e)))
}
