//! Raw SDP document model.
//!
//! This layer mirrors the text format one-to-one: every field and every
//! `a=` line is kept, in order, so a canonical document serializes back to
//! the exact bytes it was parsed from. Semantic rules (multiplicity,
//! defaults, codec binding) live one level up.

pub mod attribute;
pub mod attributes;
pub mod entity;
pub mod media;
mod parser;
pub mod sdp;

pub use attribute::{Attribute, AttributeCollection, AttributeHandle, OrderedItem};
pub use attributes::AttributeValue;
pub use entity::{
    AddrType, Bandwidth, ConnectionData, NetType, Origin, ProtocolVersion, RepeatTimes,
    SessionName, TimeDescription, TimeUnit, Timing, TypedTime,
};
pub use media::{Media, MediaLine, Proto};
pub use parser::parse_sdp;
pub use sdp::Sdp;
